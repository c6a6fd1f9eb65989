//! `key` - read entries from a Keepass 2 database
//!
//! The database location and credentials come from the environment, results
//! go to stdout and everything else goes to stderr.

use clap::{Parser, Subcommand};
use kdbx_key::config::Config;
use kdbx_key::diagnostics::{Diagnostics, TracingDiagnostics};
use kdbx_key::directory::{EntryDirectory, DEFAULT_FIELD};
use kdbx_key::otp::{OneTimePassword, DEFAULT_OTP_FIELD};
use kdbx_key::output::{self, OutputFormat};
use kdbx_key::prompt::TerminalPrompt;
use kdbx_key::source::{S3Fetcher, StdinInput};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const ENVIRONMENT_HELP: &str = "\
Environment:
  KEEPASSDB           database location, file://<path> or s3://<host>/<bucket>/<key>
  KEEPASSDB_KEYFILE   key file used alongside the password
  KEEPASSDB_PASSWORD  password, skips the interactive prompt
  KEY_LOG             diagnostic filter, e.g. debug (default warn)
  KEY_S3_ACCESS_KEY   access key for signed object store requests
  KEY_S3_SECRET_KEY   secret key for signed object store requests

A database piped on stdin takes precedence over KEEPASSDB.";

/// Read entries from a Keepass 2 database
#[derive(Parser, Debug)]
#[command(author, version, about, after_long_help = ENVIRONMENT_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List top-level groups and the titles of their entries
    #[command(visible_alias = "ls")]
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// Print a field of the entry with the given title
    #[command(visible_alias = "g")]
    Get {
        /// Exact title of the entry
        name: String,
        /// Field to print
        #[arg(short, long, default_value = DEFAULT_FIELD)]
        field: String,
    },
    /// Print the current one-time password of the entry with the given title
    Otp {
        /// Exact title of the entry
        name: String,
        /// Field holding the otpauth URL or base32 secret
        #[arg(short, long, default_value = DEFAULT_OTP_FIELD)]
        field: String,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(config.log_filter.as_deref().unwrap_or_default());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

fn run(cli: Cli, config: &Config, diagnostics: &dyn Diagnostics) -> Result<(), kdbx_key::Error> {
    let prompt = TerminalPrompt::new(
        format!("Password for {}", config.database_name()),
        diagnostics,
    );
    let tree = kdbx_key::open_database(
        config,
        StdinInput::process(),
        S3Fetcher::new(config.s3_credentials()),
        prompt,
        diagnostics,
    )?;
    let directory = EntryDirectory::new(&tree);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::List { output: format } => {
            output::write_group_listing(&mut out, directory.list_groups(), format)?
        }
        Command::Get { name, field } => {
            let entry = directory.find_entry_by_title(&name)?;
            let value = directory.get_secret_field(entry, &field)?;
            output::write_secret(&mut out, value)?
        }
        Command::Otp { name, field } => {
            let entry = directory.find_entry_by_title(&name)?;
            let secret = directory.get_secret_field(entry, &field)?;
            let account = entry.field("UserName").map(str::to_string);
            let otp = OneTimePassword::new(secret, Some(entry.title().to_string()), account)?;
            output::write_secret(&mut out, &otp.current()?)?
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_logging(&config);
    let diagnostics = TracingDiagnostics;

    match run(cli, &config, &diagnostics) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics.error(format_args!("{}", e));
            ExitCode::FAILURE
        }
    }
}
