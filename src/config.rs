//! Environment configuration
//!
//! Everything is read from environment variables so that the password never
//! shows up in process arguments or shell history.

use crate::source::S3Credentials;
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// URL of the database, `file://` or `s3://`
pub const DATABASE_VAR: &str = "KEEPASSDB";
/// Path to a keyfile used alongside the password
pub const KEYFILE_VAR: &str = "KEEPASSDB_KEYFILE";
/// Database password, skips the interactive prompt
pub const PASSWORD_VAR: &str = "KEEPASSDB_PASSWORD";
/// Log filter, e.g. `debug`
pub const LOG_VAR: &str = "KEY_LOG";
/// Access key for signed object store requests
pub const S3_ACCESS_KEY_VAR: &str = "KEY_S3_ACCESS_KEY";
/// Secret key for signed object store requests
pub const S3_SECRET_KEY_VAR: &str = "KEY_S3_SECRET_KEY";

#[derive(Clone, Default)]
/// Settings for a single invocation
///
/// Empty variables are treated the same as unset ones.
pub struct Config {
    /// Database location URL
    pub database: Option<String>,
    /// Keyfile path, passed through to the decoder unvalidated
    pub keyfile: Option<PathBuf>,
    /// Explicit password
    pub password: Option<Zeroizing<String>>,
    /// `tracing` filter directive for diagnostics
    pub log_filter: Option<String>,
    /// Object store access key
    pub s3_access_key: Option<String>,
    /// Object store secret key
    pub s3_secret_key: Option<Zeroizing<String>>,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Config {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Config {
            database: var(DATABASE_VAR),
            keyfile: var(KEYFILE_VAR).map(PathBuf::from),
            password: var(PASSWORD_VAR).map(Zeroizing::new),
            log_filter: var(LOG_VAR),
            s3_access_key: var(S3_ACCESS_KEY_VAR),
            s3_secret_key: var(S3_SECRET_KEY_VAR).map(Zeroizing::new),
        }
    }

    /// Credentials for signed object store requests, if both halves are set
    pub fn s3_credentials(&self) -> Option<S3Credentials> {
        match (&self.s3_access_key, &self.s3_secret_key) {
            (Some(access_key), Some(secret_key)) => {
                Some(S3Credentials::new(access_key.clone(), secret_key.clone()))
            }
            _ => None,
        }
    }

    /// Short name of the configured database, used in the password prompt
    pub fn database_name(&self) -> &str {
        self.database
            .as_deref()
            .and_then(|location| location.rsplit('/').find(|segment| !segment.is_empty()))
            .unwrap_or("database")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("keyfile", &self.keyfile)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("log_filter", &self.log_filter)
            .field("s3_access_key", &self.s3_access_key)
            .field(
                "s3_secret_key",
                &self.s3_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
