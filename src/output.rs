//! Rendering query results to stdout

use crate::directory::GroupSummary;
use std::io::{self, Write};

const TITLE_INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
/// Format of the `list` output
pub enum OutputFormat {
    /// `<name> (<count>)` followed by indented titles
    #[default]
    Text,
    /// A JSON array of group summaries
    Json,
}

/// Write a listing of `groups` to `out`
pub fn write_group_listing<'a, W, I>(out: &mut W, groups: I, format: OutputFormat) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = GroupSummary<'a>>,
{
    match format {
        OutputFormat::Text => {
            for group in groups {
                writeln!(out, "{} ({})", group.name, group.entry_count)?;
                for title in &group.titles {
                    writeln!(out, "{}{}", TITLE_INDENT, title)?;
                }
            }
        }
        OutputFormat::Json => {
            let groups: Vec<_> = groups.into_iter().collect();
            serde_json::to_writer_pretty(&mut *out, &groups)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

/// Write a single field value followed by a newline
pub fn write_secret<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}
