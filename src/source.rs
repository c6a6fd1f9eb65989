//! Locating and opening the raw database bytes
//!
//! The bytes come from exactly one of three places, checked in order:
//!
//! 1. standard input, if it already holds data
//! 2. the location configured in `KEEPASSDB` (`file://` or `s3://`)
//! 3. standard input again, when nothing is configured

mod location;
mod remote;

pub use location::{ObjectLocation, SourceUrl};
pub use remote::{FetchError, ObjectFetcher, S3Credentials, S3Fetcher};

use crate::diagnostics::Diagnostics;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors encountered before any database bytes are read
pub enum SourceError {
    /// The configured location is malformed or uses an unsupported scheme
    #[error("Invalid database location {location:?} - {reason}")]
    ConfigurationInvalid {
        /// The configured location string
        location: String,
        /// What is wrong with it
        reason: String,
    },
    /// A local database file could not be opened
    #[error("Could not open {} - {source}", .path.display())]
    SourceUnavailable {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
    /// The object store request failed
    #[error("Could not fetch {location} - {source}")]
    RemoteFetchFailed {
        /// Object that was requested
        location: ObjectLocation,
        /// Reason reported by the object store client
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where a [`ByteSource`] reads from
pub enum Origin {
    /// The process's standard input
    Stdin,
    /// A file on the local filesystem
    LocalFile(PathBuf),
    /// An object in an S3 compatible store
    ObjectStore(ObjectLocation),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Stdin => write!(f, "stdin"),
            Origin::LocalFile(path) => write!(f, "local-file:{}", path.display()),
            Origin::ObjectStore(location) => write!(f, "object-store:{}", location),
        }
    }
}

/// A forward-only stream of raw database bytes tagged with its origin
///
/// Dropping the source closes the underlying file or connection.
pub struct ByteSource {
    origin: Origin,
    reader: Box<dyn Read + Send>,
}

impl ByteSource {
    /// Wrap `reader`, remembering where it came from
    pub fn new<R: Read + Send + 'static>(origin: Origin, reader: R) -> ByteSource {
        ByteSource {
            origin,
            reader: Box::new(reader),
        }
    }

    /// Where the bytes come from
    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Standard input together with the result of probing its size
pub struct StdinInput {
    pending: u64,
    reader: Box<dyn Read + Send>,
}

impl StdinInput {
    /// Probe the process's standard input without reading from it
    ///
    /// A failed probe counts as empty.
    pub fn process() -> StdinInput {
        StdinInput {
            pending: probe_stdin_len().unwrap_or(0),
            reader: Box::new(BufReader::new(io::stdin())),
        }
    }

    /// Use `reader` as standard input, reporting `pending` bytes available
    pub fn from_reader<R: Read + Send + 'static>(pending: u64, reader: R) -> StdinInput {
        StdinInput {
            pending,
            reader: Box::new(reader),
        }
    }

    /// Bytes reported available by the size probe
    pub fn pending(&self) -> u64 {
        self.pending
    }

    fn into_source(self) -> ByteSource {
        ByteSource {
            origin: Origin::Stdin,
            reader: self.reader,
        }
    }
}

#[cfg(unix)]
fn probe_stdin_len() -> io::Result<u64> {
    use std::os::fd::AsFd;
    let fd = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd).metadata()?.len())
}

#[cfg(windows)]
fn probe_stdin_len() -> io::Result<u64> {
    use std::os::windows::io::AsHandle;
    let handle = io::stdin().as_handle().try_clone_to_owned()?;
    Ok(File::from(handle).metadata()?.len())
}

#[cfg(not(any(unix, windows)))]
fn probe_stdin_len() -> io::Result<u64> {
    Ok(0)
}

/// Picks and opens the database source for one invocation
pub struct SourceResolver<'a, F> {
    location: Option<&'a str>,
    fetcher: F,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a, F: ObjectFetcher> SourceResolver<'a, F> {
    /// Create a resolver for the configured `location`
    pub fn new(
        location: Option<&'a str>,
        fetcher: F,
        diagnostics: &'a dyn Diagnostics,
    ) -> SourceResolver<'a, F> {
        SourceResolver {
            location,
            fetcher,
            diagnostics,
        }
    }

    /// Open the database source, consuming `stdin` if it is selected
    pub fn resolve(&self, stdin: StdinInput) -> Result<ByteSource, SourceError> {
        if stdin.pending() > 0 {
            self.diagnostics.debug(format_args!(
                "reading database from stdin ({} bytes pending)",
                stdin.pending()
            ));
            return Ok(stdin.into_source());
        }

        let location = match self.location.map(str::trim).filter(|l| !l.is_empty()) {
            Some(location) => location,
            None => {
                self.diagnostics
                    .debug(format_args!("no database location configured, reading stdin"));
                return Ok(stdin.into_source());
            }
        };

        match SourceUrl::parse(location)? {
            SourceUrl::LocalFile(path) => {
                self.diagnostics
                    .debug(format_args!("opening database file {}", path.display()));
                match File::open(&path) {
                    Ok(file) => Ok(ByteSource::new(Origin::LocalFile(path), BufReader::new(file))),
                    Err(source) => Err(SourceError::SourceUnavailable { path, source }),
                }
            }
            SourceUrl::ObjectStore(object) => {
                self.diagnostics.debug(format_args!(
                    "fetching database endpoint={} bucket={} key={}",
                    object.endpoint(),
                    object.bucket(),
                    object.key()
                ));
                match self.fetcher.fetch(&object) {
                    Ok(reader) => Ok(ByteSource {
                        origin: Origin::ObjectStore(object),
                        reader,
                    }),
                    Err(source) => Err(SourceError::RemoteFetchFailed {
                        location: object,
                        source,
                    }),
                }
            }
        }
    }
}
