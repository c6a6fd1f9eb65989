#![deny(missing_docs)]

//! Command line access to Keepass 2 (KDBX) databases.
//!
//! An invocation runs a single pipeline:
//!
//! * [`SourceResolver`] picks where the database bytes come from: piped
//!   stdin, a local file or an S3 compatible object store
//! * [`CredentialBuilder`] takes the password from the environment or asks
//!   for it with a [`SecretPrompt`]
//! * [`DatabaseLoader`] decodes and unlocks the bytes into an [`EntryTree`]
//! * [`EntryDirectory`] answers `list`, `get` and `otp` queries over that tree
//!
//! [`open_database`] chains the first three steps together.
//!
//! # Querying a database
//!
//! ```
//! use kdbx_key::directory::{Entry, EntryDirectory, EntryTree, Group, DEFAULT_FIELD};
//! use kdbx_key::output::{write_group_listing, OutputFormat};
//!
//! # fn main() -> Result<(), kdbx_key::Error> {
//! let tree = EntryTree::new(vec![Group::new("Personal")
//!     .with_entry(Entry::new("Email").with_password("hunter2"))]);
//! let directory = EntryDirectory::new(&tree);
//!
//! let mut listing = Vec::new();
//! write_group_listing(&mut listing, directory.list_groups(), OutputFormat::Text)?;
//! assert_eq!(listing, b"Personal (1)\n  Email\n");
//!
//! let entry = directory.find_entry_by_title("Email")?;
//! assert_eq!(directory.get_secret_field(entry, DEFAULT_FIELD)?, "hunter2");
//! # Ok(())
//! # }
//! ```
//!
//! [`CredentialBuilder`]: crate::credentials::CredentialBuilder
//! [`DatabaseLoader`]: crate::loader::DatabaseLoader
//! [`EntryDirectory`]: crate::directory::EntryDirectory
//! [`EntryTree`]: crate::directory::EntryTree
//! [`open_database`]: crate::loader::open_database
//! [`SecretPrompt`]: crate::prompt::SecretPrompt
//! [`SourceResolver`]: crate::source::SourceResolver

pub mod config;
pub mod credentials;
pub mod diagnostics;
pub mod directory;
pub mod errors;
pub mod loader;
pub mod otp;
pub mod output;
pub mod prompt;
pub mod source;

pub use config::Config;
pub use diagnostics::{Diagnostics, MemoryDiagnostics, TracingDiagnostics};
pub use errors::Error;
pub use loader::open_database;
