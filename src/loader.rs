//! Decoding and unlocking database bytes

use crate::config::Config;
use crate::credentials::{CredentialBuilder, CredentialBundle};
use crate::diagnostics::Diagnostics;
use crate::directory::EntryTree;
use crate::errors::Error;
use crate::prompt::SecretPrompt;
use crate::source::{ByteSource, ObjectFetcher, Origin, SourceResolver, StdinInput};
use kdbx_rs::CompositeKey;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors turning bytes into an [`EntryTree`]
pub enum LoadError {
    /// The bytes are not a database these credentials unlock
    #[error("Could not decode database from {origin} - {reason}")]
    DecodeFailed {
        /// Where the bytes came from
        origin: Origin,
        /// Message from the decoder
        reason: String,
    },
}

/// Decodes, decrypts and materialises a database
pub struct DatabaseLoader<'a> {
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> DatabaseLoader<'a> {
    /// Create a loader reporting to `diagnostics`
    pub fn new(diagnostics: &'a dyn Diagnostics) -> DatabaseLoader<'a> {
        DatabaseLoader { diagnostics }
    }

    /// Read `source` to the end and unlock it with `credentials`
    pub fn load(
        &self,
        source: ByteSource,
        credentials: CredentialBundle,
    ) -> Result<EntryTree, LoadError> {
        let origin = source.origin().clone();
        let failed = |reason: String| LoadError::DecodeFailed {
            origin: origin.clone(),
            reason,
        };

        let (mut passphrase, keyfile_path) = credentials.into_parts();
        let keyfile = match keyfile_path {
            Some(path) => Some(fs::read(&path).map_err(|e| {
                failed(format!("could not read key file {} - {}", path.display(), e))
            })?),
            None => None,
        };
        // CompositeKey takes the passphrase by value
        let key = CompositeKey::new(Some(std::mem::take(&mut *passphrase)), keyfile);

        self.diagnostics
            .debug(format_args!("decoding database from {}", origin));
        let locked = kdbx_rs::from_reader(source).map_err(|e| failed(e.to_string()))?;
        // FailedUnlock hands the locked database back alongside the reason
        let unlocked = locked.unlock(&key).map_err(|e| failed(e.1.to_string()))?;
        self.diagnostics
            .debug(format_args!("unlocked database from {}", origin));

        Ok(EntryTree::from(unlocked.database()))
    }
}

/// Run the whole pipeline: pick a source, gather credentials, unlock
///
/// Source and credential failures return before any bytes are decoded.
pub fn open_database<F, P>(
    config: &Config,
    stdin: StdinInput,
    fetcher: F,
    prompt: P,
    diagnostics: &dyn Diagnostics,
) -> Result<EntryTree, Error>
where
    F: ObjectFetcher,
    P: SecretPrompt,
{
    let source = SourceResolver::new(config.database.as_deref(), fetcher, diagnostics)
        .resolve(stdin)?;
    let credentials = CredentialBuilder::new(prompt, diagnostics).build(
        config.password.as_deref().map(String::as_str),
        config.keyfile.clone(),
    )?;
    Ok(DatabaseLoader::new(diagnostics).load(source, credentials)?)
}
