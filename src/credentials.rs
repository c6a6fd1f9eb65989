//! Assembling the key material used to unlock a database

use crate::diagnostics::Diagnostics;
use crate::prompt::SecretPrompt;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
/// Errors building a [`CredentialBundle`]
pub enum CredentialError {
    /// Neither the environment nor the prompt produced a password
    #[error("password is empty")]
    Missing,
    /// The interactive prompt failed
    #[error("Could not read password - {0}")]
    Prompt(#[from] io::Error),
}

/// A non-empty passphrase and an optional key file
pub struct CredentialBundle {
    passphrase: Zeroizing<String>,
    keyfile: Option<PathBuf>,
}

impl CredentialBundle {
    /// Bundle `passphrase` with an optional `keyfile`
    ///
    /// An empty passphrase is rejected.
    pub fn new(
        passphrase: Zeroizing<String>,
        keyfile: Option<PathBuf>,
    ) -> Result<CredentialBundle, CredentialError> {
        if passphrase.is_empty() {
            return Err(CredentialError::Missing);
        }
        Ok(CredentialBundle {
            passphrase,
            keyfile,
        })
    }

    /// The passphrase
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Path of the key file, if one was configured
    pub fn keyfile(&self) -> Option<&Path> {
        self.keyfile.as_deref()
    }

    /// Take the passphrase and key file path out of the bundle
    pub fn into_parts(self) -> (Zeroizing<String>, Option<PathBuf>) {
        (self.passphrase, self.keyfile)
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("passphrase", &"<redacted>")
            .field("keyfile", &self.keyfile)
            .finish()
    }
}

/// Chooses between an explicitly supplied password and an interactive prompt
pub struct CredentialBuilder<'a, P> {
    prompt: P,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a, P: SecretPrompt> CredentialBuilder<'a, P> {
    /// Create a builder falling back to `prompt`
    pub fn new(prompt: P, diagnostics: &'a dyn Diagnostics) -> CredentialBuilder<'a, P> {
        CredentialBuilder {
            prompt,
            diagnostics,
        }
    }

    /// Produce the credentials for one unlock attempt
    ///
    /// `explicit` takes precedence and suppresses the prompt entirely.
    pub fn build(
        mut self,
        explicit: Option<&str>,
        keyfile: Option<PathBuf>,
    ) -> Result<CredentialBundle, CredentialError> {
        let passphrase = match explicit {
            Some(password) => {
                self.diagnostics
                    .debug(format_args!("using password from environment"));
                Zeroizing::new(password.to_string())
            }
            None => self.prompt.prompt_for_password()?,
        };
        if let Some(path) = &keyfile {
            self.diagnostics
                .debug(format_args!("using key file {}", path.display()));
        }
        CredentialBundle::new(passphrase, keyfile)
    }
}
