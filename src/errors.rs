//! Error types for kdbx-key

pub use crate::credentials::CredentialError;
pub use crate::directory::LookupError;
pub use crate::loader::LoadError;
pub use crate::otp::OtpError;
pub use crate::source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
/// Wrapper error type for this crate
pub enum Error {
    /// Failed to locate or open the database bytes
    #[error("Could not read database - {0}")]
    Source(#[from] SourceError),
    /// No usable password was supplied
    #[error("Could not build credentials - {0}")]
    Credential(#[from] CredentialError),
    /// Failed decoding or decrypting the database
    #[error("Could not open database - {0}")]
    Load(#[from] LoadError),
    /// A query against the unlocked database missed
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A stored OTP secret could not be used
    #[error(transparent)]
    Otp(#[from] OtpError),
    /// Failed writing results to the output stream
    #[error("Could not write output - {0}")]
    Output(#[from] std::io::Error),
}
