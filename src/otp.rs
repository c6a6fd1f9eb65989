//! Time-based one-time passwords stored in entry fields
//!
//! A field holds either an `otpauth://totp/...` URL or a bare base32 secret.
//! Bare secrets use the common defaults: SHA1, 6 digits, 30 second steps.

use std::time::SystemTimeError;
use thiserror::Error;
use totp_rs::{Algorithm, Secret, TOTP};
use zeroize::Zeroizing;

/// Field read by `otp` when none is named
pub const DEFAULT_OTP_FIELD: &str = "otp";

const URL_PREFIX: &str = "otpauth:";
const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

#[derive(Debug, Error)]
/// Errors generating a one-time password
pub enum OtpError {
    /// The field holds neither a usable URL nor a base32 secret
    #[error("Invalid OTP secret - {0}")]
    InvalidSecret(String),
    /// The system clock is before the Unix epoch
    #[error("Could not read the clock - {0}")]
    Clock(#[from] SystemTimeError),
}

/// An OTP generator built from a field value
pub struct OneTimePassword {
    totp: TOTP,
}

impl OneTimePassword {
    /// Parse `secret`, labelling it with `issuer` and `account` when it is a bare secret
    pub fn new(
        secret: &str,
        issuer: Option<String>,
        account: Option<String>,
    ) -> Result<OneTimePassword, OtpError> {
        let totp = if secret.starts_with(URL_PREFIX) {
            TOTP::from_url_unchecked(secret)
                .map_err(|e| OtpError::InvalidSecret(e.to_string()))?
        } else {
            let bytes = Secret::Encoded(secret.to_string())
                .to_bytes()
                .map_err(|e| OtpError::InvalidSecret(e.to_string()))?;
            TOTP::new_unchecked(
                Algorithm::SHA1,
                DIGITS,
                SKEW,
                STEP,
                bytes,
                issuer,
                account.unwrap_or_default(),
            )
        };
        Ok(OneTimePassword { totp })
    }

    /// Code for the current time step
    pub fn current(&self) -> Result<Zeroizing<String>, OtpError> {
        Ok(Zeroizing::new(self.totp.generate_current()?))
    }

    /// Code for the step containing `unix_time`
    pub fn at(&self, unix_time: u64) -> Zeroizing<String> {
        Zeroizing::new(self.totp.generate(unix_time))
    }
}
