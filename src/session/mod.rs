//! Session backend seam.
//!
//! The backend owns users and sessions. `linkgate` only asks it two questions:
//! is this one-time token valid, and can this PKCE code be traded for a session.
//! The backend client is built once at startup and shared behind
//! `Arc<dyn SessionBackend>` for the lifetime of the process.

mod gotrue;
mod otp;

pub use gotrue::GoTrueBackend;
pub use otp::{OtpType, UnknownOtpType};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered and said no (invalid, expired or reused credential).
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid backend response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Verify a hashed one-time token.
    ///
    /// `Ok(None)` means the token was accepted but no session was issued (for
    /// example the first half of a double-confirmed email change).
    async fn verify_token(
        &self,
        otp_type: OtpType,
        token_hash: &str,
    ) -> Result<Option<Session>, BackendError>;

    /// Exchange a PKCE authorization code for a session.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, BackendError>;
}

/// Tokens issued by the backend once a credential is accepted.
#[derive(Clone)]
pub struct Session {
    access_token: SecretString,
    refresh_token: SecretString,
    expires_in: u64,
    token_type: String,
}

impl Session {
    #[must_use]
    pub fn new(access_token: SecretString, refresh_token: SecretString, expires_in: u64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type: "bearer".to_string(),
        }
    }

    #[must_use]
    pub fn with_token_type(mut self, token_type: String) -> Self {
        self.token_type = token_type;
        self
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    #[must_use]
    pub const fn expires_in(&self) -> u64 {
        self.expires_in
    }

    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}
