//! Ordered session strategies and the first-success combinator.

use super::InboundAuthRequest;
use crate::session::{BackendError, Session, SessionBackend};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The strategy's credentials are not in the request; the backend was not called.
    #[error("strategy does not apply")]
    NotApplicable,
    #[error("token verification failed: {0}")]
    Verification(#[source] BackendError),
    #[error("code exchange failed: {0}")]
    Exchange(#[source] BackendError),
    #[error("no credentials supplied")]
    NoCredentials,
}

/// One way of turning request credentials into a session.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Try to establish a session. Each call hits the backend at most once.
    async fn attempt(
        &self,
        backend: &dyn SessionBackend,
        request: &InboundAuthRequest,
    ) -> Result<Option<Session>, ResolveError>;
}

/// `token_hash` + `type`, verified as a one-time token.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenStrategy;

#[async_trait]
impl ResolutionStrategy for TokenStrategy {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn attempt(
        &self,
        backend: &dyn SessionBackend,
        request: &InboundAuthRequest,
    ) -> Result<Option<Session>, ResolveError> {
        let (Some(token_hash), Some(otp_type)) = (request.token_hash(), request.otp_type()) else {
            return Err(ResolveError::NotApplicable);
        };

        backend
            .verify_token(otp_type, token_hash)
            .await
            .map_err(ResolveError::Verification)
    }
}

/// PKCE `code`, exchanged for a session.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodeStrategy;

#[async_trait]
impl ResolutionStrategy for CodeStrategy {
    fn name(&self) -> &'static str {
        "code"
    }

    async fn attempt(
        &self,
        backend: &dyn SessionBackend,
        request: &InboundAuthRequest,
    ) -> Result<Option<Session>, ResolveError> {
        let Some(code) = request.exchange_code() else {
            return Err(ResolveError::NotApplicable);
        };

        backend
            .exchange_code(code, request.code_verifier())
            .await
            .map(Some)
            .map_err(ResolveError::Exchange)
    }
}

/// Run strategies in order and stop at the first one that succeeds.
///
/// Returns the winning strategy name with its session. When every strategy
/// fails the last real failure is returned, or `NoCredentials` if none applied.
///
/// # Errors
/// Returns the last backend failure, or `NoCredentials` when no strategy applied.
pub async fn first_success(
    strategies: &[Box<dyn ResolutionStrategy>],
    backend: &dyn SessionBackend,
    request: &InboundAuthRequest,
) -> Result<(&'static str, Option<Session>), ResolveError> {
    let mut last_error = ResolveError::NoCredentials;

    for strategy in strategies {
        match strategy.attempt(backend, request).await {
            Ok(session) => {
                debug!("Callback resolved by {} strategy", strategy.name());
                return Ok((strategy.name(), session));
            }
            Err(ResolveError::NotApplicable) => {
                debug!("Skipping {} strategy", strategy.name());
            }
            Err(err) => {
                warn!("Callback {} strategy failed: {err}", strategy.name());
                last_error = err;
            }
        }
    }

    Err(last_error)
}
