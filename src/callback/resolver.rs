use super::{
    CodeStrategy, InboundAuthRequest, Locale, ResolutionOutcome, ResolutionStrategy,
    TokenStrategy, first_success, safe_next,
};
use super::redirect::checked_path;
use crate::session::{Session, SessionBackend};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of one callback plus the session that produced it, if any.
#[derive(Debug)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    pub session: Option<Session>,
    pub strategy: Option<&'static str>,
}

/// Resolves callback requests against a shared session backend.
///
/// Holds no per-request state; one instance serves every request.
pub struct Resolver {
    backend: Arc<dyn SessionBackend>,
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    default_next: String,
    locale: Locale,
}

impl Resolver {
    /// Token verification first, then code exchange.
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            strategies: vec![Box::new(TokenStrategy), Box::new(CodeStrategy)],
            default_next: super::DEFAULT_NEXT.to_string(),
            locale: Locale::default(),
        }
    }

    /// Where successful non-recovery links go when `next` is missing or unsafe.
    ///
    /// # Errors
    /// Returns an error if `default_next` is not a relative path.
    pub fn with_default_next(mut self, default_next: String) -> Result<Self> {
        self.default_next = checked_path("default next", default_next)?;
        Ok(self)
    }

    #[must_use]
    pub fn default_next(&self) -> &str {
        &self.default_next
    }

    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Resolve a request into exactly one outcome. Never fails: backend
    /// errors become a login redirect with a generic message.
    #[instrument(skip_all, fields(otp_type = ?request.otp_type()))]
    pub async fn resolve(&self, request: &InboundAuthRequest) -> Resolution {
        match first_success(&self.strategies, self.backend.as_ref(), request).await {
            Ok((strategy, session)) => {
                let outcome = if request.is_recovery() {
                    ResolutionOutcome::RedirectToRecovery
                } else {
                    ResolutionOutcome::RedirectToNext(safe_next(
                        request.next(),
                        &self.default_next,
                    ))
                };

                Resolution {
                    outcome,
                    session,
                    strategy: Some(strategy),
                }
            }
            Err(err) => {
                info!("Callback not resolved: {err}");

                Resolution {
                    outcome: ResolutionOutcome::RedirectToLoginError(
                        self.locale.invalid_link_message().to_string(),
                    ),
                    session: None,
                    strategy: None,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{BackendError, OtpType};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeBackend {
        accept_token: bool,
        accept_code: bool,
        verify_calls: AtomicUsize,
        exchange_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(accept_token: bool, accept_code: bool) -> Arc<Self> {
            Arc::new(Self {
                accept_token,
                accept_code,
                ..Self::default()
            })
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.verify_calls.load(Ordering::SeqCst),
                self.exchange_calls.load(Ordering::SeqCst),
            )
        }
    }

    fn session(token: &str) -> Session {
        Session::new(SecretString::from(token), SecretString::from("refresh"), 3600)
    }

    fn rejected() -> BackendError {
        BackendError::Rejected {
            status: 403,
            message: "Token has expired or is invalid".to_string(),
        }
    }

    #[async_trait]
    impl SessionBackend for FakeBackend {
        async fn verify_token(
            &self,
            _otp_type: OtpType,
            _token_hash: &str,
        ) -> Result<Option<Session>, BackendError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.accept_token {
                Ok(Some(session("from-token")))
            } else {
                Err(rejected())
            }
        }

        async fn exchange_code(
            &self,
            _code: &str,
            _code_verifier: Option<&str>,
        ) -> Result<Session, BackendError> {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if self.accept_code {
                Ok(session("from-code"))
            } else {
                Err(rejected())
            }
        }
    }

    fn login_error() -> ResolutionOutcome {
        ResolutionOutcome::RedirectToLoginError(
            Locale::default().invalid_link_message().to_string(),
        )
    }

    #[tokio::test]
    async fn magiclink_goes_to_default_next() {
        let backend = FakeBackend::new(true, false);
        let resolver = Resolver::new(backend.clone());
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Magiclink);

        let resolution = resolver.resolve(&request).await;
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::RedirectToNext("/dashboard".to_string())
        );
        assert_eq!(resolution.strategy, Some("token"));
        assert_eq!(
            resolution.session.map(|s| s.access_token().to_string()),
            Some("from-token".to_string())
        );
        assert_eq!(backend.calls(), (1, 0));
    }

    #[tokio::test]
    async fn recovery_token_ignores_next() {
        let backend = FakeBackend::new(true, true);
        let resolver = Resolver::new(backend);
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Recovery)
            .with_next("/feed");

        let resolution = resolver.resolve(&request).await;
        assert_eq!(resolution.outcome, ResolutionOutcome::RedirectToRecovery);
    }

    #[tokio::test]
    async fn non_recovery_token_uses_next() {
        let backend = FakeBackend::new(true, false);
        let resolver = Resolver::new(backend);
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Signup)
            .with_next("/profile");

        let resolution = resolver.resolve(&request).await;
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::RedirectToNext("/profile".to_string())
        );
    }

    #[tokio::test]
    async fn failed_token_falls_back_to_code() {
        let backend = FakeBackend::new(false, true);
        let resolver = Resolver::new(backend.clone());
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Signup)
            .with_exchange_code("xyz");

        let resolution = resolver.resolve(&request).await;
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::RedirectToNext("/dashboard".to_string())
        );
        assert_eq!(resolution.strategy, Some("code"));
        assert_eq!(backend.calls(), (1, 1));
    }

    #[tokio::test]
    async fn code_with_recovery_type_goes_to_recovery() {
        let backend = FakeBackend::new(false, true);
        let resolver = Resolver::new(backend.clone());
        let request = InboundAuthRequest::new()
            .with_exchange_code("xyz")
            .with_otp_type(OtpType::Recovery);

        let resolution = resolver.resolve(&request).await;
        assert_eq!(resolution.outcome, ResolutionOutcome::RedirectToRecovery);
        // No token_hash, so verification is never attempted.
        assert_eq!(backend.calls(), (0, 1));
    }

    #[tokio::test]
    async fn empty_request_is_login_error_without_backend_calls() {
        let backend = FakeBackend::new(true, true);
        let resolver = Resolver::new(backend.clone());

        let resolution = resolver.resolve(&InboundAuthRequest::new()).await;
        assert_eq!(resolution.outcome, login_error());
        assert!(resolution.session.is_none());
        assert_eq!(backend.calls(), (0, 0));
    }

    #[tokio::test]
    async fn both_paths_failing_calls_each_once() {
        let backend = FakeBackend::new(false, false);
        let resolver = Resolver::new(backend.clone());
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Invite)
            .with_exchange_code("xyz");

        let resolution = resolver.resolve(&request).await;
        assert_eq!(resolution.outcome, login_error());
        assert_eq!(backend.calls(), (1, 1));
    }

    #[tokio::test]
    async fn resolving_twice_gives_same_outcome() {
        let backend = FakeBackend::new(false, true);
        let resolver = Resolver::new(backend);
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Magiclink)
            .with_exchange_code("xyz")
            .with_next("/feed");

        let first = resolver.resolve(&request).await;
        let second = resolver.resolve(&request).await;
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.strategy, second.strategy);
    }

    #[tokio::test]
    async fn unsafe_next_falls_back_to_default() {
        let backend = FakeBackend::new(true, false);
        let resolver = Resolver::new(backend)
            .with_default_next("/feed".to_string())
            .unwrap();
        let request = InboundAuthRequest::new()
            .with_token_hash("abc")
            .with_otp_type(OtpType::Magiclink)
            .with_next("//evil.example");

        let resolution = resolver.resolve(&request).await;
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::RedirectToNext("/feed".to_string())
        );
    }

    #[test]
    fn default_next_must_be_relative() {
        let resolver = Resolver::new(FakeBackend::new(true, true));
        assert_eq!(resolver.default_next(), "/dashboard");
        assert!(
            Resolver::new(FakeBackend::new(true, true))
                .with_default_next("https://evil.example".to_string())
                .is_err()
        );
        assert!(
            Resolver::new(FakeBackend::new(true, true))
                .with_default_next("//evil.example".to_string())
                .is_err()
        );
    }

    #[tokio::test]
    async fn login_error_uses_configured_locale() {
        let resolver = Resolver::new(FakeBackend::new(false, false)).with_locale(Locale::En);
        let resolution = resolver.resolve(&InboundAuthRequest::new()).await;
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::RedirectToLoginError(
                "Invalid or expired confirmation link. Please try again.".to_string()
            )
        );
    }
}
