use crate::session::OtpType;
use tracing::debug;

/// Credentials and routing hints carried by one inbound callback link.
///
/// Empty strings are treated as absent. An unrecognized `type` is dropped, so
/// the token path is skipped and only the code path can succeed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundAuthRequest {
    token_hash: Option<String>,
    otp_type: Option<OtpType>,
    exchange_code: Option<String>,
    code_verifier: Option<String>,
    next: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl InboundAuthRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from raw query parameters.
    #[must_use]
    pub fn from_query(
        token_hash: Option<String>,
        otp_type: Option<String>,
        exchange_code: Option<String>,
        next: Option<String>,
    ) -> Self {
        let otp_type = non_empty(otp_type).and_then(|raw| match raw.parse::<OtpType>() {
            Ok(otp_type) => Some(otp_type),
            Err(err) => {
                debug!("Ignoring callback type: {err}");
                None
            }
        });

        Self {
            token_hash: non_empty(token_hash),
            otp_type,
            exchange_code: non_empty(exchange_code),
            code_verifier: None,
            next: non_empty(next),
        }
    }

    #[must_use]
    pub fn with_token_hash(mut self, token_hash: impl Into<String>) -> Self {
        self.token_hash = non_empty(Some(token_hash.into()));
        self
    }

    #[must_use]
    pub const fn with_otp_type(mut self, otp_type: OtpType) -> Self {
        self.otp_type = Some(otp_type);
        self
    }

    #[must_use]
    pub fn with_exchange_code(mut self, code: impl Into<String>) -> Self {
        self.exchange_code = non_empty(Some(code.into()));
        self
    }

    #[must_use]
    pub fn with_code_verifier(mut self, verifier: Option<String>) -> Self {
        self.code_verifier = non_empty(verifier);
        self
    }

    #[must_use]
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = non_empty(Some(next.into()));
        self
    }

    #[must_use]
    pub fn token_hash(&self) -> Option<&str> {
        self.token_hash.as_deref()
    }

    #[must_use]
    pub const fn otp_type(&self) -> Option<OtpType> {
        self.otp_type
    }

    #[must_use]
    pub fn exchange_code(&self) -> Option<&str> {
        self.exchange_code.as_deref()
    }

    #[must_use]
    pub fn code_verifier(&self) -> Option<&str> {
        self.code_verifier.as_deref()
    }

    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Recovery is decided by the inbound `type`, whichever path produced the session.
    #[must_use]
    pub fn is_recovery(&self) -> bool {
        self.otp_type.is_some_and(OtpType::is_recovery)
    }

    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        (self.token_hash.is_some() && self.otp_type.is_some()) || self.exchange_code.is_some()
    }
}
