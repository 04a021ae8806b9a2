//! Session and PKCE verifier cookies.

use crate::session::Session;
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};

const DEFAULT_PREFIX: &str = "sb";
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct CookieConfig {
    prefix: String,
    secure: bool,
    refresh_ttl_seconds: u64,
}

impl CookieConfig {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            secure,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefix = prefix;
        self
    }

    #[must_use]
    pub const fn with_refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn access_cookie_name(&self) -> String {
        format!("{}-access-token", self.prefix)
    }

    #[must_use]
    pub fn refresh_cookie_name(&self) -> String {
        format!("{}-refresh-token", self.prefix)
    }

    #[must_use]
    pub fn verifier_cookie_name(&self) -> String {
        format!("{}-code-verifier", self.prefix)
    }

    /// `Set-Cookie` values for an established session.
    ///
    /// # Errors
    /// Returns an error if a token contains characters not allowed in a header.
    pub fn session_cookies(&self, session: &Session) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
        let mut cookies = vec![self.cookie(
            &self.access_cookie_name(),
            session.access_token(),
            session.expires_in(),
        )?];

        if !session.refresh_token().is_empty() {
            cookies.push(self.cookie(
                &self.refresh_cookie_name(),
                session.refresh_token(),
                self.refresh_ttl_seconds,
            )?);
        }

        Ok(cookies)
    }

    /// Expire the PKCE verifier once it has been used.
    ///
    /// # Errors
    /// Returns an error if the configured prefix is not header safe.
    pub fn clear_verifier_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.cookie(&self.verifier_cookie_name(), "", 0)
    }

    /// Read the PKCE verifier left by the client that started the flow.
    #[must_use]
    pub fn code_verifier(&self, headers: &HeaderMap) -> Option<String> {
        let name = self.verifier_cookie_name();
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|value| value.split(';'))
            .find_map(|pair| {
                let (key, val) = pair.trim().split_once('=')?;
                (key.trim() == name).then(|| val.trim().trim_matches('"').to_string())
            })
            .filter(|verifier| !verifier.is_empty())
    }

    fn cookie(&self, name: &str, value: &str, max_age: u64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}
