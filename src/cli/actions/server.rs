use crate::{
    api::{
        self,
        handlers::{CallbackState, CookieConfig},
    },
    callback::{Locale, RedirectTargets, Resolver},
    session::{GoTrueBackend, SessionBackend},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::debug;

pub struct Args {
    pub port: u16,
    pub public_url: String,
    pub default_next: String,
    pub recovery_path: String,
    pub login_path: String,
    pub locale: Locale,
    pub cookie_prefix: String,
    pub refresh_cookie_ttl_seconds: u64,
    pub backend_url: String,
    pub backend_api_key: SecretString,
    pub backend_timeout_seconds: u64,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("public_url", &self.public_url)
            .field("default_next", &self.default_next)
            .field("recovery_path", &self.recovery_path)
            .field("login_path", &self.login_path)
            .field("locale", &self.locale)
            .field("cookie_prefix", &self.cookie_prefix)
            .field("refresh_cookie_ttl_seconds", &self.refresh_cookie_ttl_seconds)
            .field("backend_url", &self.backend_url)
            .field("backend_api_key", &"***")
            .field("backend_timeout_seconds", &self.backend_timeout_seconds)
            .finish()
    }
}

/// Build the shared callback state from the server arguments.
///
/// # Errors
/// Returns an error if a URL or path argument is invalid or the backend client cannot be built.
pub fn build_state(args: Args) -> Result<CallbackState> {
    let targets = RedirectTargets::new(&args.public_url)?
        .with_recovery_path(args.recovery_path)?
        .with_login_path(args.login_path)?;

    // The backend client lives for the whole process and is never rebuilt.
    let backend: Arc<dyn SessionBackend> = Arc::new(
        GoTrueBackend::new(
            &args.backend_url,
            args.backend_api_key,
            Duration::from_secs(args.backend_timeout_seconds),
        )
        .context("Could not build the auth backend client")?,
    );

    let resolver = Resolver::new(backend)
        .with_default_next(args.default_next)?
        .with_locale(args.locale);

    let cookies = CookieConfig::new(targets.is_secure())
        .with_prefix(args.cookie_prefix)
        .with_refresh_ttl_seconds(args.refresh_cookie_ttl_seconds);

    Ok(CallbackState::new(resolver, targets).with_cookies(cookies))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let port = args.port;
    let state = Arc::new(build_state(args)?);

    api::new(port, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            public_url: "https://app.example.com".to_string(),
            default_next: "/dashboard".to_string(),
            recovery_path: "/reset-password".to_string(),
            login_path: "/login".to_string(),
            locale: Locale::PtBr,
            cookie_prefix: "sb".to_string(),
            refresh_cookie_ttl_seconds: 60,
            backend_url: "https://project.supabase.co".to_string(),
            backend_api_key: SecretString::from("anon-key"),
            backend_timeout_seconds: 5,
        }
    }

    #[test]
    fn build_state_accepts_valid_args() {
        let state = build_state(args());
        assert!(state.is_ok());
        if let Ok(state) = state {
            assert_eq!(state.resolver().default_next(), "/dashboard");
            assert_eq!(state.resolver().locale(), Locale::PtBr);
            assert_eq!(state.cookies().access_cookie_name(), "sb-access-token");
        }
    }

    #[test]
    fn build_state_rejects_bad_paths_and_urls() {
        let mut bad_next = args();
        bad_next.default_next = "https://evil.example".to_string();
        assert!(build_state(bad_next).is_err());

        let mut bad_public = args();
        bad_public.public_url = "app.example.com".to_string();
        assert!(build_state(bad_public).is_err());

        let mut bad_backend = args();
        bad_backend.backend_url = "ftp://project.supabase.co".to_string();
        assert!(build_state(bad_backend).is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        assert!(!format!("{:?}", args()).contains("anon-key"));
    }
}
