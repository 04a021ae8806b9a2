use super::ResolutionOutcome;
use anyhow::{Context, Result, anyhow};
use url::Url;

pub const DEFAULT_NEXT: &str = "/dashboard";
const DEFAULT_RECOVERY_PATH: &str = "/reset-password";
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Return `next` when it is a same-origin relative path, otherwise `default`.
///
/// Rejects scheme-relative (`//host`) and backslash (`/\host`) forms that
/// browsers resolve to another origin.
#[must_use]
pub fn safe_next(next: Option<&str>, default: &str) -> String {
    match next {
        Some(path) if is_relative_path(path) => path.to_string(),
        _ => default.to_string(),
    }
}

fn is_relative_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

/// Absolute redirect locations for every outcome, rooted at the public URL.
#[derive(Clone, Debug)]
pub struct RedirectTargets {
    public_url: Url,
    recovery_path: String,
    login_path: String,
}

impl RedirectTargets {
    /// # Errors
    /// Returns an error if `public_url` is not an absolute http(s) URL.
    pub fn new(public_url: &str) -> Result<Self> {
        let public_url =
            Url::parse(public_url).with_context(|| format!("Invalid public URL: {public_url}"))?;

        if !matches!(public_url.scheme(), "http" | "https") || public_url.host_str().is_none() {
            return Err(anyhow!(
                "Public URL must be an absolute http(s) URL: {public_url}"
            ));
        }

        Ok(Self {
            public_url,
            recovery_path: DEFAULT_RECOVERY_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        })
    }

    /// # Errors
    /// Returns an error if `path` is not a relative path.
    pub fn with_recovery_path(mut self, path: String) -> Result<Self> {
        self.recovery_path = checked_path("recovery", path)?;
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `path` is not a relative path.
    pub fn with_login_path(mut self, path: String) -> Result<Self> {
        self.login_path = checked_path("login", path)?;
        Ok(self)
    }

    #[must_use]
    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    /// Session cookies are only marked `Secure` when the site is served over https.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.public_url.scheme() == "https"
    }

    /// # Errors
    /// Returns an error if the outcome path cannot be joined onto the public URL.
    pub fn location(&self, outcome: &ResolutionOutcome) -> Result<Url, url::ParseError> {
        match outcome {
            ResolutionOutcome::RedirectToRecovery => self.public_url.join(&self.recovery_path),
            ResolutionOutcome::RedirectToNext(next) => self.public_url.join(next),
            ResolutionOutcome::RedirectToLoginError(message) => {
                let mut url = self.public_url.join(&self.login_path)?;
                url.query_pairs_mut().append_pair("error", message);
                Ok(url)
            }
        }
    }
}

pub(super) fn checked_path(name: &str, path: String) -> Result<String> {
    if is_relative_path(&path) {
        Ok(path)
    } else {
        Err(anyhow!("The {name} path must start with a single '/': {path}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn targets() -> RedirectTargets {
        RedirectTargets::new("https://app.example.com").unwrap()
    }

    #[test]
    fn safe_next_accepts_relative_paths() {
        assert_eq!(safe_next(Some("/feed"), DEFAULT_NEXT), "/feed");
        assert_eq!(
            safe_next(Some("/profile?tab=badges#top"), DEFAULT_NEXT),
            "/profile?tab=badges#top"
        );
    }

    #[test]
    fn safe_next_rejects_other_origins() {
        for next in [
            "https://evil.example",
            "//evil.example",
            "/\\evil.example",
            "evil",
            "/feed\n",
            "",
        ] {
            assert_eq!(safe_next(Some(next), DEFAULT_NEXT), DEFAULT_NEXT, "{next:?}");
        }
        assert_eq!(safe_next(None, DEFAULT_NEXT), DEFAULT_NEXT);
    }

    #[test]
    fn new_rejects_relative_or_non_http_urls() {
        assert!(RedirectTargets::new("/dashboard").is_err());
        assert!(RedirectTargets::new("mailto:ana@example.com").is_err());
    }

    #[test]
    fn setters_reject_absolute_paths() {
        assert!(targets().with_login_path("https://evil.example/login".to_string()).is_err());
        assert!(targets().with_recovery_path("//evil".to_string()).is_err());
        assert!(targets().with_login_path("/signin".to_string()).is_ok());
    }

    #[test]
    fn location_for_each_outcome() {
        let targets = targets();
        assert_eq!(
            targets
                .location(&ResolutionOutcome::RedirectToRecovery)
                .unwrap()
                .as_str(),
            "https://app.example.com/reset-password"
        );
        assert_eq!(
            targets
                .location(&ResolutionOutcome::RedirectToNext("/feed?x=1".to_string()))
                .unwrap()
                .as_str(),
            "https://app.example.com/feed?x=1"
        );

        let login = targets
            .location(&ResolutionOutcome::RedirectToLoginError(
                "Invalid link".to_string(),
            ))
            .unwrap();
        assert_eq!(login.path(), "/login");
        let error = login
            .query_pairs()
            .find(|(key, _)| key == "error")
            .map(|(_, value)| value.into_owned());
        assert_eq!(error.as_deref(), Some("Invalid link"));
    }

    #[test]
    fn paths_are_rooted_at_origin() {
        let targets = RedirectTargets::new("https://app.example.com/app/").unwrap();
        assert_eq!(
            targets
                .location(&ResolutionOutcome::RedirectToNext("/feed".to_string()))
                .unwrap()
                .as_str(),
            "https://app.example.com/feed"
        );
    }

    #[test]
    fn secure_follows_scheme() {
        assert!(targets().is_secure());
        assert!(!RedirectTargets::new("http://localhost:3000").unwrap().is_secure());
    }
}
