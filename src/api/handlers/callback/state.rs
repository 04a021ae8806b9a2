//! Shared state for the callback handlers.

use super::cookies::CookieConfig;
use crate::callback::{RedirectTargets, Resolver};

/// Built once at startup and shared by every callback request.
pub struct CallbackState {
    resolver: Resolver,
    targets: RedirectTargets,
    cookies: CookieConfig,
}

impl CallbackState {
    #[must_use]
    pub fn new(resolver: Resolver, targets: RedirectTargets) -> Self {
        let cookies = CookieConfig::new(targets.is_secure());
        Self {
            resolver,
            targets,
            cookies,
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: CookieConfig) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[must_use]
    pub const fn targets(&self) -> &RedirectTargets {
        &self.targets
    }

    #[must_use]
    pub const fn cookies(&self) -> &CookieConfig {
        &self.cookies
    }
}
