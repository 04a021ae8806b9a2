//! Auth callback resolution.
//!
//! An inbound link is turned into an [`InboundAuthRequest`], resolved against
//! the session backend by [`Resolver`], and rendered as a redirect by
//! [`RedirectTargets`]. Resolution is linear:
//! `Start -> TryTokenPath -> TryCodePath -> Terminal(outcome)`.

mod locale;
mod redirect;
mod request;
mod resolver;
mod strategy;

pub use locale::{Locale, UnknownLocale};
pub use redirect::{DEFAULT_NEXT, RedirectTargets, safe_next};
pub use request::InboundAuthRequest;
pub use resolver::{Resolution, Resolver};
pub use strategy::{CodeStrategy, ResolutionStrategy, ResolveError, TokenStrategy, first_success};

/// Where the browser goes once the callback has been handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A recovery link established a session; send the user to set a new password.
    RedirectToRecovery,
    /// Session established; continue to the requested relative path.
    RedirectToNext(String),
    /// Nothing worked; show the login page with this message.
    RedirectToLoginError(String),
}

impl ResolutionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::RedirectToLoginError(_))
    }
}
