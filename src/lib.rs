//! # Linkgate (Authentication Callback Resolver)
//!
//! `linkgate` turns inbound authentication links into a browser redirect. Links
//! arrive in two shapes, sometimes both at once:
//!
//! - **Token hash + type:** email confirmation, magic link, recovery, invite and
//!   email change links carry `token_hash` and `type` query parameters that are
//!   verified against the session backend.
//! - **PKCE code:** OAuth and PKCE email flows carry a single `code` that is
//!   exchanged for a session.
//!
//! The token path is tried first. If it fails (or does not apply) the code path
//! is tried. The first path that yields a session decides the redirect:
//! recovery links land on the password reset page, everything else on `next`.
//! When nothing succeeds the user is sent to the login page with a generic,
//! localized error that does not reveal which path failed.

pub mod api;
pub mod callback;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
