//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, such as starting the
//! callback server with its full configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{backend, callback};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let backend_opts = backend::Options::parse(matches)?;
    let callback_opts = callback::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        public_url: callback_opts.public_url,
        default_next: callback_opts.default_next,
        recovery_path: callback_opts.recovery_path,
        login_path: callback_opts.login_path,
        locale: callback_opts.locale,
        cookie_prefix: callback_opts.cookie_prefix,
        refresh_cookie_ttl_seconds: callback_opts.refresh_cookie_ttl_seconds,
        backend_url: backend_opts.url,
        backend_api_key: backend_opts.api_key,
        backend_timeout_seconds: backend_opts.timeout_seconds,
    }))
}
