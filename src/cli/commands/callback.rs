use crate::callback::Locale;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, builder::ValueParser};

pub const ARG_PUBLIC_URL: &str = "public-url";
pub const ARG_DEFAULT_NEXT: &str = "default-next";
pub const ARG_RECOVERY_PATH: &str = "recovery-path";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_LOCALE: &str = "locale";
pub const ARG_COOKIE_PREFIX: &str = "cookie-prefix";
pub const ARG_REFRESH_COOKIE_TTL_SECONDS: &str = "refresh-cookie-ttl-seconds";

#[must_use]
pub fn validator_locale() -> ValueParser {
    ValueParser::from(move |locale: &str| -> std::result::Result<Locale, String> {
        locale.parse::<Locale>().map_err(|err| err.to_string())
    })
}

pub fn with_args(command: Command) -> Command {
    let command = with_redirect_args(command);
    with_cookie_args(command)
}

fn with_redirect_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Public base URL of the site; every redirect is rooted here")
                .env("LINKGATE_PUBLIC_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DEFAULT_NEXT)
                .long(ARG_DEFAULT_NEXT)
                .help("Where to go after sign-in when the link has no usable next")
                .env("LINKGATE_DEFAULT_NEXT")
                .default_value("/dashboard"),
        )
        .arg(
            Arg::new(ARG_RECOVERY_PATH)
                .long(ARG_RECOVERY_PATH)
                .help("Password reset page for recovery links")
                .env("LINKGATE_RECOVERY_PATH")
                .default_value("/reset-password"),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Login page that receives the error message")
                .env("LINKGATE_LOGIN_PATH")
                .default_value("/login"),
        )
        .arg(
            Arg::new(ARG_LOCALE)
                .long(ARG_LOCALE)
                .help("Language of the login error message: pt-BR, en")
                .env("LINKGATE_LOCALE")
                .default_value("pt-BR")
                .value_parser(validator_locale()),
        )
}

fn with_cookie_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COOKIE_PREFIX)
                .long(ARG_COOKIE_PREFIX)
                .help("Prefix for session and PKCE verifier cookie names")
                .env("LINKGATE_COOKIE_PREFIX")
                .default_value("sb"),
        )
        .arg(
            Arg::new(ARG_REFRESH_COOKIE_TTL_SECONDS)
                .long(ARG_REFRESH_COOKIE_TTL_SECONDS)
                .help("Refresh token cookie TTL in seconds")
                .env("LINKGATE_REFRESH_COOKIE_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub public_url: String,
    pub default_next: String,
    pub recovery_path: String,
    pub login_path: String,
    pub locale: Locale,
    pub cookie_prefix: String,
    pub refresh_cookie_ttl_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if `--public-url` is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let string = |name: &str, default: &str| {
            matches
                .get_one::<String>(name)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            public_url: matches
                .get_one::<String>(ARG_PUBLIC_URL)
                .cloned()
                .context("missing required argument: --public-url")?,
            default_next: string(ARG_DEFAULT_NEXT, "/dashboard"),
            recovery_path: string(ARG_RECOVERY_PATH, "/reset-password"),
            login_path: string(ARG_LOGIN_PATH, "/login"),
            locale: matches
                .get_one::<Locale>(ARG_LOCALE)
                .copied()
                .unwrap_or_default(),
            cookie_prefix: string(ARG_COOKIE_PREFIX, "sb"),
            refresh_cookie_ttl_seconds: matches
                .get_one::<u64>(ARG_REFRESH_COOKIE_TTL_SECONDS)
                .copied()
                .unwrap_or(2_592_000),
        })
    }
}
