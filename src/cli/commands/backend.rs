use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_BACKEND_API_KEY: &str = "backend-api-key";
pub const ARG_BACKEND_TIMEOUT_SECONDS: &str = "backend-timeout-seconds";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .long(ARG_BACKEND_URL)
                .help("Auth backend base URL, example: https://<project>.supabase.co")
                .env("LINKGATE_BACKEND_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_BACKEND_API_KEY)
                .long(ARG_BACKEND_API_KEY)
                .help("Auth backend API key sent in the apikey header")
                .env("LINKGATE_BACKEND_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT_SECONDS)
                .long(ARG_BACKEND_TIMEOUT_SECONDS)
                .help("Timeout for each auth backend request in seconds")
                .env("LINKGATE_BACKEND_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

pub struct Options {
    pub url: String,
    pub api_key: SecretString,
    pub timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required backend argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_BACKEND_URL)
            .cloned()
            .context("missing required argument: --backend-url")?;
        let api_key = matches
            .get_one::<String>(ARG_BACKEND_API_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --backend-api-key")?;
        let timeout_seconds = matches
            .get_one::<u64>(ARG_BACKEND_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);

        Ok(Self {
            url,
            api_key,
            timeout_seconds,
        })
    }
}
