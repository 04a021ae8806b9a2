//! HTTP client for a GoTrue compatible auth API.

use super::{BackendError, OtpType, Session, SessionBackend};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const VERIFY_PATH: &str = "/auth/v1/verify";
const PKCE_TOKEN_PATH: &str = "/auth/v1/token?grant_type=pkce";
const DEFAULT_EXPIRES_IN: u64 = 3600;

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

pub struct GoTrueBackend {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl GoTrueBackend {
    /// Build the backend client. Called once at startup.
    ///
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL: {base_url}"))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("Unsupported backend URL scheme: {scheme}")),
        }

        if parsed.host_str().is_none() {
            return Err(anyhow!("Backend URL must include a host: {base_url}"));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Option<Session>, BackendError> {
        let response = self
            .client
            .post(url)
            .header("apikey", self.api_key.expose_secret())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        debug!("{} - {}", url, status);

        parse_session(&body)
    }
}

impl std::fmt::Debug for GoTrueBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionBackend for GoTrueBackend {
    #[instrument(skip(self, token_hash))]
    async fn verify_token(
        &self,
        otp_type: OtpType,
        token_hash: &str,
    ) -> Result<Option<Session>, BackendError> {
        let payload = json!({
            "type": otp_type.as_str(),
            "token_hash": token_hash,
        });

        self.post(&self.endpoint(VERIFY_PATH), &payload).await
    }

    #[instrument(skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, BackendError> {
        let payload = json!({
            "auth_code": code,
            "code_verifier": code_verifier.unwrap_or_default(),
        });

        self.post(&self.endpoint(PKCE_TOKEN_PATH), &payload)
            .await?
            .ok_or_else(|| BackendError::Decode("no access_token in code exchange".to_string()))
    }
}

fn parse_session(body: &str) -> Result<Option<Session>, BackendError> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let token: TokenResponse =
        serde_json::from_str(body).map_err(|err| BackendError::Decode(err.to_string()))?;

    let Some(access_token) = token.access_token.filter(|token| !token.is_empty()) else {
        return Ok(None);
    };

    let session = Session::new(
        SecretString::from(access_token),
        SecretString::from(token.refresh_token.unwrap_or_default()),
        token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
    );

    Ok(Some(match token.token_type {
        Some(token_type) => session.with_token_type(token_type),
        None => session,
    }))
}

// GoTrue is not consistent about where the human readable reason lives.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}
