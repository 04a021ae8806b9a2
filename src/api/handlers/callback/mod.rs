//! Auth callback endpoints.
//!
//! `/auth/confirm` receives email links (`token_hash` + `type`), `/auth/callback`
//! receives OAuth and PKCE redirects (`code`). Both accept either shape and run
//! the same resolver, since providers are not consistent about which one they
//! send where.

pub mod cookies;
pub mod state;

pub use cookies::CookieConfig;
pub use state::CallbackState;

use crate::callback::InboundAuthRequest;
use axum::{
    extract::{Extension, RawQuery},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Hashed one-time token from an email link
    token_hash: Option<String>,
    /// Token purpose: signup, invite, magiclink, recovery, email_change or email
    #[serde(rename = "type")]
    otp_type: Option<String>,
    /// PKCE authorization code
    code: Option<String>,
    /// Relative path to continue to after a successful sign-in
    next: Option<String>,
}

impl CallbackQuery {
    /// Parse a raw query string. The first value of a repeated key wins and
    /// unknown keys are ignored.
    fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "token_hash" => &mut query.token_hash,
                "type" => &mut query.otp_type,
                "code" => &mut query.code,
                "next" => &mut query.next,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }

    fn into_request(self) -> InboundAuthRequest {
        InboundAuthRequest::from_query(self.token_hash, self.otp_type, self.code, self.next)
    }
}

#[utoipa::path(
    get,
    path = "/auth/confirm",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Redirect to the next page, the password reset page, or the login page with an error")
    ),
    tag = "auth"
)]
pub async fn confirm(
    headers: HeaderMap,
    state: Extension<Arc<CallbackState>>,
    RawQuery(query): RawQuery,
) -> Response {
    handle(&headers, &state, query.as_deref()).await
}

#[utoipa::path(
    get,
    path = "/auth/callback",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Redirect to the next page, the password reset page, or the login page with an error")
    ),
    tag = "auth"
)]
pub async fn callback(
    headers: HeaderMap,
    state: Extension<Arc<CallbackState>>,
    RawQuery(query): RawQuery,
) -> Response {
    handle(&headers, &state, query.as_deref()).await
}

async fn handle(
    headers: &HeaderMap,
    state: &CallbackState,
    query: Option<&str>,
) -> Response {
    let query = CallbackQuery::from_raw(query);

    let verifier = state.cookies().code_verifier(headers);
    let had_verifier = verifier.is_some();
    let request = query.into_request().with_code_verifier(verifier);

    let resolution = state.resolver().resolve(&request).await;

    let location = match state.targets().location(&resolution.outcome) {
        Ok(url) => url,
        Err(err) => {
            error!("Failed to build redirect location: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    debug!("Redirecting to {}", location.path());

    let mut response_headers = HeaderMap::new();

    match HeaderValue::from_str(location.as_str()) {
        Ok(value) => {
            response_headers.insert(LOCATION, value);
        }
        Err(err) => {
            error!("Invalid redirect location header: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    if let Some(session) = &resolution.session {
        match state.cookies().session_cookies(session) {
            Ok(cookies) => {
                for cookie in cookies {
                    response_headers.append(SET_COOKIE, cookie);
                }
            }
            Err(err) => error!("Failed to build session cookies: {err}"),
        }
    }

    if had_verifier
        && let Ok(cookie) = state.cookies().clear_verifier_cookie()
    {
        response_headers.append(SET_COOKIE, cookie);
    }

    (StatusCode::SEE_OTHER, response_headers).into_response()
}
