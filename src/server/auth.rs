//! Bearer credential check.
//!
//! Sessions are owned by a collaborator; this layer only verifies that the
//! request carries the expected credential, either as an `access_token`
//! cookie (how the web player sends it) or an `Authorization: Bearer`
//! header.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::AppConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub async fn require_token(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if credential(&request).as_deref() == Some(config.api_token.as_str()) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "invalid or missing credentials").into_response()
    }
}

fn credential(request: &Request) -> Option<String> {
    let headers = request.headers();

    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
    })
}
