use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use base64::{Engine as _, engine::GeneralPurpose};
use http::{StatusCode, header};
use tracing::{error, warn};

use super::config::AuthConfig;
use crate::error::{GuardError, GuardResult};
use crate::state::AppState;

const BASE64_ENGINE: GeneralPurpose = base64::engine::general_purpose::STANDARD;

type SingleHeader = [(header::HeaderName, &'static str); 1];
const WWW_AUTHENTICATE_HEADER: SingleHeader = [(header::WWW_AUTHENTICATE, "Basic realm=htguard")];

/// Authentication state after checking credentials
pub enum AuthState {
    Public,
    Request,
    Success,
    Failed,
}

/// Authenticate a request against the admin credentials
pub fn authenticate(auth_config: &AuthConfig, request: &Request) -> GuardResult<AuthState> {
    let (expected_username, expected_password) = match auth_config {
        AuthConfig::None => return Ok(AuthState::Public),
        AuthConfig::Some {
            username,
            password_hash,
        } => (username, password_hash),
    };
    let Some(header_value) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(AuthState::Request);
    };
    let Ok(header_str) = header_value.to_str() else {
        return Ok(AuthState::Failed);
    };
    let mut parts = header_str.split_ascii_whitespace();
    let digest = match (parts.next().map(str::to_ascii_lowercase), parts.next()) {
        (Some(scheme), Some(digest)) if scheme == "basic" => digest,
        _ => return Ok(AuthState::Failed),
    };
    let Some(decoded) = BASE64_ENGINE
        .decode(digest)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return Ok(AuthState::Failed);
    };
    // passwords may contain ':'
    let Some((username, password)) = decoded.split_once(':') else {
        return Ok(AuthState::Failed);
    };
    if username != expected_username {
        return Ok(AuthState::Failed);
    }
    match bcrypt::verify(password, expected_password) {
        Ok(true) => Ok(AuthState::Success),
        Ok(false) => Ok(AuthState::Failed),
        Err(err) => {
            error!(?err, "failed to verify password");
            Err(GuardError::Bcrypt(err))
        }
    }
}

/// Axum middleware function for authentication
pub async fn auth_middleware_fn(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match authenticate(&state.auth_config, &request) {
        Ok(AuthState::Public | AuthState::Success) => next.run(request).await,
        Ok(AuthState::Failed) => {
            warn!(uri = %request.uri(), "rejected admin credentials");
            (StatusCode::UNAUTHORIZED, WWW_AUTHENTICATE_HEADER, "").into_response()
        }
        Ok(AuthState::Request) => {
            (StatusCode::UNAUTHORIZED, WWW_AUTHENTICATE_HEADER, "").into_response()
        }
        Err(err) => {
            error!(%err, "failed to authenticate");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
