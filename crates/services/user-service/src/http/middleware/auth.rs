//! Authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{ACCESS_TOKEN_COOKIE, BEARER_TOKEN_PREFIX};

use crate::http::state::AppState;
use crate::token::Claims;

/// Current authenticated user extracted from a validated token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub claims: Claims,
}

/// Validate the request's access token and attach [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, request.headers())?;
    let claims = state.auth_service.validate_token(&token)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        claims,
    });

    Ok(next.run(request).await)
}

/// Token from the `access_token` cookie, else from `Authorization: Bearer`.
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> AppResult<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}
