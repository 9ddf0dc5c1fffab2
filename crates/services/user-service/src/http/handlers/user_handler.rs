//! User handlers: registration, login and profile.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{
    CreateUserResponse, NewUser, UserProfile, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
    TOKEN_TYPE_BEARER,
};

use crate::http::extractors::ValidatedJson;
use crate::http::middleware::{auth_middleware, CurrentUser};
use crate::http::state::AppState;
use crate::token::TokenPair;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Alice Liddell")]
    pub name: String,
    /// Unique login name
    #[validate(length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"))]
    #[schema(example = "alice")]
    pub username: String,
    /// Optional phone number
    #[schema(example = "+6281234567")]
    pub phone: Option<String>,
    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "secret123", min_length = 8)]
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name,
            username: req.username,
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            password: req.password,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

/// Tokens returned after a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenResponse {
    fn new(pair: TokenPair, now: DateTime<Utc>) -> Self {
        Self {
            expires_in: (pair.access_expires_at - now).num_seconds(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            access_expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
        }
    }
}

/// Create user routes. Only `/profile` requires a token.
pub fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", post(create_user))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    let created = state
        .registration_service
        .register(NewUser::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Login and receive tokens (also set as HttpOnly cookies)
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let pair = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let jar = jar
        .add(token_cookie(
            ACCESS_TOKEN_COOKIE,
            &pair.access_token,
            pair.access_expires_at,
            state.secure_cookies,
        )?)
        .add(token_cookie(
            REFRESH_TOKEN_COOKIE,
            &pair.refresh_token,
            pair.refresh_expires_at,
            state.secure_cookies,
        )?);

    Ok((jar, Json(TokenResponse::new(pair, Utc::now()))))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    tag = "Users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.user_service.profile(current_user.id).await?;
    Ok(Json(profile))
}

fn token_cookie(
    name: &'static str,
    value: &str,
    expires_at: DateTime<Utc>,
    secure: bool,
) -> AppResult<Cookie<'static>> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .map_err(|e| AppError::internal(format!("cookie expiry out of range: {}", e)))?;

    Ok(Cookie::build((name, value.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(expires)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use mockall::predicate::eq;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::infra::TransactionCoordinator;
    use crate::repository::InMemoryStore;
    use crate::service::{MockAuthService, MockUserService, Registrar};
    use crate::token::Claims;

    fn app(auth: MockAuthService, users: MockUserService) -> Router {
        let store = Arc::new(InMemoryStore::new());
        let registrar = Registrar::new(TransactionCoordinator::new(store.clone()), store.clone());
        let state = AppState::new(Arc::new(auth), Arc::new(registrar), Arc::new(users), store);

        Router::new()
            .nest("/users", user_routes(state.clone()))
            .with_state(state)
    }

    fn profile_request(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/users/profile")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_profile_uses_token_subject() {
        let id = Uuid::new_v4();

        let mut auth = MockAuthService::new();
        auth.expect_validate_token()
            .withf(|token| token == "good-token")
            .times(1)
            .returning(move |_| {
                Ok(Claims {
                    sub: id,
                    iss: "user-service".to_string(),
                    iat: 0,
                    exp: i64::MAX,
                    nbf: None,
                    aud: None,
                })
            });

        let mut users = MockUserService::new();
        users
            .expect_profile()
            .with(eq(id))
            .times(1)
            .returning(|id| {
                Ok(UserProfile {
                    id,
                    name: "Alice".to_string(),
                    username: "alice".to_string(),
                    phone: None,
                    created_at: Utc::now(),
                })
            });

        let response = app(auth, users)
            .oneshot(profile_request("good-token"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let profile: UserProfile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(profile.id, id);
    }

    #[tokio::test]
    async fn test_profile_rejected_token_never_reaches_service() {
        let mut auth = MockAuthService::new();
        auth.expect_validate_token()
            .returning(|_| Err(AppError::invalid_token("token expired")));

        let mut users = MockUserService::new();
        users.expect_profile().never();

        let response = app(auth, users)
            .oneshot(profile_request("stale-token"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");
        assert_eq!(body["error"]["message"], "Invalid or expired token");
    }

    #[test]
    fn test_token_cookie_attributes() {
        let expires_at = Utc::now() + chrono::Duration::hours(24);
        let cookie = token_cookie(ACCESS_TOKEN_COOKIE, "abc", expires_at, true).unwrap();

        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(expires_at.timestamp())
        );
    }

    #[test]
    fn test_blank_phone_dropped() {
        let req = CreateUserRequest {
            name: "Alice".to_string(),
            username: "alice".to_string(),
            phone: Some("  ".to_string()),
            password: "secret123".to_string(),
        };
        assert_eq!(NewUser::from(req).phone, None);
    }
}
