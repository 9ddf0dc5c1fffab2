//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum name length
pub const MAX_NAME_LENGTH: usize = 100;

/// Allowed username length range
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;

// =============================================================================
// Authentication
// =============================================================================

/// Default access token lifetime (24 hours)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Default refresh token lifetime (48 hours)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 172_800;

/// Minimum shared secret length for HMAC signing
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default issuer written into every token
pub const DEFAULT_TOKEN_ISSUER: &str = "user-service";

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
