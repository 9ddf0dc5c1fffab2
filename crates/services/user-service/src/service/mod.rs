//! Service layer - business logic.

mod auth_service;
mod registration_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator};
pub use registration_service::{RegistrationService, Registrar};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
