//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::HealthProbe;
use crate::service::{AuthService, RegistrationService, UserService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub registration_service: Arc<dyn RegistrationService>,
    pub user_service: Arc<dyn UserService>,
    pub health: Arc<dyn HealthProbe>,
    pub secure_cookies: bool,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        registration_service: Arc<dyn RegistrationService>,
        user_service: Arc<dyn UserService>,
        health: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            auth_service,
            registration_service,
            user_service,
            health,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
