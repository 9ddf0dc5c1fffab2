//! Request middleware.

mod auth;
mod panic;

pub use auth::{auth_middleware, extract_token, CurrentUser};
pub use panic::panic_response;
