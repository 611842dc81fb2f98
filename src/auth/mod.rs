// Authentication module
// API key gate, bearer sessions, Basic-credential login with lockout, roles

pub mod api_keys;
pub mod basic;
pub mod error;
pub mod handlers;
pub mod lockout;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{require_api_key, AdminUser, AuthenticatedUser};
pub use models::{Role, User, UserResponse};
pub use service::AuthService;
