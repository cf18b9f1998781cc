//! Application services and external integrations.

pub mod auth;
pub mod line_auth;

pub use auth::{AuthError, AuthService, LoginKind};
pub use line_auth::{LineAuthClient, LineAuthError};
