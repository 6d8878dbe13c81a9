//! Identity module — authentication, role binding and user lifecycle
//!
//! All identity business logic lives in these three services; transport
//! layers should be thin wrappers that delegate here.

pub mod auth_service;
pub mod role_service;
pub mod user_service;

pub use auth_service::{AuthResult, AuthService};
pub use role_service::RoleService;
pub use user_service::UserService;
