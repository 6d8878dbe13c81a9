//! # Hipp Identity
//!
//! Identity and access core for the Hipp platform: credential
//! verification, signed bearer tokens, role-to-profile bindings and the
//! full user account lifecycle with an audit trail.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **domain**: entities, DTOs, repository traits and the error taxonomy
//! - **application**: authentication, role binding and user lifecycle services
//! - **infrastructure**: token codec, password hashing, SeaORM persistence,
//!   in-memory store for development and testing
//! - **shared**: pagination and validation helpers
//!
//! Transport is out of scope: callers mount the services behind whatever
//! interface they need (HTTP, gRPC, a job runner).

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use domain::{DomainError, DomainResult, UserRole, UserView};

// Re-export the services for easy access
pub use application::identity::{AuthResult, AuthService, RoleService, UserService};

// Re-export database and crypto types
pub use infrastructure::crypto::token::{TokenCodec, TokenConfig};
pub use infrastructure::database::migrator::Migrator;
pub use infrastructure::database::repositories::{
    SeaOrmActivityLogRepository, SeaOrmRoleRepository, SeaOrmUserRepository,
};
pub use infrastructure::database::{init_database, DatabaseConfig};
pub use infrastructure::memory::InMemoryIdentityStore;
