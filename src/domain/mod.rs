pub mod activity;
pub mod error;
pub mod role;
pub mod user;

// Re-export commonly used types
pub use activity::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogRepositoryInterface, NewActivityLog,
};
pub use error::{DomainError, DomainResult};
pub use role::{ProfileView, RoleProfile, RoleRepositoryInterface};
pub use user::{
    CreateUserDto, SearchUsersDto, UpdateProfileDto, User, UserRepositoryInterface, UserRole,
    UserView,
};
