//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories behind the domain traits.

pub mod activity_log_repository;
pub mod role_repository;
pub mod user_repository;

pub use activity_log_repository::SeaOrmActivityLogRepository;
pub use role_repository::SeaOrmRoleRepository;
pub use user_repository::SeaOrmUserRepository;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

pub(crate) fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("UNIQUE") || msg.contains("duplicate")
}
