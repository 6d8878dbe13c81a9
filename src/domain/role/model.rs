use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::user::UserRole;

/// Role-specific profile record, keyed 1:1 by the holding user.
///
/// Exists iff the user currently holds the matching non-Admin role;
/// reassignment removes it and creates the new role's record in the
/// same logical operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    pub id: String,
    pub user_id: String,
    pub role: UserRole,
    pub completed_tasks_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile joined with the owning account, as returned by role listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub completed_tasks_count: i32,
}
