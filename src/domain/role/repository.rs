use async_trait::async_trait;

use super::RoleProfile;
use crate::domain::{DomainResult, UserRole};

#[async_trait]
pub trait RoleRepositoryInterface: Send + Sync {
    /// Replace all memberships of the user with `role` and bring the
    /// profile table in sync (old profile removed, new one created if
    /// absent), as one atomic unit. Idempotent for re-assignment of the
    /// currently held role.
    async fn assign_role(&self, user_id: &str, role: UserRole) -> DomainResult<()>;

    /// The single current role. If a corrupted state holds several
    /// memberships, the lexicographically first role name wins.
    async fn role_of(&self, user_id: &str) -> DomainResult<Option<UserRole>>;

    async fn profile_of(&self, user_id: &str) -> DomainResult<Option<RoleProfile>>;

    async fn profiles_for_role(&self, role: UserRole) -> DomainResult<Vec<RoleProfile>>;
}
