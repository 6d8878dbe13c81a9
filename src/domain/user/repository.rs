use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{SearchUsersDto, UpdateProfileDto, User};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

/// Credential-store contract.
///
/// Write operations report whether a row matched as `Ok(bool)`; the
/// services map `false` onto the error taxonomy. Read misses are
/// `Ok(None)`, never errors. Email lookups are case-insensitive.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn insert_user(&self, user: User) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn update_profile(&self, id: &str, dto: UpdateProfileDto) -> DomainResult<bool>;
    async fn update_password(&self, id: &str, new_password_hash: &str) -> DomainResult<bool>;
    async fn update_last_login(&self, id: &str) -> DomainResult<bool>;

    /// Park a fresh reset token on the account, superseding any prior one.
    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// Apply the new hash iff `token` matches the stored, unexpired
    /// reset token; the token is cleared on success.
    async fn complete_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password_hash: &str,
    ) -> DomainResult<bool>;

    /// Phase 1 of an email change: store the candidate address and its
    /// verification token without touching the login email.
    async fn set_pending_email(
        &self,
        id: &str,
        new_email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// Phase 2: commit `pending_email` as the login email iff `token`
    /// matches the stored, unexpired verification token.
    async fn confirm_pending_email(&self, id: &str, token: &str) -> DomainResult<bool>;

    async fn soft_delete(&self, id: &str, deleted_by: &str) -> DomainResult<bool>;

    /// Remove the account together with its role memberships, profile
    /// record and activity entries, as one atomic unit.
    async fn hard_delete(&self, id: &str) -> DomainResult<bool>;

    async fn search(&self, dto: SearchUsersDto) -> DomainResult<PaginatedResult<User>>;
}
