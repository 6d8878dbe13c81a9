//! User lifecycle service
//!
//! Account creation, profile/email/password maintenance, soft and hard
//! deletion, search, and the audit trail around all of it. Operations
//! that used to be bare booleans report *why* they failed through
//! [`DomainError`]; callers that only care about success still get the
//! uniform view via `.is_ok()`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogRepositoryInterface, CreateUserDto,
    DomainError, DomainResult, NewActivityLog, RoleRepositoryInterface, SearchUsersDto,
    UpdateProfileDto, User, UserRepositoryInterface, UserView,
};
use crate::infrastructure::crypto::password::hash_password;
use crate::shared::{is_valid_email, PaginatedResult};

const MIN_PASSWORD_LEN: usize = 8;

pub struct UserService {
    users: Arc<dyn UserRepositoryInterface>,
    roles: Arc<dyn RoleRepositoryInterface>,
    activity: Arc<dyn ActivityLogRepositoryInterface>,
    reset_token_ttl: Duration,
    email_token_ttl: Duration,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        roles: Arc<dyn RoleRepositoryInterface>,
        activity: Arc<dyn ActivityLogRepositoryInterface>,
    ) -> Self {
        Self {
            users,
            roles,
            activity,
            reset_token_ttl: Duration::hours(24),
            email_token_ttl: Duration::hours(48),
        }
    }

    /// Override the workflow-token lifetimes from configuration.
    pub fn with_token_ttls(mut self, reset_hours: i64, email_hours: i64) -> Self {
        self.reset_token_ttl = Duration::hours(reset_hours);
        self.email_token_ttl = Duration::hours(email_hours);
        self
    }

    // ── Account creation ────────────────────────────────────────

    /// Create an account and its role binding as one logical operation.
    ///
    /// All rejection reasons are aggregated into one `Validation` error.
    /// If the role binding cannot be created the fresh account is
    /// removed again, so no user is ever left without a role.
    pub async fn create_user(&self, dto: CreateUserDto) -> DomainResult<UserView> {
        let email = dto.email.trim().to_lowercase();

        let mut problems = Vec::new();
        if !is_valid_email(&email) {
            problems.push("Invalid email address".to_string());
        }
        if dto.password.len() < MIN_PASSWORD_LEN {
            problems.push(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if dto.first_name.trim().is_empty() {
            problems.push("First name is required".to_string());
        }
        if dto.last_name.trim().is_empty() {
            problems.push("Last name is required".to_string());
        }
        let role = crate::domain::UserRole::parse(&dto.role);
        if role.is_none() {
            problems.push(format!("Unknown role: {}", dto.role));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            problems.push("Email already exists".to_string());
        }
        if !problems.is_empty() {
            return Err(DomainError::Validation(problems));
        }
        let role = role.ok_or_else(|| DomainError::validation("Unknown role"))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: hash_password(&dto.password)?,
            first_name: dto.first_name.trim().to_string(),
            last_name: dto.last_name.trim().to_string(),
            phone_number: dto.phone_number,
            is_active: true,
            created_at: Utc::now(),
            last_modified_at: None,
            last_login: None,
            deleted_at: None,
            deleted_by: None,
            pending_email: None,
            email_verification_token: None,
            email_token_expires_at: None,
            password_reset_token: None,
            reset_token_expires_at: None,
        };
        let user_id = user.id.clone();

        self.users.insert_user(user).await.map_err(|e| match e {
            DomainError::Conflict(_) => {
                DomainError::Validation(vec!["Email already exists".to_string()])
            }
            other => other,
        })?;

        if let Err(e) = self.roles.assign_role(&user_id, role).await {
            if let Err(rollback) = self.users.hard_delete(&user_id).await {
                warn!(
                    user_id = %user_id,
                    error = %rollback,
                    "Failed to roll back user after role assignment failure"
                );
            }
            return Err(e);
        }

        self.log_activity(
            &user_id,
            "UserCreated",
            &format!("User created with role {role}"),
        )
        .await;
        info!(user_id = %user_id, role = %role, "User created");

        self.get_by_id(&user_id)
            .await?
            .ok_or_else(|| DomainError::validation("User created but could not be retrieved"))
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Get a single user by ID, with the freshly resolved role.
    pub async fn get_by_id(&self, id: &str) -> DomainResult<Option<UserView>> {
        let Some(user) = self.users.find_by_id(id).await? else {
            return Ok(None);
        };
        let role = self.roles.role_of(&user.id).await?;
        Ok(Some(UserView::from_user(&user, role)))
    }

    /// Get a single user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> DomainResult<Option<UserView>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        let role = self.roles.role_of(&user.id).await?;
        Ok(Some(UserView::from_user(&user, role)))
    }

    /// Search with free-text match, role and deletion filters, paginated.
    ///
    /// Ordering is creation time ascending (id as tie-break), stable
    /// across pages for a fixed filter set.
    pub async fn search_users(
        &self,
        dto: SearchUsersDto,
    ) -> DomainResult<PaginatedResult<UserView>> {
        let page = self.users.search(dto).await?;

        let mut items = Vec::with_capacity(page.items.len());
        for user in &page.items {
            let role = self.roles.role_of(&user.id).await?;
            items.push(UserView::from_user(user, role));
        }

        Ok(PaginatedResult {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    // ── Profile and credential updates ──────────────────────────

    /// Update name/phone fields; all-or-nothing.
    pub async fn update_profile(&self, user_id: &str, dto: UpdateProfileDto) -> DomainResult<()> {
        if !self.users.update_profile(user_id, dto).await? {
            return Err(user_not_found(user_id));
        }
        self.log_activity(user_id, "ProfileUpdate", "Profile information was updated")
            .await;
        Ok(())
    }

    pub async fn change_password(&self, user_id: &str, new_password: &str) -> DomainResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let new_hash = hash_password(new_password)?;
        if !self.users.update_password(user_id, &new_hash).await? {
            return Err(user_not_found(user_id));
        }

        self.log_activity(user_id, "PasswordChange", "Password was changed")
            .await;
        info!(user_id, "Password changed");
        Ok(())
    }

    /// Stamp the last-login timestamp.
    pub async fn update_last_login(&self, user_id: &str) -> DomainResult<()> {
        if !self.users.update_last_login(user_id).await? {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    // ── Password reset workflow ─────────────────────────────────

    /// Always reports success: whether the address exists must not be
    /// observable to the caller. A fresh token supersedes any prior one.
    pub async fn initiate_password_reset(&self, email: &str) -> DomainResult<()> {
        let email = email.trim().to_lowercase();
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.reset_token_ttl;

        match self.users.set_reset_token(&email, &token, expires_at).await {
            Ok(true) => info!(email = %email, "Password reset initiated"),
            Ok(false) => {} // unknown address: same outcome for the caller
            Err(e) => warn!(error = %e, "Failed to store password reset token"),
        }
        Ok(())
    }

    pub async fn complete_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let email = email.trim().to_lowercase();
        let new_hash = hash_password(new_password)?;
        if !self
            .users
            .complete_password_reset(&email, token, &new_hash)
            .await?
        {
            return Err(DomainError::Unauthorized(
                "Invalid or expired reset token".into(),
            ));
        }

        if let Some(user) = self.users.find_by_email(&email).await? {
            self.log_activity(
                &user.id,
                "PasswordReset",
                "Password was reset using reset token",
            )
            .await;
        }
        Ok(())
    }

    // ── Email change workflow ───────────────────────────────────

    /// Phase 1: park the new address. The login email stays untouched
    /// until phase 2 confirms; a repeat call supersedes any pending
    /// request.
    pub async fn initiate_email_change(&self, user_id: &str, new_email: &str) -> DomainResult<()> {
        let new_email = new_email.trim().to_lowercase();
        if !is_valid_email(&new_email) {
            return Err(DomainError::validation("Invalid email address"));
        }
        if self.users.find_by_email(&new_email).await?.is_some() {
            return Err(DomainError::validation("Email already exists"));
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.email_token_ttl;
        if !self
            .users
            .set_pending_email(user_id, &new_email, &token, expires_at)
            .await?
        {
            return Err(user_not_found(user_id));
        }

        info!(user_id, "Email change initiated");
        Ok(())
    }

    /// Phase 2: commit the pending address.
    pub async fn confirm_email_change(&self, user_id: &str, token: &str) -> DomainResult<()> {
        if !self.users.confirm_pending_email(user_id, token).await? {
            return Err(DomainError::Unauthorized(
                "Invalid or expired verification token".into(),
            ));
        }

        self.log_activity(user_id, "EmailChanged", "Email address change was confirmed")
            .await;
        info!(user_id, "Email changed");
        Ok(())
    }

    // ── Deletion ────────────────────────────────────────────────

    /// Mark the account deleted; it stays readable and searchable.
    pub async fn soft_delete_user(&self, user_id: &str, deleted_by: &str) -> DomainResult<()> {
        if !self.users.soft_delete(user_id, deleted_by).await? {
            return Err(user_not_found(user_id));
        }
        self.log_activity(user_id, "UserDeleted", "User was soft deleted")
            .await;
        info!(user_id, deleted_by, "User soft deleted");
        Ok(())
    }

    /// Irreversible removal of the account together with its role
    /// binding, profile record and audit entries.
    pub async fn hard_delete_user(&self, user_id: &str) -> DomainResult<()> {
        if !self.users.hard_delete(user_id).await? {
            return Err(user_not_found(user_id));
        }
        info!(user_id, "User hard deleted");
        Ok(())
    }

    // ── Audit trail ─────────────────────────────────────────────

    /// Append an audit entry. Failures are logged and swallowed: audit
    /// logging must never unwind a completed operation.
    pub async fn log_activity(&self, user_id: &str, action: &str, description: &str) {
        let entry = NewActivityLog::system(user_id, action, description);
        if let Err(e) = self.activity.append(entry).await {
            warn!(user_id, action, error = %e, "Failed to record activity");
        }
    }

    pub async fn activity_logs(
        &self,
        filter: ActivityLogFilter,
    ) -> DomainResult<PaginatedResult<ActivityLogEntry>> {
        self.activity.list(filter).await
    }

    /// Retention purge; returns the number of removed entries.
    pub async fn clear_old_logs(&self, days_to_keep: i64) -> DomainResult<u64> {
        let removed = self.activity.clear_older_than(days_to_keep).await?;
        info!(days_to_keep, removed, "Old activity logs cleared");
        Ok(removed)
    }
}

fn user_not_found(id: &str) -> DomainError {
    DomainError::NotFound {
        entity: "User",
        field: "id",
        value: id.to_string(),
    }
}
