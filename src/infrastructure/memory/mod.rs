//! In-memory repository implementations for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogRepositoryInterface, DomainError,
    DomainResult, NewActivityLog, RoleProfile, RoleRepositoryInterface, SearchUsersDto,
    UpdateProfileDto, User, UserRepositoryInterface, UserRole,
};
use crate::shared::{validate_pagination, PaginatedResult};

/// In-memory identity store implementing all three repository traits.
///
/// Single-process only; compound mutations are applied map by map
/// without a transaction, which is sufficient for tests and local
/// development.
pub struct InMemoryIdentityStore {
    users: DashMap<String, User>,
    memberships: DashMap<String, Vec<UserRole>>,
    profiles: DashMap<String, RoleProfile>,
    logs: DashMap<i32, ActivityLogEntry>,
    log_counter: AtomicI32,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            memberships: DashMap::new(),
            profiles: DashMap::new(),
            logs: DashMap::new(),
            log_counter: AtomicI32::new(1),
        }
    }

    /// Insert an extra membership row directly, bypassing the
    /// exclusivity `assign_role` enforces. Test hook for the
    /// corrupted-state path of `role_of`.
    #[cfg(test)]
    pub fn insert_membership(&self, user_id: &str, role: UserRole) {
        self.memberships
            .entry(user_id.to_string())
            .or_default()
            .push(role);
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_term(user: &User, term: &str) -> bool {
    let term = term.to_lowercase();
    user.first_name.to_lowercase().contains(&term)
        || user.last_name.to_lowercase().contains(&term)
        || user.email.to_lowercase().contains(&term)
}

// ── User repository ─────────────────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for InMemoryIdentityStore {
    async fn insert_user(&self, user: User) -> DomainResult<()> {
        let email = user.email.to_lowercase();
        if self.users.iter().any(|u| u.email == email) {
            return Err(DomainError::Conflict("Email already exists".to_string()));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn update_profile(&self, id: &str, dto: UpdateProfileDto) -> DomainResult<bool> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        if let Some(first_name) = dto.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = dto.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = dto.phone_number {
            user.phone_number = Some(phone_number);
        }
        user.last_modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn update_password(&self, id: &str, new_password_hash: &str) -> DomainResult<bool> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        user.password_hash = new_password_hash.to_string();
        user.last_modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn update_last_login(&self, id: &str) -> DomainResult<bool> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        user.last_login = Some(Utc::now());
        Ok(true)
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> DomainResult<bool> {
        let email = email.to_lowercase();
        let Some(id) = self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id.clone())
        else {
            return Ok(false);
        };
        if let Some(mut user) = self.users.get_mut(&id) {
            user.password_reset_token = Some(token.to_string());
            user.reset_token_expires_at = Some(expires_at);
        }
        Ok(true)
    }

    async fn complete_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password_hash: &str,
    ) -> DomainResult<bool> {
        let email = email.to_lowercase();
        let Some(id) = self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id.clone())
        else {
            return Ok(false);
        };
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(false);
        };

        let valid = user.password_reset_token.as_deref() == Some(token)
            && user
                .reset_token_expires_at
                .is_some_and(|expires| expires > Utc::now());
        if !valid {
            return Ok(false);
        }

        user.password_hash = new_password_hash.to_string();
        user.password_reset_token = None;
        user.reset_token_expires_at = None;
        user.last_modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn set_pending_email(
        &self,
        id: &str,
        new_email: &str,
        token: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> DomainResult<bool> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        user.pending_email = Some(new_email.to_lowercase());
        user.email_verification_token = Some(token.to_string());
        user.email_token_expires_at = Some(expires_at);
        Ok(true)
    }

    async fn confirm_pending_email(&self, id: &str, token: &str) -> DomainResult<bool> {
        let pending = {
            let Some(user) = self.users.get(id) else {
                return Ok(false);
            };
            let valid = user.email_verification_token.as_deref() == Some(token)
                && user
                    .email_token_expires_at
                    .is_some_and(|expires| expires > Utc::now());
            if !valid {
                return Ok(false);
            }
            match user.pending_email.clone() {
                Some(pending) => pending,
                None => return Ok(false),
            }
        };

        if self.users.iter().any(|u| u.id != id && u.email == pending) {
            return Err(DomainError::Conflict("Email already exists".to_string()));
        }

        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        user.email = pending;
        user.pending_email = None;
        user.email_verification_token = None;
        user.email_token_expires_at = None;
        user.last_modified_at = Some(Utc::now());
        Ok(true)
    }

    async fn soft_delete(&self, id: &str, deleted_by: &str) -> DomainResult<bool> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(false);
        };
        user.is_active = false;
        user.deleted_at = Some(Utc::now());
        user.deleted_by = Some(deleted_by.to_string());
        Ok(true)
    }

    async fn hard_delete(&self, id: &str) -> DomainResult<bool> {
        if self.users.remove(id).is_none() {
            return Ok(false);
        }
        self.memberships.remove(id);
        self.profiles.remove(id);
        let orphaned: Vec<i32> = self
            .logs
            .iter()
            .filter(|entry| entry.user_id == id)
            .map(|entry| entry.id)
            .collect();
        for log_id in orphaned {
            self.logs.remove(&log_id);
        }
        Ok(true)
    }

    async fn search(&self, dto: SearchUsersDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = validate_pagination(dto.page, dto.page_size);

        let mut matches: Vec<User> = self
            .users
            .iter()
            .filter(|user| match dto.search_term.as_deref() {
                Some(term) if !term.is_empty() => matches_term(user, term),
                _ => true,
            })
            .filter(|user| match dto.role {
                Some(role) => self
                    .memberships
                    .get(&user.id)
                    .is_some_and(|roles| roles.contains(&role)),
                None => true,
            })
            .filter(|user| match dto.is_deleted {
                Some(deleted) => user.is_soft_deleted() == deleted,
                None => true,
            })
            .map(|user| user.clone())
            .collect();

        // Same stable order as the database implementation
        matches.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matches.len() as u64;
        let items: Vec<User> = matches
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }
}

// ── Role repository ─────────────────────────────────────────────

#[async_trait]
impl RoleRepositoryInterface for InMemoryIdentityStore {
    async fn assign_role(&self, user_id: &str, role: UserRole) -> DomainResult<()> {
        self.memberships.insert(user_id.to_string(), vec![role]);

        let stale = self
            .profiles
            .get(user_id)
            .is_some_and(|profile| profile.role != role || !role.has_profile());
        if stale {
            self.profiles.remove(user_id);
        }

        if role.has_profile() && !self.profiles.contains_key(user_id) {
            self.profiles.insert(
                user_id.to_string(),
                RoleProfile {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    role,
                    completed_tasks_count: 0,
                    created_at: Utc::now(),
                    updated_at: None,
                },
            );
        }
        Ok(())
    }

    async fn role_of(&self, user_id: &str) -> DomainResult<Option<UserRole>> {
        // Lexicographic minimum doubles as the corrupted-state tie-break
        Ok(self
            .memberships
            .get(user_id)
            .and_then(|roles| roles.iter().min().copied()))
    }

    async fn profile_of(&self, user_id: &str) -> DomainResult<Option<RoleProfile>> {
        Ok(self.profiles.get(user_id).map(|profile| profile.clone()))
    }

    async fn profiles_for_role(&self, role: UserRole) -> DomainResult<Vec<RoleProfile>> {
        let mut profiles: Vec<RoleProfile> = self
            .profiles
            .iter()
            .filter(|profile| profile.role == role)
            .map(|profile| profile.clone())
            .collect();
        profiles.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(profiles)
    }
}

// ── Activity log repository ─────────────────────────────────────

#[async_trait]
impl ActivityLogRepositoryInterface for InMemoryIdentityStore {
    async fn append(&self, entry: NewActivityLog) -> DomainResult<()> {
        let id = self.log_counter.fetch_add(1, Ordering::SeqCst);
        self.logs.insert(
            id,
            ActivityLogEntry {
                id,
                user_id: entry.user_id,
                action: entry.action,
                description: entry.description,
                ip_address: entry.ip_address,
                additional_info: entry.additional_info,
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list(
        &self,
        filter: ActivityLogFilter,
    ) -> DomainResult<PaginatedResult<ActivityLogEntry>> {
        let (page, page_size) = validate_pagination(filter.page, filter.page_size);

        let mut entries: Vec<ActivityLogEntry> = self
            .logs
            .iter()
            .filter(|entry| match filter.user_id.as_deref() {
                Some(user_id) => entry.user_id == user_id,
                None => true,
            })
            .filter(|entry| filter.start.is_none_or(|start| entry.timestamp >= start))
            .filter(|entry| filter.end.is_none_or(|end| entry.timestamp <= end))
            .map(|entry| entry.clone())
            .collect();

        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = entries.len() as u64;
        let items: Vec<ActivityLogEntry> = entries
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }

    async fn clear_older_than(&self, days_to_keep: i64) -> DomainResult<u64> {
        let cutoff = Utc::now() - Duration::days(days_to_keep);
        let before = self.logs.len();
        self.logs.retain(|_, entry| entry.timestamp >= cutoff);
        Ok((before - self.logs.len()) as u64)
    }
}
