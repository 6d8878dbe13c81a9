//! User entity and the closed role set

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of authorization roles.
///
/// `Admin` is a pure authorization role; every other role owns exactly
/// one profile record per holder. Declaration order is lexicographic by
/// role name, so the derived `Ord` doubles as the deterministic
/// tie-break when a corrupted state holds more than one membership.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UserRole {
    Admin,
    Etiketues,
    Komercialist,
    Menaxher,
    Shofer,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Etiketues,
        UserRole::Komercialist,
        UserRole::Menaxher,
        UserRole::Shofer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Etiketues => "Etiketues",
            UserRole::Komercialist => "Komercialist",
            UserRole::Menaxher => "Menaxher",
            UserRole::Shofer => "Shofer",
        }
    }

    /// Case-insensitive role name lookup.
    pub fn parse(name: &str) -> Option<UserRole> {
        match name.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "etiketues" => Some(UserRole::Etiketues),
            "komercialist" => Some(UserRole::Komercialist),
            "menaxher" => Some(UserRole::Menaxher),
            "shofer" => Some(UserRole::Shofer),
            _ => None,
        }
    }

    /// Whether holders of this role own a profile record.
    pub fn has_profile(&self) -> bool {
        !matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account as held in storage.
///
/// Emails are stored lowercase; soft deletion is the
/// `deleted_at`/`deleted_by` pair plus `is_active = false`. The
/// `pending_email`/`password_reset_token` groups are transient workflow
/// state and empty outside an in-flight email change or password reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub pending_email: Option<String>,
    pub email_verification_token: Option<String>,
    pub email_token_expires_at: Option<DateTime<Utc>>,
    pub password_reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_soft_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// User as exposed to callers: public account fields plus the resolved
/// role. The role is always read back from the role binding, never from
/// stale token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub role: Option<UserRole>,
}

impl UserView {
    pub fn from_user(user: &User, role: Option<UserRole>) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            last_login: user.last_login,
            deleted_at: user.deleted_at,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(UserRole::parse("menaxher"), Some(UserRole::Menaxher));
        assert_eq!(UserRole::parse("MENAXHER"), Some(UserRole::Menaxher));
        assert_eq!(UserRole::parse(" Shofer "), Some(UserRole::Shofer));
        assert_eq!(UserRole::parse("manager"), None);
    }

    #[test]
    fn role_ordering_is_lexicographic() {
        let mut roles = vec![UserRole::Shofer, UserRole::Menaxher, UserRole::Admin];
        roles.sort();
        assert_eq!(
            roles,
            vec![UserRole::Admin, UserRole::Menaxher, UserRole::Shofer]
        );
    }

    #[test]
    fn only_admin_has_no_profile() {
        assert!(!UserRole::Admin.has_profile());
        for role in UserRole::ALL {
            if role != UserRole::Admin {
                assert!(role.has_profile(), "{role} should own a profile");
            }
        }
    }
}
