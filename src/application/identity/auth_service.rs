//! Authentication service
//!
//! Credential verification, token issuance and token-bearing request
//! authorization.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    ActivityLogRepositoryInterface, DomainError, DomainResult, NewActivityLog,
    RoleRepositoryInterface, UserRepositoryInterface, UserView,
};
use crate::infrastructure::crypto::password::verify_password;
use crate::infrastructure::crypto::token::TokenCodec;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserView,
}

pub struct AuthService {
    users: Arc<dyn UserRepositoryInterface>,
    roles: Arc<dyn RoleRepositoryInterface>,
    activity: Arc<dyn ActivityLogRepositoryInterface>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        roles: Arc<dyn RoleRepositoryInterface>,
        activity: Arc<dyn ActivityLogRepositoryInterface>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            users,
            roles,
            activity,
            codec,
        }
    }

    /// Authenticate by email + password and return a bearer token.
    ///
    /// Unknown address and wrong password are indistinguishable to the
    /// caller. An account must hold exactly one role to authenticate.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let user = self.users.find_by_email(email).await?;
        let Some(user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        if !verify_password(password, &user.password_hash) {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let Some(role) = self.roles.role_of(&user.id).await? else {
            return Err(DomainError::Unauthorized("User has no assigned role".into()));
        };

        // Best-effort bookkeeping before issuance; a failure here must
        // not fail the login.
        if let Err(e) = self.users.update_last_login(&user.id).await {
            warn!(user_id = %user.id, error = %e, "Failed to update last login");
        }
        let entry = NewActivityLog::system(&user.id, "Login", "User logged in successfully");
        if let Err(e) = self.activity.append(entry).await {
            warn!(user_id = %user.id, error = %e, "Failed to record login activity");
        }

        let token = self.codec.issue(&user.id, &user.email, role)?;
        info!(user_id = %user.id, role = %role, "User logged in");

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.codec.expiration_minutes() * 60,
            user: UserView::from_user(&user, Some(role)),
        })
    }

    pub fn validate_token(&self, token: &str) -> bool {
        self.codec.validate(token)
    }

    /// Resolve the current account behind a token.
    ///
    /// The role is re-read from storage, not taken from the token, so a
    /// revocation takes effect while issued tokens are still live.
    pub async fn user_by_token(&self, token: &str) -> DomainResult<UserView> {
        if !self.codec.validate(token) {
            return Err(DomainError::Unauthorized("Invalid token".into()));
        }

        let user_id = self.codec.subject(token)?;
        let Some(user) = self.users.find_by_id(&user_id).await? else {
            return Err(DomainError::Unauthorized("Invalid token".into()));
        };

        let role = self.roles.role_of(&user.id).await?;
        Ok(UserView::from_user(&user, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::UserService;
    use crate::domain::{CreateUserDto, UserRole};
    use crate::infrastructure::crypto::token::TokenConfig;
    use crate::infrastructure::memory::InMemoryIdentityStore;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(
            TokenCodec::new(TokenConfig {
                secret: "auth-service-test-secret".to_string(),
                issuer: "hipp-identity".to_string(),
                audience: "hipp-clients".to_string(),
                expiration_minutes: 30,
            })
            .unwrap(),
        )
    }

    fn services() -> (Arc<InMemoryIdentityStore>, AuthService, UserService) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let store = Arc::new(InMemoryIdentityStore::new());
        let auth = AuthService::new(store.clone(), store.clone(), store.clone(), codec());
        let users = UserService::new(store.clone(), store.clone(), store.clone());
        (store, auth, users)
    }

    async fn seed_alice(users: &UserService) -> String {
        users
            .create_user(CreateUserDto {
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Berisha".to_string(),
                phone_number: None,
                role: "Menaxher".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn login_returns_a_valid_token_and_resolved_role() {
        let (_, auth, users) = services();
        let id = seed_alice(&users).await;

        let result = auth.login("alice@example.com", "password123").await.unwrap();

        assert!(auth.validate_token(&result.token));
        assert_eq!(result.token_type, "Bearer");
        assert_eq!(result.expires_in, 30 * 60);
        assert_eq!(result.user.id, id);
        assert_eq!(result.user.role, Some(UserRole::Menaxher));

        // last login stamped, activity recorded
        let view = users.get_by_id(&id).await.unwrap().unwrap();
        assert!(view.last_login.is_some());
        let logs = users.activity_logs(Default::default()).await.unwrap();
        assert!(logs.items.iter().any(|entry| entry.action == "Login"));
    }

    #[tokio::test]
    async fn login_accepts_any_email_casing() {
        let (_, auth, users) = services();
        seed_alice(&users).await;

        assert!(auth.login("Alice@Example.COM", "password123").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (_, auth, users) = services();
        seed_alice(&users).await;

        let wrong_password = auth
            .login("alice@example.com", "not-her-password")
            .await
            .unwrap_err();
        let unknown_email = auth
            .login("nobody@example.com", "password123")
            .await
            .unwrap_err();

        match (&wrong_password, &unknown_email) {
            (DomainError::Unauthorized(a), DomainError::Unauthorized(b)) => assert_eq!(a, b),
            other => panic!("expected matching Unauthorized errors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn account_without_role_cannot_log_in() {
        use crate::infrastructure::crypto::password::hash_password;
        let (store, auth, _) = services();

        let user = crate::domain::User {
            id: "roleless".to_string(),
            email: "roleless@example.com".to_string(),
            password_hash: hash_password("password123").unwrap(),
            first_name: "No".to_string(),
            last_name: "Role".to_string(),
            phone_number: None,
            is_active: true,
            created_at: chrono::Utc::now(),
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
        UserRepositoryInterface::insert_user(store.as_ref(), user)
            .await
            .unwrap();

        let err = auth
            .login("roleless@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn soft_deleted_account_cannot_log_in() {
        let (_, auth, users) = services();
        let id = seed_alice(&users).await;

        users.soft_delete_user(&id, "admin-1").await.unwrap();

        let err = auth
            .login("alice@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn user_by_token_reflects_a_role_change_immediately() {
        let (store, auth, users) = services();
        let id = seed_alice(&users).await;

        let result = auth.login("alice@example.com", "password123").await.unwrap();

        // Reassign while the token is still live
        RoleRepositoryInterface::assign_role(store.as_ref(), &id, UserRole::Komercialist)
            .await
            .unwrap();

        let view = auth.user_by_token(&result.token).await.unwrap();
        assert_eq!(view.role, Some(UserRole::Komercialist));
    }

    #[tokio::test]
    async fn user_by_token_rejects_garbage() {
        let (_, auth, _) = services();
        let err = auth.user_by_token("not-a-token").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
