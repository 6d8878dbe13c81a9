//! Role binding service
//!
//! Enforces one role per user and keeps the role-specific profile
//! record in sync with the membership.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DomainError, DomainResult, ProfileView, RoleRepositoryInterface, UserRepositoryInterface,
    UserRole,
};

pub struct RoleService {
    users: Arc<dyn UserRepositoryInterface>,
    roles: Arc<dyn RoleRepositoryInterface>,
}

impl RoleService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        roles: Arc<dyn RoleRepositoryInterface>,
    ) -> Self {
        Self { users, roles }
    }

    /// Give the user exactly this role.
    ///
    /// Any previously held role and its profile record are removed and
    /// the new role's profile is created if absent, atomically.
    /// Re-assigning the held role is a no-op for the profile.
    pub async fn assign_role(&self, user_id: &str, role_name: &str) -> DomainResult<()> {
        let Some(role) = UserRole::parse(role_name) else {
            return Err(DomainError::NotFound {
                entity: "Role",
                field: "name",
                value: role_name.to_string(),
            });
        };
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        }

        self.roles.assign_role(user_id, role).await?;
        info!(user_id, role = %role, "Role assigned");
        Ok(())
    }

    /// The user's single current role, or `None` when unassigned.
    pub async fn get_role(&self, user_id: &str) -> DomainResult<Option<UserRole>> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        }
        self.roles.role_of(user_id).await
    }

    /// Member listing for one role: each profile joined with the owning
    /// account's name and email.
    pub async fn profiles(&self, role: UserRole) -> DomainResult<Vec<ProfileView>> {
        let profiles = self.roles.profiles_for_role(role).await?;

        let mut views = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let Some(user) = self.users.find_by_id(&profile.user_id).await? else {
                continue;
            };
            views.push(ProfileView {
                id: profile.id,
                user_id: profile.user_id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                completed_tasks_count: profile.completed_tasks_count,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::UserService;
    use crate::domain::CreateUserDto;
    use crate::infrastructure::memory::InMemoryIdentityStore;

    fn services() -> (Arc<InMemoryIdentityStore>, RoleService, UserService) {
        let store = Arc::new(InMemoryIdentityStore::new());
        let roles = RoleService::new(store.clone(), store.clone());
        let users = UserService::new(store.clone(), store.clone(), store.clone());
        (store, roles, users)
    }

    async fn seed(users: &UserService, email: &str, role: &str) -> String {
        users
            .create_user(CreateUserDto {
                email: email.to_string(),
                password: "password123".to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                phone_number: None,
                role: role.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn reassignment_swaps_the_profile_record() {
        let (store, roles, users) = services();
        let alice = seed(&users, "alice@example.com", "Menaxher").await;

        assert_eq!(
            roles.get_role(&alice).await.unwrap(),
            Some(UserRole::Menaxher)
        );

        roles.assign_role(&alice, "Komercialist").await.unwrap();

        assert_eq!(
            roles.get_role(&alice).await.unwrap(),
            Some(UserRole::Komercialist)
        );

        // Exactly one profile, owned by the new role
        let profile = RoleRepositoryInterface::profile_of(store.as_ref(), &alice)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.role, UserRole::Komercialist);
        assert!(roles
            .profiles(UserRole::Menaxher)
            .await
            .unwrap()
            .iter()
            .all(|p| p.user_id != alice));
    }

    #[tokio::test]
    async fn reassigning_the_held_role_keeps_the_profile() {
        let (store, roles, users) = services();
        let alice = seed(&users, "alice@example.com", "Menaxher").await;

        let before = RoleRepositoryInterface::profile_of(store.as_ref(), &alice)
            .await
            .unwrap()
            .unwrap();

        roles.assign_role(&alice, "menaxher").await.unwrap();

        let after = RoleRepositoryInterface::profile_of(store.as_ref(), &alice)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.id, after.id);
    }

    #[tokio::test]
    async fn admin_holds_no_profile_record() {
        let (store, roles, users) = services();
        let root = seed(&users, "root@example.com", "Admin").await;

        assert_eq!(roles.get_role(&root).await.unwrap(), Some(UserRole::Admin));
        assert!(RoleRepositoryInterface::profile_of(store.as_ref(), &root)
            .await
            .unwrap()
            .is_none());

        // Demoting a profile-holder to Admin drops the profile
        let bob = seed(&users, "bob@example.com", "Shofer").await;
        roles.assign_role(&bob, "Admin").await.unwrap();
        assert!(RoleRepositoryInterface::profile_of(store.as_ref(), &bob)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unknown_user_and_unknown_role_are_not_found() {
        let (_, roles, users) = services();
        let alice = seed(&users, "alice@example.com", "Menaxher").await;

        let err = roles.assign_role(&alice, "Manager").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "Role", .. }
        ));

        let err = roles.assign_role("missing", "Menaxher").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "User", .. }
        ));

        let err = roles.get_role("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn a_corrupted_multi_role_state_resolves_deterministically() {
        let (store, roles, users) = services();
        let alice = seed(&users, "alice@example.com", "Shofer").await;

        // Bypass exclusivity to simulate a corrupted membership table
        store.insert_membership(&alice, UserRole::Menaxher);

        // Lexicographically first role name wins
        assert_eq!(
            roles.get_role(&alice).await.unwrap(),
            Some(UserRole::Menaxher)
        );
    }

    #[tokio::test]
    async fn profile_listing_carries_the_owner_identity() {
        let (_, roles, users) = services();
        seed(&users, "alice@example.com", "Etiketues").await;
        seed(&users, "bob@example.com", "Etiketues").await;
        seed(&users, "carol@example.com", "Shofer").await;

        let etiketues = roles.profiles(UserRole::Etiketues).await.unwrap();
        assert_eq!(etiketues.len(), 2);
        assert!(etiketues.iter().any(|p| p.email == "alice@example.com"));
        assert!(etiketues.iter().all(|p| p.completed_tasks_count == 0));
    }
}
