use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::{DomainResult, RoleProfile, RoleRepositoryInterface, UserRole};
use crate::infrastructure::database::entities::{role_profile, user_role};

use super::db_err;

pub struct SeaOrmRoleRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn domain_role_to_entity(role: UserRole) -> user_role::Role {
    match role {
        UserRole::Admin => user_role::Role::Admin,
        UserRole::Etiketues => user_role::Role::Etiketues,
        UserRole::Komercialist => user_role::Role::Komercialist,
        UserRole::Menaxher => user_role::Role::Menaxher,
        UserRole::Shofer => user_role::Role::Shofer,
    }
}

pub(crate) fn entity_role_to_domain(role: user_role::Role) -> UserRole {
    match role {
        user_role::Role::Admin => UserRole::Admin,
        user_role::Role::Etiketues => UserRole::Etiketues,
        user_role::Role::Komercialist => UserRole::Komercialist,
        user_role::Role::Menaxher => UserRole::Menaxher,
        user_role::Role::Shofer => UserRole::Shofer,
    }
}

fn profile_model_to_domain(model: role_profile::Model) -> RoleProfile {
    RoleProfile {
        id: model.id,
        user_id: model.user_id,
        role: entity_role_to_domain(model.role),
        completed_tasks_count: model.completed_tasks_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl RoleRepositoryInterface for SeaOrmRoleRepository {
    async fn assign_role(&self, user_id: &str, role: UserRole) -> DomainResult<()> {
        let entity_role = domain_role_to_entity(role);

        // Membership replacement and profile sync commit or roll back
        // together.
        let txn = self.db.begin().await.map_err(db_err)?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        user_role::ActiveModel {
            id: NotSet,
            user_id: Set(user_id.to_string()),
            role: Set(entity_role.clone()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut stale = role_profile::Entity::delete_many()
            .filter(role_profile::Column::UserId.eq(user_id));
        if role.has_profile() {
            stale = stale.filter(role_profile::Column::Role.ne(entity_role.clone()));
        }
        stale.exec(&txn).await.map_err(db_err)?;

        if role.has_profile() {
            let existing = role_profile::Entity::find()
                .filter(role_profile::Column::UserId.eq(user_id))
                .one(&txn)
                .await
                .map_err(db_err)?;

            // Re-assignment of the held role keeps the existing profile
            if existing.is_none() {
                role_profile::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(user_id.to_string()),
                    role: Set(entity_role),
                    completed_tasks_count: Set(0),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                }
                .insert(&txn)
                .await
                .map_err(db_err)?;
            }
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn role_of(&self, user_id: &str) -> DomainResult<Option<UserRole>> {
        let row = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            // Deterministic pick if the one-role invariant is ever broken
            .order_by_asc(user_role::Column::Role)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(row.map(|r| entity_role_to_domain(r.role)))
    }

    async fn profile_of(&self, user_id: &str) -> DomainResult<Option<RoleProfile>> {
        let model = role_profile::Entity::find()
            .filter(role_profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(profile_model_to_domain))
    }

    async fn profiles_for_role(&self, role: UserRole) -> DomainResult<Vec<RoleProfile>> {
        let models = role_profile::Entity::find()
            .filter(role_profile::Column::Role.eq(domain_role_to_entity(role)))
            .order_by_asc(role_profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(profile_model_to_domain).collect())
    }
}
