use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::domain::{
    DomainError, DomainResult, SearchUsersDto, UpdateProfileDto, User, UserRepositoryInterface,
};
use crate::infrastructure::database::entities::{activity_log, role_profile, user, user_role};
use crate::shared::{validate_pagination, PaginatedResult};

use super::role_repository::domain_role_to_entity;
use super::{db_err, is_unique_violation};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: &str) -> DomainResult<Option<user::Model>> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        is_active: model.is_active,
        created_at: model.created_at,
        last_modified_at: model.last_modified_at,
        last_login: model.last_login,
        deleted_at: model.deleted_at,
        deleted_by: model.deleted_by,
        pending_email: model.pending_email,
        email_verification_token: model.email_verification_token,
        email_token_expires_at: model.email_token_expires_at,
        password_reset_token: model.password_reset_token,
        reset_token_expires_at: model.reset_token_expires_at,
    }
}

fn user_domain_to_active(user: User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(user.id),
        email: Set(user.email),
        password_hash: Set(user.password_hash),
        first_name: Set(user.first_name),
        last_name: Set(user.last_name),
        phone_number: Set(user.phone_number),
        is_active: Set(user.is_active),
        created_at: Set(user.created_at),
        last_modified_at: Set(user.last_modified_at),
        last_login: Set(user.last_login),
        deleted_at: Set(user.deleted_at),
        deleted_by: Set(user.deleted_by),
        pending_email: Set(user.pending_email),
        email_verification_token: Set(user.email_verification_token),
        email_token_expires_at: Set(user.email_token_expires_at),
        password_reset_token: Set(user.password_reset_token),
        reset_token_expires_at: Set(user.reset_token_expires_at),
    }
}

fn token_matches(stored: Option<&str>, expires: Option<DateTime<Utc>>, presented: &str) -> bool {
    match (stored, expires) {
        (Some(stored), Some(expires)) => stored == presented && expires > Utc::now(),
        _ => false,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for SeaOrmUserRepository {
    async fn insert_user(&self, user: User) -> DomainResult<()> {
        user_domain_to_active(user)
            .insert(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Conflict("Email already exists".to_string())
                } else {
                    db_err(e)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.fetch(id).await?.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn update_profile(&self, id: &str, dto: UpdateProfileDto) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = dto.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = dto.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone_number) = dto.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        active.last_modified_at = Set(Some(Utc::now()));

        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn update_password(&self, id: &str, new_password_hash: &str) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.last_modified_at = Set(Some(Utc::now()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn update_last_login(&self, id: &str) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(Utc::now()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let Some(existing) = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.password_reset_token = Set(Some(token.to_string()));
        active.reset_token_expires_at = Set(Some(expires_at));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn complete_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password_hash: &str,
    ) -> DomainResult<bool> {
        let Some(existing) = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(false);
        };

        if !token_matches(
            existing.password_reset_token.as_deref(),
            existing.reset_token_expires_at,
            token,
        ) {
            return Ok(false);
        }

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.password_reset_token = Set(None);
        active.reset_token_expires_at = Set(None);
        active.last_modified_at = Set(Some(Utc::now()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn set_pending_email(
        &self,
        id: &str,
        new_email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        // A repeat request supersedes any pending one
        let mut active: user::ActiveModel = existing.into();
        active.pending_email = Set(Some(new_email.to_lowercase()));
        active.email_verification_token = Set(Some(token.to_string()));
        active.email_token_expires_at = Set(Some(expires_at));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn confirm_pending_email(&self, id: &str, token: &str) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        if !token_matches(
            existing.email_verification_token.as_deref(),
            existing.email_token_expires_at,
            token,
        ) {
            return Ok(false);
        }
        let Some(pending) = existing.pending_email.clone() else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.email = Set(pending);
        active.pending_email = Set(None);
        active.email_verification_token = Set(None);
        active.email_token_expires_at = Set(None);
        active.last_modified_at = Set(Some(Utc::now()));
        active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict("Email already exists".to_string())
            } else {
                db_err(e)
            }
        })?;
        Ok(true)
    }

    async fn soft_delete(&self, id: &str, deleted_by: &str) -> DomainResult<bool> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.deleted_at = Set(Some(Utc::now()));
        active.deleted_by = Set(Some(deleted_by.to_string()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn hard_delete(&self, id: &str) -> DomainResult<bool> {
        if self.fetch(id).await?.is_none() {
            return Ok(false);
        }

        // Account, memberships, profile and audit rows go together
        let txn = self.db.begin().await.map_err(db_err)?;

        activity_log::Entity::delete_many()
            .filter(activity_log::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        role_profile::Entity::delete_many()
            .filter(role_profile::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        user::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn search(&self, dto: SearchUsersDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = validate_pagination(dto.page, dto.page_size);

        let mut query = user::Entity::find();

        if let Some(term) = dto.search_term.as_deref().filter(|t| !t.is_empty()) {
            query = query.filter(
                user::Column::FirstName
                    .contains(term)
                    .or(user::Column::LastName.contains(term))
                    .or(user::Column::Email.contains(term)),
            );
        }

        if let Some(role) = dto.role {
            let member_ids: Vec<String> = user_role::Entity::find()
                .filter(user_role::Column::Role.eq(domain_role_to_entity(role)))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|row| row.user_id)
                .collect();
            query = query.filter(user::Column::Id.is_in(member_ids));
        }

        match dto.is_deleted {
            Some(true) => query = query.filter(user::Column::DeletedAt.is_not_null()),
            Some(false) => query = query.filter(user::Column::DeletedAt.is_null()),
            None => {}
        }

        // Stable order so pages never overlap or skip for a fixed filter
        query = query
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let offset = ((page - 1) * page_size) as u64;
        let models = query
            .offset(offset)
            .limit(page_size as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items: Vec<User> = models.into_iter().map(user_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }
}
