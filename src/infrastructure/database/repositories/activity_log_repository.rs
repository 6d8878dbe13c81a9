use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogRepositoryInterface, DomainResult,
    NewActivityLog,
};
use crate::infrastructure::database::entities::activity_log;
use crate::shared::{validate_pagination, PaginatedResult};

use super::db_err;

pub struct SeaOrmActivityLogRepository {
    db: DatabaseConnection,
}

impl SeaOrmActivityLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn log_model_to_domain(model: activity_log::Model) -> ActivityLogEntry {
    ActivityLogEntry {
        id: model.id,
        user_id: model.user_id,
        action: model.action,
        description: model.description,
        ip_address: model.ip_address,
        additional_info: model
            .additional_info
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok()),
        timestamp: model.timestamp,
    }
}

#[async_trait]
impl ActivityLogRepositoryInterface for SeaOrmActivityLogRepository {
    async fn append(&self, entry: NewActivityLog) -> DomainResult<()> {
        let additional_info = entry
            .additional_info
            .as_ref()
            .map(|info| info.to_string());

        activity_log::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            action: Set(entry.action),
            description: Set(entry.description),
            ip_address: Set(entry.ip_address),
            additional_info: Set(additional_info),
            timestamp: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list(
        &self,
        filter: ActivityLogFilter,
    ) -> DomainResult<PaginatedResult<ActivityLogEntry>> {
        let (page, page_size) = validate_pagination(filter.page, filter.page_size);

        let mut query = activity_log::Entity::find();

        if let Some(ref user_id) = filter.user_id {
            query = query.filter(activity_log::Column::UserId.eq(user_id.as_str()));
        }
        if let Some(start) = filter.start {
            query = query.filter(activity_log::Column::Timestamp.gte(start));
        }
        if let Some(end) = filter.end {
            query = query.filter(activity_log::Column::Timestamp.lte(end));
        }

        // Newest first; id breaks same-instant ties
        query = query
            .order_by_desc(activity_log::Column::Timestamp)
            .order_by_desc(activity_log::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let offset = ((page - 1) * page_size) as u64;
        let models = query
            .offset(offset)
            .limit(page_size as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items: Vec<ActivityLogEntry> = models.into_iter().map(log_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }

    async fn clear_older_than(&self, days_to_keep: i64) -> DomainResult<u64> {
        let cutoff = Utc::now() - Duration::days(days_to_keep);

        let result = activity_log::Entity::delete_many()
            .filter(activity_log::Column::Timestamp.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}
