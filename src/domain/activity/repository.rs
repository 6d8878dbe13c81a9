use async_trait::async_trait;

use super::{ActivityLogEntry, ActivityLogFilter, NewActivityLog};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait ActivityLogRepositoryInterface: Send + Sync {
    async fn append(&self, entry: NewActivityLog) -> DomainResult<()>;

    /// Newest-first page of entries matching the filter.
    async fn list(
        &self,
        filter: ActivityLogFilter,
    ) -> DomainResult<PaginatedResult<ActivityLogEntry>>;

    /// Retention purge: drop entries older than `days_to_keep` days and
    /// return how many were removed.
    async fn clear_older_than(&self, days_to_keep: i64) -> DomainResult<u64>;
}
