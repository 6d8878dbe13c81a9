use chrono::{DateTime, Utc};
use serde::Serialize;

/// One audit entry. Never updated; removed only by the retention purge
/// or a hard-delete cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogEntry {
    pub id: i32,
    pub user_id: String,
    pub action: String,
    pub description: String,
    pub ip_address: String,
    pub additional_info: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: String,
    pub action: String,
    pub description: String,
    pub ip_address: String,
    pub additional_info: Option<serde_json::Value>,
}

impl NewActivityLog {
    /// Entry originating from the engine itself rather than a caller
    /// with a network address.
    pub fn system(
        user_id: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            description: description.into(),
            ip_address: "System".to_string(),
            additional_info: None,
        }
    }

    pub fn with_origin(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self
    }

    pub fn with_info(mut self, info: serde_json::Value) -> Self {
        self.additional_info = Some(info);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub user_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
