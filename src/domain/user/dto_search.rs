use super::UserRole;

#[derive(Debug, Clone, Default)]
pub struct SearchUsersDto {
    /// Free-text match over first name, last name and email.
    pub search_term: Option<String>,
    pub role: Option<UserRole>,
    /// `Some(true)` = soft-deleted only, `Some(false)` = live only,
    /// `None` = both.
    pub is_deleted: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
