//! Database entities

pub mod activity_log;
pub mod role_profile;
pub mod user;
pub mod user_role;
