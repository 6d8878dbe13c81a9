//! Role binding aggregate
//!
//! A user holds exactly one role; non-Admin roles own a 1:1 profile
//! record that must track the membership.

pub mod model;
pub mod repository;

pub use model::{ProfileView, RoleProfile};
pub use repository::RoleRepositoryInterface;
