//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_users;
mod m20240901_000002_create_user_roles;
mod m20240901_000003_create_role_profiles;
mod m20240901_000004_create_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_users::Migration),
            Box::new(m20240901_000002_create_user_roles::Migration),
            Box::new(m20240901_000003_create_role_profiles::Migration),
            Box::new(m20240901_000004_create_activity_logs::Migration),
        ]
    }
}
