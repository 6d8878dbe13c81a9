//! Role membership entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authorization role. String values match the role names, so ordering
/// on the column is ordering by role name.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Role {
    #[sea_orm(string_value = "Admin")]
    Admin,
    #[sea_orm(string_value = "Etiketues")]
    Etiketues,
    #[sea_orm(string_value = "Komercialist")]
    Komercialist,
    #[sea_orm(string_value = "Menaxher")]
    Menaxher,
    #[sea_orm(string_value = "Shofer")]
    Shofer,
}

/// Role membership row; at most one per user under normal operation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
