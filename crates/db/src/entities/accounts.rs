//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub subtype: Option<String>,
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
    pub tax_code: Option<String>,
    pub is_bank_account: bool,
    pub track_location: bool,
    pub track_department: bool,
    pub track_project: bool,
    pub track_class: bool,
    pub is_active: bool,
    pub is_system: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::transaction_lines::Entity")]
    TransactionLines,
}

impl Related<super::transaction_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
