//! `SeaORM` Entity for the approval_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A company-scoped approval policy template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "approval_rules")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the submitter's manager is injected as the first approver.
    pub is_manager_approver: bool,
    /// Percentage threshold, 0..=100; NULL means unanimity.
    pub min_approval_percentage: Option<i16>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning company.
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    /// Configured approvers.
    #[sea_orm(has_many = "super::rule_approvers::Entity")]
    RuleApprovers,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::rule_approvers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleApprovers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
