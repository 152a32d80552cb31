//! `SeaORM` Entity for the rule_approvers table.
//!
//! Ids are UUIDv7 so that unsequenced approvers keep a stable insertion
//! order when sorted by id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One approver slot configured on a rule.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rule_approvers")]
pub struct Model {
    /// Primary key (UUIDv7, time-ordered).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning rule.
    pub rule_id: Uuid,
    /// The approving user.
    pub approver_id: Uuid,
    /// Position in the approval chain; NULL when the rule is unsequenced.
    pub sequence: Option<i32>,
    /// Whether this approver must vote before any threshold can resolve.
    pub is_mandatory: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning rule.
    #[sea_orm(
        belongs_to = "super::approval_rules::Entity",
        from = "Column::RuleId",
        to = "super::approval_rules::Column::Id"
    )]
    ApprovalRules,
    /// The approving user.
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ApproverId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::approval_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovalRules.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
