//! `SeaORM` Entity for the expense_approvals table.
//!
//! Rows are a snapshot of the rule's approver set taken at submission
//! time; they are never re-derived, even if the rule changes afterwards.
//! Exactly one row exists per (expense, approver) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ApprovalDecision;

/// One approver's pending or decided vote on one expense.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_approvals")]
pub struct Model {
    /// Primary key (UUIDv7, time-ordered).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The expense being decided.
    pub expense_id: Uuid,
    /// The assigned approver.
    pub approver_id: Uuid,
    /// Position in the approval chain; NULL when unsequenced.
    pub sequence: Option<i32>,
    /// Whether this task blocks resolution while pending.
    pub is_mandatory: bool,
    /// The approver's decision.
    pub decision: ApprovalDecision,
    /// Free-form comments recorded with the decision.
    pub comments: Option<String>,
    /// When the decision was made.
    pub decided_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The parent expense.
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
    /// The assigned approver.
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ApproverId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
