//! `SeaORM` Entity for the expenses table.
//!
//! Every expense carries two amount representations: the amount as paid
//! (`original_amount`/`original_currency`) and its value in the company's
//! base currency (`amount`/`currency`), converted once at capture time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ExpenseStatus;

/// An expense submitted for reimbursement.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Submitting employee.
    pub employee_id: Uuid,
    /// Approval rule attached at or before submission.
    pub rule_id: Option<Uuid>,
    /// What the expense was for.
    pub description: String,
    /// Free-form category.
    pub category: Option<String>,
    /// When the expense was incurred.
    pub expense_date: Date,
    /// Who fronted the money.
    pub paid_by: Option<String>,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Value in the company base currency.
    pub amount: Decimal,
    /// Company base currency code.
    pub currency: String,
    /// Amount as originally paid.
    pub original_amount: Decimal,
    /// Currency the expense was paid in.
    pub original_currency: String,
    /// Workflow status.
    pub status: ExpenseStatus,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The submitting employee.
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::EmployeeId",
        to = "super::users::Column::Id"
    )]
    Users,
    /// The attached approval rule.
    #[sea_orm(
        belongs_to = "super::approval_rules::Entity",
        from = "Column::RuleId",
        to = "super::approval_rules::Column::Id"
    )]
    ApprovalRules,
    /// Approval tasks snapshotted onto this expense.
    #[sea_orm(has_many = "super::expense_approvals::Entity")]
    ExpenseApprovals,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::approval_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovalRules.def()
    }
}

impl Related<super::expense_approvals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseApprovals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
