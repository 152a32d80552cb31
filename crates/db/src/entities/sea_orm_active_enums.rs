//! Rust mappings for the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role within a company.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Company administrator: full visibility, manages rules and users.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Manages a team; sees own and direct reports' expenses.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Submits expenses; sees only their own.
    #[sea_orm(string_value = "employee")]
    Employee,
}

/// Expense status column.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Being drafted; freely editable by its owner.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Submitted; waiting on approver votes.
    #[sea_orm(string_value = "waiting_approval")]
    WaitingApproval,
    /// Approved for reimbursement (terminal).
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected (terminal).
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Decision column on an approval task.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_decision")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    /// The approver has not voted yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// The approver approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// The approver rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
