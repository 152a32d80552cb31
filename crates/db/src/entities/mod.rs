//! `SeaORM` entity definitions.

pub mod approval_rules;
pub mod companies;
pub mod expense_approvals;
pub mod expenses;
pub mod rule_approvers;
pub mod sea_orm_active_enums;
pub mod users;
