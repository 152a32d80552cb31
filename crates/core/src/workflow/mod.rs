//! Expense approval workflow for Claimflow.
//!
//! This module implements the expense lifecycle state machine, approval
//! policy validation, the assignment builder that snapshots a rule onto a
//! submitted expense, and the decision processor that folds individual
//! approver votes into an aggregate expense status.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ExpenseStatus, Decision, ApprovalTask)
//! - `error` - Workflow-specific error types
//! - `rules` - Approval policy and approver-set validation
//! - `assignment` - Expansion of a rule into per-expense approval tasks
//! - `resolve` - Decision eligibility checks and aggregate status resolution

pub mod assignment;
pub mod error;
pub mod resolve;
pub mod rules;
pub mod types;

#[cfg(test)]
mod assignment_props;
#[cfg(test)]
mod resolve_props;

pub use assignment::AssignmentBuilder;
pub use error::WorkflowError;
pub use resolve::DecisionProcessor;
pub use rules::RuleValidator;
pub use types::{ApprovalPolicy, ApprovalTask, Decision, ExpenseStatus, PolicyApprover, Vote};
