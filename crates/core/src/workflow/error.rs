//! Workflow error types for the expense approval lifecycle.
//!
//! This module defines all error types that can occur during rule
//! registration, assignment building, and decision processing.

use thiserror::Error;
use uuid::Uuid;

use crate::currency::CurrencyError;
use crate::workflow::types::ExpenseStatus;
use claimflow_shared::AppError;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Rule name was blank.
    #[error("Rule name is required")]
    RuleNameRequired,

    /// Percentage threshold outside the valid range.
    #[error("min_approval_percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(i16),

    /// The same approver appeared more than once in an approver set.
    #[error("Duplicate approver {0} in approver set")]
    DuplicateApprover(Uuid),

    /// An approver does not belong to the rule's company.
    #[error("Approver {0} does not belong to the company")]
    ApproverOutsideCompany(Uuid),

    /// An approver set mixed sequenced and unsequenced entries.
    #[error("Approver set must be fully sequenced or fully unsequenced")]
    MixedSequencing,

    /// A rule requiring manager approval met an employee without a manager.
    #[error("Rule requires manager approval but the employee has no manager")]
    ManagerRequired,

    /// Assignment produced no approval tasks.
    #[error("Rule has no approvers configured")]
    NoApproversConfigured,

    /// Submission was attempted without a rule attached.
    #[error("A rule is required to submit an expense for approval")]
    RuleRequired,

    /// Expense description was blank.
    #[error("Expense description is required")]
    DescriptionRequired,

    /// Expense amount was zero or negative.
    #[error("Expense amount must be positive")]
    InvalidAmount,

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Attempted to modify an expense that already left Draft.
    #[error("Only draft expenses can be modified")]
    NotDraft,

    /// A decision was attempted by someone other than the assigned approver.
    #[error("Approval task is assigned to another approver")]
    NotAssignedApprover {
        /// The user who attempted the decision.
        approver_id: Uuid,
    },

    /// An expense operation was attempted by someone other than its owner.
    #[error("Expense can only be modified by its owner")]
    NotExpenseOwner,

    /// The viewer is not allowed to see this expense.
    #[error("Expense is outside your scope")]
    ExpenseOutsideScope,

    /// The task has already been decided.
    #[error("Approval already decided")]
    AlreadyDecided,

    /// The parent expense is no longer waiting for approval.
    #[error("Expense is no longer awaiting approval (status {status})")]
    NotAwaitingApproval {
        /// The expense's current status.
        status: ExpenseStatus,
    },

    /// An earlier approver in the sequence has not approved yet.
    #[error("Awaiting earlier approvers in the sequence")]
    AwaitingEarlierApprovers,

    /// Rule not found (or outside the caller's company).
    #[error("Rule {0} not found")]
    RuleNotFound(Uuid),

    /// Expense not found (or outside the caller's company).
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Approval task not found.
    #[error("Approval task {0} not found")]
    ApprovalTaskNotFound(Uuid),

    /// Employee not found.
    #[error("Employee {0} not found")]
    EmployeeNotFound(Uuid),

    /// Currency conversion failed while preparing an expense.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RuleNameRequired
            | Self::InvalidPercentage(_)
            | Self::DuplicateApprover(_)
            | Self::ApproverOutsideCompany(_)
            | Self::MixedSequencing
            | Self::ManagerRequired
            | Self::NoApproversConfigured
            | Self::RuleRequired
            | Self::DescriptionRequired
            | Self::InvalidAmount
            | Self::InvalidTransition { .. }
            | Self::NotDraft
            | Self::AlreadyDecided
            | Self::NotAwaitingApproval { .. }
            | Self::AwaitingEarlierApprovers => 400,

            Self::NotAssignedApprover { .. }
            | Self::NotExpenseOwner
            | Self::ExpenseOutsideScope => 403,

            Self::RuleNotFound(_)
            | Self::ExpenseNotFound(_)
            | Self::ApprovalTaskNotFound(_)
            | Self::EmployeeNotFound(_) => 404,

            Self::Currency(err) => err.status_code(),

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RuleNameRequired => "RULE_NAME_REQUIRED",
            Self::InvalidPercentage(_) => "INVALID_PERCENTAGE",
            Self::DuplicateApprover(_) => "DUPLICATE_APPROVER",
            Self::ApproverOutsideCompany(_) => "APPROVER_OUTSIDE_COMPANY",
            Self::MixedSequencing => "MIXED_SEQUENCING",
            Self::ManagerRequired => "MANAGER_REQUIRED",
            Self::NoApproversConfigured => "NO_APPROVERS_CONFIGURED",
            Self::RuleRequired => "RULE_REQUIRED",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotDraft => "NOT_DRAFT",
            Self::NotAssignedApprover { .. } => "NOT_ASSIGNED_APPROVER",
            Self::NotExpenseOwner => "NOT_EXPENSE_OWNER",
            Self::ExpenseOutsideScope => "EXPENSE_OUTSIDE_SCOPE",
            Self::AlreadyDecided => "ALREADY_DECIDED",
            Self::NotAwaitingApproval { .. } => "NOT_AWAITING_APPROVAL",
            Self::AwaitingEarlierApprovers => "AWAITING_EARLIER_APPROVERS",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::ApprovalTaskNotFound(_) => "APPROVAL_TASK_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::Currency(_) => "CURRENCY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            400 => Self::Validation(message),
            502 | 503 => Self::ExternalService(message),
            _ => Self::Database(message),
        }
    }
}
