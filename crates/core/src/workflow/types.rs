//! Workflow domain types for the expense approval lifecycle.
//!
//! This module defines the value types the state-machine logic operates on.
//! Storage rows are mapped into these types at the repository boundary so
//! the engine never sees database models.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expense status in the approval workflow.
///
/// Expenses progress through these states from creation to resolution.
/// The valid transitions are:
/// - Draft → WaitingApproval (submit)
/// - WaitingApproval → Approved (votes satisfy the policy)
/// - WaitingApproval → Rejected (any approver rejects)
///
/// Approved and Rejected are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Expense is being drafted and can be modified.
    Draft,
    /// Expense has been submitted and is waiting on approver votes.
    WaitingApproval,
    /// Expense has been approved for reimbursement (terminal).
    Approved,
    /// Expense has been rejected (terminal).
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::WaitingApproval => "waiting_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "waiting_approval" => Some(Self::WaitingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the expense can still be modified by its owner.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a single approval task.
///
/// A task transitions `Pending → Approved` or `Pending → Rejected` exactly
/// once; decided tasks are never re-decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The approver has not voted yet.
    Pending,
    /// The approver approved the expense.
    Approved,
    /// The approver rejected the expense.
    Rejected,
}

impl Decision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once the approver has voted.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An approver's vote on a pending task.
///
/// Votes carry no `Pending` variant: a decision request is always one of
/// approve or reject, so replaying "pending" is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Approve the expense.
    Approved,
    /// Reject the expense.
    Rejected,
}

impl Vote {
    /// Returns the decision this vote records on the task.
    #[must_use]
    pub const fn decision(self) -> Decision {
        match self {
            Self::Approved => Decision::Approved,
            Self::Rejected => Decision::Rejected,
        }
    }
}

/// Resolution-relevant fields of an approval rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Whether the employee's manager is injected as the first approver.
    pub manager_is_approver: bool,
    /// Minimum percentage of approving tasks required, 0..=100.
    /// `None` means unanimity is required.
    pub min_approval_percentage: Option<i16>,
}

/// One approver slot as configured on a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyApprover {
    /// The approving user.
    pub approver_id: Uuid,
    /// Position in the approval chain; `None` when the rule is unsequenced.
    pub sequence: Option<i32>,
    /// Whether this approver must vote before any threshold can resolve.
    pub is_mandatory: bool,
}

/// One approval task snapshotted onto an expense at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTask {
    /// The assigned approver.
    pub approver_id: Uuid,
    /// Position in the approval chain; `None` when unsequenced.
    pub sequence: Option<i32>,
    /// Whether this task blocks resolution while pending.
    pub is_mandatory: bool,
    /// The approver's current decision.
    pub decision: Decision,
}

impl ApprovalTask {
    /// Creates an undecided task.
    #[must_use]
    pub const fn pending(approver_id: Uuid, sequence: Option<i32>, is_mandatory: bool) -> Self {
        Self {
            approver_id,
            sequence,
            is_mandatory,
            decision: Decision::Pending,
        }
    }
}
