//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Database rows are mapped into the core value types at this boundary so
//! the workflow engine never touches entity models.

pub mod approval;
pub mod directory;
pub mod expense;
pub mod rule;

pub use approval::{ApprovalRepository, DecisionOutcome, PendingApproval};
pub use directory::DirectoryRepository;
pub use expense::{CreateExpenseInput, ExpenseRepository, ExpenseWithApprovals, UpdateExpenseInput};
pub use rule::{ApproverInput, CreateRuleInput, RuleRepository, RuleWithApprovers};

use claimflow_core::workflow::{ApprovalPolicy, ApprovalTask, Decision, ExpenseStatus, PolicyApprover, Vote};

use crate::entities::{approval_rules, expense_approvals, rule_approvers, sea_orm_active_enums};

// ============================================================================
// Conversion helpers (database <-> core value types)
// ============================================================================

/// Converts a database expense status to the core status.
pub(crate) fn status_to_core(status: &sea_orm_active_enums::ExpenseStatus) -> ExpenseStatus {
    match status {
        sea_orm_active_enums::ExpenseStatus::Draft => ExpenseStatus::Draft,
        sea_orm_active_enums::ExpenseStatus::WaitingApproval => ExpenseStatus::WaitingApproval,
        sea_orm_active_enums::ExpenseStatus::Approved => ExpenseStatus::Approved,
        sea_orm_active_enums::ExpenseStatus::Rejected => ExpenseStatus::Rejected,
    }
}

/// Converts a core expense status to the database status.
pub(crate) fn status_to_db(status: ExpenseStatus) -> sea_orm_active_enums::ExpenseStatus {
    match status {
        ExpenseStatus::Draft => sea_orm_active_enums::ExpenseStatus::Draft,
        ExpenseStatus::WaitingApproval => sea_orm_active_enums::ExpenseStatus::WaitingApproval,
        ExpenseStatus::Approved => sea_orm_active_enums::ExpenseStatus::Approved,
        ExpenseStatus::Rejected => sea_orm_active_enums::ExpenseStatus::Rejected,
    }
}

/// Converts a database decision to the core decision.
pub(crate) fn decision_to_core(decision: &sea_orm_active_enums::ApprovalDecision) -> Decision {
    match decision {
        sea_orm_active_enums::ApprovalDecision::Pending => Decision::Pending,
        sea_orm_active_enums::ApprovalDecision::Approved => Decision::Approved,
        sea_orm_active_enums::ApprovalDecision::Rejected => Decision::Rejected,
    }
}

/// Converts a core vote to the database decision it records.
pub(crate) fn vote_to_db(vote: Vote) -> sea_orm_active_enums::ApprovalDecision {
    match vote {
        Vote::Approved => sea_orm_active_enums::ApprovalDecision::Approved,
        Vote::Rejected => sea_orm_active_enums::ApprovalDecision::Rejected,
    }
}

/// Extracts the resolution-relevant policy from a rule row.
pub(crate) fn policy_of(rule: &approval_rules::Model) -> ApprovalPolicy {
    ApprovalPolicy {
        manager_is_approver: rule.is_manager_approver,
        min_approval_percentage: rule.min_approval_percentage,
    }
}

/// Maps a configured approver row to its core value type.
pub(crate) fn policy_approver_of(row: &rule_approvers::Model) -> PolicyApprover {
    PolicyApprover {
        approver_id: row.approver_id,
        sequence: row.sequence,
        is_mandatory: row.is_mandatory,
    }
}

/// Maps an approval task row to its core value type.
pub(crate) fn task_of(row: &expense_approvals::Model) -> ApprovalTask {
    ApprovalTask {
        approver_id: row.approver_id,
        sequence: row.sequence,
        is_mandatory: row.is_mandatory,
        decision: decision_to_core(&row.decision),
    }
}
