//! Decision eligibility checks and aggregate status resolution.
//!
//! This module implements the core of the decision processor: the pure
//! checks that gate a vote, and the pure function that recomputes the
//! expense's aggregate status from the complete task set. Persistence and
//! locking live in the repository layer; everything here is side-effect
//! free and exhaustively testable.

use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalPolicy, ApprovalTask, Decision, ExpenseStatus};

/// Stateless processor for individual approver votes.
pub struct DecisionProcessor;

impl DecisionProcessor {
    /// Checks that `acting_approver_id` may decide `task` right now.
    ///
    /// # Errors
    ///
    /// - `NotAssignedApprover` if the caller is not the task's approver.
    /// - `AlreadyDecided` if the task has left `Pending`.
    /// - `NotAwaitingApproval` if the parent expense is not in
    ///   `WaitingApproval`.
    pub fn authorize(
        acting_approver_id: Uuid,
        task: &ApprovalTask,
        expense_status: ExpenseStatus,
    ) -> Result<(), WorkflowError> {
        if acting_approver_id != task.approver_id {
            return Err(WorkflowError::NotAssignedApprover {
                approver_id: acting_approver_id,
            });
        }
        if task.decision != Decision::Pending {
            return Err(WorkflowError::AlreadyDecided);
        }
        if expense_status != ExpenseStatus::WaitingApproval {
            return Err(WorkflowError::NotAwaitingApproval {
                status: expense_status,
            });
        }
        Ok(())
    }

    /// Enforces the sequencing gate for `task` against its sibling set.
    ///
    /// Unsequenced tasks pass unconditionally. A sequenced task may only be
    /// decided once every sibling with a strictly smaller sequence number is
    /// `Approved`.
    ///
    /// # Errors
    ///
    /// Returns `AwaitingEarlierApprovers` while an earlier position is not
    /// approved.
    pub fn check_sequence_gate(
        task: &ApprovalTask,
        siblings: &[ApprovalTask],
    ) -> Result<(), WorkflowError> {
        let Some(position) = task.sequence else {
            return Ok(());
        };

        let blocked = siblings.iter().any(|sibling| {
            sibling
                .sequence
                .is_some_and(|earlier| earlier < position)
                && sibling.decision != Decision::Approved
        });

        if blocked {
            return Err(WorkflowError::AwaitingEarlierApprovers);
        }
        Ok(())
    }

    /// Recomputes the aggregate expense status from the complete task set.
    ///
    /// Pure function of the policy and the tasks' decisions:
    /// 1. Any rejection is terminal.
    /// 2. A pending mandatory task holds the expense open regardless of any
    ///    threshold.
    /// 3. With a percentage configured, the comparison is exact rational
    ///    arithmetic: `approved * 100 >= percentage * total`.
    /// 4. Without a percentage, unanimity is required.
    #[must_use]
    pub fn resolve(policy: &ApprovalPolicy, tasks: &[ApprovalTask]) -> ExpenseStatus {
        if tasks
            .iter()
            .any(|task| task.decision == Decision::Rejected)
        {
            return ExpenseStatus::Rejected;
        }

        if tasks
            .iter()
            .any(|task| task.is_mandatory && task.decision == Decision::Pending)
        {
            return ExpenseStatus::WaitingApproval;
        }

        let approved = tasks
            .iter()
            .filter(|task| task.decision == Decision::Approved)
            .count();
        let total = tasks.len();

        if let Some(percentage) = policy.min_approval_percentage {
            let threshold = usize::try_from(percentage).unwrap_or(0);
            if approved * 100 >= threshold * total {
                return ExpenseStatus::Approved;
            }
            return ExpenseStatus::WaitingApproval;
        }

        if approved == total {
            ExpenseStatus::Approved
        } else {
            ExpenseStatus::WaitingApproval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unanimity() -> ApprovalPolicy {
        ApprovalPolicy {
            manager_is_approver: false,
            min_approval_percentage: None,
        }
    }

    fn threshold(pct: i16) -> ApprovalPolicy {
        ApprovalPolicy {
            manager_is_approver: false,
            min_approval_percentage: Some(pct),
        }
    }

    fn task(decision: Decision) -> ApprovalTask {
        ApprovalTask {
            approver_id: Uuid::new_v4(),
            sequence: None,
            is_mandatory: false,
            decision,
        }
    }

    fn mandatory(decision: Decision) -> ApprovalTask {
        ApprovalTask {
            is_mandatory: true,
            ..task(decision)
        }
    }

    fn sequenced(position: i32, decision: Decision) -> ApprovalTask {
        ApprovalTask {
            sequence: Some(position),
            ..task(decision)
        }
    }

    // ========================================================================
    // authorize
    // ========================================================================

    #[test]
    fn test_authorize_ok_for_assigned_pending_task() {
        let t = task(Decision::Pending);
        assert!(DecisionProcessor::authorize(
            t.approver_id,
            &t,
            ExpenseStatus::WaitingApproval
        )
        .is_ok());
    }

    #[test]
    fn test_authorize_rejects_foreign_approver() {
        let t = task(Decision::Pending);
        let intruder = Uuid::new_v4();
        assert!(matches!(
            DecisionProcessor::authorize(intruder, &t, ExpenseStatus::WaitingApproval),
            Err(WorkflowError::NotAssignedApprover { approver_id }) if approver_id == intruder
        ));
    }

    #[test]
    fn test_authorize_rejects_decided_task() {
        let t = task(Decision::Approved);
        assert!(matches!(
            DecisionProcessor::authorize(t.approver_id, &t, ExpenseStatus::WaitingApproval),
            Err(WorkflowError::AlreadyDecided)
        ));
    }

    #[test]
    fn test_authorize_rejects_resolved_expense() {
        let t = task(Decision::Pending);
        for status in [
            ExpenseStatus::Draft,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
        ] {
            assert!(matches!(
                DecisionProcessor::authorize(t.approver_id, &t, status),
                Err(WorkflowError::NotAwaitingApproval { .. })
            ));
        }
    }

    #[test]
    fn test_authorize_ownership_checked_before_replay() {
        // A foreign approver poking at a decided task gets Forbidden, not
        // AlreadyDecided.
        let t = task(Decision::Approved);
        assert!(matches!(
            DecisionProcessor::authorize(Uuid::new_v4(), &t, ExpenseStatus::WaitingApproval),
            Err(WorkflowError::NotAssignedApprover { .. })
        ));
    }

    // ========================================================================
    // check_sequence_gate
    // ========================================================================

    #[test]
    fn test_gate_passes_unsequenced() {
        let t = task(Decision::Pending);
        let siblings = vec![t, task(Decision::Pending)];
        assert!(DecisionProcessor::check_sequence_gate(&t, &siblings).is_ok());
    }

    #[test]
    fn test_gate_blocks_until_earlier_approved() {
        let first = sequenced(1, Decision::Pending);
        let second = sequenced(2, Decision::Pending);
        let siblings = vec![first, second];

        assert!(matches!(
            DecisionProcessor::check_sequence_gate(&second, &siblings),
            Err(WorkflowError::AwaitingEarlierApprovers)
        ));
        // The first position has no earlier sibling and passes.
        assert!(DecisionProcessor::check_sequence_gate(&first, &siblings).is_ok());
    }

    #[test]
    fn test_gate_opens_after_earlier_approval() {
        let first = sequenced(1, Decision::Approved);
        let second = sequenced(2, Decision::Pending);
        let siblings = vec![first, second];
        assert!(DecisionProcessor::check_sequence_gate(&second, &siblings).is_ok());
    }

    #[test]
    fn test_gate_blocks_on_earlier_rejection() {
        // A rejected earlier task never counts as approved; the aggregate
        // will already be Rejected, but the gate stays closed too.
        let first = sequenced(1, Decision::Rejected);
        let second = sequenced(2, Decision::Pending);
        let siblings = vec![first, second];
        assert!(matches!(
            DecisionProcessor::check_sequence_gate(&second, &siblings),
            Err(WorkflowError::AwaitingEarlierApprovers)
        ));
    }

    #[test]
    fn test_gate_equal_positions_do_not_block() {
        let left = sequenced(1, Decision::Pending);
        let right = sequenced(1, Decision::Pending);
        let siblings = vec![left, right];
        assert!(DecisionProcessor::check_sequence_gate(&right, &siblings).is_ok());
    }

    // ========================================================================
    // resolve
    // ========================================================================

    #[test]
    fn test_resolve_rejection_is_immediate() {
        let tasks = vec![
            task(Decision::Approved),
            task(Decision::Rejected),
            task(Decision::Pending),
        ];
        assert_eq!(
            DecisionProcessor::resolve(&unanimity(), &tasks),
            ExpenseStatus::Rejected
        );
        assert_eq!(
            DecisionProcessor::resolve(&threshold(10), &tasks),
            ExpenseStatus::Rejected
        );
    }

    #[test]
    fn test_resolve_unanimity_waits_for_all() {
        let tasks = vec![task(Decision::Approved), task(Decision::Pending)];
        assert_eq!(
            DecisionProcessor::resolve(&unanimity(), &tasks),
            ExpenseStatus::WaitingApproval
        );

        let tasks = vec![task(Decision::Approved), task(Decision::Approved)];
        assert_eq!(
            DecisionProcessor::resolve(&unanimity(), &tasks),
            ExpenseStatus::Approved
        );
    }

    #[test]
    fn test_resolve_threshold_flips_at_exact_boundary() {
        // p=60 with three approvers: 1/3 stays open, 2/3 approves.
        let one_of_three = vec![
            task(Decision::Approved),
            task(Decision::Pending),
            task(Decision::Pending),
        ];
        assert_eq!(
            DecisionProcessor::resolve(&threshold(60), &one_of_three),
            ExpenseStatus::WaitingApproval
        );

        let two_of_three = vec![
            task(Decision::Approved),
            task(Decision::Approved),
            task(Decision::Pending),
        ];
        assert_eq!(
            DecisionProcessor::resolve(&threshold(60), &two_of_three),
            ExpenseStatus::Approved
        );
    }

    #[test]
    fn test_resolve_threshold_exact_rational_comparison() {
        // 1 of 2 is exactly 50%: meets p=50, misses p=60. No floating
        // point may blur either side.
        let one_of_two = vec![task(Decision::Approved), task(Decision::Pending)];
        assert_eq!(
            DecisionProcessor::resolve(&threshold(50), &one_of_two),
            ExpenseStatus::Approved
        );
        assert_eq!(
            DecisionProcessor::resolve(&threshold(60), &one_of_two),
            ExpenseStatus::WaitingApproval
        );
    }

    #[test]
    fn test_resolve_mandatory_blocks_satisfied_threshold() {
        let tasks = vec![
            task(Decision::Approved),
            task(Decision::Approved),
            mandatory(Decision::Pending),
        ];
        // 2/3 ≈ 67% would satisfy p=50, but the mandatory approver has not
        // weighed in.
        assert_eq!(
            DecisionProcessor::resolve(&threshold(50), &tasks),
            ExpenseStatus::WaitingApproval
        );
    }

    #[test]
    fn test_resolve_mandatory_approval_releases_threshold() {
        let tasks = vec![
            task(Decision::Approved),
            task(Decision::Approved),
            mandatory(Decision::Approved),
        ];
        assert_eq!(
            DecisionProcessor::resolve(&threshold(50), &tasks),
            ExpenseStatus::Approved
        );
    }

    #[test]
    fn test_resolve_zero_percentage_with_no_mandatory() {
        // p=0 is satisfied by any non-rejecting task set.
        let tasks = vec![task(Decision::Pending), task(Decision::Pending)];
        assert_eq!(
            DecisionProcessor::resolve(&threshold(0), &tasks),
            ExpenseStatus::Approved
        );
    }

    #[test]
    fn test_resolve_all_pending_unanimity_stays_open() {
        let tasks = vec![task(Decision::Pending), task(Decision::Pending)];
        assert_eq!(
            DecisionProcessor::resolve(&unanimity(), &tasks),
            ExpenseStatus::WaitingApproval
        );
    }
}
