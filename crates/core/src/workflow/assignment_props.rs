//! Property-based tests for the assignment builder.
//!
//! These tests validate the structural invariants every built assignment
//! must satisfy, regardless of how the rule's approver set is configured.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::assignment::AssignmentBuilder;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalPolicy, Decision, PolicyApprover};

/// Strategy for a pool of approver ids to draw from.
///
/// Uuids are derived from small integers so that duplicates actually occur.
fn arb_approver_id() -> impl Strategy<Value = Uuid> {
    (0u8..8).prop_map(|n| Uuid::from_u128(u128::from(n) + 1))
}

/// Strategy for an approver set that is uniformly sequenced or unsequenced.
fn arb_approver_set() -> impl Strategy<Value = Vec<PolicyApprover>> {
    (any::<bool>(), prop::collection::vec((arb_approver_id(), 0i32..10, any::<bool>()), 0..8))
        .prop_map(|(sequenced, entries)| {
            entries
                .into_iter()
                .map(|(approver_id, seq, is_mandatory)| PolicyApprover {
                    approver_id,
                    sequence: sequenced.then_some(seq),
                    is_mandatory,
                })
                .collect()
        })
}

fn policy(manager_is_approver: bool) -> ApprovalPolicy {
    ApprovalPolicy {
        manager_is_approver,
        min_approval_percentage: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // No duplicate approvers ever survive assignment
    // =========================================================================

    #[test]
    fn prop_no_duplicate_approvers(approvers in arb_approver_set()) {
        if let Ok(tasks) = AssignmentBuilder::build(&policy(false), &approvers, None) {
            let mut ids: Vec<Uuid> = tasks.iter().map(|t| t.approver_id).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), tasks.len(), "assignment contains duplicates");
        }
    }

    // =========================================================================
    // Sequencing is all-or-nothing on the output
    // =========================================================================

    #[test]
    fn prop_sequencing_all_or_nothing(
        approvers in arb_approver_set(),
        manager in arb_approver_id(),
        manager_first in any::<bool>(),
    ) {
        let result = AssignmentBuilder::build(
            &policy(manager_first),
            &approvers,
            Some(manager),
        );
        if let Ok(tasks) = result {
            let sequenced = tasks.iter().filter(|t| t.sequence.is_some()).count();
            prop_assert!(
                sequenced == 0 || sequenced == tasks.len(),
                "mixed sequencing in output: {} of {}",
                sequenced,
                tasks.len()
            );
        }
    }

    // =========================================================================
    // Every task starts pending
    // =========================================================================

    #[test]
    fn prop_all_tasks_start_pending(approvers in arb_approver_set()) {
        if let Ok(tasks) = AssignmentBuilder::build(&policy(false), &approvers, None) {
            prop_assert!(tasks.iter().all(|t| t.decision == Decision::Pending));
        }
    }

    // =========================================================================
    // Manager-first injection
    // =========================================================================

    #[test]
    fn prop_manager_present_when_required(
        approvers in arb_approver_set(),
        manager in arb_approver_id(),
    ) {
        if let Ok(tasks) = AssignmentBuilder::build(&policy(true), &approvers, Some(manager)) {
            prop_assert!(
                tasks.iter().any(|t| t.approver_id == manager),
                "manager missing from assignment"
            );
        }
    }

    #[test]
    fn prop_manager_required_without_manager(approvers in arb_approver_set()) {
        let result = AssignmentBuilder::build(&policy(true), &approvers, None);
        prop_assert!(matches!(result, Err(WorkflowError::ManagerRequired)));
    }

    // =========================================================================
    // Without manager injection the output is a subset of the input
    // =========================================================================

    #[test]
    fn prop_output_drawn_from_input(approvers in arb_approver_set()) {
        if let Ok(tasks) = AssignmentBuilder::build(&policy(false), &approvers, None) {
            for task in &tasks {
                prop_assert!(
                    approvers.iter().any(|a| a.approver_id == task.approver_id),
                    "assignment invented an approver"
                );
            }
        }
    }
}
