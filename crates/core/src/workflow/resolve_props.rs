//! Property-based tests for aggregate status resolution.
//!
//! `resolve` is a pure function of the policy and the multiset of task
//! decisions; these properties pin down the behaviors the repository layer
//! relies on.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::resolve::DecisionProcessor;
use crate::workflow::types::{ApprovalPolicy, ApprovalTask, Decision, ExpenseStatus};

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        Just(Decision::Pending),
        Just(Decision::Approved),
        Just(Decision::Rejected),
    ]
}

fn arb_task() -> impl Strategy<Value = ApprovalTask> {
    (arb_decision(), any::<bool>()).prop_map(|(decision, is_mandatory)| ApprovalTask {
        approver_id: Uuid::new_v4(),
        sequence: None,
        is_mandatory,
        decision,
    })
}

fn arb_tasks() -> impl Strategy<Value = Vec<ApprovalTask>> {
    prop::collection::vec(arb_task(), 1..10)
}

fn arb_policy() -> impl Strategy<Value = ApprovalPolicy> {
    prop::option::of(0i16..=100).prop_map(|min_approval_percentage| ApprovalPolicy {
        manager_is_approver: false,
        min_approval_percentage,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    // =========================================================================
    // Rejection dominance
    // =========================================================================

    /// Any rejected task makes the aggregate Rejected, whatever the policy.
    #[test]
    fn prop_rejection_dominates(policy in arb_policy(), tasks in arb_tasks()) {
        let any_rejected = tasks.iter().any(|t| t.decision == Decision::Rejected);
        let resolved = DecisionProcessor::resolve(&policy, &tasks);
        if any_rejected {
            prop_assert_eq!(resolved, ExpenseStatus::Rejected);
        } else {
            prop_assert_ne!(resolved, ExpenseStatus::Rejected);
        }
    }

    // =========================================================================
    // Mandatory gate
    // =========================================================================

    /// Without a rejection, a pending mandatory task always keeps the
    /// expense open.
    #[test]
    fn prop_pending_mandatory_holds_open(policy in arb_policy(), tasks in arb_tasks()) {
        let any_rejected = tasks.iter().any(|t| t.decision == Decision::Rejected);
        let pending_mandatory = tasks
            .iter()
            .any(|t| t.is_mandatory && t.decision == Decision::Pending);
        if !any_rejected && pending_mandatory {
            prop_assert_eq!(
                DecisionProcessor::resolve(&policy, &tasks),
                ExpenseStatus::WaitingApproval
            );
        }
    }

    // =========================================================================
    // Threshold semantics are exact rational comparison
    // =========================================================================

    /// When the threshold path is taken, the outcome matches the integer
    /// cross-multiplication exactly.
    #[test]
    fn prop_threshold_is_exact(
        pct in 0i16..=100,
        tasks in arb_tasks(),
    ) {
        let policy = ApprovalPolicy {
            manager_is_approver: false,
            min_approval_percentage: Some(pct),
        };
        let any_rejected = tasks.iter().any(|t| t.decision == Decision::Rejected);
        let pending_mandatory = tasks
            .iter()
            .any(|t| t.is_mandatory && t.decision == Decision::Pending);
        if !any_rejected && !pending_mandatory {
            let approved = tasks.iter().filter(|t| t.decision == Decision::Approved).count();
            let met = approved * 100 >= usize::try_from(pct).unwrap() * tasks.len();
            let expected = if met {
                ExpenseStatus::Approved
            } else {
                ExpenseStatus::WaitingApproval
            };
            prop_assert_eq!(DecisionProcessor::resolve(&policy, &tasks), expected);
        }
    }

    // =========================================================================
    // Unanimity fallback
    // =========================================================================

    /// Without a percentage, Approved requires every task approved.
    #[test]
    fn prop_unanimity_fallback(tasks in arb_tasks()) {
        let policy = ApprovalPolicy {
            manager_is_approver: false,
            min_approval_percentage: None,
        };
        let resolved = DecisionProcessor::resolve(&policy, &tasks);
        let all_approved = tasks.iter().all(|t| t.decision == Decision::Approved);
        if resolved == ExpenseStatus::Approved {
            prop_assert!(all_approved, "approved without unanimity");
        }
        if all_approved {
            prop_assert_eq!(resolved, ExpenseStatus::Approved);
        }
    }

    // =========================================================================
    // resolve never invents Draft, and is order-independent
    // =========================================================================

    #[test]
    fn prop_resolve_never_returns_draft(policy in arb_policy(), tasks in arb_tasks()) {
        prop_assert_ne!(
            DecisionProcessor::resolve(&policy, &tasks),
            ExpenseStatus::Draft
        );
    }

    /// The aggregate is a function of the task multiset, not its order.
    #[test]
    fn prop_resolve_order_independent(
        policy in arb_policy(),
        tasks in arb_tasks(),
        rotation in 0usize..10,
    ) {
        let mut rotated = tasks.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);
        prop_assert_eq!(
            DecisionProcessor::resolve(&policy, &tasks),
            DecisionProcessor::resolve(&policy, &rotated)
        );
    }
}
