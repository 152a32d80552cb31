//! Expansion of an approval rule into per-expense approval tasks.
//!
//! The assignment builder runs once, at submission time. Its output is
//! snapshotted into the store and never re-derived, even if the rule's
//! approver set changes afterwards.

use std::collections::HashSet;

use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalPolicy, ApprovalTask, PolicyApprover};

/// Stateless builder that expands a rule into concrete approval tasks.
pub struct AssignmentBuilder;

impl AssignmentBuilder {
    /// Builds the approval task list for a submitted expense.
    ///
    /// The approver list is sequenced iff any configured approver carries a
    /// sequence number. When the policy requires manager approval, the
    /// employee's manager is prepended as a mandatory approver at position 0
    /// unless the rule already lists them; an explicitly configured manager
    /// entry keeps its own sequence and mandatory flag. Duplicates are
    /// removed keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// - `ManagerRequired` when the policy injects a manager but
    ///   `manager_id` is `None`.
    /// - `MixedSequencing` when the configured set mixes sequenced and
    ///   unsequenced entries.
    /// - `NoApproversConfigured` when the resulting list is empty.
    pub fn build(
        policy: &ApprovalPolicy,
        rule_approvers: &[PolicyApprover],
        manager_id: Option<Uuid>,
    ) -> Result<Vec<ApprovalTask>, WorkflowError> {
        let sequenced = rule_approvers.iter().filter(|a| a.sequence.is_some()).count();
        if sequenced != 0 && sequenced != rule_approvers.len() {
            return Err(WorkflowError::MixedSequencing);
        }
        let has_sequence = sequenced != 0;

        let mut tasks = Vec::with_capacity(rule_approvers.len() + 1);

        if policy.manager_is_approver {
            let manager = manager_id.ok_or(WorkflowError::ManagerRequired)?;
            let already_listed = rule_approvers.iter().any(|a| a.approver_id == manager);
            if !already_listed {
                let sequence = if has_sequence { Some(0) } else { None };
                tasks.push(ApprovalTask::pending(manager, sequence, true));
            }
        }

        for approver in rule_approvers {
            let sequence = if has_sequence { approver.sequence } else { None };
            tasks.push(ApprovalTask::pending(
                approver.approver_id,
                sequence,
                approver.is_mandatory,
            ));
        }

        // First occurrence wins.
        let mut seen = HashSet::with_capacity(tasks.len());
        tasks.retain(|task| seen.insert(task.approver_id));

        if tasks.is_empty() {
            return Err(WorkflowError::NoApproversConfigured);
        }

        Ok(tasks)
    }
}
