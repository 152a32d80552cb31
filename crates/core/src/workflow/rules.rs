//! Approval policy and approver-set validation.
//!
//! Rules are validated before they are persisted; the assignment builder
//! can therefore assume a well-formed policy, but still defends against
//! malformed approver sets (see `assignment`).

use std::collections::HashSet;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::PolicyApprover;

/// Stateless validator for approval rule inputs.
pub struct RuleValidator;

impl RuleValidator {
    /// Validates a rule name.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::RuleNameRequired` if the name is blank.
    pub fn validate_name(name: &str) -> Result<(), WorkflowError> {
        if name.trim().is_empty() {
            return Err(WorkflowError::RuleNameRequired);
        }
        Ok(())
    }

    /// Validates an optional percentage threshold.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidPercentage` unless the value is
    /// absent or within `0..=100`.
    pub fn validate_percentage(percentage: Option<i16>) -> Result<(), WorkflowError> {
        match percentage {
            Some(p) if !(0..=100).contains(&p) => Err(WorkflowError::InvalidPercentage(p)),
            _ => Ok(()),
        }
    }

    /// Validates a replacement approver set.
    ///
    /// The set must be non-empty, free of duplicate approver ids, and
    /// either fully sequenced or fully unsequenced.
    ///
    /// # Errors
    ///
    /// Returns `NoApproversConfigured`, `DuplicateApprover`, or
    /// `MixedSequencing` accordingly.
    pub fn validate_approvers(approvers: &[PolicyApprover]) -> Result<(), WorkflowError> {
        if approvers.is_empty() {
            return Err(WorkflowError::NoApproversConfigured);
        }

        let mut seen = HashSet::with_capacity(approvers.len());
        for approver in approvers {
            if !seen.insert(approver.approver_id) {
                return Err(WorkflowError::DuplicateApprover(approver.approver_id));
            }
        }

        let sequenced = approvers.iter().filter(|a| a.sequence.is_some()).count();
        if sequenced != 0 && sequenced != approvers.len() {
            return Err(WorkflowError::MixedSequencing);
        }

        Ok(())
    }
}
