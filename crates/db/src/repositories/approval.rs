//! Decision processor repository.
//!
//! `decide_approval` is the one mutation in the system with real
//! concurrency hazards: the aggregate status is recomputed from every
//! sibling task, so the whole row set must be read under an exclusive
//! lock. The expense row is the lock root; sibling tasks are locked as a
//! set after it, which keeps concurrent decisions on one expense from
//! deadlocking while decisions on different expenses never contend.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use claimflow_core::workflow::{ApprovalTask, DecisionProcessor, ExpenseStatus, Vote, WorkflowError};

use crate::entities::{approval_rules, expense_approvals, expenses, sea_orm_active_enums, users};
use crate::repositories::{policy_of, status_to_core, status_to_db, task_of, vote_to_db};

/// A pending approval task joined with its expense summary.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    /// The approval task row.
    pub approval: expense_approvals::Model,
    /// The expense awaiting this decision.
    pub expense: expenses::Model,
    /// Submitting employee's display name.
    pub employee_name: String,
    /// Submitting employee's email.
    pub employee_email: String,
}

/// The result of a recorded decision.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The decided approval task.
    pub approval: expense_approvals::Model,
    /// The expense's aggregate status after this decision.
    pub expense_status: ExpenseStatus,
}

/// Repository for approval task operations.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    db: DatabaseConnection,
}

impl ApprovalRepository {
    /// Creates a new approval repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an approver's undecided tasks with their expense summaries,
    /// most recent expense date first.
    pub async fn list_pending_approvals(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<PendingApproval>, WorkflowError> {
        let tasks = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ApproverId.eq(approver_id))
            .filter(
                expense_approvals::Column::Decision
                    .eq(sea_orm_active_enums::ApprovalDecision::Pending),
            )
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let mut result = Vec::with_capacity(tasks.len());
        for task in tasks {
            let expense = expenses::Entity::find_by_id(task.expense_id)
                .one(&self.db)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?
                .ok_or(WorkflowError::ExpenseNotFound(task.expense_id))?;
            let employee = users::Entity::find_by_id(expense.employee_id)
                .one(&self.db)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?
                .ok_or(WorkflowError::EmployeeNotFound(expense.employee_id))?;

            result.push(PendingApproval {
                approval: task,
                expense,
                employee_name: employee.full_name,
                employee_email: employee.email,
            });
        }

        result.sort_by(|a, b| b.expense.expense_date.cmp(&a.expense.expense_date));
        Ok(result)
    }

    /// Records one approver's vote and recomputes the expense status.
    ///
    /// Every precondition is checked under the lock before anything is
    /// written; a violated precondition rolls the transaction back with no
    /// partial state.
    ///
    /// # Errors
    ///
    /// - `ApprovalTaskNotFound` / `ExpenseNotFound` if either row is gone.
    /// - `NotAssignedApprover` if the caller does not own the task.
    /// - `AlreadyDecided` if the task has left pending.
    /// - `NotAwaitingApproval` if the expense already resolved.
    /// - `AwaitingEarlierApprovers` while the sequence gate is closed.
    /// - `Database` on persistence failure.
    pub async fn decide_approval(
        &self,
        acting_approver_id: Uuid,
        approval_id: Uuid,
        vote: Vote,
        comments: Option<String>,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        // Unlocked probe to learn the parent expense id.
        let probe = expense_approvals::Entity::find_by_id(approval_id)
            .one(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::ApprovalTaskNotFound(approval_id))?;

        // Lock root: the expense row serializes concurrent decisions.
        let expense = expenses::Entity::find_by_id(probe.expense_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::ExpenseNotFound(probe.expense_id))?;

        // The full sibling set, locked; the aggregate below reads all of it.
        let siblings = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ExpenseId.eq(expense.id))
            .order_by_asc(expense_approvals::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        // Re-read the target from the locked set; the probe may be stale.
        let task_row = siblings
            .iter()
            .find(|row| row.id == approval_id)
            .cloned()
            .ok_or(WorkflowError::ApprovalTaskNotFound(approval_id))?;

        let task = task_of(&task_row);
        let current_status = status_to_core(&expense.status);
        DecisionProcessor::authorize(acting_approver_id, &task, current_status)?;

        let sibling_tasks: Vec<ApprovalTask> = siblings.iter().map(task_of).collect();
        DecisionProcessor::check_sequence_gate(&task, &sibling_tasks)?;

        let rule = approval_rules::Entity::find_by_id(
            expense
                .rule_id
                .ok_or_else(|| WorkflowError::Database("expense has tasks but no rule".into()))?,
        )
        .one(&txn)
        .await
        .map_err(|e| WorkflowError::Database(e.to_string()))?
        .ok_or_else(|| WorkflowError::Database("expense rule row missing".into()))?;

        let now = Utc::now();
        let mut active: expense_approvals::ActiveModel = task_row.into();
        active.decision = Set(vote_to_db(vote));
        active.comments = Set(comments);
        active.decided_at = Set(Some(now.into()));
        let decided = active
            .update(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        // Recompute the aggregate from the locked set plus this vote.
        let updated_tasks: Vec<ApprovalTask> = sibling_tasks
            .iter()
            .zip(&siblings)
            .map(|(task, row)| {
                let mut updated = *task;
                if row.id == approval_id {
                    updated.decision = vote.decision();
                }
                updated
            })
            .collect();

        let resolved = DecisionProcessor::resolve(&policy_of(&rule), &updated_tasks);
        if resolved != current_status {
            let mut active: expenses::ActiveModel = expense.into();
            active.status = Set(status_to_db(resolved));
            active.updated_at = Set(now.into());
            active
                .update(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        tracing::debug!(
            %approval_id,
            decision = %vote.decision(),
            expense_status = %resolved,
            "approval decision recorded"
        );

        Ok(DecisionOutcome {
            approval: decided,
            expense_status: resolved,
        })
    }
}
