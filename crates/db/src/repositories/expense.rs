//! Expense repository: capture, editing, and submission.
//!
//! Submission is the single entry point into the approval pipeline: it
//! runs the assignment builder and inserts the resulting task snapshot in
//! the same transaction that flips the expense to `waiting_approval`.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use claimflow_core::currency::{CurrencyConverter, DEFAULT_DECIMAL_PLACES};
use claimflow_core::workflow::{AssignmentBuilder, ExpenseStatus, WorkflowError};
use claimflow_shared::types::{CurrencyCode, Money};

use crate::entities::{
    companies, expense_approvals, expenses, sea_orm_active_enums, users,
};
use crate::repositories::rule::{rule_in_company, rule_policy_approvers};
use crate::repositories::{policy_of, status_to_core};

/// Input for capturing a new expense draft.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// What the expense was for.
    pub description: String,
    /// Free-form category.
    pub category: Option<String>,
    /// When the expense was incurred.
    pub expense_date: NaiveDate,
    /// Who fronted the money.
    pub paid_by: Option<String>,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// The amount as paid, in its original currency.
    pub amount: Money,
    /// Approval rule to attach, if already known.
    pub rule_id: Option<Uuid>,
}

/// Patch for an expense still in draft.
///
/// Outer `Option` means "leave unchanged"; the inner `Option` on nullable
/// fields distinguishes "set" from "clear".
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<Option<String>>,
    /// New expense date.
    pub expense_date: Option<NaiveDate>,
    /// New payer.
    pub paid_by: Option<Option<String>>,
    /// New remarks.
    pub remarks: Option<Option<String>>,
    /// New original amount.
    pub amount: Option<Decimal>,
    /// New original currency.
    pub currency: Option<CurrencyCode>,
    /// Attach or detach a rule.
    pub rule_id: Option<Option<Uuid>>,
}

/// An expense together with its approval task snapshot.
#[derive(Debug, Clone)]
pub struct ExpenseWithApprovals {
    /// The expense row.
    pub expense: expenses::Model,
    /// Approval tasks ordered by sequence, then insertion order.
    pub approvals: Vec<expense_approvals::Model>,
}

/// Repository for expense lifecycle operations.
pub struct ExpenseRepository {
    db: DatabaseConnection,
    converter: Arc<dyn CurrencyConverter>,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    pub fn new(db: DatabaseConnection, converter: Arc<dyn CurrencyConverter>) -> Self {
        Self { db, converter }
    }

    /// Captures a new expense draft for `employee_id`.
    ///
    /// The original amount is converted into the company base currency
    /// before the row is written, so both representations are always
    /// present.
    ///
    /// # Errors
    ///
    /// Returns `DescriptionRequired`, `InvalidAmount`, `RuleNotFound`,
    /// `EmployeeNotFound`, a `Currency` error from the converter, or
    /// `Database`.
    pub async fn create_expense(
        &self,
        employee_id: Uuid,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, WorkflowError> {
        if input.description.trim().is_empty() {
            return Err(WorkflowError::DescriptionRequired);
        }
        if !input.amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }

        let employee = self.employee(employee_id).await?;
        let base_currency = self.base_currency(employee.company_id).await?;

        if let Some(rule_id) = input.rule_id {
            rule_in_company(&self.db, employee.company_id, rule_id).await?;
        }

        let original_amount = round_money(input.amount.amount);
        let conversion = self
            .converter
            .convert(original_amount, &input.amount.currency, &base_currency)
            .await?;

        let now = Utc::now();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            rule_id: Set(input.rule_id),
            description: Set(input.description),
            category: Set(input.category),
            expense_date: Set(input.expense_date),
            paid_by: Set(input.paid_by),
            remarks: Set(input.remarks),
            amount: Set(conversion.converted_amount),
            currency: Set(base_currency.as_str().to_string()),
            original_amount: Set(original_amount),
            original_currency: Set(input.amount.currency.as_str().to_string()),
            status: Set(sea_orm_active_enums::ExpenseStatus::Draft),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        expense
            .insert(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Updates an expense still in draft. Owner only.
    ///
    /// Changing the amount or currency re-runs the conversion so the base
    /// representation never goes stale.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound`, `NotExpenseOwner`, `NotDraft`,
    /// `InvalidAmount`, `RuleNotFound`, a `Currency` error, or `Database`.
    pub async fn update_expense(
        &self,
        employee_id: Uuid,
        expense_id: Uuid,
        patch: UpdateExpenseInput,
    ) -> Result<expenses::Model, WorkflowError> {
        let expense = self.expense(expense_id).await?;
        if expense.employee_id != employee_id {
            return Err(WorkflowError::NotExpenseOwner);
        }
        if status_to_core(&expense.status) != ExpenseStatus::Draft {
            return Err(WorkflowError::NotDraft);
        }

        let employee = self.employee(employee_id).await?;
        let base_currency = self.base_currency(employee.company_id).await?;

        if let Some(Some(rule_id)) = patch.rule_id {
            rule_in_company(&self.db, employee.company_id, rule_id).await?;
        }

        let reconvert = patch.amount.is_some() || patch.currency.is_some();
        let new_original_amount = match patch.amount {
            Some(amount) => {
                if amount <= Decimal::ZERO {
                    return Err(WorkflowError::InvalidAmount);
                }
                round_money(amount)
            }
            None => expense.original_amount,
        };
        let new_original_currency = match &patch.currency {
            Some(currency) => currency.clone(),
            None => CurrencyCode::new(&expense.original_currency)
                .map_err(|e| WorkflowError::Database(e.to_string()))?,
        };

        let mut active: expenses::ActiveModel = expense.into();
        if let Some(description) = patch.description {
            if description.trim().is_empty() {
                return Err(WorkflowError::DescriptionRequired);
            }
            active.description = Set(description);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(expense_date) = patch.expense_date {
            active.expense_date = Set(expense_date);
        }
        if let Some(paid_by) = patch.paid_by {
            active.paid_by = Set(paid_by);
        }
        if let Some(remarks) = patch.remarks {
            active.remarks = Set(remarks);
        }
        if let Some(rule_id) = patch.rule_id {
            active.rule_id = Set(rule_id);
        }

        if reconvert {
            let conversion = self
                .converter
                .convert(new_original_amount, &new_original_currency, &base_currency)
                .await?;
            active.amount = Set(conversion.converted_amount);
            active.currency = Set(base_currency.as_str().to_string());
            active.original_amount = Set(new_original_amount);
            active.original_currency = Set(new_original_currency.as_str().to_string());
        }

        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Submits a draft expense for approval.
    ///
    /// Expands the rule into approval tasks and inserts them together with
    /// the `draft -> waiting_approval` flip in one transaction; on any
    /// failure nothing is written and the expense stays draft.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound`, `NotExpenseOwner`, `InvalidTransition`,
    /// `RuleRequired`, `RuleNotFound`, `ManagerRequired`,
    /// `NoApproversConfigured`, or `Database`.
    pub async fn submit_expense(
        &self,
        employee_id: Uuid,
        expense_id: Uuid,
        rule_id: Option<Uuid>,
    ) -> Result<expenses::Model, WorkflowError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;

        if expense.employee_id != employee_id {
            return Err(WorkflowError::NotExpenseOwner);
        }

        let current = status_to_core(&expense.status);
        if current != ExpenseStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: current,
                to: ExpenseStatus::WaitingApproval,
            });
        }

        let employee = users::Entity::find_by_id(employee_id)
            .one(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))?;

        let rule_id = rule_id
            .or(expense.rule_id)
            .ok_or(WorkflowError::RuleRequired)?;
        let rule = rule_in_company(&txn, employee.company_id, rule_id).await?;
        let approvers = rule_policy_approvers(&txn, rule_id).await?;

        let tasks = AssignmentBuilder::build(&policy_of(&rule), &approvers, employee.manager_id)?;

        // Snapshot replace: stale rows from a previous submission attempt
        // are discarded before the new assignment lands.
        expense_approvals::Entity::delete_many()
            .filter(expense_approvals::Column::ExpenseId.eq(expense_id))
            .exec(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let now = Utc::now();
        for task in &tasks {
            let row = expense_approvals::ActiveModel {
                id: Set(Uuid::now_v7()),
                expense_id: Set(expense_id),
                approver_id: Set(task.approver_id),
                sequence: Set(task.sequence),
                is_mandatory: Set(task.is_mandatory),
                decision: Set(sea_orm_active_enums::ApprovalDecision::Pending),
                comments: Set(None),
                decided_at: Set(None),
                created_at: Set(now.into()),
            };
            row.insert(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;
        }

        let mut active: expenses::ActiveModel = expense.into();
        active.rule_id = Set(Some(rule_id));
        active.status = Set(sea_orm_active_enums::ExpenseStatus::WaitingApproval);
        active.updated_at = Set(now.into());
        let submitted = active
            .update(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        tracing::debug!(%expense_id, %rule_id, tasks = tasks.len(), "expense submitted for approval");
        Ok(submitted)
    }

    /// Lists the expenses visible to `viewer`.
    ///
    /// Employees see their own, managers their own plus direct reports',
    /// admins the whole company.
    pub async fn list_expenses(
        &self,
        viewer: &users::Model,
    ) -> Result<Vec<expenses::Model>, WorkflowError> {
        let query = match viewer.role {
            sea_orm_active_enums::UserRole::Employee => expenses::Entity::find()
                .filter(expenses::Column::EmployeeId.eq(viewer.id)),
            sea_orm_active_enums::UserRole::Manager => {
                let mut visible = self.team_ids(viewer.id).await?;
                visible.push(viewer.id);
                expenses::Entity::find().filter(expenses::Column::EmployeeId.is_in(visible))
            }
            sea_orm_active_enums::UserRole::Admin => expenses::Entity::find()
                .inner_join(users::Entity)
                .filter(users::Column::CompanyId.eq(viewer.company_id)),
        };

        query
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Fetches one expense with its approval snapshot, scope-checked.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound` outside the viewer's company (the tenant
    /// boundary does not leak existence) and `ExpenseOutsideScope` inside
    /// the company but outside the viewer's role scope.
    pub async fn get_expense_with_approvals(
        &self,
        viewer: &users::Model,
        expense_id: Uuid,
    ) -> Result<ExpenseWithApprovals, WorkflowError> {
        let expense = self.expense(expense_id).await?;
        let owner = users::Entity::find_by_id(expense.employee_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::EmployeeNotFound(expense.employee_id))?;

        if owner.company_id != viewer.company_id {
            return Err(WorkflowError::ExpenseNotFound(expense_id));
        }
        match viewer.role {
            sea_orm_active_enums::UserRole::Admin => {}
            sea_orm_active_enums::UserRole::Manager => {
                let team = self.team_ids(viewer.id).await?;
                if expense.employee_id != viewer.id && !team.contains(&expense.employee_id) {
                    return Err(WorkflowError::ExpenseOutsideScope);
                }
            }
            sea_orm_active_enums::UserRole::Employee => {
                if expense.employee_id != viewer.id {
                    return Err(WorkflowError::ExpenseOutsideScope);
                }
            }
        }

        let mut approvals = expense_approvals::Entity::find()
            .filter(expense_approvals::Column::ExpenseId.eq(expense_id))
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;
        approvals.sort_by_key(|row| (row.sequence.unwrap_or(i32::MAX), row.id));

        Ok(ExpenseWithApprovals { expense, approvals })
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    async fn expense(&self, expense_id: Uuid) -> Result<expenses::Model, WorkflowError> {
        expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))
    }

    async fn employee(&self, employee_id: Uuid) -> Result<users::Model, WorkflowError> {
        users::Entity::find_by_id(employee_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))
    }

    async fn base_currency(&self, company_id: Uuid) -> Result<CurrencyCode, WorkflowError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| WorkflowError::Database(format!("company {company_id} missing")))?;

        CurrencyCode::new(&company.base_currency)
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    async fn team_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>, WorkflowError> {
        let reports = users::Entity::find()
            .filter(users::Column::ManagerId.eq(manager_id))
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;
        Ok(reports.into_iter().map(|u| u.id).collect())
    }
}

/// Rounds a monetary amount to the stored precision (half to even).
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DEFAULT_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}
