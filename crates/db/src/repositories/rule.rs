//! Rule registry repository.
//!
//! Stores approval policies and their approver sets, scoped to a company.
//! Approver replacement is delete-then-insert: the rule's approver set is
//! replaced wholesale, never patched incrementally.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use claimflow_core::workflow::{RuleValidator, WorkflowError};

use crate::entities::{approval_rules, rule_approvers, users};
use crate::repositories::policy_approver_of;

/// Input for creating an approval rule.
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    /// Name of the approval rule.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the submitter's manager is injected as the first approver.
    pub is_manager_approver: bool,
    /// Percentage threshold, 0..=100; `None` requires unanimity.
    pub min_approval_percentage: Option<i16>,
}

/// One approver entry in a replacement approver set.
#[derive(Debug, Clone, Copy)]
pub struct ApproverInput {
    /// The approving user.
    pub approver_id: Uuid,
    /// Position in the approval chain; `None` for unsequenced rules.
    pub sequence: Option<i32>,
    /// Whether this approver must vote before any threshold can resolve.
    pub is_mandatory: bool,
}

/// A rule together with its configured approvers.
#[derive(Debug, Clone)]
pub struct RuleWithApprovers {
    /// The rule row.
    pub rule: approval_rules::Model,
    /// Approvers ordered by sequence, then insertion order.
    pub approvers: Vec<rule_approvers::Model>,
}

/// Repository for approval rule operations.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    db: DatabaseConnection,
}

impl RuleRepository {
    /// Creates a new rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new approval rule.
    ///
    /// # Errors
    ///
    /// Returns `RuleNameRequired` or `InvalidPercentage` on malformed
    /// input, or `Database` on persistence failure.
    pub async fn create_rule(
        &self,
        company_id: Uuid,
        input: CreateRuleInput,
    ) -> Result<approval_rules::Model, WorkflowError> {
        RuleValidator::validate_name(&input.name)?;
        RuleValidator::validate_percentage(input.min_approval_percentage)?;

        let now = Utc::now();
        let rule = approval_rules::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            name: Set(input.name),
            description: Set(input.description),
            is_manager_approver: Set(input.is_manager_approver),
            min_approval_percentage: Set(input.min_approval_percentage),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        rule.insert(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Replaces a rule's approver set (delete-then-insert).
    ///
    /// # Errors
    ///
    /// - `RuleNotFound` if the rule does not exist in this company.
    /// - `NoApproversConfigured`, `DuplicateApprover`, `MixedSequencing`
    ///   on a malformed replacement set.
    /// - `ApproverOutsideCompany` if any approver is not a user of the
    ///   rule's company.
    pub async fn replace_approvers(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
        approvers: Vec<ApproverInput>,
    ) -> Result<(), WorkflowError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        rule_in_company(&txn, company_id, rule_id).await?;

        let candidate_set: Vec<_> = approvers
            .iter()
            .map(|a| claimflow_core::workflow::PolicyApprover {
                approver_id: a.approver_id,
                sequence: a.sequence,
                is_mandatory: a.is_mandatory,
            })
            .collect();
        RuleValidator::validate_approvers(&candidate_set)?;

        let approver_ids: Vec<Uuid> = approvers.iter().map(|a| a.approver_id).collect();
        let known: Vec<Uuid> = users::Entity::find()
            .filter(users::Column::Id.is_in(approver_ids.clone()))
            .filter(users::Column::CompanyId.eq(company_id))
            .all(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .into_iter()
            .map(|u| u.id)
            .collect();
        if let Some(outsider) = approver_ids.iter().find(|id| !known.contains(id)) {
            return Err(WorkflowError::ApproverOutsideCompany(*outsider));
        }

        rule_approvers::Entity::delete_many()
            .filter(rule_approvers::Column::RuleId.eq(rule_id))
            .exec(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let now = Utc::now();
        for approver in &approvers {
            let row = rule_approvers::ActiveModel {
                id: Set(Uuid::now_v7()),
                rule_id: Set(rule_id),
                approver_id: Set(approver.approver_id),
                sequence: Set(approver.sequence),
                is_mandatory: Set(approver.is_mandatory),
                created_at: Set(now.into()),
            };
            row.insert(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        tracing::debug!(%rule_id, approvers = approvers.len(), "replaced rule approver set");
        Ok(())
    }

    /// Lists a company's rules with their embedded approvers.
    pub async fn list_rules(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<RuleWithApprovers>, WorkflowError> {
        let rules = approval_rules::Entity::find()
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .order_by_desc(approval_rules::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let mut result = Vec::with_capacity(rules.len());
        for rule in rules {
            let approvers = rule_approver_rows(&self.db, rule.id).await?;
            result.push(RuleWithApprovers { rule, approvers });
        }
        Ok(result)
    }

    /// Gets a single rule with its approvers.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` if the rule does not exist in this company.
    pub async fn get_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
    ) -> Result<RuleWithApprovers, WorkflowError> {
        let rule = rule_in_company(&self.db, company_id, rule_id).await?;
        let approvers = rule_approver_rows(&self.db, rule.id).await?;
        Ok(RuleWithApprovers { rule, approvers })
    }
}

// ============================================================================
// Shared helpers (also used by the expense repository)
// ============================================================================

/// Fetches a rule, requiring it to belong to `company_id`.
///
/// A rule in another company is indistinguishable from a missing one.
pub(crate) async fn rule_in_company<C: ConnectionTrait>(
    conn: &C,
    company_id: Uuid,
    rule_id: Uuid,
) -> Result<approval_rules::Model, WorkflowError> {
    approval_rules::Entity::find_by_id(rule_id)
        .filter(approval_rules::Column::CompanyId.eq(company_id))
        .one(conn)
        .await
        .map_err(|e| WorkflowError::Database(e.to_string()))?
        .ok_or(WorkflowError::RuleNotFound(rule_id))
}

/// Fetches a rule's approver rows ordered by sequence, then insertion order.
pub(crate) async fn rule_approver_rows<C: ConnectionTrait>(
    conn: &C,
    rule_id: Uuid,
) -> Result<Vec<rule_approvers::Model>, WorkflowError> {
    let mut rows = rule_approvers::Entity::find()
        .filter(rule_approvers::Column::RuleId.eq(rule_id))
        .all(conn)
        .await
        .map_err(|e| WorkflowError::Database(e.to_string()))?;

    rows.sort_by_key(|row| (row.sequence.unwrap_or(i32::MAX), row.id));
    Ok(rows)
}

/// Fetches a rule's approvers as core value types, in assignment order.
pub(crate) async fn rule_policy_approvers<C: ConnectionTrait>(
    conn: &C,
    rule_id: Uuid,
) -> Result<Vec<claimflow_core::workflow::PolicyApprover>, WorkflowError> {
    Ok(rule_approver_rows(conn, rule_id)
        .await?
        .iter()
        .map(policy_approver_of)
        .collect())
}
