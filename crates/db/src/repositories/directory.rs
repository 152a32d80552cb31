//! Directory lookups consumed by the workflow engine.
//!
//! The user directory is managed elsewhere; the engine only needs a few
//! narrow reads: who a user is, who their manager is, which company they
//! belong to, and which users report to a manager.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use claimflow_core::workflow::WorkflowError;

use crate::entities::users;

/// Read-only repository over the user directory.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    db: DatabaseConnection,
}

impl DirectoryRepository {
    /// Creates a new directory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns `EmployeeNotFound` if the user does not exist.
    pub async fn get_user(&self, user_id: Uuid) -> Result<users::Model, WorkflowError> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::EmployeeNotFound(user_id))
    }

    /// Returns the manager of a user, if one is assigned.
    pub async fn manager_of(&self, user_id: Uuid) -> Result<Option<Uuid>, WorkflowError> {
        Ok(self.get_user(user_id).await?.manager_id)
    }

    /// Returns the company a user belongs to.
    pub async fn company_of(&self, user_id: Uuid) -> Result<Uuid, WorkflowError> {
        Ok(self.get_user(user_id).await?.company_id)
    }

    /// Returns the ids of a manager's direct reports.
    pub async fn team_member_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>, WorkflowError> {
        let reports = users::Entity::find()
            .filter(users::Column::ManagerId.eq(manager_id))
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        Ok(reports.into_iter().map(|u| u.id).collect())
    }
}
