//! # School Repository
//!
//! This module contains the repository implementation for School entities,
//! providing CRUD operations for tenant management. Deleting a school
//! cascades through the database to everything it owns.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::school::{self, Entity as School};

/// Request data for creating a new school
#[derive(Debug, Clone)]
pub struct CreateSchoolRequest {
    /// Display name, unique across the deployment
    pub name: String,
    /// Short code, unique across the deployment
    pub code: String,
    /// Contact e-mail for the school office
    pub contact_email: String,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

/// Repository for School database operations
pub struct SchoolRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SchoolRepository<'a> {
    /// Create a new SchoolRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new school
    pub async fn create_school(
        &self,
        request: CreateSchoolRequest,
    ) -> Result<school::Model, RepositoryError> {
        let name = request.name.trim().to_string();
        let code = request.code.trim().to_string();

        if name.is_empty() {
            return Err(RepositoryError::validation_error(
                "School name cannot be empty",
            ));
        }
        if code.is_empty() {
            return Err(RepositoryError::validation_error(
                "School code cannot be empty",
            ));
        }
        if request.contact_email.trim().is_empty() || !request.contact_email.contains('@') {
            return Err(RepositoryError::validation_error(
                "A valid contact e-mail is required",
            ));
        }

        let clash = School::find()
            .filter(
                Condition::any()
                    .add(school::Column::Name.eq(name.clone()))
                    .add(school::Column::Code.eq(code.clone())),
            )
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if let Some(existing) = clash {
            let field = if existing.name == name { "name" } else { "code" };
            return Err(RepositoryError::DuplicateEntity(format!(
                "A school with this {} already exists",
                field
            )));
        }

        let now = Utc::now();
        let school = school::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            code: Set(code),
            contact_email: Set(request.contact_email.trim().to_string()),
            contact_phone: Set(request.contact_phone),
            address: Set(request.address),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        school
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get school by ID
    pub async fn get_school_by_id(
        &self,
        school_id: Uuid,
    ) -> Result<Option<school::Model>, RepositoryError> {
        School::find_by_id(school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all schools ordered by name
    pub async fn list_schools(&self) -> Result<Vec<school::Model>, RepositoryError> {
        School::find()
            .order_by_asc(school::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a school, cascading to everything it owns
    pub async fn delete_school(&self, school_id: Uuid) -> Result<(), RepositoryError> {
        let school = School::find_by_id(school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("School not found".to_string()))?;

        school
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Check if a school exists
    pub async fn school_exists(&self, school_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.get_school_by_id(school_id).await?.is_some())
    }
}
