//! # House Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::house::{self, Entity as House};
use crate::models::school::Entity as School;

/// Request data for creating a new house
#[derive(Debug, Clone)]
pub struct CreateHouseRequest {
    /// Owning school
    pub school_id: Uuid,
    /// House name, unique within the school
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
}

/// Repository for House database operations
pub struct HouseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> HouseRepository<'a> {
    /// Create a new HouseRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new house within a school
    pub async fn create_house(
        &self,
        request: CreateHouseRequest,
    ) -> Result<house::Model, RepositoryError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(RepositoryError::validation_error(
                "House name cannot be empty",
            ));
        }

        School::find_by_id(request.school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("School not found".to_string()))?;

        let clash = House::find()
            .filter(house::Column::SchoolId.eq(request.school_id))
            .filter(house::Column::Name.eq(name.clone()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if clash.is_some() {
            return Err(RepositoryError::DuplicateEntity(format!(
                "House '{}' already exists in this school",
                name
            )));
        }

        let now = Utc::now();
        let house = house::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(request.school_id),
            name: Set(name),
            description: Set(request.description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        house
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get house by ID
    pub async fn get_house_by_id(
        &self,
        house_id: Uuid,
    ) -> Result<Option<house::Model>, RepositoryError> {
        House::find_by_id(house_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List the houses of one school ordered by name
    pub async fn list_by_school(
        &self,
        school_id: Uuid,
    ) -> Result<Vec<house::Model>, RepositoryError> {
        House::find()
            .filter(house::Column::SchoolId.eq(school_id))
            .order_by_asc(house::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List every house ordered by name
    pub async fn list_all(&self) -> Result<Vec<house::Model>, RepositoryError> {
        House::find()
            .order_by_asc(house::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
