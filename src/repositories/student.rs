//! # Student Repository
//!
//! Student roster access. Creating a student provisions the backing
//! identity account in the same transaction, so either both rows exist or
//! neither does.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::access::Visibility;
use crate::error::RepositoryError;
use crate::models::house::Entity as House;
use crate::models::school::Entity as School;
use crate::models::student::{self, Entity as Student};
use crate::models::user::{self, UserRole};
use crate::repositories::identity::{CreateIdentityRequest, create_identity_on, generate_password};

/// Request data for enrolling a new student
#[derive(Debug, Clone)]
pub struct CreateStudentRequest {
    /// Owning school
    pub school_id: Uuid,
    /// Assigned house, if any
    pub house_id: Option<Uuid>,
    /// School-issued reference number, unique within the school
    pub student_ref: String,
    /// Full display name
    pub full_name: String,
    /// E-mail for the backing identity account
    pub email: String,
    /// Guardian contact name
    pub guardian_name: Option<String>,
    /// Guardian contact phone number
    pub guardian_phone: Option<String>,
}

/// A freshly enrolled student together with the provisioned credentials
#[derive(Debug, Clone)]
pub struct EnrolledStudent {
    /// The student row
    pub student: student::Model,
    /// The backing identity account
    pub account: user::Model,
    /// Generated initial password, for one-time delivery to the student
    pub password: String,
}

/// Repository for Student database operations
pub struct StudentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StudentRepository<'a> {
    /// Create a new StudentRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enroll a student: identity account plus student row in one
    /// transaction. The login name is derived from the reference number,
    /// prefixed with the school code since references are only unique
    /// within their school.
    pub async fn create_student(
        &self,
        request: CreateStudentRequest,
    ) -> Result<EnrolledStudent, RepositoryError> {
        let student_ref = request.student_ref.trim().to_string();
        let full_name = request.full_name.trim().to_string();

        if student_ref.is_empty() {
            return Err(RepositoryError::validation_error(
                "Student reference cannot be empty",
            ));
        }
        if full_name.is_empty() {
            return Err(RepositoryError::validation_error(
                "Student name cannot be empty",
            ));
        }

        let school = School::find_by_id(request.school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("School not found".to_string()))?;

        if let Some(house_id) = request.house_id {
            let house = House::find_by_id(house_id)
                .one(self.db)
                .await
                .map_err(RepositoryError::database_error)?
                .ok_or_else(|| RepositoryError::NotFound("House not found".to_string()))?;
            if house.school_id != request.school_id {
                return Err(RepositoryError::validation_error(
                    "House belongs to a different school",
                ));
            }
        }

        let clash = Student::find()
            .filter(student::Column::SchoolId.eq(request.school_id))
            .filter(student::Column::StudentRef.eq(student_ref.clone()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if clash.is_some() {
            return Err(RepositoryError::DuplicateEntity(format!(
                "Student reference '{}' is already taken in this school",
                student_ref
            )));
        }

        let password = generate_password();

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let username = format!("{}-{}", school.code, student_ref).to_lowercase();
        let account = match create_identity_on(
            &txn,
            CreateIdentityRequest {
                username,
                email: request.email.clone(),
                password: password.clone(),
                role: UserRole::Student,
                school_id: Some(request.school_id),
            },
        )
        .await
        {
            Ok(account) => account,
            Err(err) => {
                txn.rollback()
                    .await
                    .map_err(RepositoryError::database_error)?;
                return Err(err);
            }
        };

        let now = Utc::now();
        let active = student::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(request.school_id),
            house_id: Set(request.house_id),
            user_id: Set(account.id),
            student_ref: Set(student_ref),
            full_name: Set(full_name),
            guardian_name: Set(request.guardian_name),
            guardian_phone: Set(request.guardian_phone),
            photo_path: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let student = match active.insert(&txn).await {
            Ok(student) => student,
            Err(err) => {
                txn.rollback()
                    .await
                    .map_err(RepositoryError::database_error)?;
                return Err(RepositoryError::database_error(err));
            }
        };

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(EnrolledStudent {
            student,
            account,
            password,
        })
    }

    /// Get student by ID
    pub async fn get_student_by_id(
        &self,
        student_id: Uuid,
    ) -> Result<Option<student::Model>, RepositoryError> {
        Student::find_by_id(student_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Find the student backing a user identity
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<student::Model>, RepositoryError> {
        Student::find()
            .filter(student::Column::UserId.eq(user_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List students within the caller's visibility scope
    pub async fn list_students(
        &self,
        visibility: Visibility,
    ) -> Result<Vec<student::Model>, RepositoryError> {
        Student::find()
            .filter(visibility.student_condition())
            .order_by_asc(student::Column::FullName)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Record the photo reference on a student row
    pub async fn set_photo(
        &self,
        student_id: Uuid,
        reference: String,
    ) -> Result<student::Model, RepositoryError> {
        let student = Student::find_by_id(student_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Student not found".to_string()))?;

        let mut active = student.into_active_model();
        active.photo_path = Set(Some(reference));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
