//! # Staff Repository
//!
//! Role profile provisioning: sub-admins, house supervisors and security
//! officers. Each creation writes the identity account and the profile row
//! in one transaction; the one-per-school and one-per-house invariants are
//! checked up front and backstopped by unique indexes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::house::{self, Entity as House};
use crate::models::house_supervisor::{self, Entity as HouseSupervisor};
use crate::models::school::Entity as School;
use crate::models::security_person::{self, Entity as SecurityPerson};
use crate::models::sub_admin::{self, Entity as SubAdmin};
use crate::models::user::{self, UserRole};
use crate::repositories::identity::{CreateIdentityRequest, create_identity_on, generate_password};

/// Request data for provisioning a staff profile
#[derive(Debug, Clone)]
pub struct CreateStaffRequest {
    /// School (sub-admin, security) or house (supervisor) the profile is
    /// scoped to
    pub scope_id: Uuid,
    /// Login name for the backing identity account
    pub username: String,
    /// E-mail for the backing identity account
    pub email: String,
    /// Full display name
    pub full_name: String,
    /// Contact phone number
    pub phone: Option<String>,
}

/// A provisioned staff member together with the generated credentials
#[derive(Debug, Clone)]
pub struct ProvisionedStaff<P> {
    /// The profile row
    pub profile: P,
    /// The backing identity account
    pub account: user::Model,
    /// Generated initial password, for one-time delivery
    pub password: String,
}

/// Repository for staff profile operations
pub struct StaffRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StaffRepository<'a> {
    /// Create a new StaffRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    fn validate(request: &CreateStaffRequest) -> Result<(), RepositoryError> {
        if request.full_name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Staff name cannot be empty",
            ));
        }
        Ok(())
    }

    /// Provision the sub-admin of a school. At most one may exist.
    pub async fn create_sub_admin(
        &self,
        request: CreateStaffRequest,
    ) -> Result<ProvisionedStaff<sub_admin::Model>, RepositoryError> {
        Self::validate(&request)?;

        let school_id = request.scope_id;
        School::find_by_id(school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("School not found".to_string()))?;

        let existing = SubAdmin::find()
            .filter(sub_admin::Column::SchoolId.eq(school_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Err(RepositoryError::DuplicateEntity(
                "This school already has a sub-admin".to_string(),
            ));
        }

        let password = generate_password();
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let account = match Self::identity_in(
            &txn,
            &request,
            password.clone(),
            UserRole::SubAdmin,
            Some(school_id),
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
        let active = sub_admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(school_id),
            user_id: Set(account.id),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(request.phone),
            created_at: Set(now.into()),
        };

        let profile = match active.insert(&txn).await {
            Ok(profile) => profile,
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

        Ok(ProvisionedStaff {
            profile,
            account,
            password,
        })
    }

    /// Provision the supervisor of a house. At most one may exist.
    pub async fn create_house_supervisor(
        &self,
        request: CreateStaffRequest,
    ) -> Result<ProvisionedStaff<house_supervisor::Model>, RepositoryError> {
        Self::validate(&request)?;

        let house_id = request.scope_id;
        let house = House::find_by_id(house_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("House not found".to_string()))?;

        let existing = HouseSupervisor::find()
            .filter(house_supervisor::Column::HouseId.eq(house_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Err(RepositoryError::DuplicateEntity(
                "This house already has a supervisor".to_string(),
            ));
        }

        let password = generate_password();
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let account = match Self::identity_in(
            &txn,
            &request,
            password.clone(),
            UserRole::HouseSupervisor,
            Some(house.school_id),
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
        let active = house_supervisor::ActiveModel {
            id: Set(Uuid::new_v4()),
            house_id: Set(house_id),
            user_id: Set(account.id),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(request.phone),
            created_at: Set(now.into()),
        };

        let profile = match active.insert(&txn).await {
            Ok(profile) => profile,
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

        Ok(ProvisionedStaff {
            profile,
            account,
            password,
        })
    }

    /// Provision a security officer for a school.
    pub async fn create_security_person(
        &self,
        request: CreateStaffRequest,
    ) -> Result<ProvisionedStaff<security_person::Model>, RepositoryError> {
        Self::validate(&request)?;

        let school_id = request.scope_id;
        School::find_by_id(school_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("School not found".to_string()))?;

        let password = generate_password();
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let account = match Self::identity_in(
            &txn,
            &request,
            password.clone(),
            UserRole::Security,
            Some(school_id),
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
        let active = security_person::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(school_id),
            user_id: Set(account.id),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(request.phone),
            created_at: Set(now.into()),
        };

        let profile = match active.insert(&txn).await {
            Ok(profile) => profile,
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

        Ok(ProvisionedStaff {
            profile,
            account,
            password,
        })
    }

    /// The sub-admin of a school, if provisioned
    pub async fn sub_admin_of_school(
        &self,
        school_id: Uuid,
    ) -> Result<Option<sub_admin::Model>, RepositoryError> {
        SubAdmin::find()
            .filter(sub_admin::Column::SchoolId.eq(school_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// The supervisor of a house, if provisioned
    pub async fn supervisor_of_house(
        &self,
        house_id: Uuid,
    ) -> Result<Option<house_supervisor::Model>, RepositoryError> {
        HouseSupervisor::find()
            .filter(house_supervisor::Column::HouseId.eq(house_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// The security officers of a school
    pub async fn security_of_school(
        &self,
        school_id: Uuid,
    ) -> Result<Vec<security_person::Model>, RepositoryError> {
        SecurityPerson::find()
            .filter(security_person::Column::SchoolId.eq(school_id))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// The house a supervisor profile points at
    pub async fn house_of_supervisor(
        &self,
        profile: &house_supervisor::Model,
    ) -> Result<Option<house::Model>, RepositoryError> {
        House::find_by_id(profile.house_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn identity_in(
        txn: &DatabaseTransaction,
        request: &CreateStaffRequest,
        password: String,
        role: UserRole,
        school_id: Option<Uuid>,
    ) -> Result<user::Model, RepositoryError> {
        create_identity_on(
            txn,
            CreateIdentityRequest {
                username: request.username.clone(),
                email: request.email.clone(),
                password,
                role,
                school_id,
            },
        )
        .await
    }
}
