//! User entity model
//!
//! This module contains the SeaORM entity model for the users table, the
//! identity account behind every role profile, plus the role enumeration
//! resolved into an [`crate::access::Actor`] at authentication time.

use super::school::Entity as School;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role tag carried by every identity account
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Student requesting exeats
    #[sea_orm(string_value = "student")]
    Student,
    /// Staff member supervising one house
    #[sea_orm(string_value = "house_supervisor")]
    HouseSupervisor,
    /// Security officer recording sign-out/sign-in events
    #[sea_orm(string_value = "security")]
    Security,
    /// School-scoped administrator
    #[sea_orm(string_value = "sub_admin")]
    SubAdmin,
    /// Global administrator
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User entity representing an identity account
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning school; null only for global administrators
    pub school_id: Option<Uuid>,

    /// Login name, unique across the deployment
    pub username: String,

    /// E-mail address, unique across the deployment
    pub email: String,

    /// Salted credential digest
    pub password_hash: String,

    /// Role tag for this identity
    pub role: UserRole,

    /// Outstanding one-time passcode, if a password reset is in flight
    pub otp_code: Option<String>,

    /// When the passcode was issued; validity is computed from this on
    /// every check rather than expired proactively
    pub otp_issued_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the user was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the user was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "School",
        from = "Column::SchoolId",
        to = "super::school::Column::Id"
    )]
    School,
}

impl Related<School> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
