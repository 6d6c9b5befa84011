//! School entity model
//!
//! This module contains the SeaORM entity model for the schools table, the
//! tenant root that owns houses, students, staff profiles and exeats.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// School entity representing one tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    /// Unique identifier for the school (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name, unique across the deployment
    pub name: String,

    /// Short school code, unique across the deployment
    pub code: String,

    /// Contact e-mail address for the school office
    pub contact_email: String,

    /// Contact phone number
    pub contact_phone: Option<String>,

    /// Postal address
    pub address: Option<String>,

    /// Timestamp when the school was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the school was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
