//! SecurityPerson entity model
//!
//! School-scoped security officer profile. Several officers may exist per
//! school; each backs exactly one user identity.

use super::school::Entity as School;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// SecurityPerson profile entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "security_people")]
pub struct Model {
    /// Unique identifier for the profile (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// School whose gate this officer staffs
    pub school_id: Uuid,

    /// Backing identity account
    pub user_id: Uuid,

    /// Full display name
    pub full_name: String,

    /// Contact phone number
    pub phone: Option<String>,

    /// Timestamp when the profile was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "School",
        from = "Column::SchoolId",
        to = "super::school::Column::Id"
    )]
    School,
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<School> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
