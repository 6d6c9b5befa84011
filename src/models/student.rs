//! Student entity model
//!
//! One row per enrolled student, one-to-one with a user identity. The
//! `student_ref` number is unique within the owning school only.

use super::house::Entity as House;
use super::school::Entity as School;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Student entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning school
    pub school_id: Uuid,

    /// Assigned house, if any
    pub house_id: Option<Uuid>,

    /// Backing identity account
    pub user_id: Uuid,

    /// School-issued student reference number, unique within the school
    pub student_ref: String,

    /// Full display name
    pub full_name: String,

    /// Guardian contact name
    pub guardian_name: Option<String>,

    /// Guardian contact phone number
    pub guardian_phone: Option<String>,

    /// Reference into the photo store, if a photo has been uploaded
    pub photo_path: Option<String>,

    /// Timestamp when the student was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the student was last updated
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
    #[sea_orm(
        belongs_to = "House",
        from = "Column::HouseId",
        to = "super::house::Column::Id"
    )]
    House,
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

impl Related<House> for Entity {
    fn to() -> RelationDef {
        Relation::House.def()
    }
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
