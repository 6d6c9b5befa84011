//! HouseSupervisor entity model
//!
//! Staff profile owning approval authority over one house's students. The
//! school is reached transitively through the house. At most one supervisor
//! exists per house, enforced by a unique index.

use super::house::Entity as House;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// HouseSupervisor profile entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "house_supervisors")]
pub struct Model {
    /// Unique identifier for the profile (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// House this supervisor is responsible for
    pub house_id: Uuid,

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
