//! Exeat entity model
//!
//! The central record of the system: one leave request per row, carrying
//! the status driven by [`crate::lifecycle`] and the audit trail of who
//! approved and who recorded the physical sign-out/sign-in events.

use super::school::Entity as School;
use super::student::Entity as Student;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored exeat status.
///
/// Overdueness is a derived property (`lifecycle::is_overdue`), never a
/// stored status value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ExeatStatus {
    /// Awaiting an approval decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Cleared to leave
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Denied; terminal
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Student has physically left the premises
    #[sea_orm(string_value = "signed_out")]
    SignedOut,
    /// Student has returned; terminal
    #[sea_orm(string_value = "signed_in")]
    SignedIn,
}

/// Exeat entity representing one leave request
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exeats")]
pub struct Model {
    /// Unique identifier for the exeat (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning school
    pub school_id: Uuid,

    /// Student the leave is requested for
    pub student_id: Uuid,

    /// Free-text reason for the leave
    pub reason: String,

    /// Requested departure time
    pub start_date: DateTimeWithTimeZone,

    /// Requested return time
    pub end_date: DateTimeWithTimeZone,

    /// Current lifecycle status
    pub status: ExeatStatus,

    /// Identity that approved the request; rejection records no actor
    pub approved_by: Option<Uuid>,

    /// Identity that recorded the physical departure
    pub signed_out_by: Option<Uuid>,

    /// When the physical departure was recorded
    pub signed_out_time: Option<DateTimeWithTimeZone>,

    /// Identity that recorded the physical return
    pub signed_in_by: Option<Uuid>,

    /// When the physical return was recorded
    pub signed_in_time: Option<DateTimeWithTimeZone>,

    /// Timestamp when the exeat was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the exeat was last updated
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
        belongs_to = "Student",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<School> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<Student> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
