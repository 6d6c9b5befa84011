//! # Exeat Repository
//!
//! Exeat persistence: creation, visibility-scoped reads and the single
//! code path that applies lifecycle transitions with their audit side
//! effects.

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::access::{ExeatContext, Visibility};
use crate::error::RepositoryError;
use crate::lifecycle::{ExeatAction, next_status};
use crate::models::exeat::{self, Entity as Exeat, ExeatStatus};
use crate::models::student::Entity as Student;

/// Request data for creating a new exeat
#[derive(Debug, Clone)]
pub struct CreateExeatRequest {
    /// School the exeat is filed under; must match the student's school
    pub school_id: Uuid,
    /// Student the leave is requested for
    pub student_id: Uuid,
    /// Free-text reason
    pub reason: String,
    /// Requested departure time
    pub start_date: DateTime<Utc>,
    /// Requested return time; no ordering against `start_date` is enforced
    pub end_date: DateTime<Utc>,
}

/// Per-status counts for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub signed_out: u64,
    pub signed_in: u64,
}

/// Repository for Exeat database operations
pub struct ExeatRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ExeatRepository<'a> {
    /// Create a new ExeatRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// File a new exeat in `pending`.
    pub async fn create_exeat(
        &self,
        request: CreateExeatRequest,
    ) -> Result<exeat::Model, RepositoryError> {
        if request.reason.trim().is_empty() {
            return Err(RepositoryError::validation_error("Reason is required"));
        }

        let student = Student::find_by_id(request.student_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Student not found".to_string()))?;

        if student.school_id != request.school_id {
            return Err(RepositoryError::validation_error(
                "Student belongs to a different school",
            ));
        }

        let now = Utc::now();
        let active = exeat::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(request.school_id),
            student_id: Set(request.student_id),
            reason: Set(request.reason.trim().to_string()),
            start_date: Set(request.start_date.into()),
            end_date: Set(request.end_date.into()),
            status: Set(ExeatStatus::Pending),
            approved_by: Set(None),
            signed_out_by: Set(None),
            signed_out_time: Set(None),
            signed_in_by: Set(None),
            signed_in_time: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        active
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get exeat by ID
    pub async fn get_exeat_by_id(
        &self,
        exeat_id: Uuid,
    ) -> Result<Option<exeat::Model>, RepositoryError> {
        Exeat::find_by_id(exeat_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Build the authorization context for an exeat: which school it lives
    /// in and whose it is, including the student's current house.
    pub async fn context_for(
        &self,
        record: &exeat::Model,
    ) -> Result<ExeatContext, RepositoryError> {
        let student = Student::find_by_id(record.student_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Student not found".to_string()))?;

        Ok(ExeatContext {
            school_id: record.school_id,
            student_id: record.student_id,
            house_id: student.house_id,
        })
    }

    /// The authorization context for a prospective exeat, given the
    /// target student.
    pub async fn context_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<ExeatContext, RepositoryError> {
        let student = Student::find_by_id(student_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Student not found".to_string()))?;

        Ok(ExeatContext {
            school_id: student.school_id,
            student_id: student.id,
            house_id: student.house_id,
        })
    }

    /// List exeats within the caller's visibility scope, newest first,
    /// optionally narrowed to one status.
    pub async fn list_exeats(
        &self,
        visibility: Visibility,
        status: Option<ExeatStatus>,
    ) -> Result<Vec<exeat::Model>, RepositoryError> {
        let mut query = Exeat::find().filter(visibility.exeat_condition());
        if let Some(status) = status {
            query = query.filter(exeat::Column::Status.eq(status));
        }

        query
            .order_by_desc(exeat::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Exeats a gate officer acts on: approved (awaiting sign-out) and
    /// signed-out (awaiting sign-in), within the caller's scope.
    pub async fn list_gate_queue(
        &self,
        visibility: Visibility,
    ) -> Result<Vec<exeat::Model>, RepositoryError> {
        Exeat::find()
            .filter(visibility.exeat_condition())
            .filter(exeat::Column::Status.is_in([ExeatStatus::Approved, ExeatStatus::SignedOut]))
            .order_by_desc(exeat::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Apply a lifecycle action, recording the acting identity and the
    /// timestamps the transition table calls for. The caller has already
    /// passed the authorization gate.
    pub async fn apply_transition(
        &self,
        record: exeat::Model,
        actor_user_id: Uuid,
        action: ExeatAction,
        now: DateTime<Utc>,
    ) -> Result<exeat::Model, RepositoryError> {
        let target = next_status(record.status, action)?;

        let mut active = record.into_active_model();
        active.status = Set(target);
        match action {
            ExeatAction::Approve => {
                active.approved_by = Set(Some(actor_user_id));
            }
            // Rejection records no actor; the schema has no rejected_by.
            ExeatAction::Reject => {}
            ExeatAction::SignOut => {
                active.signed_out_by = Set(Some(actor_user_id));
                active.signed_out_time = Set(Some(now.into()));
            }
            ExeatAction::SignIn => {
                active.signed_in_by = Set(Some(actor_user_id));
                active.signed_in_time = Set(Some(now.into()));
            }
        }
        active.updated_at = Set(now.into());

        let updated = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        counter!("exeat_transitions_total", "action" => action.as_str()).increment(1);

        Ok(updated)
    }

    /// Per-status counts within the caller's visibility scope.
    pub async fn count_by_status(
        &self,
        visibility: Visibility,
    ) -> Result<StatusCounts, RepositoryError> {
        let count_for = |status: Option<ExeatStatus>| {
            let mut query = Exeat::find().filter(visibility.exeat_condition());
            if let Some(status) = status {
                query = query.filter(exeat::Column::Status.eq(status));
            }
            query.count(self.db)
        };

        Ok(StatusCounts {
            total: count_for(None)
                .await
                .map_err(RepositoryError::database_error)?,
            pending: count_for(Some(ExeatStatus::Pending))
                .await
                .map_err(RepositoryError::database_error)?,
            approved: count_for(Some(ExeatStatus::Approved))
                .await
                .map_err(RepositoryError::database_error)?,
            rejected: count_for(Some(ExeatStatus::Rejected))
                .await
                .map_err(RepositoryError::database_error)?,
            signed_out: count_for(Some(ExeatStatus::SignedOut))
                .await
                .map_err(RepositoryError::database_error)?,
            signed_in: count_for(Some(ExeatStatus::SignedIn))
                .await
                .map_err(RepositoryError::database_error)?,
        })
    }
}
