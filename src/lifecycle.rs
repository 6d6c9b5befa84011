//! # Exeat Lifecycle
//!
//! The state machine governing a leave request from creation through
//! approval, physical sign-out and sign-in. [`next_status`] is the single
//! transition authority; repositories and handlers never mutate the status
//! column any other way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::exeat::ExeatStatus;

/// Requested lifecycle action on an exeat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExeatAction {
    /// Grant the leave request
    Approve,
    /// Deny the leave request
    Reject,
    /// Record the student physically leaving
    SignOut,
    /// Record the student physically returning
    SignIn,
}

impl ExeatAction {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ExeatAction::Approve => "approve",
            ExeatAction::Reject => "reject",
            ExeatAction::SignOut => "sign_out",
            ExeatAction::SignIn => "sign_in",
        }
    }
}

/// Error returned when an action is not legal from the current status
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {} an exeat in status {}", .action.as_str(), status_label(.status))]
pub struct InvalidTransition {
    /// Status the exeat was in when the action arrived
    pub status: ExeatStatus,
    /// Action that was attempted
    pub action: ExeatAction,
}

fn status_label(status: &ExeatStatus) -> &'static str {
    match status {
        ExeatStatus::Pending => "pending",
        ExeatStatus::Approved => "approved",
        ExeatStatus::Rejected => "rejected",
        ExeatStatus::SignedOut => "signed_out",
        ExeatStatus::SignedIn => "signed_in",
    }
}

/// Computes the status an exeat moves to when `action` is applied in
/// `current`, or fails if the edge is not in the transition table.
///
/// `rejected` and `signed_in` are terminal; nothing leaves them.
pub fn next_status(
    current: ExeatStatus,
    action: ExeatAction,
) -> Result<ExeatStatus, InvalidTransition> {
    match (current, action) {
        (ExeatStatus::Pending, ExeatAction::Approve) => Ok(ExeatStatus::Approved),
        (ExeatStatus::Pending, ExeatAction::Reject) => Ok(ExeatStatus::Rejected),
        (ExeatStatus::Approved, ExeatAction::SignOut) => Ok(ExeatStatus::SignedOut),
        (ExeatStatus::SignedOut, ExeatAction::SignIn) => Ok(ExeatStatus::SignedIn),
        (status, action) => Err(InvalidTransition { status, action }),
    }
}

/// Whether an exeat counts as overdue at `now`.
///
/// True exactly when the student is still out past the requested return
/// time. Never true for any other status, no matter the timestamps; the
/// value is recomputed on every read and never stored.
pub fn is_overdue(status: ExeatStatus, end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    status == ExeatStatus::SignedOut && now > end_date
}
