use chrono::NaiveDate;

use crate::model::*;
use crate::store::StoreError;

/// Why a candidate reservation was refused. Raised before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingRequesterName,
    MissingGuestName,
    NameTooLong(&'static str),
    UnknownRoom(RoomId),
    UnknownDepartment(String),
    InvalidGuestCount(GuestCount),
    InvalidInterval {
        start: TimeOfDay,
        end: TimeOfDay,
    },
    OutsideWindow {
        span: Span,
        window: Span,
    },
    OffGrid {
        time: TimeOfDay,
        step_minutes: u16,
    },
    /// The conflict set handed in belongs to another day.
    SnapshotDateMismatch {
        candidate: NaiveDate,
        snapshot: NaiveDate,
    },
    Conflict {
        with: ReservationId,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingRequesterName => write!(f, "requester name is required"),
            ValidationError::MissingGuestName => {
                write!(f, "guest name is required for visitor reservations")
            }
            ValidationError::NameTooLong(field) => write!(f, "{field} is too long"),
            ValidationError::UnknownRoom(room) => write!(f, "unknown room: {room}"),
            ValidationError::UnknownDepartment(name) => write!(f, "unknown department: {name}"),
            ValidationError::InvalidGuestCount(count) => {
                write!(f, "invalid guest count: {count}")
            }
            ValidationError::InvalidInterval { start, end } => {
                write!(f, "end time {end} must be after start time {start}")
            }
            ValidationError::OutsideWindow { span, window } => {
                write!(f, "reservation {span} is outside operating hours {window}")
            }
            ValidationError::OffGrid { time, step_minutes } => {
                write!(f, "{time} is not on the {step_minutes}-minute grid")
            }
            ValidationError::SnapshotDateMismatch {
                candidate,
                snapshot,
            } => write!(
                f,
                "reservations for {candidate} are not loaded (have {snapshot})"
            ),
            ValidationError::Conflict { with } => {
                write!(f, "the room is already reserved for this time ({with})")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure of an edit-session operation. Session and form are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Validation(ValidationError),
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Validation(e) => write!(f, "rejected: {e}"),
            SessionError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Validation(e) => Some(e),
            SessionError::Store(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(e: ValidationError) -> Self {
        SessionError::Validation(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}
