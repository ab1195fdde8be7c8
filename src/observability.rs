use crate::engine::ValidationError;

// ── Mutations ────────────────────────────────────────────────────

/// Counter: save attempts that reached the store. Labels: op, status.
pub const SAVES_TOTAL: &str = "roomtide_saves_total";

/// Counter: candidates refused before any store call. Labels: reason.
pub const REJECTIONS_TOTAL: &str = "roomtide_rejections_total";

/// Counter: failed store calls. Labels: op.
pub const STORE_FAILURES_TOTAL: &str = "roomtide_store_failures_total";

/// Counter: reservations deleted.
pub const DELETES_TOTAL: &str = "roomtide_deletes_total";

// ── Live feed ────────────────────────────────────────────────────

/// Counter: snapshots applied to a live schedule.
pub const SNAPSHOTS_APPLIED_TOTAL: &str = "roomtide_snapshots_applied_total";

/// Counter: snapshots dropped as stale or for the wrong date.
pub const SNAPSHOTS_STALE_TOTAL: &str = "roomtide_snapshots_stale_total";

/// Gauge: open store subscriptions.
pub const SUBSCRIBERS_ACTIVE: &str = "roomtide_subscribers_active";

/// Map a rejection to a short label for metrics.
pub fn rejection_label(e: &ValidationError) -> &'static str {
    match e {
        ValidationError::MissingRequesterName => "missing_requester",
        ValidationError::MissingGuestName => "missing_guest",
        ValidationError::NameTooLong(_) => "name_too_long",
        ValidationError::UnknownRoom(_) => "unknown_room",
        ValidationError::UnknownDepartment(_) => "unknown_department",
        ValidationError::InvalidGuestCount(_) => "invalid_guest_count",
        ValidationError::InvalidInterval { .. } => "invalid_interval",
        ValidationError::OutsideWindow { .. } => "outside_window",
        ValidationError::OffGrid { .. } => "off_grid",
        ValidationError::SnapshotDateMismatch { .. } => "date_mismatch",
        ValidationError::Conflict { .. } => "conflict",
    }
}
