use crate::config::ConflictScope;
use crate::model::*;

/// True if `candidate` collides with any reservation in `existing`.
///
/// The reservation whose id equals `self_id` is skipped, so an edit never
/// collides with its own persisted state.
pub fn has_conflict(
    candidate: &ReservationFields,
    existing: &[Reservation],
    self_id: Option<ReservationId>,
    scope: ConflictScope,
) -> bool {
    find_conflict(candidate, existing, self_id, scope).is_some()
}

/// First reservation in `existing` that blocks `candidate`, if any.
pub fn find_conflict<'a>(
    candidate: &ReservationFields,
    existing: &'a [Reservation],
    self_id: Option<ReservationId>,
    scope: ConflictScope,
) -> Option<&'a Reservation> {
    existing
        .iter()
        .filter(|r| Some(r.id) != self_id)
        .find(|r| {
            shares_partition(candidate, &r.fields, scope) && candidate.span.overlaps(&r.fields.span)
        })
}

fn shares_partition(a: &ReservationFields, b: &ReservationFields, scope: ConflictScope) -> bool {
    if a.date != b.date {
        return false;
    }
    match scope {
        ConflictScope::Room => a.room == b.room,
        ConflictScope::RoomOrRequester => {
            a.room == b.room || a.requester_name.trim() == b.requester_name.trim()
        }
    }
}
