use crate::config::EngineConfig;
use crate::limits::MAX_NAME_LEN;
use crate::model::*;

use super::conflict::find_conflict;
use super::grid::TimeGrid;
use super::ValidationError;

/// Field rules that do not depend on other reservations.
pub(crate) fn validate_fields(
    candidate: &ReservationFields,
    config: &EngineConfig,
    grid: &TimeGrid,
) -> Result<(), ValidationError> {
    let name = candidate.requester_name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingRequesterName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong("requester name"));
    }

    let guest = candidate.guest_name.as_deref().map(str::trim).unwrap_or("");
    if candidate.purpose == Purpose::Visitor && config.require_guest_for_visitor && guest.is_empty()
    {
        return Err(ValidationError::MissingGuestName);
    }
    if guest.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong("guest name"));
    }

    if !config.has_room(&candidate.room) {
        return Err(ValidationError::UnknownRoom(candidate.room.clone()));
    }
    if !config.has_department(&candidate.department) {
        return Err(ValidationError::UnknownDepartment(candidate.department.clone()));
    }
    if !candidate.guest_count.is_valid() {
        return Err(ValidationError::InvalidGuestCount(candidate.guest_count));
    }

    let span = candidate.span;
    if !span.is_valid() {
        return Err(ValidationError::InvalidInterval {
            start: span.start,
            end: span.end,
        });
    }
    if !grid.contains(&span) {
        return Err(ValidationError::OutsideWindow {
            span,
            window: grid.window(),
        });
    }
    for time in [span.start, span.end] {
        if !grid.is_on_grid(time) {
            return Err(ValidationError::OffGrid {
                time,
                step_minutes: grid.step_minutes(),
            });
        }
    }
    Ok(())
}

/// Full check of a candidate against the current day's reservations.
pub fn validate(
    candidate: &ReservationFields,
    snapshot: &Snapshot,
    self_id: Option<ReservationId>,
    config: &EngineConfig,
    grid: &TimeGrid,
) -> Result<(), ValidationError> {
    validate_fields(candidate, config, grid)?;

    if snapshot.date != candidate.date {
        return Err(ValidationError::SnapshotDateMismatch {
            candidate: candidate.date,
            snapshot: snapshot.date,
        });
    }
    if let Some(existing) = find_conflict(
        candidate,
        &snapshot.reservations,
        self_id,
        config.conflict_scope,
    ) {
        return Err(ValidationError::Conflict { with: existing.id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ulid::Ulid;

    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig {
            rooms: vec![RoomId::from("A"), RoomId::from("B")],
            ..EngineConfig::default()
        }
    }

    fn candidate(room: &str, start: &str, end: &str) -> ReservationFields {
        ReservationFields {
            date: day(),
            room: room.into(),
            requester_name: "Sato".into(),
            department: "General Affairs".into(),
            purpose: Purpose::Meeting,
            guest_name: None,
            guest_count: GuestCount::Exact(4),
            span: Span::new(t(start), t(end)),
        }
    }

    fn check(c: &ReservationFields, snapshot: &Snapshot) -> Result<(), ValidationError> {
        let config = config();
        let grid = config.grid().unwrap();
        validate(c, snapshot, None, &config, &grid)
    }

    #[test]
    fn scenario_room_a_rejected_room_b_accepted() {
        let existing = Reservation::new(Ulid::new(), candidate("A", "09:00", "10:00"));
        let snapshot = Snapshot::new(day(), 1, vec![existing.clone()]);

        let same_room = candidate("A", "09:30", "10:30");
        assert_eq!(
            check(&same_room, &snapshot),
            Err(ValidationError::Conflict { with: existing.id })
        );

        let other_room = candidate("B", "09:30", "10:30");
        assert_eq!(check(&other_room, &snapshot), Ok(()));
    }

    #[test]
    fn inverted_interval_rejected_before_conflicts() {
        let existing = Reservation::new(Ulid::new(), candidate("A", "09:00", "10:00"));
        let snapshot = Snapshot::new(day(), 1, vec![existing]);
        let c = candidate("A", "10:00", "09:00");
        assert_eq!(
            check(&c, &snapshot),
            Err(ValidationError::InvalidInterval {
                start: t("10:00"),
                end: t("09:00"),
            })
        );
        let zero = candidate("B", "10:00", "10:00");
        assert!(matches!(
            check(&zero, &Snapshot::empty(day())),
            Err(ValidationError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn required_fields() {
        let empty = Snapshot::empty(day());
        let mut c = candidate("A", "09:00", "10:00");
        c.requester_name = "   ".into();
        assert_eq!(check(&c, &empty), Err(ValidationError::MissingRequesterName));

        let mut visitor = candidate("A", "09:00", "10:00");
        visitor.purpose = Purpose::Visitor;
        assert_eq!(check(&visitor, &empty), Err(ValidationError::MissingGuestName));
        visitor.guest_name = Some("Acme Corp".into());
        assert_eq!(check(&visitor, &empty), Ok(()));
    }

    #[test]
    fn guest_requirement_can_be_relaxed() {
        let config = EngineConfig {
            require_guest_for_visitor: false,
            ..config()
        };
        let grid = config.grid().unwrap();
        let mut visitor = candidate("A", "09:00", "10:00");
        visitor.purpose = Purpose::Visitor;
        assert_eq!(
            validate(&visitor, &Snapshot::empty(day()), None, &config, &grid),
            Ok(())
        );
    }

    #[test]
    fn window_and_grid_bounds() {
        let empty = Snapshot::empty(day());
        assert!(matches!(
            check(&candidate("A", "07:30", "08:30"), &empty),
            Err(ValidationError::OutsideWindow { .. })
        ));
        assert!(matches!(
            check(&candidate("A", "17:30", "18:30"), &empty),
            Err(ValidationError::OutsideWindow { .. })
        ));
        assert_eq!(
            check(&candidate("A", "09:15", "10:00"), &empty),
            Err(ValidationError::OffGrid {
                time: t("09:15"),
                step_minutes: 30,
            })
        );
        assert_eq!(check(&candidate("A", "08:00", "18:00"), &empty), Ok(()));
    }

    #[test]
    fn unknown_room_and_department() {
        let empty = Snapshot::empty(day());
        assert_eq!(
            check(&candidate("Z", "09:00", "10:00"), &empty),
            Err(ValidationError::UnknownRoom(RoomId::from("Z")))
        );
        let mut c = candidate("A", "09:00", "10:00");
        c.department = "Sales".into();
        assert_eq!(
            check(&c, &empty),
            Err(ValidationError::UnknownDepartment("Sales".into()))
        );
    }

    #[test]
    fn guest_count_and_name_limits() {
        let empty = Snapshot::empty(day());
        let mut c = candidate("A", "09:00", "10:00");
        c.guest_count = GuestCount::Exact(0);
        assert_eq!(
            check(&c, &empty),
            Err(ValidationError::InvalidGuestCount(GuestCount::Exact(0)))
        );

        let mut c = candidate("A", "09:00", "10:00");
        c.requester_name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            check(&c, &empty),
            Err(ValidationError::NameTooLong("requester name"))
        );
    }

    #[test]
    fn snapshot_for_other_day_rejected() {
        let other = Snapshot::empty(day().succ_opt().unwrap());
        assert!(matches!(
            check(&candidate("A", "09:00", "10:00"), &other),
            Err(ValidationError::SnapshotDateMismatch { .. })
        ));
    }

    #[test]
    fn editing_unchanged_interval_passes() {
        let config = config();
        let grid = config.grid().unwrap();
        let me = Reservation::new(Ulid::new(), candidate("A", "09:00", "10:00"));
        let snapshot = Snapshot::new(day(), 2, vec![me.clone()]);
        assert_eq!(
            validate(&me.fields, &snapshot, Some(me.id), &config, &grid),
            Ok(())
        );
        assert!(validate(&me.fields, &snapshot, None, &config, &grid).is_err());
    }

    #[test]
    fn rejection_reasons_read_well() {
        let e = ValidationError::InvalidInterval {
            start: t("10:00"),
            end: t("09:00"),
        };
        assert_eq!(e.to_string(), "end time 09:00 must be after start time 10:00");
    }
}
