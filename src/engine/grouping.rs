use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::*;

/// One room's reservations for a day, earliest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLane {
    pub room: RoomId,
    pub reservations: Vec<Reservation>,
}

/// A day's reservations partitioned by room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    /// Configured rooms first, in configured order, then any unconfigured rooms
    /// found in the data.
    pub lanes: Vec<RoomLane>,
}

impl DaySchedule {
    pub fn lane(&self, room: &RoomId) -> Option<&RoomLane> {
        self.lanes.iter().find(|l| l.room == *room)
    }

    /// Total reservations across all lanes.
    pub fn len(&self) -> usize {
        self.lanes.iter().map(|l| l.reservations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(|l| l.reservations.is_empty())
    }
}

/// Group one day's reservations by room.
///
/// Every configured room gets a lane even when it has no reservations. Lanes are
/// ordered by start time; equal starts keep their input order.
pub fn group_by_room(reservations: &[Reservation], date: NaiveDate, rooms: &[RoomId]) -> DaySchedule {
    let mut lanes: Vec<RoomLane> = rooms
        .iter()
        .map(|room| RoomLane {
            room: room.clone(),
            reservations: Vec::new(),
        })
        .collect();

    for r in reservations.iter().filter(|r| r.fields.date == date) {
        match lanes.iter_mut().find(|l| l.room == r.fields.room) {
            Some(lane) => lane.reservations.push(r.clone()),
            None => {
                tracing::debug!(room = %r.fields.room, id = %r.id, "reservation for unconfigured room");
                lanes.push(RoomLane {
                    room: r.fields.room.clone(),
                    reservations: vec![r.clone()],
                });
            }
        }
    }

    for lane in &mut lanes {
        // stable: ties stay in input order
        lane.reservations.sort_by_key(|r| r.fields.span.start);
    }

    DaySchedule { date, lanes }
}

/// Multi-day overview: one [`DaySchedule`] per date present, dates ascending.
pub fn group_by_date(reservations: &[Reservation], rooms: &[RoomId]) -> Vec<DaySchedule> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Reservation>> = BTreeMap::new();
    for r in reservations {
        by_date.entry(r.fields.date).or_default().push(r.clone());
    }
    by_date
        .into_iter()
        .map(|(date, day)| group_by_room(&day, date, rooms))
        .collect()
}
