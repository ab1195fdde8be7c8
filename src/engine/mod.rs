mod conflict;
mod error;
mod grid;
mod grouping;
mod session;
mod timeline;
mod validation;

pub use conflict::{find_conflict, has_conflict};
pub use error::{SessionError, ValidationError};
pub use grid::TimeGrid;
pub use grouping::{DaySchedule, RoomLane, group_by_date, group_by_room};
pub use session::{EditCoordinator, EditSession, ReservationForm, SaveOutcome};
pub use timeline::{Gridline, Projection, Timeline, project};
pub use validation::validate;

use chrono::NaiveDate;

use crate::config::{ConfigError, EngineConfig};
use crate::model::*;

/// A validated configuration together with its time grid and timeline.
///
/// Everything here is synchronous and side-effect free; the reservation set is
/// always passed in by the caller.
#[derive(Debug, Clone)]
pub struct BookingEngine {
    config: EngineConfig,
    grid: TimeGrid,
    timeline: Timeline,
}

impl BookingEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid()?;
        let timeline = Timeline::new(grid.open(), grid.close())?;
        tracing::debug!(
            open = %grid.open(),
            close = %grid.close(),
            step = grid.step_minutes(),
            rooms = config.rooms.len(),
            "booking engine ready"
        );
        Ok(Self {
            config,
            grid,
            timeline,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn new_form(&self, date: NaiveDate) -> ReservationForm {
        ReservationForm::new(date, &self.config)
    }

    pub fn validate(
        &self,
        candidate: &ReservationFields,
        snapshot: &Snapshot,
        self_id: Option<ReservationId>,
    ) -> Result<(), ValidationError> {
        validate(candidate, snapshot, self_id, &self.config, &self.grid)
    }

    pub fn has_conflict(
        &self,
        candidate: &ReservationFields,
        existing: &[Reservation],
        self_id: Option<ReservationId>,
    ) -> bool {
        has_conflict(candidate, existing, self_id, self.config.conflict_scope)
    }

    /// The snapshot's day, one lane per configured room.
    pub fn day_schedule(&self, snapshot: &Snapshot) -> DaySchedule {
        group_by_room(&snapshot.reservations, snapshot.date, &self.config.rooms)
    }

    pub fn overview(&self, reservations: &[Reservation]) -> Vec<DaySchedule> {
        group_by_date(reservations, &self.config.rooms)
    }

    pub fn project(&self, span: &Span) -> Projection {
        self.timeline.project(span)
    }
}
