use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::model::*;
use crate::observability::{self, rejection_label};
use crate::store::ReservationStore;

use super::{BookingEngine, SessionError};

/// Which persisted reservation, if any, the form is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(ReservationId),
}

impl EditSession {
    pub fn editing_id(&self) -> Option<ReservationId> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing(id) => Some(*id),
        }
    }
}

/// Working values of the booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationForm {
    pub date: NaiveDate,
    pub requester_name: String,
    pub department: String,
    pub purpose: Purpose,
    pub guest_name: String,
    pub guest_count: GuestCount,
    pub room: RoomId,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl ReservationForm {
    /// Blank form for `date` with the configured defaults.
    pub fn new(date: NaiveDate, config: &EngineConfig) -> Self {
        Self {
            date,
            requester_name: String::new(),
            department: config
                .departments
                .first()
                .map(|d| d.name.clone())
                .unwrap_or_default(),
            purpose: Purpose::default(),
            guest_name: String::new(),
            guest_count: GuestCount::default(),
            room: config
                .rooms
                .first()
                .cloned()
                .unwrap_or_else(|| RoomId(String::new())),
            start: config.default_start,
            end: config.default_end,
        }
    }

    pub fn load(&mut self, r: &Reservation) {
        let f = &r.fields;
        self.date = f.date;
        self.requester_name = f.requester_name.clone();
        self.department = f.department.clone();
        self.purpose = f.purpose;
        self.guest_name = f.guest_name.clone().unwrap_or_default();
        self.guest_count = f.guest_count;
        self.room = f.room.clone();
        self.start = f.span.start;
        self.end = f.span.end;
    }

    /// Candidate built from the form. The guest name is kept only for visitors.
    pub fn to_fields(&self) -> ReservationFields {
        let guest = self.guest_name.trim();
        ReservationFields {
            date: self.date,
            room: self.room.clone(),
            requester_name: self.requester_name.trim().to_string(),
            department: self.department.clone(),
            purpose: self.purpose,
            guest_name: (self.purpose == Purpose::Visitor && !guest.is_empty())
                .then(|| guest.to_string()),
            guest_count: self.guest_count,
            span: Span::new(self.start, self.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(ReservationId),
    Updated(ReservationId),
}

impl SaveOutcome {
    pub fn id(&self) -> ReservationId {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => *id,
        }
    }
}

/// Drives the booking form: create, edit, cancel, delete.
///
/// Mutating calls take `&mut self`, so one coordinator never has two
/// mutations in flight. Failures leave session and form as they were.
pub struct EditCoordinator<S> {
    engine: Arc<BookingEngine>,
    store: Arc<S>,
    session: EditSession,
    form: ReservationForm,
}

impl<S: ReservationStore> EditCoordinator<S> {
    pub fn new(engine: Arc<BookingEngine>, store: Arc<S>, date: NaiveDate) -> Self {
        let form = engine.new_form(date);
        Self {
            engine,
            store,
            session: EditSession::Idle,
            form,
        }
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    pub fn is_editing(&self, id: &ReservationId) -> bool {
        self.session.editing_id() == Some(*id)
    }

    pub fn form(&self) -> &ReservationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReservationForm {
        &mut self.form
    }

    /// Start editing `r`, replacing any edit already in progress.
    pub fn begin_edit(&mut self, r: &Reservation) {
        if let EditSession::Editing(previous) = self.session
            && previous != r.id
        {
            debug!(%previous, next = %r.id, "switching edit target");
        }
        self.session = EditSession::Editing(r.id);
        self.form.load(r);
    }

    pub fn cancel(&mut self) {
        self.session = EditSession::Idle;
        self.form = self.engine.new_form(self.form.date);
    }

    /// Move the form to another day. Any edit in progress is abandoned.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.form.date = date;
        self.cancel();
    }

    /// Validate the form against `snapshot` and persist it.
    ///
    /// Idle creates a new reservation; editing replaces the edited one.
    pub async fn save(&mut self, snapshot: &Snapshot) -> Result<SaveOutcome, SessionError> {
        let candidate = self.form.to_fields();
        let self_id = self.session.editing_id();
        let op = if self_id.is_some() { "update" } else { "create" };

        if let Err(e) = self.engine.validate(&candidate, snapshot, self_id) {
            metrics::counter!(observability::REJECTIONS_TOTAL, "reason" => rejection_label(&e))
                .increment(1);
            debug!(op, reason = %e, "reservation rejected");
            return Err(e.into());
        }

        let result = match self_id {
            None => self.store.create(candidate).await.map(SaveOutcome::Created),
            Some(id) => self
                .store
                .update(id, candidate)
                .await
                .map(|()| SaveOutcome::Updated(id)),
        };

        match result {
            Ok(outcome) => {
                metrics::counter!(observability::SAVES_TOTAL, "op" => op, "status" => "ok")
                    .increment(1);
                info!(op, id = %outcome.id(), date = %self.form.date, room = %self.form.room, "reservation saved");
                self.cancel();
                Ok(outcome)
            }
            Err(e) => {
                metrics::counter!(observability::SAVES_TOTAL, "op" => op, "status" => "error")
                    .increment(1);
                metrics::counter!(observability::STORE_FAILURES_TOTAL, "op" => op).increment(1);
                warn!(op, error = %e, "saving reservation failed");
                Err(e.into())
            }
        }
    }

    /// Delete a reservation. The caller has already confirmed with the user.
    pub async fn delete(&mut self, id: ReservationId) -> Result<(), SessionError> {
        if let Err(e) = self.store.delete(id).await {
            metrics::counter!(observability::STORE_FAILURES_TOTAL, "op" => "delete").increment(1);
            warn!(%id, error = %e, "deleting reservation failed");
            return Err(e.into());
        }
        metrics::counter!(observability::DELETES_TOTAL).increment(1);
        info!(%id, "reservation deleted");
        if self.is_editing(&id) {
            self.cancel();
        }
        Ok(())
    }
}
