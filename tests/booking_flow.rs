use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;

use roomtide::engine::{EditSession, SaveOutcome};
use roomtide::model::*;
use roomtide::{
    BookingEngine, EditCoordinator, EngineConfig, InMemoryStore, LiveSchedule, ReservationStore,
    SessionError, ValidationError,
};

// ── Test infrastructure ──────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

struct Harness {
    engine: Arc<BookingEngine>,
    store: Arc<InMemoryStore>,
    live: Arc<LiveSchedule>,
    changes: watch::Receiver<Arc<Snapshot>>,
}

impl Harness {
    async fn start() -> Self {
        init_tracing();
        let config = EngineConfig {
            rooms: vec![RoomId::from("A"), RoomId::from("B")],
            ..EngineConfig::default()
        };
        let engine = Arc::new(BookingEngine::new(config).unwrap());
        let store = Arc::new(InMemoryStore::new());
        let live = Arc::new(LiveSchedule::new(day()));
        let mut changes = live.watch();

        let sub = store.subscribe(day()).await.unwrap();
        let follower = live.clone();
        tokio::spawn(async move { follower.follow(sub).await });
        wait_for_change(&mut changes).await; // initial snapshot

        Self {
            engine,
            store,
            live,
            changes,
        }
    }

    fn coordinator(&self) -> EditCoordinator<InMemoryStore> {
        EditCoordinator::new(self.engine.clone(), self.store.clone(), day())
    }

    /// Wait until the live schedule has caught up with the store.
    async fn settle(&mut self) -> Arc<Snapshot> {
        let target = self.store.revision();
        while self.live.current().revision < target {
            wait_for_change(&mut self.changes).await;
        }
        self.live.current()
    }
}

async fn wait_for_change(rx: &mut watch::Receiver<Arc<Snapshot>>) {
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("timed out waiting for snapshot")
        .expect("live schedule dropped");
}

fn fill(c: &mut EditCoordinator<InMemoryStore>, who: &str, room: &str, start: &str, end: &str) {
    let form = c.form_mut();
    form.requester_name = who.into();
    form.room = room.into();
    form.start = t(start);
    form.end = t(end);
}

// ── Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn booking_day_end_to_end() {
    let mut h = Harness::start().await;
    let mut c = h.coordinator();

    // first booking
    fill(&mut c, "Sato", "A", "09:00", "10:00");
    let snapshot = h.settle().await;
    let first = c.save(&snapshot).await.unwrap();

    // overlapping booking in the same room is refused
    let snapshot = h.settle().await;
    fill(&mut c, "Ito", "A", "09:30", "10:30");
    let refused = c.save(&snapshot).await;
    assert_eq!(
        refused,
        Err(SessionError::Validation(ValidationError::Conflict { with: first.id() }))
    );

    // same time in the other room is fine
    c.form_mut().room = "B".into();
    let second = c.save(&snapshot).await.unwrap();

    let snapshot = h.settle().await;
    let schedule = h.engine.day_schedule(&snapshot);
    assert_eq!(schedule.lanes.len(), 2);
    assert_eq!(schedule.lane(&RoomId::from("A")).unwrap().reservations[0].id, first.id());
    assert_eq!(schedule.lane(&RoomId::from("B")).unwrap().reservations[0].id, second.id());

    // timeline bar for the first booking: 09:00-10:00 on 08:00-18:00
    let bar = h.engine.project(&snapshot.get(&first.id()).unwrap().span());
    assert!((bar.offset - 0.1).abs() < 1e-12);
    assert!((bar.width - 0.1).abs() < 1e-12);
}

#[tokio::test]
async fn edit_flow_through_live_feed() {
    let mut h = Harness::start().await;
    let mut c = h.coordinator();

    fill(&mut c, "Sato", "A", "09:00", "10:00");
    let snapshot = h.settle().await;
    let id = c.save(&snapshot).await.unwrap().id();

    // pick it from the live view and extend it
    let snapshot = h.settle().await;
    let current = snapshot.get(&id).unwrap().clone();
    c.begin_edit(&current);
    c.form_mut().end = t("11:00");
    assert_eq!(c.save(&snapshot).await, Ok(SaveOutcome::Updated(id)));
    assert_eq!(c.session(), EditSession::Idle);

    let snapshot = h.settle().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.reservations[0].span(), Span::new(t("09:00"), t("11:00")));

    // delete while editing ends the session and empties the day
    c.begin_edit(&snapshot.reservations[0]);
    c.delete(id).await.unwrap();
    assert_eq!(c.session(), EditSession::Idle);
    let snapshot = h.settle().await;
    assert!(snapshot.is_empty());
    assert!(h.engine.day_schedule(&snapshot).is_empty());
}

#[tokio::test]
async fn persisted_reservations_never_overlap() {
    let mut h = Harness::start().await;
    let mut c = h.coordinator();

    // (room, start, end, accepted)
    let attempts = [
        ("A", "08:00", "09:00", true),
        ("A", "08:30", "09:30", false),
        ("A", "09:00", "10:00", true),
        ("B", "08:00", "12:00", true),
        ("B", "11:30", "12:30", false),
        ("A", "09:30", "11:00", false),
        ("B", "12:00", "13:00", true),
        ("A", "17:30", "18:00", true),
    ];
    for (i, (room, start, end, accepted)) in attempts.into_iter().enumerate() {
        let snapshot = h.settle().await;
        fill(&mut c, &format!("user-{i}"), room, start, end);
        // rejected attempts keep the form; the next fill overwrites it
        let result = c.save(&snapshot).await;
        if accepted {
            assert!(
                matches!(result, Ok(SaveOutcome::Created(_))),
                "{room} {start}-{end}: {result:?}"
            );
        } else {
            assert!(
                matches!(
                    result,
                    Err(SessionError::Validation(ValidationError::Conflict { .. }))
                ),
                "{room} {start}-{end}: {result:?}"
            );
        }
    }

    let snapshot = h.settle().await;
    assert_eq!(snapshot.len(), 5);
    for (i, a) in snapshot.reservations.iter().enumerate() {
        for b in &snapshot.reservations[i + 1..] {
            if a.room() == b.room() {
                assert!(!a.span().overlaps(&b.span()), "{} overlaps {}", a.span(), b.span());
            }
        }
    }
}
