//! Room reservation engine: conflict detection, day grouping, timeline
//! projection and edit sessions on top of a live reservation store.

pub mod config;
pub mod engine;
pub mod limits;
pub mod live;
pub mod model;
pub mod notify;
pub mod observability;
pub mod store;

pub use config::{ConfigError, ConflictScope, EngineConfig};
pub use engine::{BookingEngine, EditCoordinator, EditSession, SessionError, ValidationError};
pub use live::LiveSchedule;
pub use model::{Reservation, ReservationFields, ReservationId, RoomId, Snapshot, Span, TimeOfDay};
pub use store::{InMemoryStore, ReservationStore, StoreError, Subscription};
