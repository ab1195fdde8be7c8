use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Store-assigned reservation identifier.
pub type ReservationId = Ulid;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Time of day as minutes since midnight. Parses and prints zero-padded `HH:MM`.
///
/// Ordering is numeric, so sorting never depends on how the value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from hour and minute. Panics on out-of-range input; use
    /// [`TimeOfDay::from_minutes`] or [`TimeOfDay::parse`] for untrusted values.
    pub const fn hm(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60, "time of day out of range");
        Self(hour * 60 + minute)
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn is_full_hour(self) -> bool {
        self.minute() == 0
    }

    pub fn parse(s: &str) -> Result<Self, ParseTimeError> {
        let err = || ParseTimeError(s.to_string());
        let b = s.as_bytes();
        if b.len() != 5 || b[2] != b':' {
            return Err(err());
        }
        let digit = |c: u8| c.is_ascii_digit().then(|| u16::from(c - b'0')).ok_or_else(err);
        let hour = digit(b[0])? * 10 + digit(b[1])?;
        let minute = digit(b[3])? * 10 + digit(b[4])?;
        if hour > 23 || minute > 59 {
            return Err(err());
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeError(pub String);

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time of day {:?}: expected zero-padded HH:MM", self.0)
    }
}

impl std::error::Error for ParseTimeError {}

/// Half-open interval `[start, end)`.
///
/// Not checked on construction: form input may be inverted and is rejected by
/// validation, not by a panic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "startTime")]
    pub start: TimeOfDay,
    #[serde(rename = "endTime")]
    pub end: TimeOfDay,
}

impl Span {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Strict intersection: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A bookable room, identified by its configured name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Purpose {
    #[default]
    Meeting,
    /// External guest; requires a guest (company) name.
    Visitor,
    Consultation,
    Interview,
    Other,
}

impl Purpose {
    pub const ALL: [Purpose; 5] = [
        Purpose::Meeting,
        Purpose::Visitor,
        Purpose::Consultation,
        Purpose::Interview,
        Purpose::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Meeting => "Meeting",
            Purpose::Visitor => "Visitor",
            Purpose::Consultation => "Consultation",
            Purpose::Interview => "Interview",
            Purpose::Other => "Other",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head count as offered by the booking form: 1 through 9, or "10+".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GuestCount {
    Exact(u8),
    TenOrMore,
}

impl GuestCount {
    pub const MAX_EXACT: u8 = 9;

    pub fn options() -> Vec<GuestCount> {
        (1..=Self::MAX_EXACT)
            .map(GuestCount::Exact)
            .chain(std::iter::once(GuestCount::TenOrMore))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        match self {
            GuestCount::Exact(n) => (1..=Self::MAX_EXACT).contains(n),
            GuestCount::TenOrMore => true,
        }
    }
}

impl Default for GuestCount {
    fn default() -> Self {
        GuestCount::Exact(1)
    }
}

impl fmt::Display for GuestCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestCount::Exact(n) => write!(f, "{n}"),
            GuestCount::TenOrMore => f.write_str("10+"),
        }
    }
}

impl TryFrom<String> for GuestCount {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "10+" {
            return Ok(GuestCount::TenOrMore);
        }
        match s.parse::<u8>() {
            Ok(n) if (1..=Self::MAX_EXACT).contains(&n) => Ok(GuestCount::Exact(n)),
            _ => Err(format!("invalid guest count: {s:?}")),
        }
    }
}

impl From<GuestCount> for String {
    fn from(c: GuestCount) -> Self {
        c.to_string()
    }
}

/// Every field of a reservation except its id. Candidates are built from this;
/// updates replace all of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFields {
    pub date: NaiveDate,
    pub room: RoomId,
    pub requester_name: String,
    pub department: String,
    pub purpose: Purpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    pub guest_count: GuestCount,
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(flatten)]
    pub fields: ReservationFields,
}

impl Reservation {
    pub fn new(id: ReservationId, fields: ReservationFields) -> Self {
        Self { id, fields }
    }

    pub fn span(&self) -> Span {
        self.fields.span
    }

    pub fn room(&self) -> &RoomId {
        &self.fields.room
    }

    pub fn date(&self) -> NaiveDate {
        self.fields.date
    }
}

/// Full set of reservations for one date as of a store revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub revision: u64,
    /// Sorted by start time, ties by id.
    pub reservations: Vec<Reservation>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, revision: u64, mut reservations: Vec<Reservation>) -> Self {
        reservations.sort_by(|a, b| {
            a.fields
                .span
                .start
                .cmp(&b.fields.span.start)
                .then(a.id.cmp(&b.id))
        });
        Self {
            date,
            revision,
            reservations,
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            revision: 0,
            reservations: Vec::new(),
        }
    }

    pub fn get(&self, id: &ReservationId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == *id)
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}
