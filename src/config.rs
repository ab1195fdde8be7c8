use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::TimeGrid;
use crate::limits::*;
use crate::model::{RoomId, TimeOfDay};

/// Which reservations share a conflict partition with a candidate on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Same room only.
    #[default]
    Room,
    /// Same room, or same requester in any room.
    RoomOrRequester,
}

impl std::str::FromStr for ConflictScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "room" => Ok(Self::Room),
            "room_or_requester" => Ok(Self::RoomOrRequester),
            other => Err(ConfigError::Source(format!("unknown conflict scope: {other}"))),
        }
    }
}

/// A department and its legend color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSpec {
    pub name: String,
    /// CSS-style color used for the department legend and timeline bars.
    pub color: String,
}

impl DepartmentSpec {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Opening bound of the operating window.
    pub open: TimeOfDay,
    /// Closing bound; a reservation may end here but not start here.
    ///
    /// Times of day stop at `23:59`, so a window cannot close at midnight
    /// (`24:00`); such a value is rejected when the config is read.
    pub close: TimeOfDay,
    pub step_minutes: u16,
    pub rooms: Vec<RoomId>,
    pub departments: Vec<DepartmentSpec>,
    pub conflict_scope: ConflictScope,
    pub require_guest_for_visitor: bool,
    pub default_start: TimeOfDay,
    pub default_end: TimeOfDay,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            open: TimeOfDay::hm(8, 0),
            close: TimeOfDay::hm(18, 0),
            step_minutes: 30,
            rooms: vec![
                RoomId::from("Conference Room"),
                RoomId::from("Reception Room"),
                RoomId::from("Spare 1"),
                RoomId::from("Spare 2"),
            ],
            departments: vec![
                DepartmentSpec::new("Manufacturing", "#3b82f6"),
                DepartmentSpec::new("Ceramics", "#10b981"),
                DepartmentSpec::new("General Affairs", "#f59e0b"),
                DepartmentSpec::new("Executives", "#8b5cf6"),
                DepartmentSpec::new("Other", "#6b7280"),
            ],
            conflict_scope: ConflictScope::Room,
            require_guest_for_visitor: true,
            default_start: TimeOfDay::hm(9, 0),
            default_end: TimeOfDay::hm(9, 30),
        }
    }
}

impl EngineConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Source(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment.
    ///
    /// `ROOMTIDE_CONFIG` names a JSON file to start from (defaults otherwise);
    /// `ROOMTIDE_OPEN`, `ROOMTIDE_CLOSE`, `ROOMTIDE_STEP_MINUTES` and
    /// `ROOMTIDE_CONFLICT_SCOPE` override single fields.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match lookup("ROOMTIDE_CONFIG") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Source(format!("{path}: {e}")))?;
                serde_json::from_str(&raw)
                    .map_err(|e| ConfigError::Source(format!("{path}: {e}")))?
            }
            None => Self::default(),
        };

        let time = |key: &str| -> Result<Option<TimeOfDay>, ConfigError> {
            lookup(key)
                .map(|v| TimeOfDay::parse(&v).map_err(|e| ConfigError::Source(format!("{key}: {e}"))))
                .transpose()
        };
        if let Some(open) = time("ROOMTIDE_OPEN")? {
            config.open = open;
        }
        if let Some(close) = time("ROOMTIDE_CLOSE")? {
            config.close = close;
        }
        if let Some(step) = lookup("ROOMTIDE_STEP_MINUTES") {
            config.step_minutes = step
                .parse()
                .map_err(|_| ConfigError::Source(format!("ROOMTIDE_STEP_MINUTES: {step:?}")))?;
        }
        if let Some(scope) = lookup("ROOMTIDE_CONFLICT_SCOPE") {
            config.conflict_scope = scope.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn grid(&self) -> Result<TimeGrid, ConfigError> {
        TimeGrid::new(self.open, self.close, self.step_minutes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid()?;

        if self.rooms.is_empty() {
            return Err(ConfigError::NoRooms);
        }
        if self.rooms.len() > MAX_ROOMS {
            return Err(ConfigError::LimitExceeded("too many rooms"));
        }
        let mut seen = HashSet::new();
        for room in &self.rooms {
            if room.as_str().trim().is_empty() || room.as_str().len() > MAX_LABEL_LEN {
                return Err(ConfigError::LimitExceeded("room name empty or too long"));
            }
            if !seen.insert(room) {
                return Err(ConfigError::DuplicateRoom(room.clone()));
            }
        }

        if self.departments.is_empty() {
            return Err(ConfigError::NoDepartments);
        }
        if self.departments.len() > MAX_DEPARTMENTS {
            return Err(ConfigError::LimitExceeded("too many departments"));
        }
        let mut seen = HashSet::new();
        for dept in &self.departments {
            if dept.name.trim().is_empty() || dept.name.len() > MAX_LABEL_LEN {
                return Err(ConfigError::LimitExceeded("department name empty or too long"));
            }
            if !seen.insert(dept.name.as_str()) {
                return Err(ConfigError::DuplicateDepartment(dept.name.clone()));
            }
        }

        if self.default_start >= self.default_end
            || !grid.is_on_grid(self.default_start)
            || !grid.is_on_grid(self.default_end)
        {
            return Err(ConfigError::InvalidDefaults {
                start: self.default_start,
                end: self.default_end,
            });
        }
        Ok(())
    }

    pub fn has_room(&self, room: &RoomId) -> bool {
        self.rooms.contains(room)
    }

    pub fn has_department(&self, name: &str) -> bool {
        self.departments.iter().any(|d| d.name == name)
    }

    pub fn department_color(&self, name: &str) -> Option<&str> {
        self.departments
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.color.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Window has no extent (`close <= open`).
    EmptyWindow { open: TimeOfDay, close: TimeOfDay },
    InvalidStep(u16),
    StepMisaligned { step: u16, window_minutes: u16 },
    NoRooms,
    NoDepartments,
    DuplicateRoom(RoomId),
    DuplicateDepartment(String),
    InvalidDefaults { start: TimeOfDay, end: TimeOfDay },
    LimitExceeded(&'static str),
    /// Config file, JSON or environment value could not be read.
    Source(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyWindow { open, close } => {
                write!(f, "operating window {open}-{close} is empty")
            }
            ConfigError::InvalidStep(step) => write!(
                f,
                "slot step {step} is invalid: must be at least {MIN_STEP_MINUTES} minutes"
            ),
            ConfigError::StepMisaligned {
                step,
                window_minutes,
            } => write!(
                f,
                "slot step {step} does not divide the {window_minutes}-minute window"
            ),
            ConfigError::NoRooms => write!(f, "no rooms configured"),
            ConfigError::NoDepartments => write!(f, "no departments configured"),
            ConfigError::DuplicateRoom(room) => write!(f, "duplicate room: {room}"),
            ConfigError::DuplicateDepartment(name) => write!(f, "duplicate department: {name}"),
            ConfigError::InvalidDefaults { start, end } => {
                write!(f, "default interval {start}-{end} is not a valid slot range")
            }
            ConfigError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            ConfigError::Source(e) => write!(f, "config source error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
