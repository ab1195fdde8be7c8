//! Hard limits on configuration and form input.

/// Max length of a requester or guest name, in bytes.
pub const MAX_NAME_LEN: usize = 100;

/// Max length of a room or department name, in bytes.
pub const MAX_LABEL_LEN: usize = 64;

/// Max number of configured rooms.
pub const MAX_ROOMS: usize = 64;

/// Max number of configured departments.
pub const MAX_DEPARTMENTS: usize = 64;

/// Finest supported slot step, in minutes.
pub const MIN_STEP_MINUTES: u16 = 5;
