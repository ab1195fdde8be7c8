use crate::config::ConfigError;
use crate::limits::MIN_STEP_MINUTES;
use crate::model::*;

/// Operating window discretized into fixed-width slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    open: TimeOfDay,
    close: TimeOfDay,
    step: u16,
}

impl TimeGrid {
    pub fn new(open: TimeOfDay, close: TimeOfDay, step_minutes: u16) -> Result<Self, ConfigError> {
        if step_minutes < MIN_STEP_MINUTES {
            return Err(ConfigError::InvalidStep(step_minutes));
        }
        if open >= close {
            return Err(ConfigError::EmptyWindow { open, close });
        }
        let window_minutes = close.minutes() - open.minutes();
        if window_minutes % step_minutes != 0 {
            return Err(ConfigError::StepMisaligned {
                step: step_minutes,
                window_minutes,
            });
        }
        Ok(Self {
            open,
            close,
            step: step_minutes,
        })
    }

    pub fn open(&self) -> TimeOfDay {
        self.open
    }

    pub fn close(&self) -> TimeOfDay {
        self.close
    }

    pub fn step_minutes(&self) -> u16 {
        self.step
    }

    pub fn window(&self) -> Span {
        Span::new(self.open, self.close)
    }

    /// Number of slots between open and close.
    pub fn slot_count(&self) -> usize {
        usize::from((self.close.minutes() - self.open.minutes()) / self.step)
    }

    /// Every slot boundary from open to close, both ends included.
    pub fn boundaries(&self) -> Vec<TimeOfDay> {
        (self.open.minutes()..=self.close.minutes())
            .step_by(usize::from(self.step))
            .filter_map(TimeOfDay::from_minutes)
            .collect()
    }

    /// Boundaries a reservation may start at (everything but the closing bound).
    pub fn start_options(&self) -> Vec<TimeOfDay> {
        let mut times = self.boundaries();
        times.pop();
        times
    }

    /// Boundaries a reservation may end at (everything but the opening bound).
    pub fn end_options(&self) -> Vec<TimeOfDay> {
        let mut times = self.boundaries();
        times.remove(0);
        times
    }

    pub fn is_on_grid(&self, t: TimeOfDay) -> bool {
        self.open <= t && t <= self.close && (t.minutes() - self.open.minutes()) % self.step == 0
    }

    pub fn contains(&self, span: &Span) -> bool {
        self.window().contains_span(span)
    }
}
