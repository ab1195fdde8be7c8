use crate::config::ConfigError;
use crate::model::*;

use super::grid::TimeGrid;

/// Horizontal placement of an interval, as fractions of the window width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub offset: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gridline {
    pub time: TimeOfDay,
    pub offset: f64,
    /// Full hour (drawn stronger and labeled).
    pub major: bool,
}

/// Maps times of day onto `[0, 1]` across a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Timeline {
    pub fn new(window_start: TimeOfDay, window_end: TimeOfDay) -> Result<Self, ConfigError> {
        if window_end <= window_start {
            return Err(ConfigError::EmptyWindow {
                open: window_start,
                close: window_end,
            });
        }
        Ok(Self {
            start: window_start,
            end: window_end,
        })
    }

    fn total(&self) -> f64 {
        f64::from(self.end.minutes() - self.start.minutes())
    }

    fn fraction(&self, t: TimeOfDay) -> f64 {
        (f64::from(t.minutes()) - f64::from(self.start.minutes())) / self.total()
    }

    /// No clipping: a span outside the window yields fractions outside `[0, 1]`.
    pub fn project(&self, span: &Span) -> Projection {
        Projection {
            offset: self.fraction(span.start),
            width: (f64::from(span.end.minutes()) - f64::from(span.start.minutes())) / self.total(),
        }
    }

    pub fn gridlines(&self, grid: &TimeGrid) -> Vec<Gridline> {
        grid.boundaries()
            .into_iter()
            .map(|time| Gridline {
                time,
                offset: self.fraction(time),
                major: time.is_full_hour(),
            })
            .collect()
    }

    /// Every full hour from window start to end, inclusive, with its offset.
    pub fn hour_labels(&self) -> Vec<(TimeOfDay, f64)> {
        let first = self.start.minutes().div_ceil(60) * 60;
        (first..=self.end.minutes())
            .step_by(60)
            .filter_map(TimeOfDay::from_minutes)
            .map(|t| (t, self.fraction(t)))
            .collect()
    }
}

/// One-shot projection. Fails when the window has no extent.
pub fn project(
    span: &Span,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
) -> Result<Projection, ConfigError> {
    Ok(Timeline::new(window_start, window_end)?.project(span))
}
