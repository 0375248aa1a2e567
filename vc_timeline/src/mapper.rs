//! Time/score to pixel mapping.

use serde::{Deserialize, Serialize};

use crate::model::{millis, Timestamp};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Content rectangle in CSS pixels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    /// Inset `css_size` by `padding`; width and height never drop below 1px.
    pub fn inset(css_size: (f64, f64), padding: &Padding) -> Self {
        let (width, height) = css_size;
        Self {
            left: padding.left,
            top: padding.top,
            width: sanitize_extent(width - padding.left - padding.right),
            height: sanitize_extent(height - padding.top - padding.bottom),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

/// Epoch-millisecond window plotted along x.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeDomain {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl TimeDomain {
    pub fn planned(start: Timestamp, planned_minutes: f64) -> Self {
        let start_ms = millis(&start);
        Self {
            start_ms,
            end_ms: start_ms + planned_minutes * 60_000.0,
        }
    }

    pub fn span_ms(&self) -> f64 {
        let span = self.end_ms - self.start_ms;
        if span.is_finite() && span > 0.0 {
            span
        } else {
            1.0
        }
    }

    pub fn span_minutes(&self) -> f64 {
        self.span_ms() / 60_000.0
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CoordinateMapper {
    pub rect: PlotRect,
    pub domain: TimeDomain,
    pub score_max: f64,
}

impl CoordinateMapper {
    pub fn new(rect: PlotRect, domain: TimeDomain, score_max: f64) -> Self {
        let score_max = if score_max.is_finite() && score_max > 0.0 {
            score_max
        } else {
            1.0
        };
        Self {
            rect,
            domain,
            score_max,
        }
    }

    /// Not clamped: times past the domain land beyond the content rect.
    pub fn x_of(&self, time_ms: f64) -> f64 {
        self.rect.left + (time_ms - self.domain.start_ms) / self.domain.span_ms() * self.rect.width
    }

    pub fn x_of_time(&self, time: &Timestamp) -> f64 {
        self.x_of(millis(time))
    }

    /// x for a minute offset from the domain start.
    pub fn x_of_minute(&self, minute: f64) -> f64 {
        self.x_of(self.domain.start_ms + minute * 60_000.0)
    }

    pub fn y_of(&self, score: f64) -> f64 {
        self.rect.top + (1.0 - score / self.score_max) * self.rect.height
    }

    pub fn time_of(&self, x: f64) -> f64 {
        self.domain.start_ms + (x - self.rect.left) / self.rect.width * self.domain.span_ms()
    }
}
