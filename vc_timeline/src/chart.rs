//! Per-chart mutable state: size, domain and series visibility.

use serde::{Deserialize, Serialize};

use crate::config::ChartConfig;
use crate::mapper::{CoordinateMapper, Padding, PlotRect, TimeDomain};
use crate::model::{is_plannable, ContestBundle, MedalCutoffs, Timestamp};

/// Which series a toggle refers to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Total,
    Problem(u32),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeriesVisibility {
    total: bool,
    problems: Vec<bool>,
}

impl SeriesVisibility {
    pub fn all_visible(problem_count: u32) -> Self {
        Self {
            total: true,
            problems: vec![true; problem_count as usize],
        }
    }

    pub fn is_visible(&self, key: SeriesKey) -> bool {
        match key {
            SeriesKey::Total => self.total,
            SeriesKey::Problem(index) => self
                .slot(index)
                .map(|slot| self.problems[slot])
                .unwrap_or(false),
        }
    }

    /// Flip one toggle; returns `false` for an unknown problem.
    pub fn toggle(&mut self, key: SeriesKey) -> bool {
        let current = self.is_visible(key);
        self.set(key, !current)
    }

    pub fn set(&mut self, key: SeriesKey, visible: bool) -> bool {
        match key {
            SeriesKey::Total => {
                self.total = visible;
                true
            }
            SeriesKey::Problem(index) => match self.slot(index) {
                Some(slot) => {
                    self.problems[slot] = visible;
                    true
                }
                None => false,
            },
        }
    }

    pub fn problem_count(&self) -> u32 {
        self.problems.len() as u32
    }

    fn slot(&self, problem_index: u32) -> Option<usize> {
        problem_index
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < self.problems.len())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartState {
    pub pixel_ratio: f64,
    pub css_size: (f64, f64),
    pub padding: Padding,
    pub start: Timestamp,
    /// Planned duration; `None` when missing or non-positive.
    pub planned_minutes: Option<f64>,
    pub max_score: f64,
    pub visibility: SeriesVisibility,
    pub cutoffs: Option<MedalCutoffs>,
}

impl ChartState {
    pub fn new(
        start: Timestamp,
        planned_minutes: Option<f64>,
        problem_count: u32,
        max_score: f64,
        padding: Padding,
    ) -> Self {
        Self {
            pixel_ratio: 1.0,
            css_size: (0.0, 0.0),
            padding,
            start,
            planned_minutes: planned_minutes.filter(|m| is_plannable(*m)),
            max_score,
            visibility: SeriesVisibility::all_visible(problem_count),
            cutoffs: None,
        }
    }

    /// Score chart state for a contest, with medal cutoffs when known.
    pub fn for_scores(bundle: &ContestBundle, config: &ChartConfig) -> Self {
        let mut state = Self::new(
            bundle.contest.started_at,
            bundle.meta.planned_minutes(),
            bundle.problem_count(),
            bundle.max_score(),
            config.padding,
        );
        state.cutoffs = bundle.cutoffs();
        state
    }

    pub fn for_timeline(bundle: &ContestBundle, config: &ChartConfig) -> Self {
        Self::new(
            bundle.contest.started_at,
            bundle.meta.planned_minutes(),
            bundle.problem_count(),
            bundle.max_score(),
            config.timeline_padding,
        )
    }

    pub fn with_cutoffs(mut self, cutoffs: Option<MedalCutoffs>) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    /// Returns `true` when the size or pixel ratio actually changed.
    pub fn resize(&mut self, css_size: (f64, f64), pixel_ratio: f64) -> bool {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let css_size = (css_size.0.max(0.0), css_size.1.max(0.0));
        let changed = css_size != self.css_size || pixel_ratio != self.pixel_ratio;
        self.css_size = css_size;
        self.pixel_ratio = pixel_ratio;
        changed
    }

    pub fn domain(&self) -> Option<TimeDomain> {
        self.planned_minutes
            .map(|minutes| TimeDomain::planned(self.start, minutes))
    }

    pub fn plot_rect(&self) -> PlotRect {
        PlotRect::inset(self.css_size, &self.padding)
    }

    /// `None` when the chart cannot be drawn.
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.domain()
            .map(|domain| CoordinateMapper::new(self.plot_rect(), domain, self.max_score))
    }

    /// Device-pixel size for the backing store.
    pub fn backing_size(&self) -> (u32, u32) {
        let scale = |v: f64| (v * self.pixel_ratio).round().max(1.0) as u32;
        (scale(self.css_size.0), scale(self.css_size.1))
    }
}

/// Horizontal gridline spacing in points.
pub fn score_step(max_score: f64) -> f64 {
    if max_score <= 300.0 {
        50.0
    } else {
        100.0
    }
}

/// Vertical gridline spacing in minutes.
pub fn time_step_minutes(planned_minutes: f64) -> f64 {
    if planned_minutes <= 120.0 {
        15.0
    } else if planned_minutes <= 180.0 {
        30.0
    } else {
        60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn state(planned: Option<f64>) -> ChartState {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        ChartState::new(start, planned, 3, 300.0, Padding::default())
    }

    #[test]
    fn toggles_are_independent() {
        let mut vis = SeriesVisibility::all_visible(3);
        assert!(vis.toggle(SeriesKey::Problem(2)));
        assert!(!vis.is_visible(SeriesKey::Problem(2)));
        assert!(vis.is_visible(SeriesKey::Problem(1)));
        assert!(vis.is_visible(SeriesKey::Total));
        assert!(vis.toggle(SeriesKey::Total));
        assert!(!vis.is_visible(SeriesKey::Total));
        assert!(!vis.toggle(SeriesKey::Problem(0)));
        assert!(!vis.toggle(SeriesKey::Problem(4)));
        assert!(!vis.is_visible(SeriesKey::Problem(4)));
    }

    #[test]
    fn oversized_duration_has_no_mapper() {
        assert!(state(Some(1e300)).mapper().is_none());
        assert!(state(Some(1e300)).domain().is_none());
    }

    #[test]
    fn missing_duration_has_no_mapper() {
        assert!(state(None).mapper().is_none());
        assert!(state(Some(0.0)).mapper().is_none());
        assert!(state(Some(-10.0)).mapper().is_none());
        assert!(state(Some(300.0)).mapper().is_some());
    }

    #[test]
    fn resize_reports_changes_and_sanitizes_ratio() {
        let mut s = state(Some(300.0));
        assert!(s.resize((640.0, 320.0), 2.0));
        assert!(!s.resize((640.0, 320.0), 2.0));
        assert_eq!(s.backing_size(), (1280, 640));
        assert!(s.resize((640.0, 320.0), f64::NAN));
        assert_eq!(s.pixel_ratio, 1.0);
    }

    #[test]
    fn grid_steps() {
        assert_eq!(score_step(300.0), 50.0);
        assert_eq!(score_step(400.0), 100.0);
        assert_eq!(time_step_minutes(90.0), 15.0);
        assert_eq!(time_step_minutes(120.0), 15.0);
        assert_eq!(time_step_minutes(150.0), 30.0);
        assert_eq!(time_step_minutes(300.0), 60.0);
    }
}
