//! Pointer hit-testing and tooltip placement for the submission scatter.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::aggregate::TimelineEvent;
use crate::format::{format_delta, format_elapsed};
use crate::model::{millis, Timestamp};
use crate::surface::Point;

/// A drawn submission dot, kept for hit-testing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Dot {
    pub center: Point,
    pub radius: f64,
    /// Index into the event list the dots were drawn from.
    pub event: usize,
}

fn chebyshev(a: Point, b: Point) -> f64 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

/// Closest dot within `threshold` pixels (Chebyshev), first one on ties.
pub fn hit_test(dots: &[Dot], pointer: Point, threshold: f64) -> Option<&Dot> {
    dots.iter()
        .map(|dot| (chebyshev(dot.center, pointer), dot))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| OrderedFloat(*distance))
        .map(|(_, dot)| dot)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TooltipContent {
    pub name: String,
    pub elapsed: String,
    pub delta: String,
}

impl TooltipContent {
    pub fn for_event(
        event: &TimelineEvent,
        contest_start: Timestamp,
        problem_name: impl Fn(u32) -> String,
    ) -> Self {
        Self {
            name: problem_name(event.problem_index),
            elapsed: format_elapsed(millis(&event.time) - millis(&contest_start)),
            delta: format_delta(event.delta),
        }
    }

    pub fn lines(&self) -> [&str; 3] {
        [&self.name, &self.elapsed, &self.delta]
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
    pub below: bool,
}

/// Put a `size` tooltip above `cursor`, flipping below when it would leave
/// the top of the viewport, then clamp inside `viewport` with `margin`.
pub fn place_tooltip(
    cursor: Point,
    size: (f64, f64),
    viewport: (f64, f64),
    margin: f64,
    offset: f64,
) -> TooltipPlacement {
    let (width, height) = size;
    let (vw, vh) = viewport;
    let above = cursor.1 - offset - height;
    let below = above < margin;
    let top = if below { cursor.1 + offset } else { above };
    TooltipPlacement {
        left: clamp_span(cursor.0 - width / 2.0, width, vw, margin),
        top: clamp_span(top, height, vh, margin),
        below,
    }
}

fn clamp_span(start: f64, extent: f64, limit: f64, margin: f64) -> f64 {
    let max = (limit - extent - margin).max(margin);
    start.clamp(margin, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn dot(x: f64, y: f64, event: usize) -> Dot {
        Dot {
            center: (x, y),
            radius: 4.0,
            event,
        }
    }

    #[test]
    fn nearest_dot_within_threshold() {
        let dots = vec![dot(10.0, 10.0, 0), dot(20.0, 10.0, 1), dot(100.0, 10.0, 2)];
        assert_eq!(hit_test(&dots, (17.0, 12.0), 8.0).unwrap().event, 1);
        assert_eq!(hit_test(&dots, (12.0, 17.0), 8.0).unwrap().event, 0);
        assert!(hit_test(&dots, (60.0, 10.0), 8.0).is_none());
    }

    #[test]
    fn chebyshev_not_euclidean() {
        // (7, 7) away: euclidean ~9.9 but chebyshev 7
        let dots = vec![dot(0.0, 0.0, 0)];
        assert!(hit_test(&dots, (7.0, 7.0), 8.0).is_some());
        assert!(hit_test(&dots, (8.5, 0.0), 8.0).is_none());
    }

    #[test]
    fn ties_pick_first_dot() {
        let dots = vec![dot(0.0, 0.0, 0), dot(10.0, 0.0, 1)];
        assert_eq!(hit_test(&dots, (5.0, 0.0), 8.0).unwrap().event, 0);
    }

    #[test]
    fn tooltip_text() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let event = TimelineEvent {
            time: start + Duration::minutes(95),
            problem_index: 2,
            score: 60.0,
            delta: 12.25,
        };
        let content = TooltipContent::for_event(&event, start, |p| format!("Problem {p}"));
        assert_eq!(content.lines(), ["Problem 2", "1h35m", "+12.3"]);
    }

    #[test]
    fn placed_above_by_default() {
        let p = place_tooltip((200.0, 200.0), (100.0, 40.0), (800.0, 600.0), 8.0, 12.0);
        assert!(!p.below);
        assert_eq!(p.top, 148.0);
        assert_eq!(p.left, 150.0);
    }

    #[test]
    fn flips_below_near_top() {
        let p = place_tooltip((200.0, 30.0), (100.0, 40.0), (800.0, 600.0), 8.0, 12.0);
        assert!(p.below);
        assert_eq!(p.top, 42.0);
    }

    #[test]
    fn clamped_inside_viewport() {
        let p = place_tooltip((5.0, 590.0), (100.0, 40.0), (800.0, 600.0), 8.0, 12.0);
        assert_eq!(p.left, 8.0);
        let p = place_tooltip((795.0, 300.0), (100.0, 40.0), (800.0, 600.0), 8.0, 12.0);
        assert_eq!(p.left, 692.0);
        // flipped below at the very bottom still stays on screen
        let p = place_tooltip((400.0, 20.0), (100.0, 700.0), (800.0, 600.0), 8.0, 12.0);
        assert_eq!(p.top, 8.0);
    }
}
