//! Toggleable step lines for the total and each problem.

use tracing::debug;

use crate::aggregate::{SeriesSet, StepSeries};
use crate::chart::{ChartState, SeriesKey};
use crate::config::ChartConfig;
use crate::mapper::CoordinateMapper;
use crate::surface::{begin_frame, Point, Stroke, Surface};
use crate::theme::Palette;

/// Redraw every visible series. Only this layer's surface is touched.
pub fn draw_series<S: Surface + ?Sized>(
    surface: &mut S,
    state: &ChartState,
    series: &SeriesSet,
    palette: &Palette,
    config: &ChartConfig,
) {
    let Some(mapper) = state.mapper() else {
        debug!("series layer skipped: no planned duration");
        return;
    };
    begin_frame(surface, state.pixel_ratio);

    for (&problem, steps) in &series.per_problem {
        if !state.visibility.is_visible(SeriesKey::Problem(problem)) {
            continue;
        }
        let stroke = Stroke::solid(palette.problem(problem), config.series_width);
        draw_steps(surface, &mapper, steps, &stroke);
    }
    // total last so it sits on top
    if state.visibility.is_visible(SeriesKey::Total) {
        let stroke = Stroke::solid(palette.total, config.total_width);
        draw_steps(surface, &mapper, &series.total, &stroke);
    }
}

fn draw_steps<S: Surface + ?Sized>(
    surface: &mut S,
    mapper: &CoordinateMapper,
    series: &StepSeries,
    stroke: &Stroke,
) {
    let path = step_path(mapper, series);
    if path.len() >= 2 {
        surface.stroke_path(&path, stroke);
    }
}

/// Horizontal run at the old value, then a vertical jump at each new point.
pub fn step_path(mapper: &CoordinateMapper, series: &StepSeries) -> Vec<Point> {
    let mut path: Vec<Point> = Vec::with_capacity(series.len() * 2);
    for point in series.points() {
        let x = mapper.x_of_time(&point.time);
        let y = mapper.y_of(point.value);
        if let Some(&(_, prev_y)) = path.last() {
            path.push((x, prev_y));
        }
        path.push((x, y));
    }
    path.dedup();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_series;
    use crate::mapper::Padding;
    use crate::model::{Submission, Timestamp};
    use crate::surface::{DrawCall, RecordingSurface};
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn fixture() -> (ChartState, SeriesSet) {
        let subs = vec![
            Submission::new(start() + Duration::minutes(60), 1, vec![50.0]),
            Submission::new(start() + Duration::minutes(120), 2, vec![30.0, 30.0]),
        ];
        let end = start() + Duration::minutes(300);
        let series = build_series(&subs, 3, start(), end);
        let mut state = ChartState::new(start(), Some(300.0), 3, 300.0, Padding::default());
        state.resize((300.0, 300.0), 1.0);
        (state, series)
    }

    fn paths(surface: &RecordingSurface) -> Vec<Vec<Point>> {
        surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::StrokePath { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn steps_never_run_diagonally() {
        let (state, series) = fixture();
        let mapper = state.mapper().unwrap();
        let path = step_path(&mapper, &series.total);
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.0 == b.0 || a.1 == b.1, "diagonal segment {a:?} -> {b:?}");
        }
        // 0 -> 50 at 1h, 50 -> 110 at 2h, flat to 5h
        let expected = [
            (0.0, 300.0),
            (60.0, 300.0),
            (60.0, 250.0),
            (120.0, 250.0),
            (120.0, 190.0),
            (300.0, 190.0),
        ];
        assert_eq!(path.len(), expected.len());
        for (got, want) in path.iter().zip(expected) {
            assert!((got.0 - want.0).abs() < 1e-6 && (got.1 - want.1).abs() < 1e-6, "{got:?} vs {want:?}");
        }
    }

    #[test]
    fn hidden_series_are_skipped_without_recomputing() {
        let (mut state, series) = fixture();
        let config = ChartConfig::default();
        let mut surface = RecordingSurface::new(300, 300);
        draw_series(&mut surface, &state, &series, &config.palette, &config);
        assert_eq!(paths(&surface).len(), 4);

        state.visibility.toggle(SeriesKey::Problem(2));
        state.visibility.toggle(SeriesKey::Total);
        draw_series(&mut surface, &state, &series, &config.palette, &config);
        let strokes: Vec<_> = surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::StrokePath { stroke, .. } => Some(stroke.color),
                _ => None,
            })
            .collect();
        assert_eq!(strokes, vec![config.palette.problem(1), config.palette.problem(3)]);
    }

    #[test]
    fn redraw_is_idempotent() {
        let (state, series) = fixture();
        let config = ChartConfig::default();
        let mut surface = RecordingSurface::new(300, 300);
        draw_series(&mut surface, &state, &series, &config.palette, &config);
        let first = surface.calls().to_vec();
        draw_series(&mut surface, &state, &series, &config.palette, &config);
        assert_eq!(surface.calls(), first.as_slice());
        assert_eq!(surface.clear_count(), 2);
    }

    #[test]
    fn total_uses_accent_and_draws_last() {
        let (state, series) = fixture();
        let config = ChartConfig::default();
        let mut surface = RecordingSurface::new(300, 300);
        draw_series(&mut surface, &state, &series, &config.palette, &config);
        match surface.calls().last() {
            Some(DrawCall::StrokePath { stroke, .. }) => {
                assert_eq!(stroke.color, config.palette.total);
                assert_eq!(stroke.width, config.total_width);
            }
            other => panic!("unexpected last call {other:?}"),
        }
    }
}
