use chrono::{Duration, TimeZone, Utc};
use vc_timeline::{
    bin_counts, build_series, draw_heatmap, draw_series, draw_timeline, BinLayout, ChartConfig,
    ChartState, CoordinateMapper, DrawCall, Padding, PlotRect, RecordingSurface, StepSeries,
    Submission, Theme, TimeDomain, Timestamp,
};

fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

fn at(minutes: i64) -> Timestamp {
    start() + Duration::minutes(minutes)
}

fn minutes_and_values(series: &StepSeries) -> Vec<(i64, f64)> {
    series
        .points()
        .iter()
        .map(|p| ((p.time - start()).num_minutes(), p.value))
        .collect()
}

fn noisy_submissions() -> Vec<Submission> {
    // a mix of improvements, regressions and longer subtask lists
    vec![
        Submission::new(at(5), 1, vec![10.0, 0.0]),
        Submission::new(at(12), 2, vec![0.0, 25.0]),
        Submission::new(at(30), 1, vec![0.0, 40.0]),
        Submission::new(at(41), 1, vec![5.0, 5.0, 7.0]),
        Submission::new(at(64), 3, vec![100.0]),
        Submission::new(at(70), 2, vec![20.0, 0.0]),
        Submission::new(at(70), 2, vec![0.0, 0.0]),
        Submission::new(at(200), 3, vec![0.0]),
        Submission::new(at(299), 2, vec![50.0, 50.0]),
    ]
}

#[test]
fn two_problem_scenario() {
    let subs = vec![
        Submission::new(at(10), 1, vec![50.0]),
        Submission::new(at(20), 2, vec![30.0, 30.0]),
    ];
    let set = build_series(&subs, 3, start(), at(300));
    assert_eq!(
        minutes_and_values(set.problem(1).unwrap()),
        vec![(0, 0.0), (10, 50.0), (300, 50.0)]
    );
    assert_eq!(
        minutes_and_values(set.problem(2).unwrap()),
        vec![(0, 0.0), (20, 60.0), (300, 60.0)]
    );
    assert_eq!(
        minutes_and_values(&set.total),
        vec![(0, 0.0), (10, 50.0), (20, 110.0), (300, 110.0)]
    );
}

#[test]
fn per_problem_series_never_decrease() {
    let set = build_series(&noisy_submissions(), 3, start(), at(300));
    for series in set.per_problem.values().chain(std::iter::once(&set.total)) {
        for pair in series.points().windows(2) {
            assert!(pair[1].value >= pair[0].value);
            assert!(pair[1].time >= pair[0].time);
        }
    }
}

#[test]
fn series_cover_the_whole_contest() {
    let set = build_series(&noisy_submissions(), 3, start(), at(300));
    for series in set.per_problem.values().chain(std::iter::once(&set.total)) {
        let first = series.points().first().unwrap();
        let last = series.points().last().unwrap();
        assert_eq!((first.time, first.value), (start(), 0.0));
        assert_eq!(last.time, at(300));
        assert_eq!(last.value, series.last_value());
    }
    let last_total = set.total.last_value();
    let per_problem: f64 = set.per_problem.values().map(StepSeries::last_value).sum();
    assert_eq!(last_total, per_problem);
}

#[test]
fn bins_tile_the_planned_window() {
    let subs = noisy_submissions();
    for planned in [60.0, 90.0, 120.0, 150.0, 180.0, 240.0, 300.0] {
        let layout = BinLayout::for_duration(planned).unwrap();
        let counts = bin_counts(&subs, start(), planned);
        assert_eq!(counts.len(), layout.count);
        assert_eq!(layout.count, (planned / layout.width_minutes as f64).ceil() as usize);
        let within = subs
            .iter()
            .filter(|s| s.time >= start() && s.time <= start() + Duration::minutes(planned as i64))
            .count() as u32;
        assert!(counts.iter().sum::<u32>() <= within);
    }
    for (planned, width, count) in [(90.0, 8, 12), (150.0, 12, 13), (240.0, 15, 16)] {
        let layout = BinLayout::for_duration(planned).unwrap();
        assert_eq!((layout.width_minutes, layout.count), (width, count));
    }
}

#[test]
fn mapper_spans_the_content_rect() {
    let padding = Padding {
        left: 48.0,
        right: 16.0,
        top: 16.0,
        bottom: 32.0,
    };
    for css in [(640.0, 320.0), (1000.0, 400.0), (10.0, 10.0)] {
        let rect = PlotRect::inset(css, &padding);
        let domain = TimeDomain::planned(start(), 300.0);
        let mapper = CoordinateMapper::new(rect, domain, 300.0);
        assert!((mapper.x_of(domain.start_ms) - rect.left).abs() < 1e-9);
        assert!((mapper.x_of(domain.end_ms) - (rect.left + rect.width)).abs() < 1e-9);
    }
}

#[test]
fn series_redraw_is_deterministic() {
    let set = build_series(&noisy_submissions(), 3, start(), at(300));
    let config = ChartConfig::default();
    let mut state = ChartState::new(start(), Some(300.0), 3, 300.0, config.padding);
    state.resize((800.0, 360.0), 2.0);

    let mut first = RecordingSurface::new(1600, 720);
    let mut second = RecordingSurface::new(1600, 720);
    draw_series(&mut first, &state, &set, &config.palette, &config);
    draw_series(&mut second, &state, &set, &config.palette, &config);
    assert_eq!(first.calls(), second.calls());
}

#[test]
fn zero_duration_timeline_is_untouched() {
    let config = ChartConfig::default();
    let state = ChartState::new(start(), Some(0.0), 3, 300.0, config.timeline_padding);
    let events = vc_timeline::timeline_events(&noisy_submissions());
    let mut surface = RecordingSurface::new(600, 80);
    let dots = draw_timeline(&mut surface, &events, &state, &config.palette, &config);
    assert!(dots.is_empty());
    assert!(surface.calls().is_empty());
    assert_eq!(surface.clear_count(), 0);
}

#[test]
fn empty_contest_is_flat_and_cold() {
    let set = build_series(&[], 3, start(), at(300));
    for problem in 1..=3 {
        let series = set.problem(problem).unwrap();
        assert_eq!(minutes_and_values(series), vec![(0, 0.0), (300, 0.0)]);
    }
    assert_eq!(minutes_and_values(&set.total), vec![(0, 0.0), (300, 0.0)]);

    let bins = bin_counts(&[], start(), 150.0);
    assert_eq!(bins, vec![0; 13]);

    let config = ChartConfig::default();
    let mut state = ChartState::new(start(), Some(150.0), 3, 300.0, config.timeline_padding);
    state.resize((650.0, 80.0), 1.0);
    for theme in [Theme::Light, Theme::Dark] {
        let mut surface = RecordingSurface::new(650, 80);
        draw_heatmap(&mut surface, &bins, &state, theme, &config);
        let fills: Vec<_> = surface
            .calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 13);
        assert!(fills.iter().all(|fill| *fill == theme.empty_bin()));
    }
}
