//! Per-chart entry points that own derived data and draw onto a layer pair.

use tracing::warn;

use crate::aggregate::{build_series, timeline_events, SeriesSet, TimelineEvent};
use crate::binning::bin_counts;
use crate::chart::{ChartState, SeriesKey};
use crate::config::ChartConfig;
use crate::model::ContestBundle;
use crate::schedule::DirtyLayers;
use crate::series_layer::draw_series;
use crate::static_layer::draw_static;
use crate::surface::Surface;
use crate::theme::Theme;
use crate::timeline::{draw_heatmap, draw_timeline};
use crate::tooltip::{hit_test, Dot, TooltipContent};

fn warn_if_unplanned(bundle: &ContestBundle, chart: &str) {
    if bundle.meta.planned_minutes().is_none() {
        warn!(
            chart,
            contest = %bundle.contest.title(),
            "contest has no planned duration; nothing will be drawn"
        );
    }
}

/// Score progression chart: static layer below, series layer on top.
#[derive(Clone, Debug)]
pub struct ScoreChart {
    pub state: ChartState,
    pub series: SeriesSet,
    pub config: ChartConfig,
}

impl ScoreChart {
    pub fn new(bundle: &ContestBundle, config: ChartConfig) -> Self {
        warn_if_unplanned(bundle, "score");
        let series = build_series(
            &bundle.contest.submissions,
            bundle.problem_count(),
            bundle.contest.started_at,
            bundle.contest.ended_at,
        );
        Self {
            state: ChartState::for_scores(bundle, &config),
            series,
            config,
        }
    }

    /// Flip a series; returns `false` when the key names no problem.
    pub fn toggle(&mut self, key: SeriesKey) -> bool {
        self.state.visibility.toggle(key)
    }

    pub fn draw<B, F>(&self, background: &mut B, foreground: &mut F, theme: Theme, layers: DirtyLayers)
    where
        B: Surface + ?Sized,
        F: Surface + ?Sized,
    {
        if layers.background {
            draw_static(background, &self.state, theme, &self.config);
        }
        if layers.foreground {
            draw_series(
                foreground,
                &self.state,
                &self.series,
                &self.config.palette,
                &self.config,
            );
        }
    }

    /// Both layers onto one surface that composites instead of wiping.
    pub fn compose<S: Surface + ?Sized>(&self, surface: &mut S, theme: Theme) {
        draw_static(surface, &self.state, theme, &self.config);
        draw_series(
            surface,
            &self.state,
            &self.series,
            &self.config.palette,
            &self.config,
        );
    }
}

/// Submission scatter with the density heatmap beneath it.
#[derive(Clone, Debug)]
pub struct TimelineChart {
    pub state: ChartState,
    pub events: Vec<TimelineEvent>,
    pub bins: Vec<u32>,
    pub config: ChartConfig,
    bundle: ContestBundle,
    dots: Vec<Dot>,
}

impl TimelineChart {
    pub fn new(bundle: &ContestBundle, config: ChartConfig) -> Self {
        warn_if_unplanned(bundle, "timeline");
        let bins = bundle
            .meta
            .planned_minutes()
            .map(|planned| {
                bin_counts(&bundle.contest.submissions, bundle.contest.started_at, planned)
            })
            .unwrap_or_default();
        Self {
            state: ChartState::for_timeline(bundle, &config),
            events: timeline_events(&bundle.contest.submissions),
            bins,
            config,
            bundle: bundle.clone(),
            dots: Vec::new(),
        }
    }

    /// Heatmap goes to `background`, scatter to `foreground`.
    pub fn draw<B, F>(&mut self, background: &mut B, foreground: &mut F, theme: Theme, layers: DirtyLayers)
    where
        B: Surface + ?Sized,
        F: Surface + ?Sized,
    {
        if layers.background {
            draw_heatmap(background, &self.bins, &self.state, theme, &self.config);
        }
        if layers.foreground {
            self.dots = draw_timeline(
                foreground,
                &self.events,
                &self.state,
                &self.config.palette,
                &self.config,
            );
        }
    }

    /// Heatmap then scatter onto one compositing surface.
    pub fn compose<S: Surface + ?Sized>(&mut self, surface: &mut S, theme: Theme) {
        draw_heatmap(surface, &self.bins, &self.state, theme, &self.config);
        self.dots = draw_timeline(
            surface,
            &self.events,
            &self.state,
            &self.config.palette,
            &self.config,
        );
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    /// Tooltip for the dot under `pointer` (CSS pixels), if any.
    pub fn hover(&self, pointer: (f64, f64)) -> Option<(Dot, TooltipContent)> {
        let dot = hit_test(&self.dots, pointer, self.config.hit_radius_px)?;
        let event = self.events.get(dot.event)?;
        let content = TooltipContent::for_event(event, self.state.start, |p| {
            self.bundle.problem_name(p)
        });
        Some((*dot, content))
    }
}
