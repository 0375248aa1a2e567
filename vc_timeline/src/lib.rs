//! Virtual-contest score progression and submission timeline charts.
//!
//! Contest data is aggregated into step series, density bins and timeline
//! events, then drawn through the [`Surface`] trait so the same renderers
//! serve a browser canvas, a plotters bitmap, or a recording used in tests.

use thiserror::Error;

pub mod aggregate;
pub mod binning;
pub mod chart;
pub mod config;
pub mod format;
pub mod mapper;
pub mod model;
pub mod render;
pub mod schedule;
pub mod series_layer;
pub mod standings;
pub mod static_layer;
pub mod surface;
pub mod theme;
pub mod timeline;
pub mod tooltip;

pub use aggregate::{
    build_series, final_results, timeline_events, BestSoFar, ProblemResult, SeriesSet,
    StepPoint, StepSeries, TimelineEvent,
};
pub use binning::{bin_counts, bin_width_minutes, BinLayout};
pub use chart::{ChartState, SeriesKey, SeriesVisibility};
pub use config::ChartConfig;
pub use mapper::{CoordinateMapper, Padding, PlotRect, TimeDomain};
pub use model::{
    default_problem_name, parse_timestamp, ContestBundle, ContestMeta, ContestRecord,
    MedalCutoffs, ScoringMeta, Submission, Timestamp,
};
pub use render::{ScoreChart, TimelineChart};
pub use schedule::{DirtyLayers, RedrawCause, RedrawScheduler};
pub use series_layer::draw_series;
pub use standings::{ContestSummary, Medal};
pub use static_layer::draw_static;
pub use surface::{Color, DrawCall, RecordingSurface, Stroke, Surface};
pub use theme::{Palette, Theme};
pub use timeline::{draw_heatmap, draw_timeline};
pub use tooltip::{hit_test, place_tooltip, Dot, TooltipContent, TooltipPlacement};

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognised timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid chart config: {0}")]
    InvalidConfig(String),
    #[error("contest has no planned duration")]
    MissingDuration,
}
