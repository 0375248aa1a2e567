//! Submission scatter and density heatmap.
//!
//! Both layers share the timeline chart's horizontal mapping. The scatter
//! band sits on top, the heatmap strip along the bottom of the plot rect, and
//! each layer clears only its own surface.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::TimelineEvent;
use crate::binning::BinLayout;
use crate::chart::ChartState;
use crate::config::ChartConfig;
use crate::mapper::PlotRect;
use crate::surface::{begin_frame, Color, Surface};
use crate::theme::{Palette, Theme};
use crate::tooltip::Dot;

/// Vertical split of the timeline plot rect.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimelineLayout {
    pub baseline_y: f64,
    pub strip_top: f64,
    pub strip_height: f64,
}

impl TimelineLayout {
    pub fn new(rect: &PlotRect, config: &ChartConfig) -> Self {
        let strip_height = config.heatmap_height.min(rect.height);
        let strip_top = rect.bottom() - strip_height;
        let band_bottom = (strip_top - config.strip_gap).max(rect.top);
        Self {
            baseline_y: (rect.top + band_bottom) / 2.0,
            strip_top,
            strip_height,
        }
    }
}

/// Draw one dot per event and return them for hit-testing.
///
/// Without a planned duration nothing is drawn, not even a clear.
pub fn draw_timeline<S: Surface + ?Sized>(
    surface: &mut S,
    events: &[TimelineEvent],
    state: &ChartState,
    palette: &Palette,
    config: &ChartConfig,
) -> Vec<Dot> {
    let Some(mapper) = state.mapper() else {
        debug!("timeline skipped: no planned duration");
        return Vec::new();
    };
    begin_frame(surface, state.pixel_ratio);

    let layout = TimelineLayout::new(&mapper.rect, config);
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let center = (mapper.x_of_time(&event.time), layout.baseline_y);
            surface.fill_circle(center, config.dot_radius, palette.problem(event.problem_index));
            Dot {
                center,
                radius: config.dot_radius,
                event: index,
            }
        })
        .collect()
}

/// Fill for a bin given the busiest bin's count.
pub fn heat_color(count: u32, max: u32, theme: Theme) -> Color {
    if count == 0 || max == 0 {
        return theme.empty_bin();
    }
    let [soft, medium, hot] = theme.heat_ramp();
    let ratio = count as f64 / max as f64;
    if ratio <= 1.0 / 3.0 {
        soft
    } else if ratio <= 2.0 / 3.0 {
        medium
    } else {
        hot
    }
}

pub fn draw_heatmap<S: Surface + ?Sized>(
    surface: &mut S,
    bins: &[u32],
    state: &ChartState,
    theme: Theme,
    config: &ChartConfig,
) {
    let (Some(mapper), Some(layout)) = (
        state.mapper(),
        state.planned_minutes.and_then(BinLayout::for_duration),
    ) else {
        debug!("heatmap skipped: no planned duration");
        return;
    };
    begin_frame(surface, state.pixel_ratio);

    let strip = TimelineLayout::new(&mapper.rect, config);
    let max = bins.iter().copied().max().unwrap_or(0);
    // snap to device pixels so neighbouring bins share an edge
    let snap = |x: f64| (x * state.pixel_ratio).round() / state.pixel_ratio;
    for (index, &count) in bins.iter().enumerate().take(layout.count) {
        let (from, to) = layout.span_minutes(index);
        let left = snap(mapper.x_of_minute(from));
        let right = snap(mapper.x_of_minute(to));
        if right <= left {
            continue;
        }
        surface.draw_rect(
            (left, strip.strip_top),
            (right - left, strip.strip_height),
            heat_color(count, max, theme),
        );
    }
}
