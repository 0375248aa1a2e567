//! Axes, gridlines, tick labels and medal bands.

use tracing::debug;

use crate::chart::{score_step, time_step_minutes, ChartState};
use crate::config::ChartConfig;
use crate::format::format_tick;
use crate::mapper::CoordinateMapper;
use crate::model::MedalCutoffs;
use crate::standings::Medal;
use crate::surface::{begin_frame, Stroke, Surface, TextAlign, TextBaseline, TextStyle};
use crate::theme::{medal_color, Theme};

const LABEL_GAP: f64 = 6.0;

/// Redraw the static layer from scratch. Draws nothing without a planned duration.
pub fn draw_static<S: Surface + ?Sized>(
    surface: &mut S,
    state: &ChartState,
    theme: Theme,
    config: &ChartConfig,
) {
    let Some(mapper) = state.mapper() else {
        debug!("static layer skipped: no planned duration");
        return;
    };
    begin_frame(surface, state.pixel_ratio);

    if let Some(cutoffs) = state.cutoffs.as_ref() {
        draw_medal_bands(surface, &mapper, cutoffs, theme);
    }
    draw_score_grid(surface, &mapper, theme, config);
    draw_time_grid(surface, &mapper, theme, config);

    let rect = mapper.rect;
    let axis = Stroke::solid(theme.axis(), 1.0);
    surface.draw_line((rect.left, rect.top), (rect.left, rect.bottom()), &axis);
    surface.draw_line((rect.left, rect.bottom()), (rect.right(), rect.bottom()), &axis);
}

fn draw_score_grid<S: Surface + ?Sized>(
    surface: &mut S,
    mapper: &CoordinateMapper,
    theme: Theme,
    config: &ChartConfig,
) {
    let rect = mapper.rect;
    let grid = Stroke::solid(theme.grid(), 1.0);
    let style = TextStyle {
        color: theme.label(),
        size_px: config.font_px,
        align: TextAlign::Right,
        baseline: TextBaseline::Middle,
    };
    let step = score_step(mapper.score_max);
    let mut score = 0.0;
    while score <= mapper.score_max + 1e-9 {
        let y = mapper.y_of(score);
        surface.draw_line((rect.left, y), (rect.right(), y), &grid);
        surface.draw_text(&format!("{score}"), (rect.left - LABEL_GAP, y), &style);
        score += step;
    }
}

fn draw_time_grid<S: Surface + ?Sized>(
    surface: &mut S,
    mapper: &CoordinateMapper,
    theme: Theme,
    config: &ChartConfig,
) {
    let rect = mapper.rect;
    let grid = Stroke::solid(theme.grid(), 1.0);
    let style = TextStyle {
        color: theme.label(),
        size_px: config.font_px,
        align: TextAlign::Center,
        baseline: TextBaseline::Top,
    };
    let planned = mapper.domain.span_minutes();
    let step = time_step_minutes(planned);
    let mut minute = 0.0;
    while minute <= planned + 1e-9 {
        let x = mapper.x_of_minute(minute);
        surface.draw_line((x, rect.top), (x, rect.bottom()), &grid);
        surface.draw_text(&format_tick(minute), (x, rect.bottom() + LABEL_GAP), &style);
        minute += step;
    }
}

fn draw_medal_bands<S: Surface + ?Sized>(
    surface: &mut S,
    mapper: &CoordinateMapper,
    cutoffs: &MedalCutoffs,
    theme: Theme,
) {
    let rect = mapper.rect;
    let clamp = |score: f64| score.clamp(0.0, mapper.score_max);
    let bands = [
        (Medal::Bronze, cutoffs.bronze, cutoffs.silver),
        (Medal::Silver, cutoffs.silver, cutoffs.gold),
        (Medal::Gold, cutoffs.gold, mapper.score_max),
    ];
    for (medal, low, high) in bands {
        let (low, high) = (clamp(low), clamp(high));
        if high <= low {
            continue;
        }
        let top = mapper.y_of(high);
        let bottom = mapper.y_of(low);
        surface.draw_rect(
            (rect.left, top),
            (rect.width, bottom - top),
            medal_color(medal).with_alpha(theme.band_alpha()),
        );
    }
    for (medal, cutoff) in [
        (Medal::Bronze, cutoffs.bronze),
        (Medal::Silver, cutoffs.silver),
        (Medal::Gold, cutoffs.gold),
    ] {
        if cutoff <= 0.0 || cutoff > mapper.score_max {
            continue;
        }
        let y = mapper.y_of(cutoff);
        let stroke = Stroke::dashed(
            medal_color(medal).with_alpha(theme.separator_alpha()),
            1.0,
            4.0,
            4.0,
        );
        surface.draw_line((rect.left, y), (rect.right(), y), &stroke);
    }
}
