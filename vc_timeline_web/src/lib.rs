//! Browser bindings: two layered canvases per chart, redrawn once per frame.

use std::cell::Cell;

use serde::Serialize;
use vc_timeline::{
    place_tooltip, ChartConfig, ContestBundle, RedrawCause, ScoreChart, SeriesKey, Theme,
    TimelineChart, TooltipContent, TooltipPlacement,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

mod canvas;
mod host;

use host::Shared;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_COMMIT: &str = env!("GIT_COMMIT_HASH");

const DEFAULT_TOOLTIP_SIZE: (f64, f64) = (140.0, 56.0);

#[wasm_bindgen]
pub fn version() -> String {
    format!("{APP_VERSION} ({APP_COMMIT})")
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Accepts either a bundle object or its JSON text.
fn decode_bundle(bundle: JsValue) -> Result<ContestBundle, JsValue> {
    let decoded = match bundle.as_string() {
        Some(text) => ContestBundle::from_json(&text).map_err(|e| e.to_string()),
        None => serde_wasm_bindgen::from_value(bundle).map_err(|e| e.to_string()),
    };
    decoded.map_err(|e| JsValue::from_str(&format!("invalid contest bundle: {e}")))
}

fn decode_config(config: JsValue) -> Result<ChartConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ChartConfig::default());
    }
    let config: ChartConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("invalid chart config: {e}")))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

#[wasm_bindgen(js_name = ScoreChart)]
pub struct WebScoreChart {
    host: Shared<ScoreChart>,
}

#[wasm_bindgen(js_class = ScoreChart)]
impl WebScoreChart {
    /// `background` holds axes and medal bands, `foreground` the series.
    #[wasm_bindgen(constructor)]
    pub fn new(
        background: HtmlCanvasElement,
        foreground: HtmlCanvasElement,
        bundle: JsValue,
        config: JsValue,
    ) -> Result<WebScoreChart, JsValue> {
        let bundle = decode_bundle(bundle)?;
        let chart = ScoreChart::new(&bundle, decode_config(config)?);
        Ok(Self {
            host: host::create(chart, background, foreground)?,
        })
    }

    fn toggle(&self, key: SeriesKey) -> bool {
        let toggled = self.host.borrow_mut().chart.toggle(key);
        if toggled {
            host::request(&self.host, RedrawCause::Toggle);
        }
        toggled
    }

    pub fn toggle_total(&self) {
        self.toggle(SeriesKey::Total);
    }

    /// Returns `false` for a problem the contest does not have.
    pub fn toggle_problem(&self, problem: u32) -> bool {
        self.toggle(SeriesKey::Problem(problem))
    }

    pub fn is_visible(&self, problem: Option<u32>) -> bool {
        let key = problem.map_or(SeriesKey::Total, SeriesKey::Problem);
        self.host.borrow().chart.state.visibility.is_visible(key)
    }

    pub fn set_theme(&self, dark: bool) {
        host::set_theme(&self.host, Theme::from_dark_flag(dark));
    }

    pub fn resize(&self) {
        host::resize(&self.host);
    }

    pub fn attach_observers(&self) -> Result<(), JsValue> {
        host::attach(&self.host)
    }

    pub fn detach(&self) {
        host::detach(&self.host);
    }
}

#[derive(Serialize)]
struct TooltipView {
    name: String,
    elapsed: String,
    delta: String,
    left: f64,
    top: f64,
    below: bool,
}

impl TooltipView {
    fn new(content: TooltipContent, placement: TooltipPlacement) -> Self {
        Self {
            name: content.name,
            elapsed: content.elapsed,
            delta: content.delta,
            left: placement.left,
            top: placement.top,
            below: placement.below,
        }
    }
}

#[wasm_bindgen(js_name = TimelineChart)]
pub struct WebTimelineChart {
    host: Shared<TimelineChart>,
    tooltip_size: Cell<(f64, f64)>,
}

#[wasm_bindgen(js_class = TimelineChart)]
impl WebTimelineChart {
    /// `background` holds the heatmap strip, `foreground` the submission dots.
    #[wasm_bindgen(constructor)]
    pub fn new(
        background: HtmlCanvasElement,
        foreground: HtmlCanvasElement,
        bundle: JsValue,
        config: JsValue,
    ) -> Result<WebTimelineChart, JsValue> {
        let bundle = decode_bundle(bundle)?;
        let chart = TimelineChart::new(&bundle, decode_config(config)?);
        Ok(Self {
            host: host::create(chart, background, foreground)?,
            tooltip_size: Cell::new(DEFAULT_TOOLTIP_SIZE),
        })
    }

    /// Measured size of the host page's tooltip element, used for placement.
    pub fn set_tooltip_size(&self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.tooltip_size.set((width, height));
        }
    }

    /// Tooltip for the dot under the pointer (canvas CSS pixels), or `null`.
    pub fn pointer_move(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let host = self.host.borrow();
        let Some((_, content)) = host.chart.hover((x, y)) else {
            return Ok(JsValue::NULL);
        };
        let config = &host.chart.config;
        let placement = place_tooltip(
            (x, y),
            self.tooltip_size.get(),
            host.chart.state.css_size,
            config.tooltip_padding,
            config.tooltip_offset,
        );
        serde_wasm_bindgen::to_value(&TooltipView::new(content, placement))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Nothing to redraw; the page hides its tooltip element.
    pub fn pointer_leave(&self) {
        tracing::trace!("pointer left timeline");
    }

    pub fn set_theme(&self, dark: bool) {
        host::set_theme(&self.host, Theme::from_dark_flag(dark));
    }

    pub fn resize(&self) {
        host::resize(&self.host);
    }

    pub fn attach_observers(&self) -> Result<(), JsValue> {
        host::attach(&self.host)
    }

    pub fn detach(&self) {
        host::detach(&self.host);
    }
}
