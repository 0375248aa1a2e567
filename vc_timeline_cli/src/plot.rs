//! `Surface` over a plotters drawing backend.

use std::panic;

use plotters::style::{FontDesc, FontFamily, FontStyle, RGBAColor};
use plotters_backend::text_anchor::{HPos, Pos, VPos};
use plotters_backend::{BackendColor, BackendCoord, BackendStyle, DrawingBackend, DrawingErrorKind};
use tracing::debug;
use vc_timeline::surface::{Color, Dash, Point, Stroke, Surface, TextAlign, TextBaseline, TextStyle};

#[derive(Clone, Copy)]
struct Pen {
    color: BackendColor,
    width: u32,
}

impl BackendStyle for Pen {
    fn color(&self) -> BackendColor {
        self.color
    }

    fn stroke_width(&self) -> u32 {
        self.width
    }
}

fn backend_color(color: Color) -> BackendColor {
    BackendColor {
        alpha: color.a,
        rgb: (color.r, color.g, color.b),
    }
}

/// Split a line into the "on" pieces of a dash pattern.
pub fn dash_segments(from: Point, to: Point, on: f64, off: f64) -> Vec<(Point, Point)> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= 0.0 || on <= 0.0 {
        return Vec::new();
    }
    let period = on + off.max(0.0);
    let at = |d: f64| (from.0 + dx * d / length, from.1 + dy * d / length);
    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + on).min(length);
        segments.push((at(offset), at(end)));
        offset += period;
    }
    segments
}

/// Draws every layer onto one image. Layers are composited, so only the
/// first clear paints the background.
pub struct PlottersSurface<DB: DrawingBackend> {
    backend: DB,
    background: Color,
    scale: f64,
    painted: bool,
    error: Option<String>,
}

impl<DB: DrawingBackend> PlottersSurface<DB> {
    pub fn new(backend: DB, background: Color) -> Self {
        Self {
            backend,
            background,
            scale: 1.0,
            painted: false,
            error: None,
        }
    }

    /// Flush the backend and report the first drawing error, if any.
    pub fn finish(mut self) -> Result<(), String> {
        let presented = self.backend.present();
        self.record(presented);
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record<T>(&mut self, result: Result<T, DrawingErrorKind<DB::ErrorType>>) {
        if let Err(err) = result {
            self.error.get_or_insert_with(|| err.to_string());
        }
    }

    fn coord(&self, point: Point) -> BackendCoord {
        (
            (point.0 * self.scale).round() as i32,
            (point.1 * self.scale).round() as i32,
        )
    }

    fn pen(&self, color: Color, width: f64) -> Pen {
        Pen {
            color: backend_color(color),
            width: (width * self.scale).round().max(1.0) as u32,
        }
    }
}

impl<DB: DrawingBackend> Surface for PlottersSurface<DB> {
    fn backing_size(&self) -> (u32, u32) {
        self.backend.get_size()
    }

    fn clear(&mut self) {
        if self.painted {
            return;
        }
        self.painted = true;
        let (w, h) = self.backend.get_size();
        let pen = Pen {
            color: backend_color(self.background),
            width: 1,
        };
        let result = self.backend.draw_rect((0, 0), (w as i32, h as i32), &pen, true);
        self.record(result);
    }

    fn set_transform(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        let pen = self.pen(stroke.color, stroke.width);
        let segments = match stroke.dash {
            Dash::Solid => vec![(from, to)],
            Dash::Dashed { on, off } => dash_segments(from, to, on, off),
        };
        for (a, b) in segments {
            let (a, b) = (self.coord(a), self.coord(b));
            let result = self.backend.draw_line(a, b, &pen);
            self.record(result);
        }
    }

    fn draw_rect(&mut self, origin: Point, size: (f64, f64), fill: Color) {
        let pen = self.pen(fill, 1.0);
        let upper_left = self.coord(origin);
        let bottom_right = self.coord((origin.0 + size.0, origin.1 + size.1));
        let result = self.backend.draw_rect(upper_left, bottom_right, &pen, true);
        self.record(result);
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let h = match style.align {
            TextAlign::Left => HPos::Left,
            TextAlign::Center => HPos::Center,
            TextAlign::Right => HPos::Right,
        };
        let v = match style.baseline {
            TextBaseline::Top => VPos::Top,
            TextBaseline::Middle => VPos::Center,
            TextBaseline::Bottom => VPos::Bottom,
        };
        let c = style.color;
        let font = FontDesc::new(FontFamily::SansSerif, style.size_px * self.scale, FontStyle::Normal)
            .color(&RGBAColor(c.r, c.g, c.b, c.a))
            .pos(Pos::new(h, v));
        let pos = self.coord(at);
        let backend = &mut self.backend;
        // font loading panics on hosts without system fonts
        match panic::catch_unwind(panic::AssertUnwindSafe(|| backend.draw_text(text, &font, pos))) {
            Ok(result) => self.record(result),
            Err(_) => debug!(text, "label skipped: font backend panicked"),
        }
    }

    fn fill_path(&mut self, points: &[Point], fill: Color) {
        let pen = self.pen(fill, 1.0);
        let coords: Vec<BackendCoord> = points.iter().map(|&p| self.coord(p)).collect();
        let result = self.backend.fill_polygon(coords, &pen);
        self.record(result);
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        if let Dash::Dashed { .. } = stroke.dash {
            for pair in points.windows(2) {
                self.draw_line(pair[0], pair[1], stroke);
            }
            return;
        }
        let pen = self.pen(stroke.color, stroke.width);
        let coords: Vec<BackendCoord> = points.iter().map(|&p| self.coord(p)).collect();
        let result = self.backend.draw_path(coords, &pen);
        self.record(result);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color) {
        let pen = self.pen(fill, 1.0);
        let radius = (radius * self.scale).round().max(1.0) as u32;
        let center = self.coord(center);
        let result = self.backend.draw_circle(center, radius, &pen, true);
        self.record(result);
    }
}
