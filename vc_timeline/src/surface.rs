//! Drawing capability shared by every renderer, plus an in-memory recorder.

use serde::{Deserialize, Serialize};

pub type Point = (f64, f64);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS `rgba()` form, as accepted by canvas fill/stroke styles.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Parse `#rrggbb` / `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum Dash {
    Solid,
    Dashed { on: f64, off: f64 },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: Dash,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Dash::Solid,
        }
    }

    pub fn dashed(color: Color, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Dash::Dashed { on, off },
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size_px: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// Minimal 2d drawing target. Coordinates are CSS pixels once
/// [`Surface::set_transform`] has applied the device pixel ratio.
pub trait Surface {
    /// Backing-store size in device pixels.
    fn backing_size(&self) -> (u32, u32);
    /// Wipe the whole backing store, regardless of the current transform.
    fn clear(&mut self);
    /// Replace the current transform with a uniform scale.
    fn set_transform(&mut self, scale: f64);
    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke);
    fn draw_rect(&mut self, origin: Point, size: (f64, f64), fill: Color);
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);
    fn fill_path(&mut self, points: &[Point], fill: Color);
    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke);
    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color);
}

/// Clear the surface and install the pixel-ratio transform.
pub fn begin_frame<S: Surface + ?Sized>(surface: &mut S, pixel_ratio: f64) {
    surface.clear();
    surface.set_transform(pixel_ratio);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear,
    SetTransform(f64),
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        origin: Point,
        size: (f64, f64),
        fill: Color,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
    FillPath {
        points: Vec<Point>,
        fill: Color,
    },
    StrokePath {
        points: Vec<Point>,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
}

/// Surface that keeps the calls issued since the last clear.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    size: (u32, u32),
    calls: Vec<DrawCall>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            calls: Vec::new(),
            clears: 0,
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn is_untouched(&self) -> bool {
        self.calls.is_empty() && self.clears == 0
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count_where(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}

impl Surface for RecordingSurface {
    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self) {
        self.calls.clear();
        self.clears += 1;
        self.calls.push(DrawCall::Clear);
    }

    fn set_transform(&mut self, scale: f64) {
        self.calls.push(DrawCall::SetTransform(scale));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.calls.push(DrawCall::Line {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn draw_rect(&mut self, origin: Point, size: (f64, f64), fill: Color) {
        self.calls.push(DrawCall::Rect { origin, size, fill });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            at,
            style: *style,
        });
    }

    fn fill_path(&mut self, points: &[Point], fill: Color) {
        self.calls.push(DrawCall::FillPath {
            points: points.to_vec(),
            fill,
        });
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        self.calls.push(DrawCall::StrokePath {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            fill,
        });
    }
}
