use std::f64::consts::TAU;

use vc_timeline::surface::{Color, Dash, Point, Stroke, Surface, TextAlign, TextBaseline, TextStyle};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// 2d canvas context behind the `Surface` trait.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the backing store; the context resets, so the next frame redraws.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width);
        let pattern = js_sys::Array::new();
        if let Dash::Dashed { on, off } = stroke.dash {
            pattern.push(&JsValue::from_f64(on));
            pattern.push(&JsValue::from_f64(off));
        }
        self.ctx.set_line_dash(&pattern).ok();
    }

    fn trace(&self, points: &[Point]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.0, first.1);
        for p in rest {
            self.ctx.line_to(p.0, p.1);
        }
        true
    }
}

impl Surface for CanvasSurface {
    fn backing_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn set_transform(&mut self, scale: f64) {
        self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0).ok();
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }

    fn draw_rect(&mut self, origin: Point, size: (f64, f64), fill: Color) {
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx.fill_rect(origin.0, origin.1, size.0, size.1);
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx.set_font(&format!("{}px sans-serif", style.size_px));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline(match style.baseline {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        });
        self.ctx.fill_text(text, at.0, at.1).ok();
    }

    fn fill_path(&mut self, points: &[Point], fill: Color) {
        if self.trace(points) {
            self.ctx.close_path();
            self.ctx.set_fill_style_str(&fill.to_css());
            self.ctx.fill();
        }
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        if self.trace(points) {
            self.apply_stroke(stroke);
            self.ctx.stroke();
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color) {
        self.ctx.begin_path();
        if self.ctx.arc(center.0, center.1, radius, 0.0, TAU).is_ok() {
            self.ctx.set_fill_style_str(&fill.to_css());
            self.ctx.fill();
        }
    }
}
