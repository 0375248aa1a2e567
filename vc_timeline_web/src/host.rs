//! Canvas pair, frame scheduling and DOM observers shared by both chart classes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use vc_timeline::{
    ChartState, DirtyLayers, RedrawCause, RedrawScheduler, ScoreChart, Theme, TimelineChart,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, MutationObserver, MutationObserverInit};

use crate::canvas::CanvasSurface;

/// A chart that draws a background and a foreground layer.
pub trait Layered {
    fn state(&self) -> &ChartState;
    fn state_mut(&mut self) -> &mut ChartState;
    fn render(
        &mut self,
        back: &mut CanvasSurface,
        front: &mut CanvasSurface,
        theme: Theme,
        layers: DirtyLayers,
    );
}

impl Layered for ScoreChart {
    fn state(&self) -> &ChartState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ChartState {
        &mut self.state
    }

    fn render(
        &mut self,
        back: &mut CanvasSurface,
        front: &mut CanvasSurface,
        theme: Theme,
        layers: DirtyLayers,
    ) {
        self.draw(back, front, theme, layers);
    }
}

impl Layered for TimelineChart {
    fn state(&self) -> &ChartState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ChartState {
        &mut self.state
    }

    fn render(
        &mut self,
        back: &mut CanvasSurface,
        front: &mut CanvasSurface,
        theme: Theme,
        layers: DirtyLayers,
    ) {
        self.draw(back, front, theme, layers);
    }
}

struct Observers {
    on_resize: Closure<dyn FnMut()>,
    // kept alive for as long as the observer is connected
    _on_theme: Closure<dyn FnMut()>,
    theme_observer: MutationObserver,
}

pub struct Host<C> {
    pub chart: C,
    pub theme: Theme,
    back: CanvasSurface,
    front: CanvasSurface,
    scheduler: RedrawScheduler,
    frame: Option<i32>,
    observers: Option<Observers>,
}

pub type Shared<C> = Rc<RefCell<Host<C>>>;

impl<C: Layered> Host<C> {
    fn flush(&mut self) {
        self.frame = None;
        let layers = self.scheduler.take();
        if layers.is_empty() {
            return;
        }
        self.chart
            .render(&mut self.back, &mut self.front, self.theme, layers);
    }
}

/// Page theme from `<html class="dark">` or `<html data-theme="dark">`.
pub fn document_theme() -> Theme {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    let Some(root) = root else {
        return Theme::Light;
    };
    let dark_class = root.class_list().contains("dark");
    let data_theme = root.get_attribute("data-theme");
    theme_from_markers(dark_class, data_theme.as_deref())
}

pub fn theme_from_markers(dark_class: bool, data_theme: Option<&str>) -> Theme {
    let dark_attr = data_theme
        .map(|v| v.trim().eq_ignore_ascii_case("dark"))
        .unwrap_or(false);
    Theme::from_dark_flag(dark_class || dark_attr)
}

pub fn create<C: Layered + 'static>(
    chart: C,
    background: HtmlCanvasElement,
    foreground: HtmlCanvasElement,
) -> Result<Shared<C>, JsValue> {
    let host = Host {
        chart,
        theme: document_theme(),
        back: CanvasSurface::new(background)?,
        front: CanvasSurface::new(foreground)?,
        scheduler: RedrawScheduler::default(),
        frame: None,
        observers: None,
    };
    let shared = Rc::new(RefCell::new(host));
    refresh_size(&shared);
    request(&shared, RedrawCause::Data);
    Ok(shared)
}

/// Mark layers dirty and make sure exactly one frame is queued.
pub fn request<C: Layered + 'static>(shared: &Shared<C>, cause: RedrawCause) {
    if !shared.borrow_mut().scheduler.request(cause) {
        return;
    }
    let Some(window) = web_sys::window() else {
        shared.borrow_mut().flush();
        return;
    };
    let weak = Rc::downgrade(shared);
    let callback = Closure::once_into_js(move || {
        if let Some(shared) = weak.upgrade() {
            shared.borrow_mut().flush();
        }
    });
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => shared.borrow_mut().frame = Some(id),
        Err(err) => {
            warn!(?err, "requestAnimationFrame failed; drawing now");
            shared.borrow_mut().flush();
        }
    }
}

/// Re-measure the foreground canvas. Returns `true` when the backing size changed.
pub fn refresh_size<C: Layered>(shared: &Shared<C>) -> bool {
    let mut host = shared.borrow_mut();
    let rect = host.front.canvas().get_bounding_client_rect();
    let ratio = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    if !host.chart.state_mut().resize((rect.width(), rect.height()), ratio) {
        return false;
    }
    let (width, height) = host.chart.state().backing_size();
    debug!(width, height, ratio, "chart resized");
    host.back.resize(width, height);
    host.front.resize(width, height);
    true
}

pub fn resize<C: Layered + 'static>(shared: &Shared<C>) {
    if refresh_size(shared) {
        request(shared, RedrawCause::Resize);
    }
}

pub fn set_theme<C: Layered + 'static>(shared: &Shared<C>, theme: Theme) {
    let changed = {
        let mut host = shared.borrow_mut();
        let changed = host.theme != theme;
        host.theme = theme;
        changed
    };
    if changed {
        request(shared, RedrawCause::Theme);
    }
}

/// Listen for window resizes and page theme flips. Calling twice is a no-op.
pub fn attach<C: Layered + 'static>(shared: &Shared<C>) -> Result<(), JsValue> {
    if shared.borrow().observers.is_some() {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let root = window
        .document()
        .and_then(|d| d.document_element())
        .ok_or_else(|| JsValue::from_str("no document element"))?;

    let weak = Rc::downgrade(shared);
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Some(shared) = weak.upgrade() {
            resize(&shared);
        }
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

    let weak = Rc::downgrade(shared);
    let on_theme = Closure::<dyn FnMut()>::new(move || {
        if let Some(shared) = weak.upgrade() {
            set_theme(&shared, document_theme());
        }
    });
    let theme_observer = MutationObserver::new(on_theme.as_ref().unchecked_ref())?;
    let filter = js_sys::Array::of2(&JsValue::from_str("class"), &JsValue::from_str("data-theme"));
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_attribute_filter(&filter);
    theme_observer.observe_with_options(&root, &init)?;

    shared.borrow_mut().observers = Some(Observers {
        on_resize,
        _on_theme: on_theme,
        theme_observer,
    });
    Ok(())
}

/// Drop observers and any queued frame.
pub fn detach<C: Layered>(shared: &Shared<C>) {
    let mut host = shared.borrow_mut();
    if let Some(observers) = host.observers.take() {
        observers.theme_observer.disconnect();
        if let Some(window) = web_sys::window() {
            window
                .remove_event_listener_with_callback(
                    "resize",
                    observers.on_resize.as_ref().unchecked_ref(),
                )
                .ok();
        }
    }
    if let Some(id) = host.frame.take() {
        if let Some(window) = web_sys::window() {
            window.cancel_animation_frame(id).ok();
        }
    }
    host.scheduler.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_markers() {
        assert_eq!(theme_from_markers(true, None), Theme::Dark);
        assert_eq!(theme_from_markers(false, Some(" Dark ")), Theme::Dark);
        assert_eq!(theme_from_markers(false, Some("light")), Theme::Light);
        assert_eq!(theme_from_markers(false, None), Theme::Light);
    }
}
