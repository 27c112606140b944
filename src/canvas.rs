use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ResizeObserver, Window};

use crate::config::StarfieldConfig;
use crate::engine::{FrameCallback, FrameToken, Host, ResizeCallback, StarfieldEngine};
use crate::error::{StarfieldError, StarfieldResult};
use crate::frame::Surface;
use crate::profile::DeviceHints;
use crate::stars::StarRng;

const CONFIG_ELEMENT_ID: &str = "starfield-config";

impl Surface for CanvasRenderingContext2d {
    fn clear(&self, width: f64, height: f64) {
        self.clear_rect(0.0, 0.0, width, height);
    }

    fn set_fill(&self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_alpha(&self, alpha: f64) {
        self.set_global_alpha(alpha);
    }

    fn fill_square(&self, x: f64, y: f64, half_side: f64) {
        self.fill_rect(x - half_side, y - half_side, half_side * 2.0, half_side * 2.0);
    }

    fn fill_circle(&self, x: f64, y: f64, radius: f64) {
        self.begin_path();
        let _ = self.arc(x, y, radius, 0.0, TAU);
        self.fill();
    }
}

/// How the canvas size is being watched
pub enum SizeWatch {
    Observer {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
    WindowResize(Closure<dyn FnMut(web_sys::Event)>),
}

/// A canvas element mounted in the page
pub struct BrowserHost {
    window: Window,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    pending_tick: Rc<RefCell<Option<FrameCallback>>>,
    frame_closure: Closure<dyn FnMut(f64)>,
}

impl BrowserHost {
    pub fn new(canvas: HtmlCanvasElement) -> StarfieldResult<Self> {
        let window = web_sys::window().ok_or(StarfieldError::NoWindow)?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| StarfieldError::ContextRequest(format!("{:?}", e)))?
            .ok_or(StarfieldError::NoContext)?
            .dyn_into()
            .map_err(|_| StarfieldError::NoContext)?;

        // One long-lived rAF closure; each request parks the tick it should run
        let pending_tick: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending = pending_tick.clone();
        let frame_closure = Closure::wrap(Box::new(move |timestamp: f64| {
            let tick = pending.borrow_mut().take();
            if let Some(tick) = tick {
                tick(timestamp);
            }
        }) as Box<dyn FnMut(f64)>);

        Ok(Self {
            window,
            canvas,
            context,
            pending_tick,
            frame_closure,
        })
    }
}

impl Host for BrowserHost {
    type Surface = CanvasRenderingContext2d;
    type Hints = DeviceHints;
    type SizeWatch = SizeWatch;

    fn surface(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    fn capabilities(&self) -> DeviceHints {
        let navigator = self.window.navigator();
        let cores = navigator.hardware_concurrency();
        // Not in web-sys; only Chromium reports it
        let memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|gb| *gb > 0.0);

        DeviceHints {
            cores: (cores.is_finite() && cores >= 1.0).then(|| cores as u32),
            memory_gb: memory,
            touch: navigator.max_touch_points() > 0,
            pixel_ratio: Some(self.window.device_pixel_ratio()),
        }
    }

    fn surface_size(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.width(), rect.height())
    }

    fn resize_backing(&self, width: u32, height: u32, pixel_ratio: f64) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let _ = self.context.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
    }

    fn request_frame(&self, tick: FrameCallback) -> FrameToken {
        *self.pending_tick.borrow_mut() = Some(tick);
        self.window
            .request_animation_frame(self.frame_closure.as_ref().unchecked_ref())
            .unwrap_or(0)
    }

    fn cancel_frame(&self, token: FrameToken) {
        let _ = self.window.cancel_animation_frame(token);
        self.pending_tick.borrow_mut().take();
    }

    fn observe_size(&self, on_resize: ResizeCallback) -> SizeWatch {
        let has_observer = js_sys::Reflect::has(&self.window, &JsValue::from_str("ResizeObserver")).unwrap_or(false);

        if has_observer {
            let cb = on_resize.clone();
            let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
                cb();
            }) as Box<dyn FnMut(js_sys::Array)>);

            if let Ok(observer) = ResizeObserver::new(callback.as_ref().unchecked_ref()) {
                observer.observe(&self.canvas);
                return SizeWatch::Observer {
                    observer,
                    _callback: callback,
                };
            }
        }

        info!("ResizeObserver unavailable, falling back to window resize");
        let callback = Closure::wrap(Box::new(move |_: web_sys::Event| {
            on_resize();
        }) as Box<dyn FnMut(web_sys::Event)>);
        let _ = self
            .window
            .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
        SizeWatch::WindowResize(callback)
    }

    fn unobserve_size(&self, watch: SizeWatch) {
        match watch {
            SizeWatch::Observer { observer, .. } => observer.disconnect(),
            SizeWatch::WindowResize(callback) => {
                let _ = self
                    .window
                    .remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
            }
        }
    }
}

/// Build an engine for `canvas`. Hosts that cannot hand out a 2d context get
/// an inert engine instead of an error.
pub fn create_starfield_engine(canvas: HtmlCanvasElement, config: StarfieldConfig) -> StarfieldEngine<BrowserHost> {
    match BrowserHost::new(canvas) {
        Ok(host) => StarfieldEngine::new(host, config, StarRng::from_entropy()),
        Err(e) => {
            warn!("starfield disabled: {}", e);
            StarfieldEngine::inert()
        }
    }
}

/// Optional `<script type="application/json" id="starfield-config">` override
pub fn read_page_config() -> StarfieldConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());

    match text {
        Some(json) => StarfieldConfig::from_json(&json).unwrap_or_else(|e| {
            warn!("{}; using defaults", e);
            StarfieldConfig::default()
        }),
        None => StarfieldConfig::default(),
    }
}
