use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::config::StarfieldConfig;
use crate::fps::FpsMonitor;
use crate::frame::{draw_frame, FrameClock, Surface};
use crate::profile::{resolve_render_profile, CapabilityQuery, RenderProfile};
use crate::stars::{build_stars, StarPopulation, StarRng};

/// Handle returned by the host's frame scheduler
pub type FrameToken = i32;

pub type FrameCallback = Rc<dyn Fn(f64)>;
pub type ResizeCallback = Rc<dyn Fn()>;

/// Everything the engine needs from the page it is mounted on
pub trait Host: 'static {
    type Surface: Surface;
    type Hints: CapabilityQuery;
    /// Keeps a size subscription alive until handed back to `unobserve_size`
    type SizeWatch;

    fn surface(&self) -> &Self::Surface;
    fn capabilities(&self) -> Self::Hints;

    /// Displayed size of the drawing surface in CSS pixels
    fn surface_size(&self) -> (f64, f64);

    /// Size the backing buffer in device pixels and scale drawing by `pixel_ratio`
    fn resize_backing(&self, width: u32, height: u32, pixel_ratio: f64);

    /// Run `tick` once on the next animation frame
    fn request_frame(&self, tick: FrameCallback) -> FrameToken;
    fn cancel_frame(&self, token: FrameToken);

    fn observe_size(&self, on_resize: ResizeCallback) -> Self::SizeWatch;
    fn unobserve_size(&self, watch: Self::SizeWatch);
}

struct EngineState<W> {
    width: f64,
    height: f64,
    profile: Option<RenderProfile>,
    frame_interval_ms: f64,
    population: StarPopulation,
    frame_token: Option<FrameToken>,
    size_watch: Option<W>,
    running: bool,
    clock: FrameClock,
    rng: StarRng,
    fps: Option<FpsMonitor>,
}

struct EngineInner<H: Host> {
    host: H,
    config: StarfieldConfig,
    state: RefCell<EngineState<H::SizeWatch>>,
    tick: FrameCallback,
    on_resize: ResizeCallback,
}

/// Public engine handle. An engine built without a usable drawing context
/// is inert: `start` and `stop` do nothing.
pub struct StarfieldEngine<H: Host> {
    inner: Option<Rc<EngineInner<H>>>,
}

impl<H: Host> StarfieldEngine<H> {
    pub fn new(host: H, config: StarfieldConfig, rng: StarRng) -> Self {
        let fps = config.fps_monitor.then(FpsMonitor::default);
        let inner = Rc::new_cyclic(|weak: &Weak<EngineInner<H>>| {
            let tick_ref = weak.clone();
            let tick: FrameCallback = Rc::new(move |timestamp| {
                if let Some(engine) = tick_ref.upgrade() {
                    engine.render(timestamp);
                }
            });
            let resize_ref = weak.clone();
            let on_resize: ResizeCallback = Rc::new(move || {
                if let Some(engine) = resize_ref.upgrade() {
                    if engine.state.borrow().running {
                        engine.resize();
                    }
                }
            });

            EngineInner {
                host,
                config,
                state: RefCell::new(EngineState {
                    width: 0.0,
                    height: 0.0,
                    profile: None,
                    frame_interval_ms: 0.0,
                    population: StarPopulation::default(),
                    frame_token: None,
                    size_watch: None,
                    running: false,
                    clock: FrameClock::default(),
                    rng,
                    fps,
                }),
                tick,
                on_resize,
            }
        });
        Self { inner: Some(inner) }
    }

    pub fn inert() -> Self {
        Self { inner: None }
    }

    pub fn start(&self) {
        if let Some(inner) = &self.inner {
            inner.start();
        }
    }

    pub fn stop(&self) {
        if let Some(inner) = &self.inner {
            inner.stop();
        }
    }
}

impl<H: Host> Drop for StarfieldEngine<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<H: Host> EngineInner<H> {
    fn start(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.running {
                return;
            }
            state.running = true;
            state.clock.reset();
            if let Some(fps) = state.fps.as_mut() {
                fps.reset();
            }
        }

        self.resize();

        let watch = self.host.observe_size(self.on_resize.clone());
        let token = self.host.request_frame(self.tick.clone());

        let mut state = self.state.borrow_mut();
        state.size_watch = Some(watch);
        state.frame_token = Some(token);
        info!("starfield started ({} stars)", state.population.stars.len());
    }

    fn stop(&self) {
        let (token, watch) = {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return;
            }
            state.running = false;
            (state.frame_token.take(), state.size_watch.take())
        };

        if let Some(token) = token {
            self.host.cancel_frame(token);
        }
        if let Some(watch) = watch {
            self.host.unobserve_size(watch);
        }
        info!("starfield stopped");
    }

    /// Re-read the surface size and rebuild profile, backing buffer and
    /// population. Zero-area layouts are skipped and keep the old field.
    fn resize(&self) {
        let (width, height) = self.host.surface_size();
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            debug!("starfield resize skipped for {}x{} surface", width, height);
            return;
        }

        let hints = self.host.capabilities();
        let profile = resolve_render_profile(&hints, &self.config, width, height);
        let pixel_ratio = profile.pixel_ratio(hints.device_pixel_ratio());
        self.host.resize_backing(
            (width * pixel_ratio).floor() as u32,
            (height * pixel_ratio).floor() as u32,
            pixel_ratio,
        );

        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        if state.profile.map(|p| p.tier) != Some(profile.tier) {
            info!(
                "starfield profile: tier={} stars={}..={} fps={} dpr<={}",
                profile.tier.label(),
                profile.min_stars,
                profile.max_stars,
                profile.target_fps,
                profile.max_pixel_ratio,
            );
        }

        state.width = width;
        state.height = height;
        state.frame_interval_ms = profile.frame_interval_ms();
        state.population = build_stars(width, height, &profile, &self.config.layers, &mut state.rng);
        state.profile = Some(profile);
        debug!(
            "starfield rebuilt for {}x{}: {} stars {:?}",
            width,
            height,
            state.population.stars.len(),
            state.population.layer_counts,
        );
    }

    fn render(&self, timestamp: f64) {
        let mut state = self.state.borrow_mut();
        // A tick that outlived `stop` must not revive the loop
        if !state.running {
            return;
        }

        let interval = state.frame_interval_ms;
        if let Some(elapsed) = state.clock.advance(timestamp, interval) {
            draw_frame(self.host.surface(), &state.population.stars, elapsed, state.width, state.height);
            if let Some(snapshot) = state.fps.as_mut().and_then(|fps| fps.record(timestamp)) {
                debug!("starfield fps={} frame={}ms", snapshot.fps, snapshot.frame_ms);
            }
        }

        state.frame_token = Some(self.host.request_frame(self.tick.clone()));
    }
}
