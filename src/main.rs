//! Prime Spiral entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use prime_spiral::{CanvasSize, CancelToken};
    use prime_spiral::platform::browser::{BrowserScheduler, FrameCallback};
    use prime_spiral::platform::{FrameLoop, SetupError};
    use prime_spiral::renderer::BlockRenderState;
    use prime_spiral::renderer::overlay::{LabelOverlay, WebSink};
    use prime_spiral::settings::Settings;
    use prime_spiral::sim::SpiralState;

    const CANVAS_ID: &str = "canvas";

    type WebLoop = FrameLoop<WebSink, BrowserScheduler>;

    /// Everything a mounted spiral keeps alive
    struct Mounted {
        window: web_sys::Window,
        frame_loop: Rc<RefCell<WebLoop>>,
        token: CancelToken,
        frame_callback: Rc<RefCell<Option<FrameCallback>>>,
        resize_listener: Closure<dyn FnMut(web_sys::Event)>,
    }

    thread_local! {
        static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            // Logger survives a remount
            log::debug!("Logger already initialized");
        }

        log::info!("Prime Spiral starting...");
        teardown();

        match mount().await {
            Ok(mounted) => {
                MOUNTED.with(|slot| *slot.borrow_mut() = Some(mounted));
                log::info!("Prime Spiral running!");
            }
            Err(e) => log::error!("Prime Spiral failed to start: {}", e),
        }
    }

    /// Stop the loop and release the canvas, overlay and callbacks
    pub fn teardown() {
        let Some(mounted) = MOUNTED.with(|slot| slot.borrow_mut().take()) else {
            return;
        };

        mounted.token.cancel();
        match mounted.frame_loop.try_borrow_mut() {
            Ok(mut frame_loop) => frame_loop.stop(),
            // Called from inside a frame; the cancelled token stops the next one
            Err(_) => log::warn!("Teardown during a frame"),
        }
        if let Err(e) = mounted.window.remove_event_listener_with_callback(
            "resize",
            mounted.resize_listener.as_ref().unchecked_ref(),
        ) {
            log::warn!("Could not remove resize listener: {:?}", e);
        }
        mounted.frame_callback.borrow_mut().take();
        log::info!("Prime Spiral torn down");
    }

    /// Canvas size in CSS pixels, falling back to the default when unlaid-out
    fn css_size(canvas: &HtmlCanvasElement) -> CanvasSize {
        let size = CanvasSize::new(
            canvas.client_width().max(0) as u32,
            canvas.client_height().max(0) as u32,
        );
        if size.is_empty() {
            CanvasSize::default()
        } else {
            size
        }
    }

    /// Match the canvas backing store to its CSS size
    fn size_backing_store(canvas: &HtmlCanvasElement, size: CanvasSize, dpr: f64) {
        canvas.set_width(((size.width as f64 * dpr).round() as u32).max(1));
        canvas.set_height(((size.height as f64 * dpr).round() as u32).max(1));
    }

    async fn mount() -> Result<Mounted, SetupError> {
        let window = web_sys::window().ok_or(SetupError::NoWindow)?;
        let document = window.document().ok_or(SetupError::NoWindow)?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| SetupError::NoCanvas(CANVAS_ID.to_string()))?;

        // The query override is for this page load only; store without it
        let stored = Settings::load();
        stored.save();
        let settings = stored.with_query_overrides();

        let dpr = window.device_pixel_ratio();
        let size = css_size(&canvas);
        size_backing_store(&canvas, size, dpr);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SetupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::Adapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let capacity = u32::try_from(settings.max_numbers).unwrap_or(u32::MAX);
        let blocks = BlockRenderState::new(
            surface,
            &adapter,
            size,
            dpr,
            capacity,
            settings.colors().background,
        )
        .await?;
        let labels = LabelOverlay::attach(&document, &canvas)?;

        let state = SpiralState::new(settings, size);
        let scheduler = BrowserScheduler::new(window.clone());
        let frame_callback = scheduler.callback_slot();
        let frame_loop = Rc::new(RefCell::new(FrameLoop::new(
            state,
            WebSink::new(blocks, labels),
            scheduler,
        )));

        // Frame callback holds the loop weakly so teardown can drop it
        {
            let weak = Rc::downgrade(&frame_loop);
            let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                let Some(frame_loop) = weak.upgrade() else {
                    return;
                };
                let Ok(mut frame_loop) = frame_loop.try_borrow_mut() else {
                    log::warn!("Frame delivered while the loop was busy");
                    return;
                };
                if let Err(e) = frame_loop.on_frame(time) {
                    log::error!("Frame loop stopped: {}", e);
                }
            });
            *frame_callback.borrow_mut() = Some(callback);
        }

        // Resize: resize the backing store now, the state at the next tick
        let resize_listener = {
            let weak = Rc::downgrade(&frame_loop);
            let window = window.clone();
            let canvas = canvas.clone();
            Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(frame_loop) = weak.upgrade() else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let size = css_size(&canvas);
                size_backing_store(&canvas, size, dpr);
                if let Ok(mut frame_loop) = frame_loop.try_borrow_mut() {
                    frame_loop.sink_mut().blocks.set_pixel_ratio(dpr);
                    frame_loop.queue_resize(size);
                }
            })
        };
        window
            .add_event_listener_with_callback("resize", resize_listener.as_ref().unchecked_ref())
            .map_err(|e| SetupError::Dom(format!("{:?}", e)))?;

        let started = frame_loop.borrow_mut().start();
        if let Err(e) = started {
            let _ = window.remove_event_listener_with_callback(
                "resize",
                resize_listener.as_ref().unchecked_ref(),
            );
            frame_callback.borrow_mut().take();
            return Err(e.into());
        }

        let token = frame_loop.borrow().token();
        Ok(Mounted {
            window,
            frame_loop,
            token,
            frame_callback,
            resize_listener,
        })
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    web::run().await;
}

/// Stop the spiral and remove everything it added to the page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn teardown() {
    web::teardown();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use prime_spiral::platform::ManualScheduler;
    use prime_spiral::renderer::HeadlessSink;
    use prime_spiral::{CanvasSize, FrameLoop, Settings, sim::SpiralState};

    /// Simulated display refresh rate
    const FPS: f64 = 60.0;
    const DEFAULT_SECONDS: f64 = 30.0;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Prime Spiral (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    let seconds = match std::env::args().nth(1).map(|arg| arg.parse::<f64>()) {
        Some(Ok(s)) if s.is_finite() && s > 0.0 => s,
        Some(_) => {
            log::warn!("Expected a positive number of seconds, using {}", DEFAULT_SECONDS);
            DEFAULT_SECONDS
        }
        None => DEFAULT_SECONDS,
    };

    let settings = Settings::load();
    let theme = settings.colors();
    let state = SpiralState::new(settings, CanvasSize::default());
    let mut frame_loop = FrameLoop::new(state, HeadlessSink::new(), ManualScheduler::new());

    if let Err(e) = frame_loop.start() {
        log::error!("Could not start: {}", e);
        std::process::exit(1);
    }

    let frames = (seconds * FPS).ceil() as u64;
    for frame in 0..frames {
        if frame_loop.scheduler_mut().deliver().is_none() {
            break;
        }
        if let Err(e) = frame_loop.on_frame(frame as f64 * 1000.0 / FPS) {
            log::error!("Stopped at frame {}: {}", frame, e);
            break;
        }
    }
    frame_loop.stop();

    let state = frame_loop.state();
    let sink = frame_loop.sink();
    log::info!(
        "{:.1}s simulated: {} numbers revealed ({} prime), last {}, scale {:.4}, rate {:.1}/s",
        seconds,
        state.revealed(),
        sink.rects_with_color(theme.prime),
        state.last_number,
        state.scale(),
        state.pacer.rate()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
