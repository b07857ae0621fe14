//! Bounce Tap entry point
//!
//! The browser build drives the square from requestAnimationFrame and
//! pointer events. The native build runs it headless on a virtual clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PageTransitionEvent, PointerEvent};

    use bounce_tap::platform::web::BrowserHost;
    use bounce_tap::platform::{Driver, TimerKind};
    use bounce_tap::renderer::RenderState;
    use bounce_tap::sim::{Bouncer, Viewport};
    use bounce_tap::{Settings, speed_label};

    /// Everything the browser callbacks touch
    struct App {
        driver: Driver<BrowserHost>,
        render_state: Option<RenderState>,
        show_speed_label: bool,
        shown_speed: Option<u8>,
    }

    impl App {
        fn now_ms(&self) -> f64 {
            self.driver.host().now_ms()
        }

        /// Paint the latest snapshot and refresh the HUD
        fn present(&mut self) {
            let snap = self.driver.snapshot();
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&snap) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.update_hud(snap.speed_factor);
        }

        fn update_hud(&mut self, speed_factor: u8) {
            if !self.show_speed_label || self.shown_speed == Some(speed_factor) {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("speed-label") {
                el.set_text_content(Some(&speed_label(speed_factor)));
                self.shown_speed = Some(speed_factor);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Bounce Tap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Simulation runs in CSS pixels; the surface in device pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let viewport = Viewport::new(client_w as f32, client_h as f32);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let bouncer = Bouncer::new(viewport, &settings, seed);
        let driver = Driver::new(
            bouncer,
            BrowserHost::new(window.clone()),
            settings.long_press_ms,
        );

        let app = Rc::new(RefCell::new(App {
            driver,
            render_state: None,
            show_speed_label: settings.show_speed_label,
            shown_speed: None,
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, viewport).await;
        app.borrow_mut().render_state = Some(render_state);

        install_host_callbacks(&app);
        setup_input_handlers(&canvas, app.clone());
        setup_teardown(app.clone());

        {
            let mut a = app.borrow_mut();
            a.driver.start();
            a.present();
        }

        log::info!("Bounce Tap running!");
    }

    /// Frame and timeout callbacks hold a weak handle so the host never
    /// keeps the app alive on its own
    fn install_host_callbacks(app: &Rc<RefCell<App>>) {
        let weak: Weak<RefCell<App>> = Rc::downgrade(app);

        let frame_cb = {
            let weak = weak.clone();
            Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                if let Some(app) = weak.upgrade() {
                    let mut a = app.borrow_mut();
                    if a.driver.on_frame(time).is_some() {
                        a.present();
                    }
                }
            })
        };

        let timeout_cb = |kind: TimerKind| {
            let weak = weak.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = weak.upgrade() {
                    let mut a = app.borrow_mut();
                    let now = a.now_ms();
                    a.driver.on_timeout(kind, now);
                    a.present();
                }
            })
        };
        let single_tap_cb = timeout_cb(TimerKind::SingleTap);
        let long_press_cb = timeout_cb(TimerKind::LongPress);

        app.borrow_mut()
            .driver
            .host_mut()
            .install(frame_cb, single_tap_cb, long_press_cb);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer down - start press tracking
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let now = a.now_ms();
                a.driver.pointer_down(now);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up - completes a tap unless a long-press already fired
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let now = a.now_ms();
                if a.driver.pointer_up(now).is_some() {
                    a.present();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer cancel / leave - drop the press
        for event_name in ["pointercancel", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().driver.pointer_cancel();
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop scheduling before the page goes away. A page kept in the
    /// back/forward cache is only suspended and resumes on `pageshow`.
    fn setup_teardown(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                let mut a = app.borrow_mut();
                if event.persisted() {
                    log::info!("Page cached; suspending");
                    a.driver.suspend();
                } else {
                    a.driver.stop();
                }
            });
            let _ =
                window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
            if event.persisted() {
                let mut a = app.borrow_mut();
                log::info!("Page restored from cache; resuming");
                a.driver.start();
                a.present();
            }
        });
        let _ = window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use bounce_tap::platform::{Scripted, Simulation, plan_script};
    use bounce_tap::sim::Viewport;
    use bounce_tap::{Settings, speed_label};

    /// Run the bouncing square headless on a virtual 60 Hz clock
    #[derive(Parser, Debug)]
    #[command(name = "bounce-tap", version)]
    struct Args {
        /// Viewport width in pixels
        #[arg(long, default_value_t = 390.0)]
        width: f32,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 844.0)]
        height: f32,
        /// Virtual time to simulate
        #[arg(long, default_value_t = 5000.0)]
        duration_ms: f64,
        /// RNG seed (overrides the settings file)
        #[arg(long)]
        seed: Option<u64>,
        /// Settings JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Tap at this time (ms); repeatable
        #[arg(long = "tap", value_name = "MS")]
        taps: Vec<f64>,
        /// Start a long-press at this time (ms); repeatable
        #[arg(long = "long-press", value_name = "MS")]
        long_presses: Vec<f64>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let args = Args::parse();

        let settings = match &args.config {
            Some(path) => match Settings::load_from_path(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            },
            None => Settings::load(),
        };

        let seed = args.seed.or(settings.seed).unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        });

        log::info!(
            "Bounce Tap (native) {}x{} for {}ms, seed {}",
            args.width,
            args.height,
            args.duration_ms,
            seed
        );

        let script = plan_script(
            args.taps
                .iter()
                .map(|&t| Scripted::Tap(t))
                .chain(args.long_presses.iter().map(|&t| Scripted::LongPress(t)))
                .collect(),
            settings.long_press_ms,
        );

        let mut sim = Simulation::new(Viewport::new(args.width, args.height), &settings, seed);
        sim.play(&script, settings.long_press_ms);
        sim.advance_to(args.duration_ms);
        sim.stop();

        let snap = sim.snapshot();
        log::info!("{} frames, {} bounces", sim.frames(), sim.bounces());

        if args.json {
            match serde_json::to_string_pretty(&snap) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    log::error!("Failed to encode snapshot: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!(
                "square at ({:.1}, {:.1}) color {} {} | {}",
                snap.x,
                snap.y,
                snap.color_hex,
                if snap.moving { "moving" } else { "paused" },
                speed_label(snap.speed_factor)
            );
        }
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
