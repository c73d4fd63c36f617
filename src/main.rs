//! Cyber Ops entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent};

    use cyber_ops::consts::INTEL_TIMEOUT_MS;
    use cyber_ops::hud::{signal_label, toggle_class_token};
    use cyber_ops::intel::{GeminiClient, IntelConfig, fetch_intel, is_online};
    use cyber_ops::persistence::LocalStorage;
    use cyber_ops::renderer::{Label, RenderOptions, RenderState, build_frame, shake_offset};
    use cyber_ops::session::{BriefingView, format_score};
    use cyber_ops::{FactRequest, GamePhase, Session, Settings, Viewport};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorage>,
        settings: Settings,
        options: RenderOptions,
        render_state: Option<RenderState>,
        overlay: Option<CanvasRenderingContext2d>,
        /// Camera jitter only; kept apart from the simulation RNG
        fx_rng: Pcg32,
        /// Pending requestAnimationFrame handle
        raf_handle: Option<i32>,
        running: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(viewport: Viewport, seed: u64) -> Self {
            let mut prefs = LocalStorage::open();
            let settings = Settings::load(&prefs);
            // Write back so a fresh profile gets editable defaults
            settings.save(&mut prefs);
            Self {
                session: Session::new(viewport, seed, LocalStorage::open()),
                options: RenderOptions::from_settings(&settings),
                settings,
                render_state: None,
                overlay: None,
                fx_rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
                raf_handle: None,
                running: true,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Oldest sample is the one we are about to overwrite next
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let jitter = shake_offset(self.session.state().screen_shake, &mut self.fx_rng);
            let frame = build_frame(self.session.state(), jitter, &self.options);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame.vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size, render_state.logical);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.draw_labels(&frame.labels);
        }

        /// Draw text labels onto the 2D overlay canvas
        fn draw_labels(&self, labels: &[Label]) {
            let Some(ctx) = &self.overlay else {
                return;
            };
            let viewport = self.session.state().viewport;
            ctx.clear_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
            ctx.set_font("bold 10px monospace");
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            for label in labels {
                let [r, g, b, a] = label.color;
                ctx.set_fill_style_str(&format!(
                    "rgba({}, {}, {}, {})",
                    (r * 255.0) as u8,
                    (g * 255.0) as u8,
                    (b * 255.0) as u8,
                    a
                ));
                let _ = ctx.fill_text(label.text, label.pos.x as f64, label.pos.y as f64);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let phase = self.session.phase();

            set_text(&document, "hud-score", &format_score(self.session.score()));
            set_text(&document, "hud-high-score", &format_score(self.session.high_score()));
            if self.settings.show_fps {
                set_text(&document, "hud-fps", &self.fps.to_string());
            }
            set_visible(&document, "hud-fps", self.settings.show_fps);
            set_text(&document, "hud-signal", signal_label(is_online()));

            set_visible(&document, "hud", phase != GamePhase::Start);
            set_visible(&document, "start-screen", phase == GamePhase::Start);

            set_visible(&document, "game-over", phase == GamePhase::GameOver);
            if phase == GamePhase::GameOver {
                set_text(&document, "final-score", &format_score(self.session.score()));
                set_text(
                    &document,
                    "final-high-score",
                    &format_score(self.session.high_score()),
                );
            }

            let briefing = self.session.briefing();
            set_visible(&document, "briefing", briefing.is_some());
            match briefing {
                Some(BriefingView::Loading) => {
                    set_text(&document, "briefing-status", "DECRYPTING INTEL...");
                    set_visible(&document, "briefing-body", false);
                    set_visible(&document, "continue-btn", false);
                }
                Some(BriefingView::Ready(brief)) => {
                    set_text(&document, "briefing-status", "INTEL SECURED");
                    set_text(&document, "briefing-topic", &brief.topic);
                    set_text(&document, "briefing-fact", &brief.fact);
                    set_text(&document, "briefing-category", brief.category.as_str());
                    set_text(&document, "briefing-emoji", &brief.fun_emoji);
                    set_text(&document, "briefing-threat", brief.threat_level.as_str());
                    set_visible(&document, "briefing-body", true);
                    set_visible(&document, "continue-btn", true);
                }
                Some(BriefingView::Interrupted) => {
                    set_text(&document, "briefing-status", "SIGNAL INTERRUPTED");
                    set_visible(&document, "briefing-body", false);
                    set_visible(&document, "continue-btn", true);
                }
                None => {}
            }
        }

        /// Match canvas backing stores to their CSS size
        fn fit_canvases(&mut self, canvas: &HtmlCanvasElement, overlay: Option<&HtmlCanvasElement>) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width().max(1);
            let client_h = canvas.client_height().max(1);
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(overlay) = overlay {
                overlay.set_width(width);
                overlay.set_height(height);
            }
            if let Some(ctx) = &self.overlay {
                let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            }

            let logical = (client_w as f32, client_h as f32);
            self.session.resize(Viewport::new(logical.0, logical.1));
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize((width, height), logical);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Toggle only the `hidden` class so layout classes like `panel` survive
    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let current = el.get_attribute("class").unwrap_or_default();
            let next = toggle_class_token(&current, "hidden", !visible);
            if next != current {
                let _ = el.set_attribute("class", &next);
            }
        }
    }

    fn get_canvas(document: &Document, id: &str) -> Option<HtmlCanvasElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Cyber Ops starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas = get_canvas(&document, "canvas").expect("no canvas");
        let overlay_canvas = get_canvas(&document, "overlay");

        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );
        let game = Rc::new(RefCell::new(Game::new(viewport, seed)));
        log::info!("Session initialized with seed: {}", seed);

        game.borrow_mut().overlay = overlay_canvas.as_ref().and_then(|c| {
            c.get_context("2d")
                .ok()
                .flatten()?
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()
        });
        game.borrow_mut()
            .fit_canvases(&canvas, overlay_canvas.as_ref());

        match init_gpu(&canvas, viewport).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("WebGPU unavailable, running without graphics: {}", e),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(canvas.clone(), overlay_canvas, game.clone());
        setup_lifecycle(game.clone());

        request_animation_frame(game);

        log::info!("Cyber Ops running!");
    }

    async fn init_gpu(
        canvas: &HtmlCanvasElement,
        viewport: Viewport,
    ) -> Result<RenderState, cyber_ops::renderer::RenderError> {
        use cyber_ops::renderer::RenderError;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::NoAdapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(
            surface,
            &adapter,
            (canvas.width(), canvas.height()),
            (viewport.width, viewport.height),
        )
        .await
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move steers and fires
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .session
                    .pointer_move(event.offset_x() as f32, event.time_stamp());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click fires
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().session.pointer_click(event.time_stamp());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().session.start();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("continue-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(
        canvas: HtmlCanvasElement,
        overlay: Option<HtmlCanvasElement>,
        game: Rc<RefCell<Game>>,
    ) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().fit_canvases(&canvas, overlay.as_ref());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop the loop when the page is torn down, restart it if restored
    fn setup_lifecycle(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.running = false;
                if let Some(handle) = g.raf_handle.take()
                    && let Some(window) = web_sys::window()
                {
                    let _ = window.cancel_animation_frame(handle);
                }
                log::info!("Page hidden, frame loop stopped");
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let restart = {
                    let mut g = game.borrow_mut();
                    let restart = !g.running;
                    g.running = true;
                    restart
                };
                if restart {
                    log::info!("Page restored, frame loop resumed");
                    request_animation_frame(game.clone());
                }
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Ok(handle) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            handle_game.borrow_mut().raf_handle = Some(handle);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let fact_request = {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            if !g.running {
                return;
            }

            let output = g.session.frame(time);
            if output.new_high_score {
                log::debug!("New high score: {}", g.session.high_score());
            }
            g.track_fps(time);
            g.render();
            g.update_hud();
            output.fact_request
        };

        if let Some(request) = fact_request {
            request_intel(game.clone(), request);
        }

        request_animation_frame(game);
    }

    /// Fetch a briefing in the background and hand it to the session.
    ///
    /// The fetch has no timeout of its own, so a watchdog flips the overlay to
    /// its interrupted state if nothing arrives in time. A late briefing for
    /// the same break still replaces it.
    fn request_intel(game: Rc<RefCell<Game>>, request: FactRequest) {
        let seed = game.borrow_mut().session.rng_mut().random::<u64>();

        if let Some(window) = web_sys::window() {
            let watchdog_game = game.clone();
            let ticket = request.ticket;
            let watchdog = Closure::once(move || {
                watchdog_game.borrow_mut().session.fact_failed(ticket);
            });
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    watchdog.as_ref().unchecked_ref(),
                    INTEL_TIMEOUT_MS,
                )
                .is_err()
            {
                log::warn!("Could not arm intel watchdog");
            }
            watchdog.forget();
        }

        wasm_bindgen_futures::spawn_local(async move {
            let client = GeminiClient::new(IntelConfig::from_build_env());
            let mut rng = Pcg32::seed_from_u64(seed);
            let brief = fetch_intel(&client, &request.topic, &mut rng).await;
            game.borrow_mut().session.deliver_fact(request.ticket, brief);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cyber Ops (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    autopilot_mission(42, 60 * 120);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fly a headless mission with a simple tracking autopilot and log the result
#[cfg(not(target_arch = "wasm32"))]
fn autopilot_mission(seed: u64, frames: u32) {
    use cyber_ops::persistence::MemoryStore;
    use cyber_ops::sim::GameEvent;
    use cyber_ops::{GamePhase, Session, Viewport, intel};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut session = Session::new(Viewport::default(), seed, MemoryStore::new());
    session.start();

    let mut kills = 0u32;
    let mut briefings = 0u32;
    for frame in 0..frames {
        let now = frame as f64 * FRAME_MS;

        // Chase the lowest enemy
        let target = session
            .state()
            .enemies
            .iter()
            .max_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y))
            .map(|e| e.bounds.center().x);
        if let Some(x) = target {
            session.pointer_move(x, now);
        }

        let output = session.frame(now);
        kills += output
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .count() as u32;
        if let Some(request) = output.fact_request {
            briefings += 1;
            let brief = intel::fallback_brief(session.rng_mut());
            log::info!("Briefing on {}: {}", request.topic, brief.topic);
            session.deliver_fact(request.ticket, brief);
            session.resume();
        }
        if session.phase() == GamePhase::GameOver {
            log::info!("Mission failed after {} frames", frame);
            break;
        }
    }

    println!(
        "Autopilot: score {} (high {}), {} kills, {} briefings",
        cyber_ops::session::format_score(session.score()),
        session.high_score(),
        kills,
        briefings
    );
}
