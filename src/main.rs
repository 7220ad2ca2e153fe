//! Marble Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlInputElement;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use marble_run::physics::{CommandPose, CourseGround, MarbleBody};
    use marble_run::sim::{
        CameraRig, CourseRuntime, FrameClock, FrameInput, ObstacleToggles, Player, RunPhase,
        RunState, ToggleUpdate, frame,
    };
    use marble_run::Settings;

    /// Game instance holding all state
    struct Game {
        state: RunState,
        course: CourseRuntime<CommandPose>,
        player: Player<MarbleBody>,
        ground: CourseGround,
        input: FrameInput,
        settings: Settings,
        rng: Pcg32,
        camera: CameraRig,
        last_time: f64,
        menu_open: bool,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let state = RunState::with_toggles(settings.segment_count, settings.toggles);
            Self {
                ground: CourseGround::new(state.segment_count),
                state,
                course: CourseRuntime::new(),
                player: Player::new(MarbleBody::new()),
                input: FrameInput::default(),
                settings,
                rng: Pcg32::seed_from_u64(js_sys::Date::now() as u64),
                camera: CameraRig {
                    position: glam::Vec3::new(10.0, 10.0, 10.0),
                    look_at: glam::Vec3::ZERO,
                },
                last_time: 0.0,
                menu_open: false,
            }
        }

        /// Advance the simulation by one rendered frame
        fn update(&mut self, time_ms: f64) {
            let dt = if self.last_time > 0.0 {
                (((time_ms - self.last_time) / 1000.0) as f32).min(0.1)
            } else {
                1.0 / 60.0
            };
            self.last_time = time_ms;

            // Menu pauses input, not the obstacle clock
            let input = if self.menu_open {
                FrameInput::default()
            } else {
                self.input
            };

            self.camera = frame(
                &mut self.state,
                &mut self.course,
                &mut self.player,
                &input,
                &self.ground,
                &mut |_, _| CommandPose::default(),
                &mut self.rng,
                FrameClock {
                    now_ms: js_sys::Date::now(),
                    elapsed_secs: (time_ms / 1000.0) as f32,
                    dt,
                },
            );

            // Reference backing only; a real engine would own this step
            self.player.body.step(dt, &self.ground);

            self.input.clear_one_shot();
        }

        /// Push timer / restart affordance into the HUD
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("time") {
                let secs = self.state.elapsed_secs(js_sys::Date::now());
                el.set_text_content(Some(&format!("{secs:.2}")));
            }

            if let Some(el) = document.get_element_by_id("restart") {
                let hidden = self.state.phase != RunPhase::Ended;
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }

            if let Some(el) = document.get_element_by_id("controls") {
                let _ = el
                    .class_list()
                    .toggle_with_force("hidden", !self.settings.show_helpers);
            }

            // Bridge for the external renderer: smoothed camera rig
            if let Some(el) = document.get_element_by_id("scene") {
                let c = self.camera;
                let _ = el.set_attribute(
                    "data-camera",
                    &format!(
                        "{:.3},{:.3},{:.3};{:.3},{:.3},{:.3}",
                        c.position.x,
                        c.position.y,
                        c.position.z,
                        c.look_at.x,
                        c.look_at.y,
                        c.look_at.z
                    ),
                );
            }
        }

        /// Apply the menu's toggle checkboxes; rejected updates leave the
        /// checkboxes untouched so the UI snaps back on next open.
        fn save_menu(&mut self) {
            if let Some(show) = read_checkbox("toggle-helpers") {
                self.settings.show_helpers = show;
            }
            let toggles = read_menu_toggles().unwrap_or(self.state.toggles);
            if self.state.update_toggles(ToggleUpdate::all(toggles)) {
                self.settings.toggles = self.state.toggles;
            } else {
                log::warn!("toggle update rejected: at least one obstacle kind must stay enabled");
            }
            self.settings.save();
            self.menu_open = false;
        }

        fn restart_from_ui(&mut self) {
            self.player.reset();
            self.state.restart(&mut self.rng);
            self.menu_open = false;
        }
    }

    fn read_checkbox(id: &str) -> Option<bool> {
        let document = web_sys::window()?.document()?;
        Some(
            document
                .get_element_by_id(id)?
                .dyn_into::<HtmlInputElement>()
                .ok()?
                .checked(),
        )
    }

    /// Read the three obstacle checkboxes from the menu modal
    fn read_menu_toggles() -> Option<ObstacleToggles> {
        Some(ObstacleToggles {
            limbo: read_checkbox("toggle-limbo")?,
            spinner: read_checkbox("toggle-spinner")?,
            axe: read_checkbox("toggle-axe")?,
        })
    }

    fn write_checkbox(id: &str, value: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id(id) {
            if let Ok(input) = el.dyn_into::<HtmlInputElement>() {
                input.set_checked(value);
            }
        }
    }

    /// Reflect current toggles into the menu checkboxes
    fn write_menu_toggles(toggles: ObstacleToggles) {
        write_checkbox("toggle-limbo", toggles.limbo);
        write_checkbox("toggle-spinner", toggles.spinner);
        write_checkbox("toggle-axe", toggles.axe);
    }

    fn set_menu_visible(open: bool) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("menu-modal"))
        {
            let _ = el.class_list().toggle_with_force("hidden", !open);
        }
    }

    pub fn run() {
        console_log::init_with_level(log::Level::Info).expect("logger init");
        console_error_panic_hook::set_once();

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(settings)));

        setup_keyboard(game.clone());
        setup_menu(game.clone());

        {
            let g = game.borrow();
            write_menu_toggles(g.state.toggles);
            write_checkbox("toggle-helpers", g.settings.show_helpers);
        }
        request_animation_frame(game);

        log::info!("Marble Run running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Held movement keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "KeyW" | "ArrowUp" => g.input.forward = true,
                    "KeyS" | "ArrowDown" => g.input.backward = true,
                    "KeyA" | "ArrowLeft" => g.input.leftward = true,
                    "KeyD" | "ArrowRight" => g.input.rightward = true,
                    "Space" => {
                        if !event.repeat() {
                            g.input.jump = true;
                        }
                    }
                    "KeyR" => g.input.restart = true,
                    "KeyM" | "Escape" => {
                        g.menu_open = !g.menu_open;
                        if g.menu_open {
                            drop(g);
                            write_menu_toggles(game.borrow().state.toggles);
                            set_menu_visible(true);
                        } else {
                            set_menu_visible(false);
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "KeyW" | "ArrowUp" => g.input.forward = false,
                    "KeyS" | "ArrowDown" => g.input.backward = false,
                    "KeyA" | "ArrowLeft" => g.input.leftward = false,
                    "KeyD" | "ArrowRight" => g.input.rightward = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().menu_open = true;
                write_menu_toggles(game.borrow().state.toggles);
                set_menu_visible(true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("menu-save") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().save_menu();
                set_menu_visible(false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("menu-restart") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart_from_ui();
                set_menu_visible(false);
                log::info!("Run restarted from menu");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // HUD restart affordance (shown once the run has ended)
        if let Some(el) = document.get_element_by_id("restart") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart_from_ui();
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use marble_run::physics::{CommandPose, CourseGround, MarbleBody, RigidBody};
    use marble_run::sim::{CourseRuntime, FrameClock, FrameInput, Player, RunState, frame};

    env_logger::init();
    log::info!("Marble Run (native) starting...");
    log::info!("Run with `trunk serve` for the playable web version");

    // Headless smoke run: hold forward for a few seconds of frames
    let mut state = RunState::new(5);
    let mut course = CourseRuntime::new();
    let mut player = Player::new(MarbleBody::new());
    let ground = CourseGround::new(state.segment_count);
    let mut rng = Pcg32::seed_from_u64(1);

    let input = FrameInput {
        forward: true,
        ..Default::default()
    };
    let dt = 1.0 / 60.0;
    let mut now_ms = 0.0;
    for i in 0..600 {
        now_ms += f64::from(dt) * 1000.0;
        frame(
            &mut state,
            &mut course,
            &mut player,
            &input,
            &ground,
            &mut |_, _| CommandPose::default(),
            &mut rng,
            FrameClock {
                now_ms,
                elapsed_secs: i as f32 * dt,
                dt,
            },
        );
        player.body.step(dt, &ground);
    }

    println!(
        "phase {:?} after {:.2}s, marble at {:.2?}",
        state.phase,
        state.elapsed_secs(now_ms),
        player.body.translation()
    );
}
