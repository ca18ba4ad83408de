//! Poppies Run entry point
//!
//! On the web this wires the simulation to the page: keyboard and touch
//! buttons in, HUD text and the leaderboard out. Natively it plays a
//! seeded run with a simple autopilot and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use poppies_run::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use poppies_run::platform::{Button, FrameClock, InputState, run_frame};
    use poppies_run::sim::{GameEvent, GamePhase, GameState};
    use poppies_run::{Leaderboard, Settings, leaderboard};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        clock: FrameClock,
        input: InputState,
        store: Box<dyn KeyValueStore>,
        settings: Settings,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let mut store: Box<dyn KeyValueStore> = match LocalStore::open() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    log::warn!("LocalStorage unavailable ({e}), scores will not persist");
                    Box::new(MemoryStore::new())
                }
            };
            let settings = Settings::load(store.as_ref());
            // Write back so every field is present for hand editing
            settings.save(store.as_mut());
            let mut state = GameState::new(seed);
            state.high_score = leaderboard::load_best_score(store.as_ref());

            Self {
                state,
                clock: FrameClock::new(settings.frame_cap_ms()),
                input: InputState::new(),
                store,
                settings,
            }
        }

        fn frame(&mut self, now_ms: f64) {
            let events = run_frame(&mut self.state, &mut self.clock, &mut self.input, now_ms);
            for event in events {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::ScoreChanged(score) => set_text("hud-score", &format!("Score: {score}")),
                GameEvent::LevelChanged(level) => set_text("hud-level", &format!("Level: {level}")),
                GameEvent::LevelComplete(_) | GameEvent::GameWon => {
                    leaderboard::save_best_score(self.store.as_mut(), self.state.score);
                    set_text("hud-best", &format!("Best: {}", self.state.high_score));
                }
                GameEvent::GameOver { score } => {
                    leaderboard::save_best_score(self.store.as_mut(), score);
                    self.input.clear();
                    let name = ask_name().unwrap_or_default();
                    let board = Leaderboard::add(self.store.as_mut(), &name, score);
                    show_leaderboard(&board);
                }
                _ => {}
            }
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn ask_name() -> Option<String> {
        web_sys::window()?
            .prompt_with_message("Game over! Your name:")
            .ok()
            .flatten()
    }

    fn show_leaderboard(board: &Leaderboard) {
        let text = board
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} {}", i + 1, e.name, e.score))
            .collect::<Vec<_>>()
            .join("\n");
        set_text("leaderboard", &text);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Poppies Run starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.borrow();
            set_text("hud-best", &format!("Best: {}", g.state.high_score));
            let touch_device = web_sys::window()
                .map(|w| w.navigator().max_touch_points() > 0)
                .unwrap_or(false);
            if !g.settings.touch_controls.visible(touch_device) {
                if let Some(el) = document().and_then(|d| d.get_element_by_id("touchControls")) {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        setup_keyboard(game.clone())?;
        setup_touch_buttons(game.clone())?;
        setup_blur(game.clone())?;
        request_animation_frame(game);

        log::info!("Poppies Run running!");
        Ok(())
    }

    fn window() -> Result<web_sys::Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = window()?;
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code(), event.repeat()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_touch_buttons(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(document) = document() else {
            return Ok(());
        };
        let buttons = [
            ("touchBtnLeft", Button::Left),
            ("touchBtnRight", Button::Right),
            ("touchBtnJump", Button::Jump),
        ];
        for (id, button) in buttons {
            let Some(el) = document.get_element_by_id(id) else {
                continue;
            };
            for (kind, down) in [("pointerdown", true), ("pointerup", false), ("pointercancel", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    if down {
                        g.input.press(button);
                    } else {
                        g.input.release(button);
                    }
                });
                el.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
        }
        Ok(())
    }

    fn setup_blur(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.input.clear();
            g.clock.reset();
            if g.state.phase == GamePhase::Running {
                log::debug!("Focus lost, inputs released");
            }
        });
        window()?.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().frame(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot run
///
/// Usage: `poppies-run [seed] [levels.json]`
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use poppies_run::consts::SIM_DT;
    use poppies_run::persistence::MemoryStore;
    use poppies_run::sim::{GameEvent, GamePhase, GameState, LevelConfigError, LevelSet, TickInput, tick};
    use poppies_run::{Leaderboard, leaderboard};

    /// Give up on a level after two minutes of game time
    const MAX_TICKS_PER_LEVEL: u64 = (120.0 / SIM_DT) as u64;

    #[derive(Debug, thiserror::Error)]
    pub enum RunError {
        #[error("invalid seed '{0}'")]
        Seed(String),
        #[error("cannot read level file: {0}")]
        Io(#[from] std::io::Error),
        #[error("invalid level file: {0}")]
        Levels(#[from] LevelConfigError),
    }

    pub fn run() -> Result<(), RunError> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(arg) => arg.parse().map_err(|_| RunError::Seed(arg))?,
            None => rand::random(),
        };
        let levels = match args.next() {
            Some(path) => LevelSet::from_json(&std::fs::read_to_string(path)?)?,
            None => LevelSet::default(),
        };

        log::info!("Poppies Run (native) starting with seed {seed}");
        let mut store = MemoryStore::new();
        let mut state = GameState::with_levels(seed, levels);
        state.high_score = leaderboard::load_best_score(&store);

        state.start();
        loop {
            let outcome = play_level(&mut state);
            match outcome {
                GamePhase::LevelComplete => {
                    leaderboard::save_best_score(&mut store, state.score);
                    state.next_level();
                }
                GamePhase::Running => {
                    log::warn!("Autopilot stuck on level {}, giving up", state.level);
                    break;
                }
                _ => break,
            }
        }

        leaderboard::save_best_score(&mut store, state.score);
        let board = Leaderboard::add(&mut store, "Autopilot", state.score);
        println!(
            "Finished level {} ({:?}) with score {}",
            state.level, state.phase, state.score
        );
        for (i, entry) in board.entries().iter().enumerate() {
            println!("{:>2}. {:<16} {}", i + 1, entry.name, entry.score);
        }
        Ok(())
    }

    /// Run right and hop whenever grounded until the level ends
    fn play_level(state: &mut GameState) -> GamePhase {
        while state.is_running() && state.time_ticks < MAX_TICKS_PER_LEVEL {
            let input = TickInput {
                move_right: true,
                jump_pressed: state.player.grounded,
                jump_held: true,
                ..TickInput::default()
            };
            for event in tick(state, &input) {
                match event {
                    GameEvent::ScoreChanged(_) | GameEvent::Jumped => {}
                    other => log::info!("tick {}: {other:?}", state.time_ticks),
                }
            }
        }
        state.phase
    }
}
