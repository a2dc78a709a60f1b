//! Rotation Wheel entry point
//!
//! Handles platform-specific initialization and wires the page to the draw engine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement, HtmlSelectElement};

    use rotation_wheel::consts::*;
    use rotation_wheel::draw::{self, CyclePhase, RotationEvent, RotationState, Transition, Wheel};
    use rotation_wheel::platform::{self, LocalStorage};
    use rotation_wheel::settings::Settings;
    use rotation_wheel::{RotationError, SnapshotStore, share};

    // Rasterizer and confetti live in page scripts; both are optional
    #[wasm_bindgen(inline_js = "
        export function export_surface(fileName, format) {
            if (window.exportSurface) {
                window.exportSurface(fileName, format);
            } else {
                console.warn('No exporter loaded, falling back to print');
                window.print();
            }
        }

        export function celebrate() {
            if (window.confetti) {
                window.confetti({ particleCount: 150, spread: 70 });
            }
        }
    ")]
    extern "C" {
        fn export_surface(file_name: &str, format: &str);
        fn celebrate();
    }

    /// Page instance holding all state
    struct App {
        state: RotationState,
        store: SnapshotStore<LocalStorage>,
        settings: Settings,
        rng: Pcg32,
        /// Current wheel rotation (degrees, only grows)
        wheel_rotation: f32,
        /// Last advisory or announcement shown to the user
        status: String,
    }

    impl App {
        fn new() -> Self {
            let mut store = SnapshotStore::new(LocalStorage::open());
            let snapshot = store.load(platform::now());
            let settings = Settings::load(store.storage());
            Self {
                state: RotationState::from_snapshot(snapshot),
                store,
                settings,
                rng: platform::seeded_rng(),
                wheel_rotation: 0.0,
                status: String::new(),
            }
        }

        /// Adopt a transition and write the snapshot through
        fn apply(&mut self, transition: Transition) -> RotationEvent {
            self.state = transition.state;
            self.store.commit(&self.state.snapshot, platform::now());
            transition.event
        }

        fn advise(&mut self, err: RotationError) {
            log::info!("Rejected: {}", err);
            self.status = err.to_string();
        }

        fn rename(&mut self, slot: usize, name: &str) {
            match draw::rename(&self.state, slot, name) {
                Ok(t) => {
                    self.apply(t);
                }
                Err(e) => self.advise(e),
            }
        }

        /// Start a spin; returns the ticket its completion must carry
        fn spin(&mut self) -> Option<u64> {
            match draw::start_draw(&self.state, &mut self.rng) {
                Ok(t) => {
                    let RotationEvent::SpinStarted {
                        ticket,
                        slot,
                        candidates,
                        ..
                    } = self.apply(t)
                    else {
                        return None;
                    };
                    let wheel = Wheel::new(candidates);
                    self.wheel_rotation =
                        wheel.landing_rotation(self.wheel_rotation, slot, SPIN_FULL_TURNS);
                    self.status = "Spinning...".to_string();
                    Some(ticket)
                }
                Err(e) => {
                    self.advise(e);
                    None
                }
            }
        }

        fn land(&mut self, ticket: u64) {
            match draw::complete_draw(&self.state, ticket) {
                Err(RotationError::StaleSpin(_)) | Err(RotationError::NoDrawInFlight) => {
                    log::debug!("Dropped completion for spin {}", ticket);
                }
                Ok(t) => {
                    if let RotationEvent::WinnerDrawn { winner, pending } = self.apply(t) {
                        self.status = if pending < PAIR_SIZE {
                            format!("🎯 {} - spin again for the second winner", winner)
                        } else {
                            format!("🎯 {} - save this month", winner)
                        };
                    }
                }
                Err(e) => self.advise(e),
            }
        }

        fn save_month(&mut self) {
            match draw::finalize(&self.state, platform::now()) {
                Ok(t) => {
                    if let RotationEvent::MonthFinalized { record, .. } = self.apply(t) {
                        self.status = format!(
                            "{} saved: {} & {}",
                            record.month, record.pair[0], record.pair[1]
                        );
                        if self.settings.effective_confetti() {
                            celebrate();
                        }
                        self.export();
                    }
                }
                Err(e) => self.advise(e),
            }
        }

        fn reset(&mut self) {
            let t = draw::reset(&self.state);
            self.apply(t);
            self.wheel_rotation = 0.0;
            self.status = "Rotation reset".to_string();
        }

        fn toggle_reduced_motion(&mut self) {
            self.settings.reduced_motion = !self.settings.reduced_motion;
            self.settings.save(self.store.storage_mut());
        }

        fn toggle_confetti(&mut self) {
            self.settings.confetti = !self.settings.confetti;
            self.settings.save(self.store.storage_mut());
        }

        fn choose(&mut self, control: &str, value: &str) {
            let changed = match control {
                "share-target" => self.settings.choose_share_target(value),
                "export-format" => self.settings.choose_export_format(value),
                _ => false,
            };
            if changed {
                self.settings.save(self.store.storage_mut());
            } else {
                log::warn!("Ignoring {} = {:?}", control, value);
            }
        }

        fn export(&self) {
            let Some(record) = self.state.snapshot.history.last() else {
                return;
            };
            let format = self.settings.export_format;
            export_surface(
                &share::export_file_name(record.month, format),
                format.extension(),
            );
        }

        fn share(&self) {
            let text = share::summary(&self.state.snapshot.history);
            let url = share::share_url(self.settings.share_target, &text);
            if let Some(window) = web_sys::window() {
                if window.open_with_url(&url).is_err() {
                    log::warn!("Share window blocked");
                }
            }
        }

        /// Sync the page with the current state
        fn render(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = &self.state.snapshot;

            for slot in 0..ROSTER_SIZE {
                if let Some(input) = input_by_id(&document, &format!("name-{}", slot)) {
                    let name = snapshot.names.get(slot).map(String::as_str).unwrap_or("");
                    if input.value() != name {
                        input.set_value(name);
                    }
                    input.set_disabled(
                        snapshot.roster_locked() || self.state.phase() == CyclePhase::Spinning,
                    );
                }
                if let Some(el) = document.get_element_by_id(&format!("avatar-{}", slot)) {
                    el.set_text_content(Some(rotation_wheel::avatar_for_slot(
                        &snapshot.avatars,
                        slot,
                    )));
                }
            }

            self.render_wheel(&document);

            if let Some(el) = document.get_element_by_id("pending") {
                let text = if self.state.pending.is_empty() {
                    "-".to_string()
                } else {
                    self.state.pending.join(" & ")
                };
                el.set_text_content(Some(&text));
            }

            if let Some(el) = document.get_element_by_id("next-month") {
                el.set_text_content(Some(self.state.next_month().as_str()));
            }

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&self.status));
            }

            if let Some(el) = document.get_element_by_id("history") {
                let items: String = snapshot
                    .history
                    .iter()
                    .rev()
                    .map(|r| {
                        format!(
                            "<li><strong>{}</strong> {} {} &amp; {} {}</li>",
                            r.month,
                            r.avatars[0],
                            escape(&r.pair[0]),
                            r.avatars[1],
                            escape(&r.pair[1])
                        )
                    })
                    .collect();
                el.set_inner_html(&items);
            }

            let phase = self.state.phase();
            set_disabled(
                &document,
                "spin-btn",
                matches!(phase, CyclePhase::Spinning | CyclePhase::PairReady),
            );
            set_disabled(&document, "save-btn", phase != CyclePhase::PairReady);
            set_disabled(&document, "reset-btn", phase == CyclePhase::Spinning);

            if let Some(select) = select_by_id(&document, "share-target") {
                select.set_value(self.settings.share_target.as_str());
            }
            if let Some(select) = select_by_id(&document, "export-format") {
                select.set_value(self.settings.export_format.extension());
            }
            set_pressed(&document, "motion-btn", self.settings.reduced_motion);
            set_pressed(&document, "confetti-btn", self.settings.confetti);
        }

        fn render_wheel(&self, document: &Document) {
            let Some(wheel_el) = document
                .get_element_by_id("wheel")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };

            // While spinning the slices are frozen to what the pointer will land on
            let candidates = match &self.state.spin {
                Some(spin) => spin.candidates.clone(),
                None => self.state.snapshot.eligible(),
            };
            let wheel = Wheel::new(candidates.len());
            let labels: String = candidates
                .iter()
                .enumerate()
                .map(|(slot, name)| {
                    let p = wheel.label_anchor(slot, 38.0);
                    format!(
                        "<span class=\"slice\" style=\"left:{:.1}%;top:{:.1}%\">{}</span>",
                        50.0 + p.x,
                        50.0 - p.y,
                        escape(name)
                    )
                })
                .collect();
            wheel_el.set_inner_html(&labels);

            let easing = if self.settings.reduced_motion { "1s" } else { "3s" };
            let style = wheel_el.style();
            let _ = style.set_property("transition", &format!("transform {} ease-out", easing));
            let _ = style.set_property("transform", &format!("rotate({}deg)", self.wheel_rotation));
        }
    }

    fn input_by_id(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn select_by_id(document: &Document, id: &str) -> Option<HtmlSelectElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn set_pressed(document: &Document, id: &str, pressed: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
        }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rotation Wheel starting...");

        let app = Rc::new(RefCell::new(App::new()));

        setup_roster_inputs(app.clone());
        setup_spin_button(app.clone());
        on_click("save-btn", app.clone(), |a| a.save_month());
        on_click("reset-btn", app.clone(), |a| a.reset());
        on_click("share-btn", app.clone(), |a| a.share());
        on_click("export-btn", app.clone(), |a| a.export());
        on_click("motion-btn", app.clone(), |a| a.toggle_reduced_motion());
        on_click("confetti-btn", app.clone(), |a| a.toggle_confetti());
        setup_choice("share-target", app.clone());
        setup_choice("export-format", app.clone());

        app.borrow().render();
        log::info!("Rotation Wheel ready");
    }

    fn setup_roster_inputs(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for slot in 0..ROSTER_SIZE {
            let Some(input) = input_by_id(&document, &format!("name-{}", slot)) else {
                continue;
            };
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                a.rename(slot, &input_clone.value());
                a.render();
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_spin_button(app: Rc<RefCell<App>>) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("spin-btn"))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let ticket = {
                let mut a = app.borrow_mut();
                let ticket = a.spin();
                a.render();
                ticket
            };
            if let Some(ticket) = ticket {
                schedule_landing(app.clone(), ticket);
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Complete the spin `ticket` once the wheel stops
    fn schedule_landing(app: Rc<RefCell<App>>, ticket: u64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move || {
            let mut a = app.borrow_mut();
            a.land(ticket);
            a.render();
        });
        if window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                SPIN_DURATION_MS,
            )
            .is_err()
        {
            log::error!("Could not schedule spin completion");
        }
        closure.forget();
    }

    fn setup_choice(id: &'static str, app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(select) = select_by_id(&document, id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let select_clone = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.choose(id, &select_clone.value());
            a.render();
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut a = app.borrow_mut();
            action(&mut a);
            a.render();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rotation Wheel (native) starting...");
    log::info!("The page build runs in the browser - use `trunk serve` for the web version");

    println!("\nRunning a dry-run rotation...");
    dry_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Draw a full cycle set against an in-memory store and print the result
#[cfg(not(target_arch = "wasm32"))]
fn dry_run() {
    use rotation_wheel::draw::{self, RotationState};
    use rotation_wheel::platform;
    use rotation_wheel::share::{self, ShareTarget};
    use rotation_wheel::{MemoryStore, RotationError, SnapshotStore};

    const NAMES: [&str; 10] = [
        "Amara", "Bruno", "Chiara", "Denno", "Elif", "Farid", "Greta", "Hiro", "Ines", "Jonas",
    ];

    let mut store = SnapshotStore::new(MemoryStore::new());
    let mut rng = platform::seeded_rng();
    let mut state = RotationState::from_snapshot(store.load(platform::now()));

    for (slot, name) in NAMES.iter().enumerate() {
        match draw::rename(&state, slot, name) {
            Ok(t) => state = t.state,
            Err(e) => log::error!("Roster edit failed: {}", e),
        }
    }
    store.commit(&state.snapshot, platform::now());

    loop {
        let drawn = draw::draw(&state, &mut rng)
            .and_then(|t| draw::draw(&t.state, &mut rng))
            .and_then(|t| draw::finalize(&t.state, platform::now()));
        match drawn {
            Ok(t) => {
                state = t.state;
                store.commit(&state.snapshot, platform::now());
            }
            Err(RotationError::NoCandidates) => break,
            Err(e) => {
                log::error!("Dry run stopped: {}", e);
                break;
            }
        }
    }

    let reloaded = RotationState::from_snapshot(store.load(platform::now()));
    assert_eq!(reloaded.snapshot, state.snapshot, "Reload should match");

    let text = share::summary(&state.snapshot.history);
    println!("{}", text);
    println!("\n{}", share::share_url(ShareTarget::WhatsApp, &text));
    println!("✓ {} months drawn, state reloads intact", state.snapshot.history.len());
}
