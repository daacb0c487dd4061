//=========================================================================
// Host Surface Controller
//=========================================================================
//
// Single owner of the shared drawing surfaces and the one "current
// scene" slot. External events (visibility, host messages, user input)
// only ever request transitions through the controller's methods; they
// never reach into scene internals.
//
// Ordering guarantee: exactly one scene is Running on the surface at a
// time. The controller always destroys the prior scene before
// initializing the next, which is the entire concurrency discipline for
// the shared canvas. No other guard exists, so this sequencing must
// hold everywhere.
//
// Timers are deadlines polled by `frame`, never blocking sleeps:
// - switch-to-black: one-shot that ends the show after a quiet period
// - random-cycle: repeating re-roll while the configured type is random
// Both are cleared when the surface hides and re-derived from scratch on
// resume. A deadline observed after teardown no-ops via the `active`
// guard.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use crate::core::registry::{Registry, BLACK_SCENE};
use crate::core::scene::{Canvas, Color, Scene, SceneContext, TextLayer};
use crate::core::selection::{resolve_random, resolve_scene, scene_options};
use crate::core::settings::{Settings, SettingsStore};

//=== Messages ============================================================

/// Inbound notifications from the host environment.
#[derive(Debug, Clone)]
pub enum HostMessage {
    /// Settings were edited; selection restarts from scratch.
    SettingsChanged {
        enabled: bool,
        power_mode: crate::core::settings::PowerMode,
        idle_minutes: u32,
    },

    /// Force-launch, ignoring idle state.
    TestScreensaver,

    /// External request to tear down and dismiss the surface.
    CloseScreensaver,
}

/// Outbound requests to the window-management collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRequest {
    /// Dismiss the idle surface (user signaled intent to exit, or an
    /// external close arrived).
    Close,
}

//=== Display State =======================================================

/// Which layer is currently presented. Both false is the quiescent
/// blank state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub canvas_visible: bool,
    pub text_visible: bool,
}

//=== Surface Mode ========================================================

/// How the controller's surface is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// Full display; the canvas tracks viewport resizes.
    Fullscreen { width: u32, height: u32 },

    /// Externally-sized embedding (settings page preview); the canvas is
    /// fixed and resize events are ignored.
    Preview { width: u32, height: u32 },
}

//=== Internal Types ======================================================

struct ActiveScene {
    id: String,
    uses_canvas: bool,
    scene: Box<dyn Scene>,
}

struct CycleTimer {
    next_at: f64,
    period_ms: f64,
}

//=== Controller ==========================================================

/// Owns one canvas and one text layer, starts/stops/swaps the active
/// scene, and drives the switch-to-black and random-cycle timers.
pub struct Controller {
    registry: Registry,
    store: Box<dyn SettingsStore>,
    settings: Settings,

    canvas: Canvas,
    text: TextLayer,

    active: Option<ActiveScene>,
    switch_to_black_at: Option<f64>,
    cycle: Option<CycleTimer>,

    rng: StdRng,
    visible: bool,
    requests: Sender<SurfaceRequest>,
}

impl Controller {
    //--- Construction -----------------------------------------------------

    pub fn new(
        registry: Registry,
        store: Box<dyn SettingsStore>,
        surface: SurfaceMode,
        requests: Sender<SurfaceRequest>,
    ) -> Self {
        let canvas = match surface {
            SurfaceMode::Fullscreen { width, height } => Canvas::tracking(width, height),
            SurfaceMode::Preview { width, height } => Canvas::fixed(width, height),
        };
        let settings = Settings::defaults(&registry);

        Self {
            registry,
            store,
            settings,
            canvas,
            text: TextLayer::new(),
            active: None,
            switch_to_black_at: None,
            cycle: None,
            rng: StdRng::from_entropy(),
            visible: true,
            requests,
        }
    }

    /// Deterministic selection for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    //--- Activation -------------------------------------------------------

    /// Loads effective settings and starts the configured scene.
    ///
    /// Called on surface activation, on manual test-trigger, and after a
    /// settings change; selection always restarts from scratch.
    pub fn activate(&mut self, now_ms: f64) {
        self.settings = Settings::load_or_defaults(self.store.as_ref(), &self.registry);

        if !self.settings.enabled {
            info!(target: "controller", "Host disabled, staying blank");
            self.stop_active();
            self.clear_timers();
            self.quiesce_surface();
            return;
        }

        let id = resolve_scene(&self.registry, &self.settings, None, &mut self.rng);
        self.launch(&id);
        self.arm_timers(now_ms);
    }

    //--- Frame Loop -------------------------------------------------------

    /// Advances one frame: fires due timers, updates the active scene,
    /// applies the dim overlay. No-op while hidden.
    pub fn frame(&mut self, now_ms: f64) {
        if !self.visible {
            return;
        }

        if let Some(deadline) = self.switch_to_black_at {
            if now_ms >= deadline {
                info!(target: "controller", "Switch-to-black deadline reached");
                self.stop_active();
                self.clear_timers();
                self.quiesce_surface();
                return;
            }
        }

        let cycle_due = self.cycle.as_ref().map_or(false, |c| now_ms >= c.next_at);
        if cycle_due {
            let last = self.active.as_ref().map(|a| a.id.clone());
            let next = resolve_random(
                &self.registry,
                self.settings.enabled_for_random.as_deref(),
                last.as_deref(),
                &mut self.rng,
            );
            debug!(target: "controller", "Cycling to '{}'", next);
            self.launch(&next);
            if let Some(cycle) = &mut self.cycle {
                cycle.next_at = now_ms + cycle.period_ms;
            }
        }

        if let Some(active) = &mut self.active {
            let mut ctx = SceneContext {
                canvas: &mut self.canvas,
                text: &mut self.text,
            };
            active.scene.update(&mut ctx, now_ms);

            if active.uses_canvas && self.settings.dim_level > 0 {
                self.canvas.dim(self.settings.dim_level);
            }
        }
    }

    //--- External Events --------------------------------------------------

    pub fn handle_message(&mut self, message: HostMessage, now_ms: f64) {
        match message {
            HostMessage::SettingsChanged { .. } => {
                info!(target: "controller", "Settings changed, restarting selection");
                self.activate(now_ms);
            }
            HostMessage::TestScreensaver => {
                info!(target: "controller", "Test trigger, launching");
                self.activate(now_ms);
            }
            HostMessage::CloseScreensaver => {
                info!(target: "controller", "External close request");
                self.shutdown();
            }
        }
    }

    /// The user signaled intent to exit (key press, sustained pointer
    /// movement). Tears down and asks the host to dismiss the surface.
    pub fn request_close(&mut self) {
        debug!(target: "controller", "User exit intent");
        self.shutdown();
    }

    /// Page visibility changed. Hiding destroys the active scene and
    /// cancels both timers immediately; resuming re-derives everything
    /// from persisted settings.
    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;

        if visible {
            debug!(target: "controller", "Surface visible, restarting");
            self.activate(now_ms);
        } else {
            debug!(target: "controller", "Surface hidden, tearing down");
            self.stop_active();
            self.clear_timers();
        }
    }

    /// Viewport dimensions changed. Ignored for fixed (preview)
    /// surfaces; tracking surfaces re-derive scene layout.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.is_fixed() {
            return;
        }
        self.canvas.resize(width, height);
        if let Some(active) = &mut self.active {
            active.scene.resize(width, height);
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn display_state(&self) -> DisplayState {
        match &self.active {
            Some(active) => DisplayState {
                canvas_visible: active.uses_canvas,
                text_visible: !active.uses_canvas,
            },
            None => DisplayState {
                canvas_visible: false,
                text_visible: false,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn text(&self) -> &TextLayer {
        &self.text
    }

    //--- Internal Transitions ---------------------------------------------

    /// Swaps the running scene: destroy the prior one, then start `id`.
    /// "black" and unknown ids land in the quiescent blank state; a
    /// failing init degrades to it too.
    fn launch(&mut self, id: &str) {
        self.stop_active();

        let Some(descriptor) = self.registry.get(id).cloned() else {
            if id != BLACK_SCENE {
                warn!(target: "controller", "Unknown scene '{}', showing blank", id);
            }
            self.quiesce_surface();
            return;
        };

        let options = scene_options(&self.registry, &self.settings, id);
        let mut scene = (descriptor.factory)();

        self.text.set_enabled(!descriptor.uses_canvas);
        if descriptor.uses_canvas {
            self.canvas.clear(Color::BLACK);
        }

        let mut ctx = SceneContext {
            canvas: &mut self.canvas,
            text: &mut self.text,
        };
        match scene.init(&options, &mut ctx) {
            Ok(()) => {
                info!(target: "controller", "Scene '{}' running", id);
                self.active = Some(ActiveScene {
                    id: id.to_string(),
                    uses_canvas: descriptor.uses_canvas,
                    scene,
                });
            }
            Err(e) => {
                warn!(target: "controller", "Scene '{}' failed to start, showing blank: {}", id, e);
                scene.destroy();
                self.quiesce_surface();
            }
        }
    }

    fn stop_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            debug!(target: "controller", "Destroying scene '{}'", active.id);
            active.scene.destroy();
            if !active.uses_canvas {
                self.text.clear();
            }
        }
    }

    fn quiesce_surface(&mut self) {
        self.canvas.clear(Color::BLACK);
        self.text.clear();
        self.text.set_enabled(false);
    }

    fn arm_timers(&mut self, now_ms: f64) {
        let running_black = self.active.is_none();

        self.switch_to_black_at = if self.settings.switch_to_black_minutes > 0 && !running_black {
            Some(now_ms + self.settings.switch_to_black_minutes as f64 * 60_000.0)
        } else {
            None
        };

        self.cycle = if self.settings.scene_type == crate::core::selection::RANDOM_SCENE
            && self.settings.random_cycle_minutes > 0
        {
            let period_ms = self.settings.random_cycle_minutes as f64 * 60_000.0;
            Some(CycleTimer {
                next_at: now_ms + period_ms,
                period_ms,
            })
        } else {
            None
        };
    }

    fn clear_timers(&mut self) {
        self.switch_to_black_at = None;
        self.cycle = None;
    }

    fn shutdown(&mut self) {
        self.stop_active();
        self.clear_timers();
        self.quiesce_surface();
        if self.requests.send(SurfaceRequest::Close).is_err() {
            warn!(target: "controller", "Close request dropped, host receiver gone");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{OptionDef, OptionMap};
    use crate::core::registry::SceneDescriptor;
    use crate::core::scene::SceneError;
    use crate::core::settings::{MemoryStore, SettingsStore};
    use crossbeam_channel::unbounded;
    use serde_json::json;
    use std::cell::Cell;

    thread_local! {
        static INIT_CALLS: Cell<usize> = const { Cell::new(0) };
        static DESTROY_CALLS: Cell<usize> = const { Cell::new(0) };
    }

    fn reset_counters() {
        INIT_CALLS.with(|c| c.set(0));
        DESTROY_CALLS.with(|c| c.set(0));
    }

    /// Canvas scene that paints white and counts lifecycle calls.
    struct ProbeScene {
        running: bool,
    }

    impl ProbeScene {
        fn new() -> Self {
            Self { running: false }
        }
    }

    impl Scene for ProbeScene {
        fn init(&mut self, _options: &OptionMap, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
            INIT_CALLS.with(|c| c.set(c.get() + 1));
            self.running = true;
            Ok(())
        }

        fn update(&mut self, ctx: &mut SceneContext<'_>, _now_ms: f64) {
            ctx.canvas.clear(Color::WHITE);
        }

        fn destroy(&mut self) {
            if self.running {
                DESTROY_CALLS.with(|c| c.set(c.get() + 1));
            }
            self.running = false;
        }
    }

    /// Scene whose init always fails.
    struct BrokenScene;

    impl Scene for BrokenScene {
        fn init(&mut self, _options: &OptionMap, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
            Err(SceneError::Surface("no context".to_string()))
        }
        fn update(&mut self, _ctx: &mut SceneContext<'_>, _now_ms: f64) {}
        fn destroy(&mut self) {}
    }

    fn probe(id: &'static str) -> SceneDescriptor {
        SceneDescriptor {
            id,
            display_name: id,
            uses_canvas: true,
            schema: vec![("speed", OptionDef::range("Speed", 3, 1, 10))],
            factory: || Box::new(ProbeScene::new()),
        }
    }

    fn broken(id: &'static str) -> SceneDescriptor {
        SceneDescriptor {
            id,
            display_name: id,
            uses_canvas: true,
            schema: vec![],
            factory: || Box::new(BrokenScene),
        }
    }

    fn controller_with(
        manifest: Vec<SceneDescriptor>,
        synced: serde_json::Value,
    ) -> (Controller, crossbeam_channel::Receiver<SurfaceRequest>) {
        let mut store = MemoryStore::new();
        store.save_synced(synced).unwrap();
        let (tx, rx) = unbounded();
        let controller = Controller::new(
            Registry::with_manifest(manifest),
            Box::new(store),
            SurfaceMode::Fullscreen { width: 320, height: 240 },
            tx,
        )
        .with_seed(11);
        (controller, rx)
    }

    //=====================================================================
    // Activation & Display State Tests
    //=====================================================================

    #[test]
    fn canvas_scene_shows_canvas_layer_only() {
        reset_counters();
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);

        assert_eq!(c.active_id(), Some("drift"));
        let state = c.display_state();
        assert!(state.canvas_visible && !state.text_visible);
    }

    #[test]
    fn text_scene_shows_text_layer_only() {
        let (mut c, _rx) = controller_with(
            crate::scenes::manifest(),
            json!({ "screensaverType": "text" }),
        );
        c.activate(0.0);

        let state = c.display_state();
        assert!(state.text_visible, "text layer must be visible");
        assert!(!state.canvas_visible, "canvas must be hidden for a text scene");
    }

    #[test]
    fn black_type_runs_nothing() {
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "black" }));
        c.activate(0.0);
        assert!(!c.is_running());
        let state = c.display_state();
        assert!(!state.canvas_visible && !state.text_visible);
    }

    #[test]
    fn unknown_type_degrades_to_black() {
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "from-the-future" }));
        c.activate(0.0);
        assert!(!c.is_running(), "unknown persisted type must behave like black");
    }

    #[test]
    fn disabled_host_stays_blank() {
        let mut store = MemoryStore::new();
        store.save_synced(json!({ "screensaverType": "drift" })).unwrap();
        store.save_local(json!({ "enabled": false })).unwrap();
        let (tx, _rx) = unbounded();
        let mut c = Controller::new(
            Registry::with_manifest(vec![probe("drift")]),
            Box::new(store),
            SurfaceMode::Fullscreen { width: 100, height: 100 },
            tx,
        );
        c.activate(0.0);
        assert!(!c.is_running());
    }

    #[test]
    fn failing_init_falls_back_to_blank() {
        let (mut c, _rx) = controller_with(vec![broken("flaky")], json!({ "screensaverType": "flaky" }));
        c.activate(0.0);
        assert!(!c.is_running(), "a scene that cannot start must not stay active");
        let state = c.display_state();
        assert!(!state.canvas_visible && !state.text_visible);
    }

    //=====================================================================
    // Lifecycle Sequencing Tests
    //=====================================================================

    #[test]
    fn restart_destroys_before_reinit() {
        reset_counters();
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);
        c.handle_message(
            HostMessage::SettingsChanged {
                enabled: true,
                power_mode: crate::core::settings::PowerMode::Normal,
                idle_minutes: 5,
            },
            1000.0,
        );

        assert_eq!(INIT_CALLS.with(|c| c.get()), 2);
        assert_eq!(
            DESTROY_CALLS.with(|c| c.get()),
            1,
            "the prior instance must be destroyed exactly once before the new init"
        );
    }

    #[test]
    fn hiding_destroys_and_resume_restarts() {
        reset_counters();
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);

        c.set_visible(false, 100.0);
        assert!(!c.is_running(), "hidden surface must not keep a scene alive");
        assert_eq!(DESTROY_CALLS.with(|c| c.get()), 1);

        c.frame(200.0);
        assert!(!c.is_running(), "frames while hidden are no-ops");

        c.set_visible(true, 300.0);
        assert!(c.is_running());
        assert_eq!(INIT_CALLS.with(|c| c.get()), 2);
    }

    #[test]
    fn repeated_teardown_is_idempotent() {
        reset_counters();
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);

        c.set_visible(false, 10.0);
        c.set_visible(false, 20.0);
        c.request_close();
        c.request_close();

        assert_eq!(
            DESTROY_CALLS.with(|c| c.get()),
            1,
            "teardown paths must tolerate being hit repeatedly"
        );
    }

    //=====================================================================
    // Timer Tests
    //=====================================================================

    #[test]
    fn switch_to_black_ends_the_show() {
        let (mut c, _rx) = controller_with(
            crate::scenes::manifest(),
            json!({ "screensaverType": "text", "idleMinutes": 1, "switchToBlackMinutes": 2 }),
        );
        c.activate(0.0);
        assert!(c.display_state().text_visible);

        c.frame(60_000.0);
        assert!(c.display_state().text_visible, "one minute in, still showing");

        c.frame(2.0 * 60_000.0 + 1.0);
        let state = c.display_state();
        assert!(!state.text_visible && !state.canvas_visible);
        assert!(!c.is_running(), "after the delay nothing may be running");
    }

    #[test]
    fn switch_to_black_is_not_armed_for_black() {
        let (mut c, _rx) = controller_with(
            vec![probe("drift")],
            json!({ "screensaverType": "black", "switchToBlackMinutes": 1 }),
        );
        c.activate(0.0);
        assert!(c.switch_to_black_at.is_none(), "already blank, nothing to switch");
    }

    #[test]
    fn random_cycle_swaps_scene_excluding_last() {
        let (mut c, _rx) = controller_with(
            vec![probe("drift"), probe("stars")],
            json!({
                "screensaverType": "random",
                "randomCycleMinutes": 1,
                "enabledForRandom": ["drift", "stars"]
            }),
        );
        c.activate(0.0);
        let first = c.active_id().unwrap().to_string();

        c.frame(60_000.0 + 1.0);
        let second = c.active_id().unwrap().to_string();
        assert_ne!(second, first, "cycling must avoid an immediate repeat");

        c.frame(2.0 * 60_000.0 + 2.0);
        let third = c.active_id().unwrap().to_string();
        assert_ne!(third, second);
    }

    #[test]
    fn cycle_is_only_armed_for_random_type() {
        let (mut c, _rx) = controller_with(
            vec![probe("drift")],
            json!({ "screensaverType": "drift", "randomCycleMinutes": 1 }),
        );
        c.activate(0.0);
        assert!(c.cycle.is_none());
    }

    //=====================================================================
    // Close & Message Tests
    //=====================================================================

    #[test]
    fn close_message_tears_down_and_requests_dismissal() {
        let (mut c, rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);
        c.handle_message(HostMessage::CloseScreensaver, 50.0);

        assert!(!c.is_running());
        assert_eq!(rx.try_recv(), Ok(SurfaceRequest::Close));
    }

    #[test]
    fn user_exit_requests_dismissal() {
        let (mut c, rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);
        c.request_close();
        assert_eq!(rx.try_recv(), Ok(SurfaceRequest::Close));
    }

    //=====================================================================
    // Rendering Tests
    //=====================================================================

    #[test]
    fn dim_overlay_darkens_scene_output() {
        let (mut c, _rx) = controller_with(
            vec![probe("drift")],
            json!({ "screensaverType": "drift", "dimLevel": 100 }),
        );
        c.activate(0.0);
        c.frame(16.0);
        assert_eq!(
            c.canvas().pixel(10, 10),
            Some(Color::BLACK),
            "full dim must black out whatever the scene drew"
        );
    }

    #[test]
    fn zero_dim_leaves_scene_output_intact() {
        let (mut c, _rx) = controller_with(vec![probe("drift")], json!({ "screensaverType": "drift" }));
        c.activate(0.0);
        c.frame(16.0);
        assert_eq!(c.canvas().pixel(10, 10), Some(Color::WHITE));
    }

    #[test]
    fn preview_surface_ignores_resize() {
        let mut store = MemoryStore::new();
        store.save_synced(json!({ "screensaverType": "drift" })).unwrap();
        let (tx, _rx) = unbounded();
        let mut c = Controller::new(
            Registry::with_manifest(vec![probe("drift")]),
            Box::new(store),
            SurfaceMode::Preview { width: 300, height: 200 },
            tx,
        );
        c.activate(0.0);
        c.resize(1920, 1080);
        assert_eq!(c.canvas().width(), 300, "the embedding page controls preview size");
    }
}
