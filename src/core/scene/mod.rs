//=========================================================================
// Scene Runtime Contract
//=========================================================================
//
// The lifecycle interface every scene implements, plus the shared
// drawing surfaces and the frame-pacing discipline.
//
// State machine per scene instance:
//   Uninitialized ── init() ──> Running ── destroy() ──> Destroyed
//
// There is no paused state: pausing is destroy-and-recreate, which
// keeps the state machine trivial at the cost of resume continuity.
// Instances are created fresh by a descriptor factory for every run, so
// no state leaks between activations.
//
// `destroy` must be safe to call twice, and safe without a prior
// `init`, since straggler timer deadlines may fire after teardown.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod canvas;
pub mod frame;
pub mod text_layer;

//=== Public API ==========================================================

pub use canvas::{Canvas, Color, SizingMode, REFERENCE_SIZE};
pub use frame::{FrameTimer, NOMINAL_FRAME_MS};
pub use text_layer::TextLayer;

//=== Internal Dependencies ===============================================

use crate::core::options::OptionMap;

//=== SceneError ==========================================================

/// Failure to bring a scene into the Running state.
///
/// The controller catches these, logs, and falls back to the blank
/// scene; init failures never surface to the user.
#[derive(Debug)]
pub enum SceneError {
    /// The drawing surface is unusable (missing, wrong kind).
    Surface(String),

    /// The resolved options violate a scene precondition.
    Options(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surface(msg) => write!(f, "scene surface unavailable: {}", msg),
            Self::Options(msg) => write!(f, "scene options rejected: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {}

//=== SceneContext ========================================================

/// The shared surfaces a scene draws on, lent to it for the duration of
/// one lifecycle call. Exactly one scene holds this at a time.
pub struct SceneContext<'a> {
    pub canvas: &'a mut Canvas,
    pub text: &'a mut TextLayer,
}

//=== Scene Trait =========================================================

/// One selectable animated idle-display mode.
///
/// Canvas scenes allocate their entity pools in `init`, advance physics
/// by the normalized frame delta in `update`, and re-derive layout in
/// `resize`. Text scenes drive the text layer instead and keep their
/// periodic work (clock tick, reposition cycle) as deadlines checked in
/// `update`.
///
/// # Contract
///
/// - `init` leaves the scene Running or returns an error without side
///   effects the next scene could observe.
/// - `update` is only called between a successful `init` and `destroy`.
/// - `destroy` is idempotent and valid in any state.
/// - Entities leaving the visible bounds are recycled in place, never
///   dropped and reallocated, so memory stays flat over arbitrary runs.
pub trait Scene {
    /// Binds to the surfaces, seeds entity state, and starts animating.
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError>;

    /// Advances and draws one frame at the given monotonic timestamp.
    fn update(&mut self, ctx: &mut SceneContext<'_>, now_ms: f64);

    /// Viewport dimensions changed (tracking surfaces only). Scenes
    /// re-derive lanes, centers, and scale factors here.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Stops all animation state. Idempotent.
    fn destroy(&mut self);

    /// Refreshes content without a full restart, for scenes that support
    /// live editing. Default: no-op.
    fn update_content(&mut self, _options: &OptionMap, _ctx: &mut SceneContext<'_>) {}
}
