//=========================================================================
// Core Systems
//=========================================================================
//
// Everything that runs the idle surface, independent of windowing:
//
//   options     option schemas and typed value coercion
//   registry    catalog of scene descriptors
//   scene       the runtime contract (trait, surfaces, frame pacing)
//   settings    effective configuration and its persistence
//   selection   random resolution and per-scene option merge
//   controller  single owner of the surfaces and the running scene
//   idle        threshold planning for the external idle collaborator
//   quotes      content pool for the text scene
//
// The platform layer drives the controller; nothing in core touches the
// OS.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod controller;
pub mod idle;
pub mod options;
pub mod quotes;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod settings;

//=== Public API ==========================================================

pub use controller::{Controller, DisplayState, HostMessage, SurfaceMode, SurfaceRequest};
pub use options::{OptionDef, OptionKind, OptionMap, OptionValue, Schema, ValueType};
pub use registry::{Registry, SceneDescriptor, BLACK_SCENE};
pub use scene::{Canvas, Color, FrameTimer, Scene, SceneContext, SceneError, TextLayer};
pub use selection::RANDOM_SCENE;
pub use settings::{JsonFileStore, MemoryStore, PowerMode, Settings, SettingsStore};
