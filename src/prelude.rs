//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use nocturne::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Host entry point
pub use crate::host::{Host, HostBuilder};

// Controller and its wire types
pub use crate::core::controller::{
    Controller, DisplayState, HostMessage, SurfaceMode, SurfaceRequest,
};

// Registry and scene contract
pub use crate::core::registry::{Registry, SceneDescriptor, BLACK_SCENE};
pub use crate::core::scene::{
    Canvas, Color, FrameTimer, Scene, SceneContext, SceneError, TextLayer,
};

// Options and settings
pub use crate::core::options::{OptionDef, OptionKind, OptionMap, OptionValue, ValueType};
pub use crate::core::settings::{
    JsonFileStore, MemoryStore, PowerMode, Settings, SettingsStore,
};

// Selection sentinels
pub use crate::core::selection::RANDOM_SCENE;

// Built-in scenes
pub use crate::scenes::manifest;
