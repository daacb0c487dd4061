//=========================================================================
// Built-in Scene Library
//=========================================================================
//
// One module per scene plus the static manifest the registry is built
// from. Adding a scene means adding its module and one manifest entry.
// Nothing self-registers at load time, so there is no load-order
// dependence.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod drift;
pub mod mystify;
pub mod pyro;
pub mod rain;
pub mod starfield;
pub mod text;
pub mod toasters;

//=== Internal Dependencies ===============================================

use crate::core::registry::SceneDescriptor;

//=== Manifest ============================================================

/// Every built-in scene, in presentation order. This order is meaningful:
/// it drives listing, default iteration, and (together with the virtual
/// blank scene) the random-selection pool.
pub fn manifest() -> Vec<SceneDescriptor> {
    vec![
        text::descriptor(),
        starfield::descriptor(),
        mystify::descriptor(),
        pyro::descriptor(),
        toasters::descriptor(),
        rain::descriptor(),
        drift::descriptor(),
    ]
}

//=========================================================================
// Unit Tests
//=========================================================================
