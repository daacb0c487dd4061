//=========================================================================
// Nocturne — Library Root
//
// This crate defines the public API surface of the Nocturne idle host.
//
// Responsibilities:
// - Expose the high-level host interface (`Host` / `HostBuilder`)
// - Expose the core systems (registry, scenes, settings) for embedding
//   and for building custom scene manifests
// - Keep the OS-facing shell (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use nocturne::HostBuilder;
//
// fn main() {
//     HostBuilder::new().build().run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every windowing-independent system: the scene registry,
// the runtime contract, option coercion, settings, selection, and the
// surface controller. `scenes` is the built-in scene library and its
// manifest.
//
pub mod core;
pub mod scenes;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the OS-specific shell (window, Winit integration,
// framebuffer presentation) and is kept private, as it is not part of the
// public API surface.
//
// `host` defines the main entry point and wiring.
//
mod host;
mod platform;

//--- Public Exports ------------------------------------------------------

pub mod prelude;

pub use host::{Host, HostBuilder};
