//=========================================================================
// Nocturne Host
//=========================================================================
//
// Main entry point and coordinator for the idle surface.
//
// Architecture:
// ```text
//     HostBuilder  ──build()──>  Host  ──run()──>  [Surface]
//         │                       │
//         ├─ with_store()         └─ wires channels
//         └─ with_manifest()         owns the controller
//                                    runs the platform shell
//                                    blocks until dismissal
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::controller::{Controller, HostMessage, SurfaceMode, SurfaceRequest};
use crate::core::registry::{Registry, SceneDescriptor};
use crate::core::settings::{MemoryStore, SettingsStore};
use crate::platform::Platform;

//=== HostBuilder =========================================================

/// Builder for configuring and constructing a [`Host`].
///
/// # Defaults
///
/// - **Scenes**: the built-in manifest ([`crate::scenes::manifest`])
/// - **Store**: in-memory (settings reset every launch); pass a
///   [`crate::core::settings::JsonFileStore`] for persistence
///
/// # Examples
///
/// ```no_run
/// use nocturne::HostBuilder;
/// use nocturne::core::JsonFileStore;
///
/// HostBuilder::new()
///     .with_store(JsonFileStore::in_dir("~/.config/nocturne"))
///     .build()
///     .run();
/// ```
pub struct HostBuilder {
    store: Box<dyn SettingsStore>,
    manifest: Vec<SceneDescriptor>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            manifest: crate::scenes::manifest(),
        }
    }

    /// Uses the given settings store instead of the in-memory default.
    pub fn with_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Replaces the scene manifest. Order is preserved and drives both
    /// listing and the random pool.
    pub fn with_manifest(mut self, manifest: Vec<SceneDescriptor>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Builds the host.
    pub fn build(self) -> Host {
        let registry = Registry::with_manifest(self.manifest);
        info!("Building host ({} scenes)", registry.list().len());

        let (message_tx, message_rx) = unbounded();
        Host {
            registry,
            store: self.store,
            message_tx,
            message_rx,
        }
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Host ================================================================

/// The idle-surface runtime: registry + settings + controller, hosted in
/// a fullscreen platform shell.
///
/// # Examples
///
/// ```no_run
/// use nocturne::HostBuilder;
///
/// let host = HostBuilder::new().build();
/// let messages = host.message_sender();   // hand to the idle detector
/// host.run();                             // blocks until dismissed
/// # drop(messages);
/// ```
pub struct Host {
    registry: Registry,
    store: Box<dyn SettingsStore>,
    message_tx: Sender<HostMessage>,
    message_rx: Receiver<HostMessage>,
}

impl Host {
    //--- Wiring -----------------------------------------------------------

    /// Channel end for the external collaborators (idle detector,
    /// options page) to notify the running surface.
    pub fn message_sender(&self) -> Sender<HostMessage> {
        self.message_tx.clone()
    }

    //--- Execution --------------------------------------------------------

    /// Opens the fullscreen surface and blocks until it is dismissed:
    /// by a key press, sustained pointer movement, or a close message.
    pub fn run(self) {
        info!("Starting idle surface");

        let (request_tx, request_rx) = unbounded::<SurfaceRequest>();

        let controller = Controller::new(
            self.registry,
            self.store,
            // Real dimensions arrive with the first window resize.
            SurfaceMode::Fullscreen { width: 0, height: 0 },
            request_tx,
        );

        let platform = Platform::new(controller, self.message_rx, request_rx);
        if let Err(e) = platform.run() {
            error!("Platform error: {}", e);
        }

        info!("Idle surface dismissed");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_carries_the_builtin_manifest() {
        let host = HostBuilder::new().build();
        assert!(host.registry.list().contains(&"text".to_string()));
        assert!(host.registry.list().contains(&"starfield".to_string()));
    }

    #[test]
    fn builder_accepts_a_custom_manifest() {
        let host = HostBuilder::new().with_manifest(vec![]).build();
        assert!(host.registry.list().is_empty());
    }

    #[test]
    fn message_sender_reaches_the_host_channel() {
        let host = HostBuilder::new().build();
        let sender = host.message_sender();
        sender.send(HostMessage::TestScreensaver).unwrap();
        assert!(host.message_rx.try_recv().is_ok());
    }
}
