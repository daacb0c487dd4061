//=========================================================================
// Platform Shell
//=========================================================================
//
// Bridges Winit (OS window + events) with the core controller.
//
// Architecture:
// ```text
//   Winit Event Loop
//     ├─ Resumed          → fullscreen window, framebuffer, activate
//     ├─ Resized          → controller.resize + framebuffer resize
//     ├─ KeyboardInput    → controller.request_close()
//     ├─ CursorMoved      → PointerWatch → controller.request_close()
//     ├─ Occluded         → controller.set_visible(..)
//     └─ RedrawRequested  → drain host messages
//                           controller.frame(now)
//                           blit canvas → framebuffer → present
//                           poll close requests → exit
// ```
//
// RedrawRequested is the frame boundary: the controller runs exactly
// once per presented frame and the loop re-arms itself by requesting
// the next redraw. Everything stays on the main thread: Winit requires
// it on macOS/iOS, and the core is single-owner by design.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod pointer;

//=== External Crates =====================================================

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;
use log::*;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowAttributes},
};

//=== Internal Imports ====================================================

use crate::core::controller::{Controller, HostMessage, SurfaceRequest};
use pointer::PointerWatch;

//=== PlatformError =======================================================

/// Platform initialization and runtime errors. These are fatal - without
/// an event loop and a surface there is nothing to host.
#[derive(Debug)]
pub(crate) enum PlatformError {
    EventLoopCreation(winit::error::EventLoopError),
    EventLoopExecution(winit::error::EventLoopError),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

//=== Platform ============================================================

/// Fullscreen window owner and event pump. Owns the controller for the
/// lifetime of the surface and presents its canvas every frame.
pub(crate) struct Platform {
    window: Option<Arc<Window>>,
    framebuffer: Option<Pixels<'static>>,
    controller: Controller,
    messages: Receiver<HostMessage>,
    requests: Receiver<SurfaceRequest>,
    pointer: PointerWatch,
    started: Instant,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub fn new(
        controller: Controller,
        messages: Receiver<HostMessage>,
        requests: Receiver<SurfaceRequest>,
    ) -> Self {
        info!(target: "platform", "Platform shell initialized");
        Self {
            window: None,
            framebuffer: None,
            controller,
            messages,
            requests,
            pointer: PointerWatch::new(),
            started: Instant::now(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the surface is dismissed.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (Winit requirement on
    /// macOS/iOS).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Copies the controller's canvas into the window framebuffer and
    /// presents it. Skips the frame on any size mismatch (a resize is in
    /// flight; the next frame catches up).
    fn present(&mut self) {
        let Some(framebuffer) = &mut self.framebuffer else {
            return;
        };

        let canvas = self.controller.canvas();
        let frame = framebuffer.frame_mut();
        if frame.len() == canvas.data().len() {
            frame.copy_from_slice(canvas.data());
        }

        if let Err(e) = framebuffer.render() {
            warn!(target: "platform", "Present failed: {}", e);
        }
    }

    fn drain_host_messages(&mut self, now_ms: f64) {
        while let Ok(message) = self.messages.try_recv() {
            debug!(target: "platform", "Host message: {:?}", message);
            self.controller.handle_message(message, now_ms);
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the fullscreen surface on first activation.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Nocturne")
            .with_fullscreen(Some(Fullscreen::Borderless(None)));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };
        window.set_cursor_visible(false);

        let size = window.inner_size();
        info!(
            target: "platform",
            "Surface created: {}x{} @ {}x DPI",
            size.width,
            size.height,
            window.scale_factor()
        );

        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window.clone());
        match Pixels::new(size.width.max(1), size.height.max(1), surface) {
            Ok(framebuffer) => self.framebuffer = Some(framebuffer),
            Err(e) => {
                error!(target: "platform", "Framebuffer creation failed: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.controller.resize(size.width, size.height);
        let now = self.now_ms();
        self.controller.activate(now);

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.controller.resize(size.width, size.height);
                if let Some(framebuffer) = &mut self.framebuffer {
                    if let Err(e) = framebuffer.resize_surface(size.width.max(1), size.height.max(1)) {
                        warn!(target: "platform", "Surface resize failed: {}", e);
                    }
                    if let Err(e) = framebuffer.resize_buffer(size.width.max(1), size.height.max(1)) {
                        warn!(target: "platform", "Buffer resize failed: {}", e);
                    }
                }
            }

            WindowEvent::Occluded(occluded) => {
                // Power invariant: a hidden surface must not animate.
                let now = self.now_ms();
                self.controller.set_visible(!occluded, now);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state == ElementState::Pressed {
                    debug!(target: "platform", "Key press, closing");
                    self.controller.request_close();
                }
            }

            WindowEvent::CursorMoved { .. } => {
                let now = self.now_ms();
                if self.pointer.on_motion(now) {
                    debug!(target: "platform", "Sustained pointer movement, closing");
                    self.pointer.reset();
                    self.controller.request_close();
                }
            }

            WindowEvent::RedrawRequested => {
                let now = self.now_ms();
                self.drain_host_messages(now);
                self.controller.frame(now);
                self.present();

                if self.requests.try_recv() == Ok(SurfaceRequest::Close) {
                    info!(target: "platform", "Dismissing surface");
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {
                // Focus, moved, IME, etc. are not needed here.
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
