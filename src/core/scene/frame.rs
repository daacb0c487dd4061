//=========================================================================
// Frame Timer
//=========================================================================
//
// Shared animation-loop discipline for canvas scenes.
//
// Each frame receives a monotonic timestamp. The timer converts it into
// a normalized delta: 1.0 means "one frame at the scene's calibration
// baseline" (60 fps for most scenes, 30 for the rain scene). Physics
// updates multiply by this delta so motion speed is independent of the
// actual display refresh rate.
//
// The optional framerate cap is a frame-drop throttle, not a sleep:
// `tick` returns None when the frame should be skipped, and the caller
// simply reschedules. Skipped frames do not advance the "last rendered"
// timestamp, so pacing is measured between rendered frames.
//
//=========================================================================

//=== Constants ===========================================================

/// Assumed duration of the very first frame, to avoid a huge initial
/// jump before any inter-frame gap exists.
pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

//=== FrameTimer ==========================================================

#[derive(Debug, Clone)]
pub struct FrameTimer {
    target_fps: f64,
    max_framerate: u32,
    last_frame_ms: Option<f64>,
}

impl FrameTimer {
    //--- Construction -----------------------------------------------------

    /// Creates a timer calibrated to the given baseline framerate.
    ///
    /// # Panics
    ///
    /// Panics if `target_fps <= 0.0`.
    pub fn new(target_fps: f64) -> Self {
        assert!(target_fps > 0.0, "target fps must be positive, got {}", target_fps);
        Self {
            target_fps,
            max_framerate: 0,
            last_frame_ms: None,
        }
    }

    /// Caps rendered frames per second. Zero means unlimited.
    pub fn with_max_framerate(mut self, max_framerate: u32) -> Self {
        self.max_framerate = max_framerate;
        self
    }

    //--- Per-frame Tick ---------------------------------------------------

    /// Advances the timer for a frame at `now_ms`.
    ///
    /// Returns the normalized delta for this frame, or `None` when the
    /// framerate cap says to drop it.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        if self.max_framerate > 0 {
            if let Some(last) = self.last_frame_ms {
                let min_frame_ms = 1000.0 / self.max_framerate as f64;
                if now_ms - last < min_frame_ms {
                    return None;
                }
            }
        }

        let delta_time = match self.last_frame_ms {
            Some(last) => now_ms - last,
            None => NOMINAL_FRAME_MS,
        };
        self.last_frame_ms = Some(now_ms);

        Some(delta_time / (1000.0 / self.target_fps))
    }

    /// Forgets the last frame, so the next tick behaves like a first one.
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
