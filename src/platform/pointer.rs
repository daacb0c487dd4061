//=========================================================================
// Pointer Exit Watch
//=========================================================================
//
// Decides when pointer movement counts as "the user is back".
//
// A single jolt (desk bump, mouse settling) must not kill the idle
// surface, so intent is defined as continuous movement: motion events
// spanning at least 500 ms, where any 150 ms quiet gap restarts the
// accumulation. Key presses bypass this and close immediately.
//
//=========================================================================

//=== Constants ===========================================================

/// Continuous movement required before the surface closes.
pub const MOVE_THRESHOLD_MS: f64 = 500.0;

/// A quiet gap this long restarts the accumulation window.
pub const QUIET_RESET_MS: f64 = 150.0;

//=== PointerWatch ========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct PointerWatch {
    move_started: Option<f64>,
    last_move: Option<f64>,
}

impl PointerWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one motion event. Returns true when accumulated movement
    /// crosses the exit threshold.
    pub fn on_motion(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_move {
            if now_ms - last >= QUIET_RESET_MS {
                self.move_started = None;
            }
        }

        let started = *self.move_started.get_or_insert(now_ms);
        self.last_move = Some(now_ms);

        now_ms - started >= MOVE_THRESHOLD_MS
    }

    pub fn reset(&mut self) {
        self.move_started = None;
        self.last_move = None;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
