//=========================================================================
// Text Layer
//=========================================================================
//
// Retained-mode sibling of the canvas: a single floating content panel
// used by scenes that render text instead of pixels. The host surface
// decides how to present the panel; this layer only tracks its state.
//
// Two visibility levels exist:
// - `enabled`: whether the layer is shown at all (controller-owned,
//   toggled against the canvas when a scene starts).
// - `panel_visible`: whether the panel is currently shown within the
//   layer (scene-owned; the content cycle hides it briefly while it
//   moves to a new position).
//
//=========================================================================

//=== TextLayer ===========================================================

#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    enabled: bool,
    panel_visible: bool,
    centered: bool,
    x: f64,
    y: f64,

    pub time_text: Option<String>,
    pub date_text: Option<String>,
    pub custom_text: Option<String>,
    pub quote_text: Option<String>,
}

impl TextLayer {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Layer Visibility (controller-owned) ------------------------------

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    //--- Panel State (scene-owned) ----------------------------------------

    pub fn show(&mut self) {
        self.panel_visible = true;
    }

    pub fn hide(&mut self) {
        self.panel_visible = false;
    }

    pub fn is_panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.centered = false;
    }

    /// Centers the panel; used in preview mode where repositioning inside
    /// a small embedded surface is not meaningful.
    pub fn center(&mut self) {
        self.centered = true;
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    //--- Content ----------------------------------------------------------

    /// Drops all content and hides the panel. Called when a text scene is
    /// destroyed so nothing lingers on the next activation.
    pub fn clear(&mut self) {
        self.panel_visible = false;
        self.centered = false;
        self.time_text = None;
        self.date_text = None;
        self.custom_text = None;
        self.quote_text = None;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
