//=========================================================================
// Text Scene
//=========================================================================
//
// The only non-canvas scene: a floating panel showing clock, date, an
// optional custom message, and rotating quotes. It follows the reduced
// contract: no frame physics, just periodic work expressed as
// deadlines checked each update:
//
//   every 1 s   refresh the clock readout
//   every 8 s   hide the panel, and 1 s later reposition it, pick a
//               fresh quote, and show it again
//
// Preview mode centers the panel and skips the reposition cycle, since
// wandering inside a small embedded surface is meaningless. Content can
// also be refreshed in place through `update_content` while the options
// page live-edits it.
//
//=========================================================================

//=== External Dependencies ===============================================

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use crate::core::options::{OptionDef, OptionMap};
use crate::core::quotes::random_quote;
use crate::core::registry::SceneDescriptor;
use crate::core::scene::{Scene, SceneContext, SceneError};

//=== Descriptor ==========================================================

pub fn descriptor() -> SceneDescriptor {
    SceneDescriptor {
        id: "text",
        display_name: "Clock & Text",
        uses_canvas: false,
        schema: vec![
            ("showTime", OptionDef::checkbox("Show Time", true)),
            ("showDate", OptionDef::checkbox("Show Date", true)),
            ("showQuotes", OptionDef::checkbox("Show Quotes", true)),
            (
                "customText",
                OptionDef::text("Custom Message", "").with_placeholder("Shown under the clock"),
            ),
        ],
        factory: || Box::new(TextScene::new()),
    }
}

//=== Scene ===============================================================

const CLOCK_TICK_MS: f64 = 1_000.0;
const CYCLE_PERIOD_MS: f64 = 8_000.0;
const REPOSITION_GAP_MS: f64 = 1_000.0;
const EDGE_PADDING: f64 = 50.0;
const PANEL_WIDTH: f64 = 480.0;
const PANEL_HEIGHT: f64 = 220.0;

pub struct TextScene {
    show_time: bool,
    show_date: bool,
    show_quotes: bool,
    custom_text: String,
    preview: bool,

    next_clock_at: Option<f64>,
    hide_at: Option<f64>,
    reshow_at: Option<f64>,

    rng: StdRng,
}

impl TextScene {
    pub fn new() -> Self {
        Self {
            show_time: true,
            show_date: true,
            show_quotes: true,
            custom_text: String::new(),
            preview: false,
            next_clock_at: None,
            hide_at: None,
            reshow_at: None,
            rng: StdRng::from_entropy(),
        }
    }

    fn apply_options(&mut self, options: &OptionMap) {
        self.show_time = options.flag("showTime", true);
        self.show_date = options.flag("showDate", true);
        self.show_quotes = options.flag("showQuotes", true);
        self.custom_text = options.text("customText", "");
    }

    fn refresh_content(&mut self, ctx: &mut SceneContext<'_>) {
        let now = Local::now();
        ctx.text.time_text = self.show_time.then(|| now.format("%H:%M").to_string());
        ctx.text.date_text = self.show_date.then(|| now.format("%A, %B %e").to_string());
        ctx.text.custom_text =
            (!self.custom_text.is_empty()).then(|| self.custom_text.clone());
        ctx.text.quote_text = self.show_quotes.then(|| random_quote(&mut self.rng).to_string());
    }

    fn reposition(&mut self, ctx: &mut SceneContext<'_>) {
        if self.preview {
            ctx.text.center();
            return;
        }
        let max_x = (ctx.canvas.width_f() - PANEL_WIDTH - EDGE_PADDING).max(EDGE_PADDING);
        let max_y = (ctx.canvas.height_f() - PANEL_HEIGHT - EDGE_PADDING).max(EDGE_PADDING);
        let x = EDGE_PADDING + self.rng.gen::<f64>() * (max_x - EDGE_PADDING);
        let y = EDGE_PADDING + self.rng.gen::<f64>() * (max_y - EDGE_PADDING);
        ctx.text.set_position(x, y);
    }
}

impl Scene for TextScene {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.apply_options(options);
        self.preview = ctx.canvas.is_fixed();
        self.next_clock_at = None;
        self.hide_at = None;
        self.reshow_at = None;

        self.refresh_content(ctx);
        self.reposition(ctx);
        ctx.text.show();
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, now_ms: f64) {
        // Deadlines anchor to the first observed timestamp.
        if self.next_clock_at.is_none() {
            self.next_clock_at = Some(now_ms + CLOCK_TICK_MS);
            if !self.preview {
                self.hide_at = Some(now_ms + CYCLE_PERIOD_MS);
            }
        }

        if self.show_time && self.next_clock_at.is_some_and(|t| now_ms >= t) {
            ctx.text.time_text = Some(Local::now().format("%H:%M").to_string());
            self.next_clock_at = Some(now_ms + CLOCK_TICK_MS);
        }

        if self.hide_at.is_some_and(|t| now_ms >= t) {
            ctx.text.hide();
            self.hide_at = None;
            self.reshow_at = Some(now_ms + REPOSITION_GAP_MS);
        }

        if self.reshow_at.is_some_and(|t| now_ms >= t) {
            self.reposition(ctx);
            if self.show_quotes {
                ctx.text.quote_text = Some(random_quote(&mut self.rng).to_string());
            }
            ctx.text.show();
            self.reshow_at = None;
            self.hide_at = Some(now_ms + CYCLE_PERIOD_MS);
        }
    }

    fn destroy(&mut self) {
        self.next_clock_at = None;
        self.hide_at = None;
        self.reshow_at = None;
    }

    fn update_content(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) {
        self.apply_options(options);
        self.refresh_content(ctx);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionValue;
    use crate::core::scene::{Canvas, TextLayer};

    fn init_scene(canvas: &mut Canvas, text: &mut TextLayer, options: OptionMap) -> TextScene {
        let mut scene = TextScene::new();
        let mut ctx = SceneContext { canvas, text };
        scene.init(&options, &mut ctx).unwrap();
        scene
    }

    #[test]
    fn init_shows_a_populated_panel() {
        let mut canvas = Canvas::tracking(1920, 1080);
        let mut text = TextLayer::new();
        init_scene(&mut canvas, &mut text, OptionMap::new());

        assert!(text.is_panel_visible());
        assert!(text.time_text.is_some());
        assert!(text.date_text.is_some());
        assert!(text.quote_text.is_some());
        assert!(text.custom_text.is_none(), "no custom message configured");
    }

    #[test]
    fn disabled_fields_stay_empty() {
        let mut canvas = Canvas::tracking(1920, 1080);
        let mut text = TextLayer::new();
        let mut options = OptionMap::new();
        options.insert("showTime", OptionValue::Bool(false));
        options.insert("showQuotes", OptionValue::Bool(false));
        init_scene(&mut canvas, &mut text, options);

        assert!(text.time_text.is_none());
        assert!(text.quote_text.is_none());
        assert!(text.date_text.is_some());
    }

    #[test]
    fn custom_message_is_carried() {
        let mut canvas = Canvas::tracking(1920, 1080);
        let mut text = TextLayer::new();
        let mut options = OptionMap::new();
        options.insert("customText", OptionValue::Text("good night".to_string()));
        init_scene(&mut canvas, &mut text, options);
        assert_eq!(text.custom_text.as_deref(), Some("good night"));
    }

    #[test]
    fn cycle_hides_then_reshows_elsewhere() {
        let mut canvas = Canvas::tracking(1920, 1080);
        let mut text = TextLayer::new();
        let mut scene = init_scene(&mut canvas, &mut text, OptionMap::new());

        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);
        assert!(ctx.text.is_panel_visible());

        scene.update(&mut ctx, 8_000.0);
        assert!(!ctx.text.is_panel_visible(), "the panel hides at the cycle boundary");

        scene.update(&mut ctx, 9_000.0);
        assert!(ctx.text.is_panel_visible(), "and reappears after the gap");
    }

    #[test]
    fn preview_centers_and_never_cycles() {
        let mut canvas = Canvas::fixed(320, 180);
        let mut text = TextLayer::new();
        let mut scene = init_scene(&mut canvas, &mut text, OptionMap::new());
        assert!(text.is_centered());

        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);
        scene.update(&mut ctx, 60_000.0);
        assert!(
            ctx.text.is_panel_visible(),
            "preview mode must not run the reposition cycle"
        );
    }

    #[test]
    fn update_content_refreshes_without_restart() {
        let mut canvas = Canvas::tracking(1920, 1080);
        let mut text = TextLayer::new();
        let mut scene = init_scene(&mut canvas, &mut text, OptionMap::new());

        let mut options = OptionMap::new();
        options.insert("customText", OptionValue::Text("edited".to_string()));
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update_content(&options, &mut ctx);

        assert_eq!(ctx.text.custom_text.as_deref(), Some("edited"));
        assert!(ctx.text.is_panel_visible(), "refresh must not restart the panel");
    }

    #[test]
    fn destroy_without_init_is_safe() {
        let mut scene = TextScene::new();
        scene.destroy();
        scene.destroy();
    }
}
