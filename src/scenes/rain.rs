//=========================================================================
// Digital Rain Scene
//=========================================================================
//
// Glyph streams fall down fixed columns, bright at the head and fading
// along the tail. Columns are the derived layout here: their number
// follows the surface width and is recomputed on every resize. The
// scene is calibrated to a 30 fps baseline (rain reads better with a
// chunkier cadence), and physics stay framerate-independent through the
// shared delta normalization either way.
//
//=========================================================================

//=== External Dependencies ===============================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use crate::core::options::{OptionDef, OptionMap};
use crate::core::registry::SceneDescriptor;
use crate::core::scene::{Color, FrameTimer, Scene, SceneContext, SceneError};
use crate::core::selection::MAX_FRAMERATE_KEY;

//=== Descriptor ==========================================================

pub fn descriptor() -> SceneDescriptor {
    SceneDescriptor {
        id: "rain",
        display_name: "Digital Rain",
        uses_canvas: true,
        schema: vec![
            ("speed", OptionDef::range("Fall Speed", 1, 1, 5)),
            ("density", OptionDef::range_with_step("Stream Density", 1.0, 0.5, 2.0, 0.5)),
            (
                "colorMode",
                OptionDef::select(
                    "Color",
                    "green",
                    &["green", "multi", "white"],
                    &["Classic Green", "Multicolor", "White"],
                ),
            ),
        ],
        factory: || Box::new(Rain::new()),
    }
}

//=== Scene ===============================================================

const TARGET_FPS: f64 = 30.0;

struct Column {
    x: f64,
    head_y: f64,
    speed: f64,
    stream_length: usize,
    hue: f64,
    /// Per-cell brightness jitter, mutated while falling so the stream
    /// shimmers like changing glyphs.
    cells: Vec<f64>,
}

pub struct Rain {
    columns: Vec<Column>,
    speed: f64,
    density: f64,
    color_mode: String,
    cell_w: f64,
    cell_h: f64,
    width: f64,
    height: f64,
    timer: FrameTimer,
    rng: StdRng,
}

impl Rain {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            speed: 1.0,
            density: 1.0,
            color_mode: "green".to_string(),
            cell_w: 20.0,
            cell_h: 16.0,
            width: 0.0,
            height: 0.0,
            timer: FrameTimer::new(TARGET_FPS),
            rng: StdRng::from_entropy(),
        }
    }

    fn spawn_column(&mut self, index: usize, random_start: bool) -> Column {
        let stream_length = 10 + self.rng.gen_range(0..20);
        Column {
            x: index as f64 * self.cell_w,
            head_y: if random_start {
                self.rng.gen::<f64>() * self.height - self.height
            } else {
                0.0
            },
            speed: 0.5 + self.rng.gen::<f64>(),
            stream_length,
            hue: self.rng.gen::<f64>() * 360.0,
            cells: (0..stream_length).map(|_| self.rng.gen::<f64>()).collect(),
        }
    }

    /// Lanes follow the surface width; called at init and on resize.
    fn derive_columns(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        let count = (width / self.cell_w).ceil() as usize;
        self.columns.clear();
        for i in 0..count {
            let column = self.spawn_column(i, true);
            self.columns.push(column);
        }
    }

    fn cell_color(&self, column: &Column, fade: f64, is_head: bool) -> Color {
        if is_head {
            return Color::rgb(230, 255, 230);
        }
        let lightness = 18.0 + fade * 38.0;
        match self.color_mode.as_str() {
            "multi" => Color::hsl(column.hue, 90.0, lightness),
            "white" => Color::gray((fade * 200.0) as u8),
            _ => Color::hsl(120.0, 95.0, lightness),
        }
    }
}

impl Scene for Rain {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.speed = options.float("speed", 1.0);
        self.density = options.float("density", 1.0);
        self.color_mode = options.text("colorMode", "green");
        self.timer = FrameTimer::new(TARGET_FPS)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        // Tighter lattice inside a small preview.
        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.cell_w = 12.0;
            self.cell_h = 10.0;
        } else {
            self.cell_w = 20.0;
            self.cell_h = 16.0;
        }

        self.derive_columns(ctx.canvas.width_f(), ctx.canvas.height_f());
        ctx.canvas.clear(Color::BLACK);
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, now_ms: f64) {
        let Some(delta) = self.timer.tick(now_ms) else {
            return;
        };
        if self.width <= 0.0 || self.height <= 0.0 {
            self.derive_columns(ctx.canvas.width_f(), ctx.canvas.height_f());
            if self.width <= 0.0 || self.height <= 0.0 {
                return;
            }
        }

        ctx.canvas.clear(Color::BLACK);

        let fall = self.cell_h * 0.6 * self.speed * self.density;
        for i in 0..self.columns.len() {
            self.columns[i].head_y += fall * self.columns[i].speed * delta;

            // Shimmer one random cell per column per frame.
            let len = self.columns[i].cells.len();
            let jitter = self.rng.gen_range(0..len);
            let value = self.rng.gen::<f64>();
            self.columns[i].cells[jitter] = value;

            let tail = self.columns[i].head_y
                - self.columns[i].stream_length as f64 * self.cell_h;
            if tail > self.height {
                let fresh = self.spawn_column(i, false);
                self.columns[i] = fresh;
            }

            let column = &self.columns[i];
            for cell in 0..column.stream_length {
                let y = column.head_y - cell as f64 * self.cell_h;
                if y < -self.cell_h || y > self.height {
                    continue;
                }
                let fade = 1.0 - cell as f64 / column.stream_length as f64;
                let brightness = fade * (0.6 + column.cells[cell] * 0.4);
                let color = self.cell_color(column, brightness, cell == 0);
                ctx.canvas.fill_rect(
                    column.x + 1.0,
                    y,
                    self.cell_w - 2.0,
                    self.cell_h - 2.0,
                    color,
                );
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.derive_columns(width as f64, height as f64);
    }

    fn destroy(&mut self) {
        self.columns.clear();
        self.timer.reset();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::{Canvas, TextLayer};

    fn init_scene(canvas: &mut Canvas) -> Rain {
        let mut text = TextLayer::new();
        let mut scene = Rain::new();
        let mut ctx = SceneContext { canvas, text: &mut text };
        scene.init(&OptionMap::new(), &mut ctx).unwrap();
        scene
    }

    #[test]
    fn column_count_follows_surface_width() {
        let mut canvas = Canvas::tracking(400, 300);
        let scene = init_scene(&mut canvas);
        assert_eq!(scene.columns.len(), 20, "400px / 20px lanes");
    }

    #[test]
    fn resize_rederives_the_lanes() {
        let mut canvas = Canvas::tracking(400, 300);
        let mut scene = init_scene(&mut canvas);
        scene.resize(800, 300);
        assert_eq!(scene.columns.len(), 40);
    }

    #[test]
    fn finished_streams_are_recycled_above_the_top() {
        let mut canvas = Canvas::tracking(200, 100);
        let mut scene = init_scene(&mut canvas);
        let lanes = scene.columns.len();

        scene.columns[0].head_y = 10_000.0;
        let mut text = TextLayer::new();
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);

        assert_eq!(scene.columns.len(), lanes);
        assert!(
            scene.columns[0].head_y < 100.0,
            "a finished stream restarts near the top instead of being dropped"
        );
    }

    #[test]
    fn preview_uses_a_tighter_lattice() {
        let mut canvas = Canvas::fixed(300, 200);
        let scene = init_scene(&mut canvas);
        assert_eq!(scene.cell_w, 12.0);
    }
}
