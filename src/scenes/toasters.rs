//=========================================================================
// Flying Toasters Scene
//=========================================================================
//
// Homage to the classic: chrome toasters with flapping wings glide
// diagonally across the screen, trailed by slices of toast. Both fleets
// respawn at the upwind edge when they leave the screen.
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
        id: "toasters",
        display_name: "Flying Toasters",
        uses_canvas: true,
        schema: vec![
            ("toasterCount", OptionDef::range("Number of Toasters", 8, 2, 20)),
            ("toastCount", OptionDef::range("Number of Toast", 6, 0, 15)),
            ("speed", OptionDef::range("Flight Speed", 2, 1, 8)),
            (
                "direction",
                OptionDef::select(
                    "Direction",
                    "diagonal-down-left",
                    &[
                        "diagonal-down-left",
                        "diagonal-down-right",
                        "diagonal-up-left",
                        "diagonal-up-right",
                    ],
                    &["Down-Left (Classic)", "Down-Right", "Up-Left", "Up-Right"],
                ),
            ),
            (
                "toastDarkness",
                OptionDef::select(
                    "Toast Doneness",
                    "mixed",
                    &["light", "medium", "dark", "mixed"],
                    &["Light", "Medium", "Dark", "Mixed"],
                ),
            ),
        ],
        factory: || Box::new(Toasters::new()),
    }
}

//=== Scene ===============================================================

struct Toaster {
    x: f64,
    y: f64,
    scale: f64,
    speed: f64,
    wing_phase: f64,
    wing_speed: f64,
}

struct Toast {
    x: f64,
    y: f64,
    scale: f64,
    speed: f64,
    doneness: f64,
}

pub struct Toasters {
    toasters: Vec<Toaster>,
    toasts: Vec<Toast>,
    toaster_count: usize,
    toast_count: usize,
    speed: f64,
    dx: f64,
    dy: f64,
    darkness: String,
    width: f64,
    height: f64,
    timer: FrameTimer,
    rng: StdRng,
}

fn direction_vector(direction: &str) -> (f64, f64) {
    match direction {
        "diagonal-down-right" => (1.0, 1.0),
        "diagonal-up-left" => (-1.0, -1.0),
        "diagonal-up-right" => (1.0, -1.0),
        _ => (-1.0, 1.0),
    }
}

impl Toasters {
    pub fn new() -> Self {
        Self {
            toasters: Vec::new(),
            toasts: Vec::new(),
            toaster_count: 8,
            toast_count: 6,
            speed: 2.0,
            dx: -1.0,
            dy: 1.0,
            darkness: "mixed".to_string(),
            width: 0.0,
            height: 0.0,
            timer: FrameTimer::new(60.0),
            rng: StdRng::from_entropy(),
        }
    }

    /// Edge spawn position upwind of the travel direction, with scatter
    /// past the border so entities do not pop in along a line.
    fn edge_position(&mut self, margin: f64) -> (f64, f64) {
        if self.rng.gen_bool(0.5) {
            let x = self.rng.gen::<f64>() * (self.width + 2.0 * margin) - margin;
            let y = if self.dy > 0.0 {
                -margin - self.rng.gen::<f64>() * margin
            } else {
                self.height + margin + self.rng.gen::<f64>() * margin
            };
            (x, y)
        } else {
            let y = self.rng.gen::<f64>() * (self.height + 2.0 * margin) - margin;
            let x = if self.dx < 0.0 {
                self.width + margin + self.rng.gen::<f64>() * margin
            } else {
                -margin - self.rng.gen::<f64>() * margin
            };
            (x, y)
        }
    }

    fn spawn_toaster(&mut self, anywhere: bool) -> Toaster {
        let (x, y) = if anywhere {
            (
                self.rng.gen::<f64>() * self.width,
                self.rng.gen::<f64>() * self.height,
            )
        } else {
            self.edge_position(50.0)
        };
        Toaster {
            x,
            y,
            scale: 0.6 + self.rng.gen::<f64>() * 0.6,
            speed: 0.8 + self.rng.gen::<f64>() * 0.4,
            wing_phase: self.rng.gen::<f64>() * std::f64::consts::TAU,
            wing_speed: 0.15 + self.rng.gen::<f64>() * 0.1,
        }
    }

    fn spawn_toast(&mut self, anywhere: bool) -> Toast {
        let (x, y) = if anywhere {
            (
                self.rng.gen::<f64>() * self.width,
                self.rng.gen::<f64>() * self.height,
            )
        } else {
            self.edge_position(40.0)
        };
        let doneness = match self.darkness.as_str() {
            "light" => 0.1 + self.rng.gen::<f64>() * 0.2,
            "medium" => 0.3 + self.rng.gen::<f64>() * 0.3,
            "dark" => 0.6 + self.rng.gen::<f64>() * 0.4,
            _ => self.rng.gen::<f64>(),
        };
        Toast {
            x,
            y,
            scale: 0.5 + self.rng.gen::<f64>() * 0.5,
            speed: 0.7 + self.rng.gen::<f64>() * 0.5,
            doneness,
        }
    }

    fn off_screen(&self, x: f64, y: f64, margin: f64) -> bool {
        (self.dx < 0.0 && x < -margin)
            || (self.dx > 0.0 && x > self.width + margin)
            || (self.dy > 0.0 && y > self.height + margin)
            || (self.dy < 0.0 && y < -margin)
    }

    fn draw_toaster(ctx: &mut SceneContext<'_>, toaster: &Toaster, scale: f64) {
        let s = toaster.scale * scale;
        let (x, y) = (toaster.x, toaster.y);
        let w = 60.0 * s;
        let h = 45.0 * s;

        // Wings flap on a sine; drawn behind the body.
        let flap = toaster.wing_phase.sin();
        let wing = Color::gray(235);
        for side in [-1.0, 1.0] {
            let base_x = x + side * w * 0.45;
            let tip_x = base_x + side * 28.0 * s;
            let tip_y = y - 8.0 * s - flap * 14.0 * s;
            ctx.canvas.line(base_x, y - 4.0 * s, tip_x, tip_y, 6.0 * s, wing);
        }

        // Chrome body with slots and lever.
        ctx.canvas.fill_rect(x - w / 2.0, y - h / 2.0, w, h, Color::gray(170));
        ctx.canvas.fill_rect(x - w / 2.0, y - h / 2.0, w, h * 0.25, Color::gray(210));
        ctx.canvas.fill_rect(x - w * 0.38, y - h / 2.0 + 3.0 * s, w * 0.3, 6.0 * s, Color::gray(26));
        ctx.canvas.fill_rect(x + w * 0.08, y - h / 2.0 + 3.0 * s, w * 0.3, 6.0 * s, Color::gray(26));
        ctx.canvas.fill_rect(x + w / 2.0 - 2.0 * s, y - 8.0 * s, 6.0 * s, 16.0 * s, Color::gray(68));
    }

    fn draw_toast(ctx: &mut SceneContext<'_>, toast: &Toast, scale: f64) {
        let s = toast.scale * scale;
        let w = 28.0 * s;
        let h = 32.0 * s;
        let r = (245.0 - toast.doneness * 90.0) as u8;
        let g = (215.0 - toast.doneness * 120.0) as u8;
        let b = (175.0 - toast.doneness * 140.0) as u8;

        ctx.canvas.fill_rect(toast.x - w / 2.0, toast.y - h / 2.0, w, h, Color::rgb(r, g, b));
        // Crust.
        let crust = Color::rgb(r.saturating_sub(50), g.saturating_sub(50), b.saturating_sub(50));
        ctx.canvas.fill_rect(toast.x - w / 2.0, toast.y - h / 2.0, w, 2.0 * s, crust);
        ctx.canvas.fill_rect(toast.x - w / 2.0, toast.y + h / 2.0 - 2.0 * s, w, 2.0 * s, crust);
    }
}

impl Scene for Toasters {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.toaster_count = options.int("toasterCount", 8).max(0) as usize;
        self.toast_count = options.int("toastCount", 6).max(0) as usize;
        self.speed = options.float("speed", 2.0);
        self.darkness = options.text("toastDarkness", "mixed");
        let (dx, dy) = direction_vector(&options.text("direction", "diagonal-down-left"));
        self.dx = dx;
        self.dy = dy;
        self.timer = FrameTimer::new(60.0)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.toaster_count = (self.toaster_count / 2).max(2);
            self.toast_count = (self.toast_count / 2).max(1);
        }

        self.width = ctx.canvas.width_f();
        self.height = ctx.canvas.height_f();

        self.toasters.clear();
        self.toasts.clear();
        for _ in 0..self.toaster_count {
            let t = self.spawn_toaster(true);
            self.toasters.push(t);
        }
        for _ in 0..self.toast_count {
            let t = self.spawn_toast(true);
            self.toasts.push(t);
        }

        ctx.canvas.clear(Color::BLACK);
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, now_ms: f64) {
        let Some(delta) = self.timer.tick(now_ms) else {
            return;
        };
        if self.width <= 0.0 || self.height <= 0.0 {
            self.width = ctx.canvas.width_f();
            self.height = ctx.canvas.height_f();
            if self.width <= 0.0 || self.height <= 0.0 {
                return;
            }
        }

        ctx.canvas.clear(Color::BLACK);
        let scale = ctx.canvas.base_scale();

        // Toast first, so toasters fly over it.
        for i in 0..self.toasts.len() {
            let step = self.toasts[i].speed * self.speed * delta;
            self.toasts[i].x += self.dx * step;
            self.toasts[i].y += self.dy * step;

            if self.off_screen(self.toasts[i].x, self.toasts[i].y, 60.0) {
                let fresh = self.spawn_toast(false);
                self.toasts[i] = fresh;
            }
            Self::draw_toast(ctx, &self.toasts[i], scale);
        }

        for i in 0..self.toasters.len() {
            let step = self.toasters[i].speed * self.speed * delta;
            self.toasters[i].x += self.dx * step;
            self.toasters[i].y += self.dy * step;
            self.toasters[i].wing_phase += self.toasters[i].wing_speed * delta;

            if self.off_screen(self.toasters[i].x, self.toasters[i].y, 100.0) {
                let fresh = self.spawn_toaster(false);
                self.toasters[i] = fresh;
            }
            Self::draw_toaster(ctx, &self.toasters[i], scale);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
    }

    fn destroy(&mut self) {
        self.toasters.clear();
        self.toasts.clear();
        self.timer.reset();
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

    fn init_scene(canvas: &mut Canvas, options: OptionMap) -> Toasters {
        let mut text = TextLayer::new();
        let mut scene = Toasters::new();
        let mut ctx = SceneContext { canvas, text: &mut text };
        scene.init(&options, &mut ctx).unwrap();
        scene
    }

    #[test]
    fn fleet_moves_along_the_configured_direction() {
        let mut canvas = Canvas::tracking(800, 600);
        let mut options = OptionMap::new();
        options.insert("direction", OptionValue::Text("diagonal-down-right".to_string()));
        let mut scene = init_scene(&mut canvas, options);

        // Park one toaster mid-screen so respawn cannot interfere.
        scene.toasters[0].x = 400.0;
        scene.toasters[0].y = 300.0;

        let mut text = TextLayer::new();
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);
        scene.update(&mut ctx, 16.67);

        assert!(scene.toasters[0].x > 400.0, "down-right means x grows");
        assert!(scene.toasters[0].y > 300.0, "down-right means y grows");
    }

    #[test]
    fn departed_entities_respawn_at_the_upwind_edge() {
        let mut canvas = Canvas::tracking(800, 600);
        let mut scene = init_scene(&mut canvas, OptionMap::new());
        let population = scene.toasters.len();

        // Default direction is down-left; push one far past the left edge.
        scene.toasters[0].x = -500.0;
        let mut text = TextLayer::new();
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);

        assert_eq!(scene.toasters.len(), population);
        assert!(scene.toasters[0].x > -200.0, "respawned toaster must be back near the field");
    }

    #[test]
    fn preview_halves_both_fleets() {
        let mut canvas = Canvas::fixed(300, 200);
        let mut options = OptionMap::new();
        options.insert("toasterCount", OptionValue::Int(8));
        options.insert("toastCount", OptionValue::Int(6));
        let scene = init_scene(&mut canvas, options);
        assert_eq!(scene.toasters.len(), 4);
        assert_eq!(scene.toasts.len(), 3);
    }

    #[test]
    fn destroy_clears_both_fleets() {
        let mut canvas = Canvas::tracking(800, 600);
        let mut scene = init_scene(&mut canvas, OptionMap::new());
        scene.destroy();
        assert!(scene.toasters.is_empty() && scene.toasts.is_empty());
        scene.destroy();
    }
}
