//=========================================================================
// Starfield Scene
//=========================================================================
//
// Classic warp field: stars spread in a box around the view axis fly
// toward the viewer, drawn as streaks at higher speeds. Stars that pass
// the viewer or drift off-screen are recycled in place.
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
        id: "starfield",
        display_name: "Starfield",
        uses_canvas: true,
        schema: vec![
            ("starDensity", OptionDef::range("Number of Stars", 200, 50, 500)),
            ("warpSpeed", OptionDef::range("Warp Speed", 5, 1, 15)),
        ],
        factory: || Box::new(Starfield::new()),
    }
}

//=== Scene ===============================================================

const MAX_DEPTH: f64 = 1000.0;
const OFFSCREEN_MARGIN: f64 = 50.0;

struct Star {
    x: f64,
    y: f64,
    z: f64,
}

pub struct Starfield {
    stars: Vec<Star>,
    num_stars: usize,
    speed: f64,
    focal_length: f64,
    width: f64,
    height: f64,
    center_x: f64,
    center_y: f64,
    timer: FrameTimer,
    rng: StdRng,
}

impl Starfield {
    pub fn new() -> Self {
        Self {
            stars: Vec::new(),
            num_stars: 200,
            speed: 5.0,
            focal_length: 256.0,
            width: 0.0,
            height: 0.0,
            center_x: 0.0,
            center_y: 0.0,
            timer: FrameTimer::new(60.0),
            rng: StdRng::from_entropy(),
        }
    }

    fn derive_layout(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.center_x = width / 2.0;
        self.center_y = height / 2.0;
    }

    fn spawn_star(&mut self, random_depth: bool) -> Star {
        let spread = self.width.max(self.height);
        Star {
            x: (self.rng.gen::<f64>() - 0.5) * spread,
            y: (self.rng.gen::<f64>() - 0.5) * spread,
            z: if random_depth {
                self.rng.gen::<f64>() * MAX_DEPTH + 1.0
            } else {
                MAX_DEPTH
            },
        }
    }

    /// Resets a star at the far plane instead of reallocating it.
    fn recycle_star(&mut self, index: usize) {
        let fresh = self.spawn_star(false);
        self.stars[index] = fresh;
    }
}

impl Scene for Starfield {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.num_stars = options.int("starDensity", 200).max(1) as usize;
        self.speed = options.float("warpSpeed", 5.0);
        self.timer = FrameTimer::new(60.0)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        // Small previews carry fewer stars and a tighter projection.
        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.num_stars = (self.num_stars / 3).max(1);
            self.focal_length = 128.0;
        } else {
            self.focal_length = 256.0;
        }

        self.derive_layout(ctx.canvas.width_f(), ctx.canvas.height_f());

        self.stars.clear();
        for _ in 0..self.num_stars {
            let star = self.spawn_star(true);
            self.stars.push(star);
        }

        ctx.canvas.clear(Color::BLACK);
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, now_ms: f64) {
        let Some(delta) = self.timer.tick(now_ms) else {
            return;
        };

        // Layout may be underivable while the surface has no area; pick
        // it up on the first frame that sees a real size.
        if self.width <= 0.0 || self.height <= 0.0 {
            self.derive_layout(ctx.canvas.width_f(), ctx.canvas.height_f());
            if self.width <= 0.0 || self.height <= 0.0 {
                return;
            }
        }

        ctx.canvas.clear(Color::BLACK);
        let scale = ctx.canvas.base_scale();

        for i in 0..self.stars.len() {
            self.stars[i].z -= self.speed * delta;

            if self.stars[i].z <= 1.0 {
                self.recycle_star(i);
            }

            let star = &self.stars[i];
            let screen_x = (star.x / star.z) * self.focal_length + self.center_x;
            let screen_y = (star.y / star.z) * self.focal_length + self.center_y;

            if screen_x < -OFFSCREEN_MARGIN
                || screen_x > self.width + OFFSCREEN_MARGIN
                || screen_y < -OFFSCREEN_MARGIN
                || screen_y > self.height + OFFSCREEN_MARGIN
            {
                self.recycle_star(i);
                continue;
            }

            let star = &self.stars[i];
            let depth_ratio = 1.0 - star.z / MAX_DEPTH;
            let size = (depth_ratio * 3.0 * scale).max(0.5);
            let value = (155.0 + depth_ratio * 100.0) as u8;
            let color = Color::gray(value);

            if self.speed >= 3.0 {
                // Streak from the previous depth position.
                let prev_z = star.z + self.speed;
                let prev_x = (star.x / prev_z) * self.focal_length + self.center_x;
                let prev_y = (star.y / prev_z) * self.focal_length + self.center_y;
                ctx.canvas.line(prev_x, prev_y, screen_x, screen_y, size, color);
            } else {
                ctx.canvas.fill_circle(screen_x, screen_y, size, color);
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.derive_layout(width as f64, height as f64);
    }

    fn destroy(&mut self) {
        self.stars.clear();
        self.timer.reset();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
