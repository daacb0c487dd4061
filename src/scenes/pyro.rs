//=========================================================================
// Pyro Scene
//=========================================================================
//
// Fireworks: rockets climb from the bottom edge and burst into particle
// shells. Spent particles are recycled through a dead-slot scan rather
// than reallocated, and the background fades instead of clearing so
// embers leave trails.
//
// Shell variants (willow drag, crossette splits) are per-particle flags
// checked in the shared update; they are deliberately local details of
// this scene, not an extension point.
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
        id: "pyro",
        display_name: "Pyro",
        uses_canvas: true,
        schema: vec![
            ("launchFrequency", OptionDef::range("Launch Frequency", 5, 1, 10)),
            (
                "explosionSize",
                OptionDef::select(
                    "Explosion Size",
                    "medium",
                    &["small", "medium", "large"],
                    &["Small", "Medium", "Large"],
                ),
            ),
            (
                "colorMode",
                OptionDef::select(
                    "Colors",
                    "rainbow",
                    &["rainbow", "warm", "cool", "monochrome"],
                    &["Rainbow", "Warm", "Cool", "Golden"],
                ),
            ),
            ("gravity", OptionDef::range_with_step("Gravity", 1.0, 0.5, 2.0, 0.5)),
        ],
        factory: || Box::new(Pyro::new()),
    }
}

//=== Scene ===============================================================

const PARTICLE_CAP: usize = 4000;
const FADE_ALPHA: u8 = 46;

struct Rocket {
    x: f64,
    y: f64,
    vy: f64,
    burst_y: f64,
    hue: f64,
    alive: bool,
}

struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    life: f64,
    decay: f64,
    hue: f64,
    willow: bool,
    crossette: bool,
    alive: bool,
}

pub struct Pyro {
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    launch_frequency: f64,
    size_multiplier: f64,
    color_mode: String,
    gravity: f64,
    last_launch_ms: Option<f64>,
    width: f64,
    height: f64,
    timer: FrameTimer,
    rng: StdRng,
}

impl Pyro {
    pub fn new() -> Self {
        Self {
            rockets: Vec::new(),
            particles: Vec::new(),
            launch_frequency: 5.0,
            size_multiplier: 1.0,
            color_mode: "rainbow".to_string(),
            gravity: 1.0,
            last_launch_ms: None,
            width: 0.0,
            height: 0.0,
            timer: FrameTimer::new(60.0),
            rng: StdRng::from_entropy(),
        }
    }

    fn pick_hue(&mut self) -> f64 {
        match self.color_mode.as_str() {
            "warm" => self.rng.gen::<f64>() * 60.0,
            "cool" => 180.0 + self.rng.gen::<f64>() * 120.0,
            "monochrome" => 45.0,
            _ => self.rng.gen::<f64>() * 360.0,
        }
    }

    fn launch_rocket(&mut self) {
        let hue = self.pick_hue();
        let rocket = Rocket {
            x: self.width * (0.1 + self.rng.gen::<f64>() * 0.8),
            y: self.height,
            vy: -(7.0 + self.rng.gen::<f64>() * 4.0),
            burst_y: self.height * (0.15 + self.rng.gen::<f64>() * 0.35),
            hue,
            alive: true,
        };
        // Reuse a burnt-out slot before growing the fleet.
        if let Some(slot) = self.rockets.iter_mut().find(|r| !r.alive) {
            *slot = rocket;
        } else {
            self.rockets.push(rocket);
        }
    }

    fn spawn_particle(&mut self, particle: Particle) {
        if let Some(slot) = self.particles.iter_mut().find(|p| !p.alive) {
            *slot = particle;
        } else if self.particles.len() < PARTICLE_CAP {
            self.particles.push(particle);
        }
        // At the cap, the shell simply loses a spark.
    }

    fn burst(&mut self, x: f64, y: f64, hue: f64) {
        let willow = self.rng.gen_bool(0.2);
        let crossette = !willow && self.rng.gen_bool(0.15);
        let count = ((40.0 + self.rng.gen::<f64>() * 30.0) * self.size_multiplier) as usize;

        for _ in 0..count {
            let angle = self.rng.gen::<f64>() * std::f64::consts::TAU;
            let power = (1.0 + self.rng.gen::<f64>() * 3.0) * self.size_multiplier;
            let decay = if willow { 0.004 } else { 0.012 } + self.rng.gen::<f64>() * 0.008;
            self.spawn_particle(Particle {
                x,
                y,
                vx: angle.cos() * power,
                vy: angle.sin() * power,
                life: 1.0,
                decay,
                hue,
                willow,
                crossette,
                alive: true,
            });
        }
    }

    /// Crossette shells pop once at mid-life into four fresh sparks.
    fn split_crossette(&mut self, index: usize) {
        let (x, y, hue) = {
            let p = &self.particles[index];
            (p.x, p.y, p.hue)
        };
        self.particles[index].crossette = false;
        for i in 0..4 {
            let angle = i as f64 * std::f64::consts::FRAC_PI_2;
            self.spawn_particle(Particle {
                x,
                y,
                vx: angle.cos() * 1.5,
                vy: angle.sin() * 1.5,
                life: 0.5,
                decay: 0.015,
                hue,
                willow: false,
                crossette: false,
                alive: true,
            });
        }
    }
}

impl Scene for Pyro {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.launch_frequency = options.float("launchFrequency", 5.0).max(0.5);
        self.size_multiplier = match options.text("explosionSize", "medium").as_str() {
            "small" => 0.6,
            "large" => 1.5,
            _ => 1.0,
        };
        self.color_mode = options.text("colorMode", "rainbow");
        self.gravity = options.float("gravity", 1.0);
        self.timer = FrameTimer::new(60.0)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.size_multiplier *= 0.6;
        }

        self.width = ctx.canvas.width_f();
        self.height = ctx.canvas.height_f();
        self.rockets.clear();
        self.particles.clear();
        self.last_launch_ms = None;

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

        ctx.canvas.fade(FADE_ALPHA);
        let scale = ctx.canvas.base_scale();

        // Launch cadence: mean interval shrinks with the frequency knob.
        let interval_ms = 2400.0 / self.launch_frequency;
        let due = match self.last_launch_ms {
            Some(last) => now_ms - last >= interval_ms,
            None => true,
        };
        if due {
            self.launch_rocket();
            self.last_launch_ms = Some(now_ms);
        }

        for i in 0..self.rockets.len() {
            if !self.rockets[i].alive {
                continue;
            }
            self.rockets[i].y += self.rockets[i].vy * delta;

            if self.rockets[i].y <= self.rockets[i].burst_y {
                self.rockets[i].alive = false;
                let (x, y, hue) = (self.rockets[i].x, self.rockets[i].y, self.rockets[i].hue);
                self.burst(x, y, hue);
                continue;
            }

            let r = &self.rockets[i];
            ctx.canvas.fill_circle(r.x, r.y, 2.0 * scale.max(0.4), Color::hsl(r.hue, 60.0, 80.0));
        }

        for i in 0..self.particles.len() {
            if !self.particles[i].alive {
                continue;
            }

            if self.particles[i].crossette && self.particles[i].life < 0.6 {
                self.split_crossette(i);
            }

            let p = &mut self.particles[i];
            p.x += p.vx * delta;
            p.y += p.vy * delta;
            p.vy += 0.05 * self.gravity * delta;
            if p.willow {
                p.vx *= 0.985_f64.powf(delta);
                p.vy *= 0.985_f64.powf(delta);
            }
            p.life -= p.decay * delta * 16.67;
            if p.life <= 0.0 || p.y > self.height + 20.0 {
                p.alive = false;
                continue;
            }

            let lightness = 35.0 + p.life * 35.0;
            let color = Color::hsl(p.hue, 95.0, lightness).with_alpha((p.life * 255.0) as u8);
            let radius = (1.6 * scale).max(0.5) * (0.5 + p.life * 0.5);
            let (x, y) = (p.x, p.y);
            ctx.canvas.fill_circle(x, y, radius, color);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
    }

    fn destroy(&mut self) {
        self.rockets.clear();
        self.particles.clear();
        self.last_launch_ms = None;
        self.timer.reset();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
