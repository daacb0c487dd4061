//=========================================================================
// Drift Scene
//=========================================================================
//
// Toy vehicles bounce around the screen like the wandering DVD logo,
// optionally shifting hue on every wall hit.
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
        id: "drift",
        display_name: "Bumper Drift",
        uses_canvas: true,
        schema: vec![
            ("vehicleCount", OptionDef::range("Number of Vehicles", 8, 2, 16)),
            ("speed", OptionDef::range("Speed", 2, 1, 8)),
            ("colorChange", OptionDef::checkbox("Change Color on Bounce", true)),
        ],
        factory: || Box::new(Drift::new()),
    }
}

//=== Scene ===============================================================

// Bright toddler-friendly hues.
const HUES: [f64; 8] = [0.0, 30.0, 50.0, 120.0, 200.0, 270.0, 330.0, 190.0];

#[derive(Clone, Copy, PartialEq)]
enum VehicleKind {
    Sedan,
    Truck,
    Bus,
}

struct Vehicle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    kind: VehicleKind,
    hue: f64,
    scale: f64,
    wheel_rotation: f64,
}

pub struct Drift {
    vehicles: Vec<Vehicle>,
    vehicle_count: usize,
    speed: f64,
    color_change: bool,
    width: f64,
    height: f64,
    timer: FrameTimer,
    rng: StdRng,
}

impl Drift {
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
            vehicle_count: 8,
            speed: 2.0,
            color_change: true,
            width: 0.0,
            height: 0.0,
            timer: FrameTimer::new(60.0),
            rng: StdRng::from_entropy(),
        }
    }

    fn spawn_vehicle(&mut self) -> Vehicle {
        let kind = match self.rng.gen_range(0..3) {
            0 => VehicleKind::Sedan,
            1 => VehicleKind::Truck,
            _ => VehicleKind::Bus,
        };
        let angle = self.rng.gen::<f64>() * std::f64::consts::TAU;
        let base_speed = self.speed * (0.5 + self.rng.gen::<f64>() * 0.5);
        Vehicle {
            x: 50.0 + self.rng.gen::<f64>() * (self.width - 100.0).max(1.0),
            y: 30.0 + self.rng.gen::<f64>() * (self.height - 60.0).max(1.0),
            vx: angle.cos() * base_speed,
            vy: angle.sin() * base_speed,
            kind,
            hue: HUES[self.rng.gen_range(0..HUES.len())],
            scale: 0.8 + self.rng.gen::<f64>() * 0.6,
            wheel_rotation: 0.0,
        }
    }

    fn body_width(kind: VehicleKind) -> f64 {
        match kind {
            VehicleKind::Sedan => 70.0,
            VehicleKind::Truck => 80.0,
            VehicleKind::Bus => 120.0,
        }
    }

    fn draw_vehicle(ctx: &mut SceneContext<'_>, vehicle: &Vehicle, base_scale: f64) {
        let s = vehicle.scale * base_scale;
        let w = Self::body_width(vehicle.kind) * s;
        let h = 40.0 * s;
        let (x, y) = (vehicle.x, vehicle.y);

        let body = Color::hsl(vehicle.hue, 70.0, 55.0);
        let cabin = Color::hsl(vehicle.hue, 55.0, 75.0);

        ctx.canvas.fill_rect(x - w / 2.0, y - h / 2.0, w, h, body);
        ctx.canvas.fill_rect(x - w * 0.25, y - h * 0.9, w * 0.5, h * 0.5, cabin);

        // Wheels with a rotation tick so motion reads at a glance.
        let radius = 9.0 * s;
        for wx in [x - w * 0.3, x + w * 0.3] {
            let wy = y + h / 2.0;
            ctx.canvas.fill_circle(wx, wy, radius, Color::gray(26));
            ctx.canvas.fill_circle(wx, wy, radius * 0.55, Color::gray(136));
            ctx.canvas.line(
                wx,
                wy,
                wx + vehicle.wheel_rotation.cos() * radius * 0.5,
                wy + vehicle.wheel_rotation.sin() * radius * 0.5,
                1.0,
                Color::gray(85),
            );
        }
    }
}

impl Scene for Drift {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.vehicle_count = options.int("vehicleCount", 8).max(1) as usize;
        self.speed = options.float("speed", 2.0);
        self.color_change = options.flag("colorChange", true);
        self.timer = FrameTimer::new(60.0)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.vehicle_count = (self.vehicle_count / 2).max(2);
        }

        self.width = ctx.canvas.width_f();
        self.height = ctx.canvas.height_f();

        self.vehicles.clear();
        for _ in 0..self.vehicle_count {
            let vehicle = self.spawn_vehicle();
            self.vehicles.push(vehicle);
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
        let base_scale = ctx.canvas.base_scale();

        for vehicle in &mut self.vehicles {
            vehicle.x += vehicle.vx * delta;
            vehicle.y += vehicle.vy * delta;
            vehicle.wheel_rotation += (vehicle.vx.abs() + vehicle.vy.abs()) * 0.1 * delta;

            let half_w = Self::body_width(vehicle.kind) * vehicle.scale * base_scale / 2.0;
            let half_h = 20.0 * vehicle.scale * base_scale;
            let mut bounced = false;

            if vehicle.x - half_w <= 0.0 {
                vehicle.x = half_w;
                vehicle.vx = vehicle.vx.abs();
                bounced = true;
            } else if vehicle.x + half_w >= self.width {
                vehicle.x = self.width - half_w;
                vehicle.vx = -vehicle.vx.abs();
                bounced = true;
            }
            if vehicle.y - half_h <= 0.0 {
                vehicle.y = half_h;
                vehicle.vy = vehicle.vy.abs();
                bounced = true;
            } else if vehicle.y + half_h >= self.height {
                vehicle.y = self.height - half_h;
                vehicle.vy = -vehicle.vy.abs();
                bounced = true;
            }

            if bounced && self.color_change {
                vehicle.hue = (vehicle.hue + 60.0) % 360.0;
            }

            Self::draw_vehicle(ctx, vehicle, base_scale);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
    }

    fn destroy(&mut self) {
        self.vehicles.clear();
        self.timer.reset();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
