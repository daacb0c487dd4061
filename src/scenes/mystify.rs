//=========================================================================
// Mystify Scene
//=========================================================================
//
// Bouncing polygons with fading trails, after the Windows classic. Each
// polygon keeps a bounded history of vertex snapshots; the history ring
// is the trail, so memory stays constant however long the scene runs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

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
        id: "mystify",
        display_name: "Mystify",
        uses_canvas: true,
        schema: vec![
            ("numPolygons", OptionDef::range("Number of Shapes", 2, 1, 5)),
            ("numVertices", OptionDef::range("Corners per Shape", 4, 3, 8)),
            ("trailLength", OptionDef::range("Trail Length", 50, 10, 100)),
            ("speed", OptionDef::range("Speed", 3, 1, 8)),
        ],
        factory: || Box::new(Mystify::new()),
    }
}

//=== Scene ===============================================================

struct Vertex {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

struct Polygon {
    vertices: Vec<Vertex>,
    trail: VecDeque<Vec<(f64, f64)>>,
    hue: f64,
    hue_drift: f64,
}

pub struct Mystify {
    polygons: Vec<Polygon>,
    num_polygons: usize,
    num_vertices: usize,
    trail_length: usize,
    speed: f64,
    width: f64,
    height: f64,
    timer: FrameTimer,
    rng: StdRng,
}

impl Mystify {
    pub fn new() -> Self {
        Self {
            polygons: Vec::new(),
            num_polygons: 2,
            num_vertices: 4,
            trail_length: 50,
            speed: 3.0,
            width: 0.0,
            height: 0.0,
            timer: FrameTimer::new(60.0),
            rng: StdRng::from_entropy(),
        }
    }

    fn spawn_polygon(&mut self, index: usize) -> Polygon {
        let mut vertices = Vec::with_capacity(self.num_vertices);
        for _ in 0..self.num_vertices {
            let angle = self.rng.gen::<f64>() * std::f64::consts::TAU;
            vertices.push(Vertex {
                x: self.rng.gen::<f64>() * self.width,
                y: self.rng.gen::<f64>() * self.height,
                vx: angle.cos() * self.speed * (0.6 + self.rng.gen::<f64>() * 0.8),
                vy: angle.sin() * self.speed * (0.6 + self.rng.gen::<f64>() * 0.8),
            });
        }
        Polygon {
            vertices,
            trail: VecDeque::with_capacity(self.trail_length + 1),
            hue: index as f64 * 137.0 + self.rng.gen::<f64>() * 60.0,
            hue_drift: 0.2 + self.rng.gen::<f64>() * 0.4,
        }
    }
}

impl Scene for Mystify {
    fn init(&mut self, options: &OptionMap, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.num_polygons = options.int("numPolygons", 2).max(1) as usize;
        self.num_vertices = options.int("numVertices", 4).max(3) as usize;
        self.trail_length = options.int("trailLength", 50).max(1) as usize;
        self.speed = options.float("speed", 3.0);
        self.timer = FrameTimer::new(60.0)
            .with_max_framerate(options.int(MAX_FRAMERATE_KEY, 0).max(0) as u32);

        if ctx.canvas.is_fixed() && ctx.canvas.width() < 600 {
            self.trail_length = (self.trail_length / 2).max(1);
            self.speed = 2.0;
        }

        self.width = ctx.canvas.width_f();
        self.height = ctx.canvas.height_f();

        self.polygons.clear();
        for i in 0..self.num_polygons {
            let polygon = self.spawn_polygon(i);
            self.polygons.push(polygon);
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

        for polygon in &mut self.polygons {
            for v in &mut polygon.vertices {
                v.x += v.vx * delta;
                v.y += v.vy * delta;

                if v.x <= 0.0 {
                    v.x = 0.0;
                    v.vx = v.vx.abs();
                } else if v.x >= self.width {
                    v.x = self.width;
                    v.vx = -v.vx.abs();
                }
                if v.y <= 0.0 {
                    v.y = 0.0;
                    v.vy = v.vy.abs();
                } else if v.y >= self.height {
                    v.y = self.height;
                    v.vy = -v.vy.abs();
                }
            }

            polygon.hue = (polygon.hue + polygon.hue_drift * delta).rem_euclid(360.0);

            polygon
                .trail
                .push_back(polygon.vertices.iter().map(|v| (v.x, v.y)).collect());
            while polygon.trail.len() > self.trail_length {
                polygon.trail.pop_front();
            }

            // Oldest first so the bright current outline lands on top.
            let count = polygon.trail.len();
            for (age, snapshot) in polygon.trail.iter().enumerate() {
                let strength = (age + 1) as f64 / count as f64;
                let color = Color::hsl(polygon.hue, 85.0, 25.0 + strength * 30.0)
                    .with_alpha((40.0 + strength * 215.0) as u8);
                for i in 0..snapshot.len() {
                    let (x0, y0) = snapshot[i];
                    let (x1, y1) = snapshot[(i + 1) % snapshot.len()];
                    ctx.canvas.line(x0, y0, x1, y1, 1.0, color);
                }
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
    }

    fn destroy(&mut self) {
        self.polygons.clear();
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

    fn init_scene(canvas: &mut Canvas, options: OptionMap) -> Mystify {
        let mut text = TextLayer::new();
        let mut scene = Mystify::new();
        let mut ctx = SceneContext { canvas, text: &mut text };
        scene.init(&options, &mut ctx).unwrap();
        scene
    }

    #[test]
    fn init_builds_the_configured_shapes() {
        let mut canvas = Canvas::tracking(800, 600);
        let mut options = OptionMap::new();
        options.insert("numPolygons", OptionValue::Int(3));
        options.insert("numVertices", OptionValue::Int(5));
        let scene = init_scene(&mut canvas, options);
        assert_eq!(scene.polygons.len(), 3);
        assert!(scene.polygons.iter().all(|p| p.vertices.len() == 5));
    }

    #[test]
    fn trail_history_is_bounded() {
        let mut canvas = Canvas::tracking(800, 600);
        let mut options = OptionMap::new();
        options.insert("trailLength", OptionValue::Int(10));
        let mut scene = init_scene(&mut canvas, options);

        let mut text = TextLayer::new();
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        for frame in 0..50 {
            scene.update(&mut ctx, frame as f64 * 16.67);
        }

        assert!(
            scene.polygons.iter().all(|p| p.trail.len() <= 10),
            "the trail ring must never outgrow its configured length"
        );
    }

    #[test]
    fn vertices_bounce_off_edges() {
        let mut canvas = Canvas::tracking(200, 200);
        let mut scene = init_scene(&mut canvas, OptionMap::new());

        scene.polygons[0].vertices[0] = Vertex { x: 1.0, y: 100.0, vx: -5.0, vy: 0.0 };
        let mut text = TextLayer::new();
        let mut ctx = SceneContext { canvas: &mut canvas, text: &mut text };
        scene.update(&mut ctx, 0.0);

        assert!(
            scene.polygons[0].vertices[0].vx > 0.0,
            "hitting the left wall must reflect the x velocity"
        );
    }
}
