use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::show::positive;
use crate::foundation::clock::Clock;
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::error::KineticaResult;
use crate::scene::lifecycle::{Composition, SceneCx};
use crate::scenes::palette::{self, GLOW_PURPLE, GLOW_TEAL, GLOW_WHITE, GlowSpec};
use crate::shape::arena::{ShapeArena, ShapeId};
use crate::shape::decorator::{Decorator, DecoratorKind};
use crate::shape::geometry::Geometry;
use crate::surface::display_list::Surface;

/// Style of proximity edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeStyle {
    pub thickness: f64,
    pub color: Color,
    pub opacity: f64,
    /// Flash shown when an edge appears.
    pub glow: GlowSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BouncingConfig {
    pub circles: usize,
    pub rectangles: usize,
    pub triangles: usize,
    /// Center distance below which two bodies are connected by an edge.
    pub proximity_threshold: f64,
    pub collision_glow: GlowSpec,
    pub edge: EdgeStyle,
}

impl Default for BouncingConfig {
    fn default() -> Self {
        Self {
            circles: 20,
            rectangles: 20,
            triangles: 10,
            proximity_threshold: 250.0,
            collision_glow: GlowSpec::new(GLOW_WHITE, 5.0, 400.0),
            edge: EdgeStyle {
                thickness: 1.5,
                color: GLOW_WHITE,
                opacity: 0.3,
                glow: GlowSpec::new(GLOW_PURPLE, 2.0, 600.0),
            },
        }
    }
}

impl BouncingConfig {
    pub fn validate(&self) -> KineticaResult<()> {
        positive("bouncing.proximity_threshold", self.proximity_threshold, false)?;
        positive("bouncing.edge.thickness", self.edge.thickness, false)?;
        positive("bouncing.collision_glow.fade_ms", self.collision_glow.fade_ms, false)?;
        positive("bouncing.edge.glow.fade_ms", self.edge.glow.fade_ms, false)?;
        Ok(())
    }
}

/// Bodies bouncing off the canvas edges, swapping velocities on contact and linked by
/// edges while close to each other.
pub struct BouncingState {
    config: BouncingConfig,
    arena: ShapeArena,
    bodies: Vec<ShapeId>,
    /// Keyed by body pair in body order.
    edges: BTreeMap<(ShapeId, ShapeId), ShapeId>,
    bounds: Vec2,
    clock: Clock,
    rng: SmallRng,
}

impl BouncingState {
    /// Empty simulation over `canvas`.
    pub fn new(
        config: BouncingConfig,
        surface: &Surface,
        clock: &Clock,
        canvas: Canvas,
        rng: SmallRng,
    ) -> Self {
        Self {
            config,
            arena: ShapeArena::new(surface, clock),
            bodies: Vec::new(),
            edges: BTreeMap::new(),
            bounds: Vec2::new(canvas.width_f64(), canvas.height_f64()),
            clock: clock.clone(),
            rng,
        }
    }

    /// Spawn the configured circles, rectangles and triangles at random.
    pub fn populate(&mut self) {
        let (w, h) = (self.bounds.x, self.bounds.y);

        for i in 0..self.config.circles {
            let radius = 15.0 + self.rng.random::<f64>() * 25.0;
            let pos = self.random_point(w, h);
            let vel = self.random_velocity(4.0);
            let id = self.spawn_body(Geometry::circle(radius), pos, vel, palette::cycle(i));
            if i % 2 == 0 {
                self.arena[id].add_decorator(Decorator::border(GLOW_WHITE, 2.0));
            }
        }

        for i in 0..self.config.rectangles {
            let width = 40.0 + self.rng.random::<f64>() * 60.0;
            let height = 30.0 + self.rng.random::<f64>() * 40.0;
            let pos = self.random_point(w, h);
            let vel = self.random_velocity(3.0);
            let id = self.spawn_body(
                Geometry::rectangle(width, height),
                pos,
                vel,
                palette::cycle(i + 2),
            );
            match i {
                0 => {
                    self.arena[id].add_decorator(Decorator::glow(GLOW_TEAL, 4.0));
                }
                1 => {
                    self.arena[id].add_decorator(Decorator::opacity(0.6));
                }
                _ => {}
            }
        }

        for i in 0..self.config.triangles {
            let size = 40.0 + self.rng.random::<f64>() * 40.0;
            let pos = self.random_point(w, h);
            let vel = self.random_velocity(3.0);
            let id = self.spawn_body(Geometry::triangle(size), pos, vel, palette::cycle(i + 4));
            self.arena[id].add_decorator(Decorator::border(GLOW_WHITE, 1.0));
        }
    }

    fn random_point(&mut self, w: f64, h: f64) -> Point {
        Point::new(self.rng.random::<f64>() * w, self.rng.random::<f64>() * h)
    }

    /// Biased towards positive so bodies drift down and right.
    fn random_velocity(&mut self, scale: f64) -> Vec2 {
        Vec2::new(
            (self.rng.random::<f64>() - 0.25) * scale,
            (self.rng.random::<f64>() - 0.25) * scale,
        )
    }

    /// Add one body; it takes part in physics, edges and beats from the next step.
    pub fn spawn_body(
        &mut self,
        geometry: Geometry,
        position: Point,
        velocity: Vec2,
        fill: Color,
    ) -> ShapeId {
        let id = self.arena.spawn(geometry);
        self.arena[id]
            .set_velocity(velocity)
            .set_position(position)
            .set_fill(fill);
        self.bodies.push(id);
        id
    }

    pub fn arena(&self) -> &ShapeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ShapeArena {
        &mut self.arena
    }

    pub fn bodies(&self) -> &[ShapeId] {
        &self.bodies
    }

    /// Connected body pairs and their edge line.
    pub fn edges(&self) -> impl Iterator<Item = ((ShapeId, ShapeId), ShapeId)> + '_ {
        self.edges.iter().map(|(pair, line)| (*pair, *line))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// One frame: move, collide, update edges, prune glows, redraw.
    pub fn step(&mut self) {
        let now = self.clock.now_ms();
        self.integrate();
        self.resolve_collisions(now);
        self.update_edges(now);
        self.prune_and_render(now);
    }

    /// Advance every body by its velocity and reflect it off the canvas edges.
    ///
    /// Positions are not clamped; a body may sit outside the canvas for a frame.
    pub fn integrate(&mut self) {
        let bounds = self.bounds;
        for &id in &self.bodies {
            let Some(shape) = self.arena.get_mut(id) else {
                continue;
            };
            shape.position += shape.velocity;
            if shape.position.x < 0.0 || shape.position.x > bounds.x {
                shape.velocity.x = -shape.velocity.x;
            }
            if shape.position.y < 0.0 || shape.position.y > bounds.y {
                shape.velocity.y = -shape.velocity.y;
            }
        }
    }

    /// Swap velocities of every overlapping pair, nudge both apart and flash them.
    /// Returns the number of collisions.
    pub fn resolve_collisions(&mut self, now_ms: f64) -> usize {
        let glow = self.config.collision_glow;
        let mut hits = 0;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (self.bodies[i], self.bodies[j]);
                if !self.arena.intersects(a, b) {
                    continue;
                }
                let Some([sa, sb]) = self.arena.pair_mut(a, b) else {
                    continue;
                };
                std::mem::swap(&mut sa.velocity, &mut sb.velocity);
                sa.position += sa.velocity;
                sb.position += sb.velocity;
                sa.add_decorator(glow.at(now_ms));
                sb.add_decorator(glow.at(now_ms));
                hits += 1;
            }
        }
        hits
    }

    /// Drop edges whose bodies drifted beyond the threshold, then connect newly close
    /// pairs. Returns `(added, removed)`.
    pub fn update_edges(&mut self, now_ms: f64) -> (usize, usize) {
        let threshold = self.config.proximity_threshold;

        let stale: Vec<(ShapeId, ShapeId)> = self
            .edges
            .keys()
            .filter(|(a, b)| self.arena.distance(*a, *b).is_none_or(|d| d > threshold))
            .copied()
            .collect();
        for pair in &stale {
            if let Some(line) = self.edges.remove(pair) {
                self.arena.remove(line);
                tracing::trace!(?pair, "proximity edge removed");
            }
        }

        let mut added = 0;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let pair = (self.bodies[i], self.bodies[j]);
                if self.edges.contains_key(&pair) {
                    continue;
                }
                let close = self
                    .arena
                    .distance(pair.0, pair.1)
                    .is_some_and(|d| d < threshold);
                if !close {
                    continue;
                }
                if let Some(line) = self.spawn_edge(pair, now_ms) {
                    self.edges.insert(pair, line);
                    added += 1;
                    tracing::trace!(?pair, "proximity edge added");
                }
            }
        }
        (added, stale.len())
    }

    fn spawn_edge(&mut self, (a, b): (ShapeId, ShapeId), now_ms: f64) -> Option<ShapeId> {
        let style = self.config.edge;
        let line = self.arena.spawn_line(style.thickness, a, b).ok()?;
        let shape = &mut self.arena[line];
        shape.set_fill(style.color).set_opacity(style.opacity);
        shape.add_decorator(style.glow.at(now_ms));
        Some(line)
    }

    /// Prune expired glows everywhere, then redraw bodies followed by edges.
    pub fn prune_and_render(&mut self, now_ms: f64) {
        let lines: Vec<ShapeId> = self.edges.values().copied().collect();
        for &id in self.bodies.iter().chain(&lines) {
            if let Some(shape) = self.arena.get_mut(id) {
                shape.prune_expired(now_ms);
            }
        }
        for &id in self.bodies.iter().chain(&lines) {
            self.arena.render(id);
        }
    }

    /// Give one random body a random palette fill, replacing any earlier override.
    pub fn on_beat(&mut self) -> Option<ShapeId> {
        if self.bodies.is_empty() {
            return None;
        }
        let id = self.bodies[self.rng.random_range(0..self.bodies.len())];
        let color = palette::random_color(&mut self.rng);
        let shape = self.arena.get_mut(id)?;
        shape.remove_decorators_of(DecoratorKind::Fill);
        shape.add_decorator(Decorator::fill(color));
        Some(id)
    }

    /// Destroy every body and edge.
    pub fn destroy(&mut self) {
        self.edges.clear();
        self.bodies.clear();
        self.arena.destroy_all();
    }
}

/// The `bouncing-shapes` scene.
pub struct BouncingShapes {
    config: BouncingConfig,
    state: Option<Rc<RefCell<BouncingState>>>,
}

impl BouncingShapes {
    pub fn new(config: BouncingConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl Composition for BouncingShapes {
    fn on_setup(&mut self, cx: &mut SceneCx<'_>) -> KineticaResult<()> {
        let mut state = BouncingState::new(
            self.config.clone(),
            cx.surface(),
            cx.clock(),
            cx.canvas(),
            cx.rng(),
        );
        state.populate();
        let state = Rc::new(RefCell::new(state));

        let ticker = Rc::clone(&state);
        cx.add_ticker(move |_| ticker.borrow_mut().step());

        let beat = Rc::clone(&state);
        cx.on_timing("beat", move |_| {
            beat.borrow_mut().on_beat();
        })?;

        self.state = Some(state);
        Ok(())
    }

    fn on_destroy(&mut self) {
        if let Some(state) = self.state.take() {
            state.borrow_mut().destroy();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/bouncing.rs"]
mod tests;
