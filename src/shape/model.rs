use smallvec::SmallVec;

use crate::foundation::clock::Clock;
use crate::foundation::color::Color;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::shape::context::RenderContext;
use crate::shape::decorator::{self, Decorator, DecoratorKind};
use crate::shape::geometry::{Geometry, LineBinding, LineGeometry, ShapeKind};
use crate::surface::display_list::Surface;
use crate::surface::graphic::Graphic;

/// Identity of one decorator within a shape's chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecoratorId(u32);

/// A drawable entity: geometry, kinematics, base style, and a decorator chain.
///
/// Every mutator re-renders before returning, so the graphic always reflects the
/// current state. The graphic is unmounted from its surface when the shape is
/// dropped.
pub struct Shape {
    geometry: Geometry,
    /// Center in canvas pixels.
    pub position: Point,
    /// Displacement per frame at 60 fps.
    pub velocity: Vec2,
    base: RenderContext,
    decorators: SmallVec<[(DecoratorId, Decorator); 4]>,
    next_decorator: u32,
    graphic: Graphic,
    surface: Surface,
    clock: Clock,
}

impl Shape {
    /// Unmounted white shape at the origin.
    pub fn new(geometry: Geometry, surface: &Surface, clock: &Clock) -> Self {
        Self {
            geometry,
            position: Point::ORIGIN,
            velocity: Vec2::ZERO,
            base: RenderContext::default(),
            decorators: SmallVec::new(),
            next_decorator: 0,
            graphic: Graphic::new(),
            surface: surface.clone(),
            clock: clock.clone(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Base attributes before decoration.
    pub fn base(&self) -> &RenderContext {
        &self.base
    }

    pub fn graphic(&self) -> &Graphic {
        &self.graphic
    }

    pub fn set_position(&mut self, position: Point) -> &mut Self {
        self.position = position;
        self.render();
        self
    }

    pub fn set_velocity(&mut self, velocity: Vec2) -> &mut Self {
        self.velocity = velocity;
        self
    }

    pub fn set_fill(&mut self, color: Color) -> &mut Self {
        self.base.fill = color;
        self.render();
        self
    }

    pub fn set_stroke(&mut self, color: Color, width: f64) -> &mut Self {
        self.base.stroke = Some(color);
        self.base.stroke_width = width;
        self.render();
        self
    }

    pub fn clear_stroke(&mut self) -> &mut Self {
        self.base.stroke = None;
        self.base.stroke_width = 0.0;
        self.render();
        self
    }

    /// Base opacity, clamped into `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) -> &mut Self {
        self.base.opacity = opacity.clamp(0.0, 1.0);
        self.render();
        self
    }

    /// Append to the end of the chain (applied last).
    pub fn add_decorator(&mut self, decorator: Decorator) -> DecoratorId {
        let id = DecoratorId(self.next_decorator);
        self.next_decorator += 1;
        self.decorators.push((id, decorator));
        self.render();
        id
    }

    pub fn remove_decorator(&mut self, id: DecoratorId) -> Option<Decorator> {
        let idx = self.decorators.iter().position(|(d, _)| *d == id)?;
        let (_, removed) = self.decorators.remove(idx);
        self.render();
        Some(removed)
    }

    /// Remove every decorator of `kind`; returns how many were removed.
    pub fn remove_decorators_of(&mut self, kind: DecoratorKind) -> usize {
        let before = self.decorators.len();
        self.decorators.retain(|(_, d)| d.kind() != kind);
        self.render();
        before - self.decorators.len()
    }

    /// First decorator of `kind` in chain order.
    pub fn find_decorator(&self, kind: DecoratorKind) -> Option<(DecoratorId, &Decorator)> {
        self.decorators
            .iter()
            .find(|(_, d)| d.kind() == kind)
            .map(|(id, d)| (*id, d))
    }

    pub fn decorator(&self, id: DecoratorId) -> Option<&Decorator> {
        self.decorators
            .iter()
            .find(|(d, _)| *d == id)
            .map(|(_, d)| d)
    }

    /// Chain in application order.
    pub fn decorators(&self) -> impl Iterator<Item = &Decorator> {
        self.decorators.iter().map(|(_, d)| d)
    }

    pub fn clear_decorators(&mut self) -> &mut Self {
        self.decorators.clear();
        self.render();
        self
    }

    /// Drop glows whose fade window elapsed by `now_ms`. Does not re-render.
    pub fn prune_expired(&mut self, now_ms: f64) -> usize {
        let before = self.decorators.len();
        self.decorators.retain(|(_, d)| !d.is_expired(now_ms));
        before - self.decorators.len()
    }

    /// Base attributes folded through the chain at `now_ms`.
    pub fn context_at(&self, now_ms: f64) -> RenderContext {
        decorator::fold(self.base, self.decorators(), now_ms)
    }

    /// Context for the current clock reading.
    pub fn compute_context(&self) -> RenderContext {
        self.context_at(self.clock.now_ms())
    }

    /// Clear the graphic and re-emit it from the current state.
    pub fn render(&self) {
        let ctx = self.compute_context();
        self.graphic.clear();
        self.graphic.set_origin(self.position);
        self.graphic.set_alpha(ctx.opacity);
        self.geometry.emit(&ctx, &self.graphic);
    }

    pub fn bounding_radius(&self) -> f64 {
        self.geometry.bounding_radius()
    }

    /// Bounding-circle overlap test.
    pub fn intersects(&self, other: &Shape) -> bool {
        let d = self.position - other.position;
        let r = self.bounding_radius() + other.bounding_radius();
        d.hypot2() < r * r
    }

    /// Distance between centers.
    pub fn distance_to(&self, other: &Shape) -> f64 {
        self.position.distance(other.position)
    }

    /// Mount on the surface this shape was created for (moves it to the top).
    pub fn add_to_surface(&self) {
        self.surface.add_child(&self.graphic);
    }

    pub fn remove_from_surface(&self) -> bool {
        self.surface.remove_child(&self.graphic)
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.contains(&self.graphic)
    }

    /// Unmount and drop.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn line(&self) -> Option<&LineGeometry> {
        match &self.geometry {
            Geometry::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Absolute endpoints, for lines.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.line().map(|line| line.endpoints(self.position))
    }

    /// Place a line at absolute endpoints, dropping any binding.
    pub fn set_points(&mut self, a: Point, b: Point) -> KineticaResult<&mut Self> {
        let line = self.line_mut()?;
        line.set_binding(None);
        self.track(a, b);
        self.render();
        Ok(self)
    }

    pub(crate) fn line_mut(&mut self) -> KineticaResult<&mut LineGeometry> {
        match &mut self.geometry {
            Geometry::Line(line) => Ok(line),
            other => Err(KineticaError::validation(format!(
                "{:?} shape has no endpoints",
                other.kind()
            ))),
        }
    }

    pub(crate) fn bind(&mut self, binding: LineBinding) -> KineticaResult<()> {
        self.line_mut()?.set_binding(Some(binding));
        Ok(())
    }

    /// Move a line's endpoints without touching its binding or re-rendering.
    pub(crate) fn track(&mut self, a: Point, b: Point) {
        if let Geometry::Line(line) = &mut self.geometry {
            self.position = line.span(a, b);
        }
    }
}

impl Drop for Shape {
    fn drop(&mut self) {
        self.surface.remove_child(&self.graphic);
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("geometry", &self.geometry)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("base", &self.base)
            .field("decorators", &self.decorators.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/model.rs"]
mod tests;
