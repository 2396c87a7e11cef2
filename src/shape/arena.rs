use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use crate::foundation::clock::Clock;
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::shape::geometry::{Geometry, LineBinding};
use crate::shape::model::Shape;
use crate::surface::display_list::Surface;

slotmap::new_key_type! {
    /// Generational handle to a shape in a [`ShapeArena`].
    pub struct ShapeId;
}

/// Owns every shape of one scene.
///
/// Spawned shapes are mounted on the arena's surface; removing a shape (or dropping the
/// arena) unmounts it. Lines refer to the shapes they connect by [`ShapeId`] only, and
/// are re-synced to those shapes whenever they are borrowed mutably, so a mutator's
/// re-render always sees current endpoints.
pub struct ShapeArena {
    shapes: SlotMap<ShapeId, Shape>,
    surface: Surface,
    clock: Clock,
}

impl ShapeArena {
    pub fn new(surface: &Surface, clock: &Clock) -> Self {
        Self {
            shapes: SlotMap::with_key(),
            surface: surface.clone(),
            clock: clock.clone(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Create, render and mount a shape.
    pub fn spawn(&mut self, geometry: Geometry) -> ShapeId {
        let shape = Shape::new(geometry, &self.surface, &self.clock);
        self.insert(shape)
    }

    /// Create a line bound to `from` and `to`.
    pub fn spawn_line(
        &mut self,
        thickness: f64,
        from: ShapeId,
        to: ShapeId,
    ) -> KineticaResult<ShapeId> {
        self.check_endpoints(from, to)?;
        let id = self.spawn(Geometry::line(thickness));
        self.bind_line(id, from, to)?;
        Ok(id)
    }

    /// Take ownership of an existing shape, render and mount it.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        shape.render();
        shape.add_to_surface();
        self.shapes.insert(shape)
    }

    /// Bind a line's endpoints to two shapes and re-render it.
    pub fn bind_line(&mut self, line: ShapeId, from: ShapeId, to: ShapeId) -> KineticaResult<()> {
        self.check_endpoints(from, to)?;
        let shape = self
            .shapes
            .get_mut(line)
            .ok_or_else(|| KineticaError::validation("line id is not in this arena"))?;
        shape.bind(LineBinding { from, to })?;
        self.render(line);
        Ok(())
    }

    fn check_endpoints(&self, from: ShapeId, to: ShapeId) -> KineticaResult<()> {
        if !self.shapes.contains_key(from) || !self.shapes.contains_key(to) {
            return Err(KineticaError::validation(
                "line endpoints must be shapes in this arena",
            ));
        }
        Ok(())
    }

    /// Pull a bound line's endpoints from its shapes. Missing shapes leave it as is.
    pub fn sync_line(&mut self, id: ShapeId) {
        let Some(binding) = self
            .shapes
            .get(id)
            .and_then(|s| s.line())
            .and_then(|l| l.binding())
        else {
            return;
        };
        let (Some(a), Some(b)) = (
            self.shapes.get(binding.from).map(|s| s.position),
            self.shapes.get(binding.to).map(|s| s.position),
        ) else {
            return;
        };
        if let Some(line) = self.shapes.get_mut(id) {
            line.track(a, b);
        }
    }

    /// Re-render one shape, re-syncing it first if it is a bound line.
    pub fn render(&mut self, id: ShapeId) {
        self.sync_line(id);
        if let Some(shape) = self.shapes.get(id) {
            shape.render();
        }
    }

    pub fn render_all(&mut self) {
        let ids: Vec<ShapeId> = self.shapes.keys().collect();
        for id in ids {
            self.render(id);
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.sync_line(id);
        self.shapes.get_mut(id)
    }

    /// Two distinct shapes mutably at once.
    pub fn pair_mut(&mut self, a: ShapeId, b: ShapeId) -> Option<[&mut Shape; 2]> {
        self.sync_line(a);
        self.sync_line(b);
        self.shapes.get_disjoint_mut([a, b])
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter()
    }

    /// Bounding-circle test; `false` if either id is gone.
    pub fn intersects(&self, a: ShapeId, b: ShapeId) -> bool {
        match (self.shapes.get(a), self.shapes.get(b)) {
            (Some(a), Some(b)) => a.intersects(b),
            _ => false,
        }
    }

    /// Center distance; `None` if either id is gone.
    pub fn distance(&self, a: ShapeId, b: ShapeId) -> Option<f64> {
        Some(self.shapes.get(a)?.distance_to(self.shapes.get(b)?))
    }

    /// Unmount and drop one shape.
    pub fn remove(&mut self, id: ShapeId) -> bool {
        match self.shapes.remove(id) {
            Some(shape) => {
                shape.destroy();
                true
            }
            None => false,
        }
    }

    /// Unmount and drop every shape.
    pub fn destroy_all(&mut self) {
        for (_, shape) in self.shapes.drain() {
            shape.destroy();
        }
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }
}

impl IndexMut<ShapeId> for ShapeArena {
    fn index_mut(&mut self, id: ShapeId) -> &mut Shape {
        self.sync_line(id);
        &mut self.shapes[id]
    }
}

impl std::fmt::Debug for ShapeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeArena")
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/arena.rs"]
mod tests;
