use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::foundation::color::Color;
use crate::foundation::core::{BezPath, Point};

/// One drawing instruction in a graphic's local coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fill a closed path.
    Fill {
        /// Path in local coordinates.
        path: BezPath,
        /// Fill color.
        color: Color,
    },
    /// Stroke a path centered on its outline.
    Stroke {
        /// Path in local coordinates.
        path: BezPath,
        /// Stroke width in pixels.
        width: f64,
        /// Stroke color.
        color: Color,
    },
}

/// Drawn output of one shape: where it sits, how opaque it is, and what to paint.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicData {
    origin: Point,
    alpha: f64,
    commands: SmallVec<[DrawCommand; 2]>,
}

impl Default for GraphicData {
    fn default() -> Self {
        Self {
            origin: Point::ORIGIN,
            alpha: 1.0,
            commands: SmallVec::new(),
        }
    }
}

impl GraphicData {
    /// Translation applied to every command.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Whole-drawable opacity.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Commands in paint order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

/// Shared handle to a drawable primitive.
///
/// A shape owns one and re-emits into it on every render; the [`Surface`] it is mounted
/// on holds another handle to the same primitive. Identity (not content) decides
/// membership on a surface.
///
/// [`Surface`]: crate::Surface
#[derive(Clone, Default)]
pub struct Graphic {
    inner: Rc<RefCell<GraphicData>>,
}

impl Graphic {
    /// Empty, fully opaque graphic at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all previously emitted commands.
    pub fn clear(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    /// Move the graphic.
    pub fn set_origin(&self, origin: Point) {
        self.inner.borrow_mut().origin = origin;
    }

    /// Set whole-drawable opacity.
    pub fn set_alpha(&self, alpha: f64) {
        self.inner.borrow_mut().alpha = alpha;
    }

    /// Append a fill.
    pub fn fill(&self, path: BezPath, color: Color) {
        self.inner
            .borrow_mut()
            .commands
            .push(DrawCommand::Fill { path, color });
    }

    /// Append a stroke.
    pub fn stroke(&self, path: BezPath, width: f64, color: Color) {
        self.inner
            .borrow_mut()
            .commands
            .push(DrawCommand::Stroke { path, width, color });
    }

    /// Borrow the current content.
    pub fn read<R>(&self, f: impl FnOnce(&GraphicData) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Copy of the current content.
    pub fn snapshot(&self) -> GraphicData {
        self.inner.borrow().clone()
    }

    /// `true` when both handles refer to the same primitive.
    pub fn ptr_eq(&self, other: &Graphic) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Graphic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Graphic")
            .field("origin", &data.origin)
            .field("alpha", &data.alpha)
            .field("commands", &data.commands.len())
            .finish()
    }
}
