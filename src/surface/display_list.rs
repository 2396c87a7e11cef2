use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::surface::graphic::Graphic;

#[derive(Debug)]
struct SurfaceData {
    canvas: Canvas,
    background: Color,
    children: Vec<Graphic>,
}

/// Render surface: an ordered display list of graphics over a solid background.
///
/// Children paint in insertion order (later on top). A graphic is listed at most once;
/// adding one that is already present moves it to the top.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<RefCell<SurfaceData>>,
}

impl Surface {
    /// Empty surface of the given size.
    pub fn new(canvas: Canvas, background: Color) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SurfaceData {
                canvas,
                background,
                children: Vec::new(),
            })),
        }
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.inner.borrow().canvas
    }

    /// Clear color.
    pub fn background(&self) -> Color {
        self.inner.borrow().background
    }

    /// Mount `graphic` on top of every other child.
    pub fn add_child(&self, graphic: &Graphic) {
        let mut data = self.inner.borrow_mut();
        data.children.retain(|g| !g.ptr_eq(graphic));
        data.children.push(graphic.clone());
    }

    /// Unmount `graphic`; returns `false` if it was not mounted.
    pub fn remove_child(&self, graphic: &Graphic) -> bool {
        let mut data = self.inner.borrow_mut();
        let before = data.children.len();
        data.children.retain(|g| !g.ptr_eq(graphic));
        data.children.len() != before
    }

    /// Unmount everything.
    pub fn remove_children(&self) {
        self.inner.borrow_mut().children.clear();
    }

    pub fn contains(&self, graphic: &Graphic) -> bool {
        self.inner
            .borrow()
            .children
            .iter()
            .any(|g| g.ptr_eq(graphic))
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Handles to the mounted children in paint order.
    pub fn children(&self) -> Vec<Graphic> {
        self.inner.borrow().children.clone()
    }

    /// `true` when both handles refer to the same surface.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Surface")
            .field("canvas", &data.canvas)
            .field("background", &data.background)
            .field("children", &data.children.len())
            .finish()
    }
}
