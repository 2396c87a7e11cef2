use std::f64::consts::PI;

use kurbo::{Circle, Line, Rect, Shape as _};

use crate::foundation::core::{BezPath, Point, Vec2};
use crate::shape::arena::ShapeId;
use crate::shape::context::RenderContext;
use crate::surface::graphic::Graphic;

const CURVE_TOLERANCE: f64 = 0.1;

/// Shape family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Hexagon,
    Line,
}

/// Two shapes a line tracks; the line does not own them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBinding {
    pub from: ShapeId,
    pub to: ShapeId,
}

/// Segment geometry, stored as a half-extent around the owning shape's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineGeometry {
    pub thickness: f64,
    half: Vec2,
    binding: Option<LineBinding>,
}

impl LineGeometry {
    pub fn new(thickness: f64) -> Self {
        Self {
            thickness,
            half: Vec2::ZERO,
            binding: None,
        }
    }

    pub fn binding(&self) -> Option<LineBinding> {
        self.binding
    }

    pub(crate) fn set_binding(&mut self, binding: Option<LineBinding>) {
        self.binding = binding;
    }

    /// Absolute endpoints for a line centered at `center`.
    pub fn endpoints(&self, center: Point) -> (Point, Point) {
        (center - self.half, center + self.half)
    }

    pub fn length(&self) -> f64 {
        self.half.hypot() * 2.0
    }

    /// Recenter on the segment `a..b`; returns the new center.
    pub(crate) fn span(&mut self, a: Point, b: Point) -> Point {
        self.half = (b - a) / 2.0;
        a.midpoint(b)
    }
}

/// Variant-specific geometry of a shape, in local coordinates centered on its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
    /// Equilateral, pointing up, centered on its centroid.
    Triangle { size: f64 },
    /// Pointy-top regular hexagon.
    Hexagon { radius: f64 },
    Line(LineGeometry),
}

impl Geometry {
    pub fn circle(radius: f64) -> Self {
        Self::Circle { radius }
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::Rectangle { width, height }
    }

    pub fn triangle(size: f64) -> Self {
        Self::Triangle { size }
    }

    pub fn hexagon(radius: f64) -> Self {
        Self::Hexagon { radius }
    }

    pub fn line(thickness: f64) -> Self {
        Self::Line(LineGeometry::new(thickness))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Triangle { .. } => ShapeKind::Triangle,
            Self::Hexagon { .. } => ShapeKind::Hexagon,
            Self::Line(_) => ShapeKind::Line,
        }
    }

    /// Radius of the circle used for the fast intersection test.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Self::Circle { radius } | Self::Hexagon { radius } => radius,
            Self::Rectangle { width, height } => width.hypot(height) / 2.0,
            Self::Triangle { size } => size * 3f64.sqrt() / 3.0,
            Self::Line(line) => line.length() / 2.0,
        }
    }

    /// Closed outline in local coordinates; the segment itself for lines.
    pub fn outline(&self) -> BezPath {
        match *self {
            Self::Circle { radius } => {
                Circle::new(Point::ORIGIN, radius).to_path(CURVE_TOLERANCE)
            }
            Self::Rectangle { width, height } => {
                Rect::from_center_size(Point::ORIGIN, (width, height)).to_path(CURVE_TOLERANCE)
            }
            Self::Triangle { size } => {
                let h = size * 3f64.sqrt() / 2.0;
                polygon(&[
                    Point::new(0.0, -2.0 * h / 3.0),
                    Point::new(-size / 2.0, h / 3.0),
                    Point::new(size / 2.0, h / 3.0),
                ])
            }
            Self::Hexagon { radius } => polygon(&hexagon_vertices(radius)),
            Self::Line(line) => {
                let (a, b) = line.endpoints(Point::ORIGIN);
                Line::new(a, b).to_path(CURVE_TOLERANCE)
            }
        }
    }

    /// Emit draw commands for `ctx` into `graphic`.
    ///
    /// Closed shapes fill, then stroke on top when the context carries a visible stroke.
    /// Lines paint the stroke as a wider underlay and the fill color as the segment.
    pub(crate) fn emit(&self, ctx: &RenderContext, graphic: &Graphic) {
        let path = self.outline();
        match self {
            Self::Line(line) => {
                if let Some(stroke) = ctx.visible_stroke() {
                    graphic.stroke(
                        path.clone(),
                        line.thickness + ctx.stroke_width * 2.0,
                        stroke,
                    );
                }
                graphic.stroke(path, line.thickness, ctx.fill);
            }
            _ => {
                graphic.fill(path.clone(), ctx.fill);
                if let Some(stroke) = ctx.visible_stroke() {
                    graphic.stroke(path, ctx.stroke_width, stroke);
                }
            }
        }
    }
}

/// Vertices of a pointy-top hexagon, starting upper right and going clockwise.
pub fn hexagon_vertices(radius: f64) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = PI / 3.0 * i as f64 - PI / 6.0;
        Point::new(radius * angle.cos(), radius * angle.sin())
    })
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}
