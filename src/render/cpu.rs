use crate::foundation::color::Color;
use crate::foundation::core::{Affine, BezPath, Point};
use crate::foundation::error::KineticaResult;
use crate::render::backend::{FrameRGBA, RenderSettings, dims_u16};
use crate::surface::display_list::Surface;
use crate::surface::graphic::{DrawCommand, GraphicData};

/// Rasterizes a [`Surface`] with `vello_cpu`.
///
/// The render context is kept between frames and only rebuilt when the canvas size
/// changes.
pub struct CpuRenderer {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ctx: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Paint every child of `surface` in display-list order over its background.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn render_surface(&mut self, surface: &Surface) -> KineticaResult<FrameRGBA> {
        let canvas = surface.canvas();
        let (width, height) = dims_u16(canvas.width, canvas.height)?;
        let background = self.settings.clear_color.unwrap_or(surface.background());
        let children = surface.children();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);

        self.with_ctx_mut(width, height, |ctx| {
            paint_background(ctx, background);
            for child in &children {
                child.read(|data| draw_graphic(ctx, data));
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

fn draw_graphic(ctx: &mut vello_cpu::RenderContext, data: &GraphicData) {
    let alpha = data.alpha().clamp(0.0, 1.0);
    if alpha <= 0.0 || data.commands().is_empty() {
        return;
    }

    let origin = data.origin();
    ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
    let layered = alpha < 1.0;
    if layered {
        ctx.push_opacity_layer(alpha as f32);
    }
    for command in data.commands() {
        match command {
            DrawCommand::Fill { path, color } => {
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawCommand::Stroke { path, width, color } => {
                if *width <= 0.0 {
                    continue;
                }
                ctx.set_paint(color_to_cpu(*color));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                ctx.stroke_path(&bezpath_to_cpu(path));
            }
        }
    }
    if layered {
        ctx.pop_layer();
    }
}

// `render_to_pixmap` overwrites the whole target, so the background is drawn as a
// scene op rather than pre-filled into the pixmap.
fn paint_background(ctx: &mut vello_cpu::RenderContext, color: Color) {
    let (w, h) = (f64::from(ctx.width()), f64::from(ctx.height()));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r(), c.g(), c.b(), 255)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
