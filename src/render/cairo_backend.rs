use std::io::Write;

use cairo::{Context, Format, ImageSurface, Matrix, Operator};
use pango::FontDescription;

use crate::core::path::{Path, PathCommand, Transform};
use crate::error::{GraphError, GraphResult};
use crate::render::{
    BlendMode, Color, DrawCommand, LineCap, RectPrimitive, RenderFrame, Renderer, ScratchLayer,
    StrokePrimitive, TextHAlign, TextMeasure, TextPrimitive, approximate_text_width,
};

const FONT_FAMILY: &str = "Arial,Helvetica,sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub fills_drawn: usize,
    pub strokes_drawn: usize,
    pub texts_drawn: usize,
    pub layers_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> GraphResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// This renderer supports two modes:
/// - offscreen image-surface rendering through `Renderer::render`, resized
///   to the frame viewport
/// - in-place rendering on an external Cairo context through
///   `CairoContextRenderer`
///
/// Scratch layers are painted through one reusable offscreen surface that is
/// only reallocated when a layer of a different size is drawn.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    scratch: Option<ImageSurface>,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> GraphResult<Self> {
        Ok(Self {
            surface: create_surface(width, height)?,
            scratch: None,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the current surface as PNG.
    pub fn write_png<W: Write>(&self, writer: &mut W) -> GraphResult<()> {
        self.surface
            .write_to_png(writer)
            .map_err(|err| GraphError::Backend(format!("failed to write png: {err}")))
    }

    fn ensure_surface_size(&mut self, width: u32, height: u32) -> GraphResult<()> {
        let width = to_cairo_size(width)?;
        let height = to_cairo_size(height)?;
        if self.surface.width() != width || self.surface.height() != height {
            self.surface = create_surface(width, height)?;
        }
        Ok(())
    }

    fn scratch_surface(&mut self, width: i32, height: i32) -> GraphResult<ImageSurface> {
        match &self.scratch {
            Some(surface) if surface.width() == width && surface.height() == height => {
                Ok(surface.clone())
            }
            _ => {
                let surface = create_surface(width, height)?;
                self.scratch = Some(surface.clone());
                Ok(surface)
            }
        }
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> GraphResult<()> {
        frame.validate()?;

        let mut stats = CairoRenderStats::default();

        for command in &frame.commands {
            match command {
                DrawCommand::Rect(rect) => {
                    fill_rect(context, rect)?;
                    stats.fills_drawn += 1;
                }
                DrawCommand::Fill(fill) => {
                    context.save().map_err(|err| map_backend_error("failed to save state", err))?;
                    context.transform(to_matrix(&fill.transform));
                    append_path(context, &fill.path);
                    context.restore().map_err(|err| map_backend_error("failed to restore state", err))?;
                    apply_color(context, fill.color);
                    context
                        .fill()
                        .map_err(|err| map_backend_error("failed to fill path", err))?;
                    stats.fills_drawn += 1;
                }
                DrawCommand::Stroke(stroke) => {
                    stroke_path(context, stroke)?;
                    stats.strokes_drawn += 1;
                }
                DrawCommand::Text(text) => {
                    draw_text(context, text)?;
                    stats.texts_drawn += 1;
                }
                DrawCommand::Layer(layer) => {
                    self.draw_layer(context, layer)?;
                    stats.layers_drawn += 1;
                }
            }
        }

        self.last_stats = stats;
        Ok(())
    }

    fn draw_layer(&mut self, context: &Context, layer: &ScratchLayer) -> GraphResult<()> {
        let (width, height) = layer.pixel_size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let scratch = self.scratch_surface(to_cairo_size(width)?, to_cairo_size(height)?)?;

        {
            let scratch_context = Context::new(&scratch)
                .map_err(|err| map_backend_error("failed to create scratch context", err))?;
            scratch_context.set_operator(Operator::Clear);
            scratch_context
                .paint()
                .map_err(|err| map_backend_error("failed to clear scratch surface", err))?;

            for entry in &layer.strokes {
                scratch_context.set_operator(match entry.blend {
                    BlendMode::SourceOver => Operator::Over,
                    BlendMode::Multiply => Operator::Multiply,
                });
                stroke_path(&scratch_context, &entry.stroke)?;
            }
        }
        scratch.flush();

        context
            .set_source_surface(&scratch, layer.x, layer.y)
            .map_err(|err| map_backend_error("failed to set scratch source", err))?;
        context
            .paint()
            .map_err(|err| map_backend_error("failed to paint scratch layer", err))
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> GraphResult<()> {
        self.ensure_surface_size(frame.viewport.width, frame.viewport.height)?;
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> GraphResult<()> {
        self.render_with_context(context, frame)
    }
}

impl TextMeasure for CairoRenderer {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        let Ok(context) = Context::new(&self.surface) else {
            return approximate_text_width(text, font_size_px);
        };
        let layout = pangocairo::functions::create_layout(&context);
        layout.set_font_description(Some(&font_description(font_size_px)));
        layout.set_text(text);
        f64::from(layout.size().0) / f64::from(pango::SCALE)
    }
}

fn create_surface(width: i32, height: i32) -> GraphResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(GraphError::InvalidData(
            "cairo surface size must be > 0".to_owned(),
        ));
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn to_cairo_size(value: u32) -> GraphResult<i32> {
    i32::try_from(value)
        .map_err(|_| GraphError::InvalidData(format!("surface size {value} exceeds cairo limits")))
}

fn to_matrix(transform: &Transform) -> Matrix {
    Matrix::new(
        transform.xx,
        transform.yx,
        transform.xy,
        transform.yy,
        transform.x0,
        transform.y0,
    )
}

fn font_description(font_size_px: f64) -> FontDescription {
    let mut description = FontDescription::from_string(FONT_FAMILY);
    description.set_absolute_size(font_size_px * f64::from(pango::SCALE));
    description
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_path(context: &Context, path: &Path) {
    context.new_path();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo { x, y } => context.move_to(x, y),
            PathCommand::LineTo { x, y } => context.line_to(x, y),
            PathCommand::Close => context.close_path(),
        }
    }
}

fn fill_rect(context: &Context, rect: &RectPrimitive) -> GraphResult<()> {
    context.new_path();
    context.rectangle(rect.x, rect.y, rect.width, rect.height);
    apply_color(context, rect.color);
    context
        .fill()
        .map_err(|err| map_backend_error("failed to fill rectangle", err))
}

fn stroke_path(context: &Context, stroke: &StrokePrimitive) -> GraphResult<()> {
    context
        .save()
        .map_err(|err| map_backend_error("failed to save state", err))?;
    context.transform(to_matrix(&stroke.transform));
    append_path(context, &stroke.path);
    context.set_line_width(stroke.width);
    context.set_line_cap(match stroke.cap {
        LineCap::Butt => cairo::LineCap::Butt,
        LineCap::Square => cairo::LineCap::Square,
    });
    apply_color(context, stroke.color);
    let result = context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke path", err));
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore state", err))?;
    result
}

fn draw_text(context: &Context, text: &TextPrimitive) -> GraphResult<()> {
    let layout = pangocairo::functions::create_layout(context);
    layout.set_font_description(Some(&font_description(text.font_size_px)));
    layout.set_text(&text.text);

    let scale = f64::from(pango::SCALE);
    let text_width = f64::from(layout.size().0) / scale;
    let baseline = f64::from(layout.baseline()) / scale;
    let x = match text.h_align {
        TextHAlign::Left => text.x,
        TextHAlign::Center => text.x - text_width / 2.0,
        TextHAlign::Right => text.x - text_width,
    };

    context
        .save()
        .map_err(|err| map_backend_error("failed to save state", err))?;
    if text.scale_x != 1.0 {
        context.translate(text.x, 0.0);
        context.scale(text.scale_x, 1.0);
        context.translate(-text.x, 0.0);
    }
    apply_color(context, text.color);
    context.move_to(x, text.y - baseline);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore state", err))
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> GraphError {
    GraphError::Backend(format!("{prefix}: {err}"))
}
