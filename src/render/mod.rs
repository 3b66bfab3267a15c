mod frame;
mod null_renderer;
mod primitives;
mod svg_renderer;

pub use frame::{DrawCommand, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    BlendMode, Color, FillPrimitive, LayerStroke, LineCap, RectPrimitive, ScratchLayer,
    StrokePrimitive, TextHAlign, TextPrimitive,
};
pub use svg_renderer::SvgRenderer;

use crate::error::GraphResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from chart layout and data handling.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> GraphResult<()>;
}

/// Text metrics source used to lay out legends.
pub trait TextMeasure {
    /// Advance width of `text` in pixels at `font_size_px`.
    fn text_width(&self, text: &str, font_size_px: f64) -> f64;
}

/// Average glyph advance of a proportional sans-serif face, in ems.
const APPROX_GLYPH_ADVANCE_EM: f64 = 0.55;

/// Width estimate for backends without font metrics.
#[must_use]
pub fn approximate_text_width(text: &str, font_size_px: f64) -> f64 {
    text.chars().count() as f64 * font_size_px * APPROX_GLYPH_ADVANCE_EM
}

/// Fixed-ratio measurer for headless layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        approximate_text_width(text, font_size_px)
    }
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
