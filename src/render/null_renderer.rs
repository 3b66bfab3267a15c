use crate::error::GraphResult;
use crate::render::{DrawCommand, RenderFrame, Renderer, TextMeasure, approximate_text_width};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// without a raster backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_fill_count: usize,
    pub last_stroke_count: usize,
    pub last_text_count: usize,
    pub last_layer_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> GraphResult<()> {
        frame.validate()?;
        self.last_fill_count = 0;
        self.last_stroke_count = 0;
        self.last_text_count = 0;
        self.last_layer_count = 0;
        for command in &frame.commands {
            match command {
                DrawCommand::Rect(_) | DrawCommand::Fill(_) => self.last_fill_count += 1,
                DrawCommand::Stroke(_) => self.last_stroke_count += 1,
                DrawCommand::Text(_) => self.last_text_count += 1,
                DrawCommand::Layer(_) => self.last_layer_count += 1,
            }
        }
        self.frames_rendered += 1;
        Ok(())
    }
}

impl TextMeasure for NullRenderer {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        approximate_text_width(text, font_size_px)
    }
}
