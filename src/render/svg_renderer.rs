use std::fmt::Write as _;

use crate::core::path::{Transform, format_coord};
use crate::error::{GraphError, GraphResult};
use crate::render::{
    BlendMode, DrawCommand, LineCap, RenderFrame, Renderer, ScratchLayer,
    StrokePrimitive, TextHAlign, TextMeasure, TextPrimitive, approximate_text_width,
};

const FONT_FAMILY: &str = "Arial,Helvetica,sans-serif";

/// Serializes frames as standalone SVG documents.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document produced by the last successful render.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }

    fn write_frame(out: &mut String, frame: &RenderFrame) -> std::fmt::Result {
        let width = frame.viewport.width;
        let height = frame.viewport.height;
        write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        for command in &frame.commands {
            match command {
                DrawCommand::Rect(rect) => write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    format_coord(rect.x),
                    format_coord(rect.y),
                    format_coord(rect.width),
                    format_coord(rect.height),
                    rect.color.to_css()
                )?,
                DrawCommand::Fill(fill) => {
                    write!(out, r#"<path d="{}""#, fill.path.to_svg_data())?;
                    write_transform(out, &fill.transform)?;
                    write!(out, r#" fill="{}"/>"#, fill.color.to_css())?;
                }
                DrawCommand::Stroke(stroke) => write_stroke(out, stroke, None)?,
                DrawCommand::Text(text) => write_text(out, text)?,
                DrawCommand::Layer(layer) => write_layer(out, layer)?,
            }
        }
        out.push_str("</svg>");
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> GraphResult<()> {
        frame.validate()?;
        let mut out = String::new();
        Self::write_frame(&mut out, frame)
            .map_err(|err| GraphError::Backend(format!("failed to serialize svg: {err}")))?;
        self.document = out;
        Ok(())
    }
}

impl TextMeasure for SvgRenderer {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        approximate_text_width(text, font_size_px)
    }
}

fn write_transform(out: &mut String, transform: &Transform) -> std::fmt::Result {
    if transform.is_identity() {
        return Ok(());
    }
    write!(out, r#" transform="{}""#, transform.to_svg())
}

fn write_stroke(out: &mut String, stroke: &StrokePrimitive, blend: Option<BlendMode>) -> std::fmt::Result {
    write!(out, r#"<path d="{}""#, stroke.path.to_svg_data())?;
    write_transform(out, &stroke.transform)?;
    let cap = match stroke.cap {
        LineCap::Butt => "butt",
        LineCap::Square => "square",
    };
    write!(
        out,
        r#" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="{cap}""#,
        stroke.color.to_css(),
        format_coord(stroke.width)
    )?;
    if blend == Some(BlendMode::Multiply) {
        out.push_str(r#" style="mix-blend-mode:multiply""#);
    }
    out.push_str("/>");
    Ok(())
}

fn write_text(out: &mut String, text: &TextPrimitive) -> std::fmt::Result {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    write!(
        out,
        r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" fill="{}" text-anchor="{anchor}""#,
        format_coord(text.x),
        format_coord(text.y),
        format_coord(text.font_size_px),
        text.color.to_css()
    )?;
    if text.scale_x != 1.0 {
        let transform = Transform::identity()
            .translate(text.x, 0.0)
            .scale(text.scale_x, 1.0)
            .translate(-text.x, 0.0);
        write_transform(out, &transform)?;
    }
    write!(out, ">{}</text>", escape_text(&text.text))
}

fn write_layer(out: &mut String, layer: &ScratchLayer) -> std::fmt::Result {
    // A nested viewport clips to the layer bounds and isolates blending.
    let (width, height) = layer.pixel_size();
    write!(
        out,
        r#"<svg x="{}" y="{}" width="{width}" height="{height}" style="isolation:isolate">"#,
        format_coord(layer.x),
        format_coord(layer.y)
    )?;
    for entry in &layer.strokes {
        write_stroke(out, &entry.stroke, Some(entry.blend))?;
    }
    out.push_str("</svg>");
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
