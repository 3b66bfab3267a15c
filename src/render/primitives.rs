use serde::{Deserialize, Serialize};

use crate::core::path::{Path, Transform};
use crate::error::{GraphError, GraphResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 0..=255 channels and a 0..=1 alpha.
    #[must_use]
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            alpha,
        )
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self::rgba(self.red, self.green, self.blue, alpha)
    }

    /// Channels as 0..=255 integers.
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        [self.red, self.green, self.blue].map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Perceived brightness on the 0..=255 scale.
    #[must_use]
    pub fn brightness(self) -> f64 {
        let [red, green, blue] = self.to_rgb8();
        0.299 * f64::from(red) + 0.587 * f64::from(green) + 0.114 * f64::from(blue)
    }

    /// CSS `rgba()` notation.
    #[must_use]
    pub fn to_css(self) -> String {
        let [red, green, blue] = self.to_rgb8();
        let alpha = (self.alpha * 1000.0).round() / 1000.0;
        format!("rgba({red},{green},{blue},{alpha})")
    }

    pub fn validate(self) -> GraphResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(GraphError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// How a stroke is composited onto a scratch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Square,
}

/// Axis-aligned filled rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, color: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    pub fn validate(self) -> GraphResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(GraphError::InvalidData(
                "rect position must be finite".to_owned(),
            ));
        }
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0 {
            return Err(GraphError::InvalidData(
                "rect size must be finite and >= 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Filled path mapped to device pixels by `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillPrimitive {
    pub path: Path,
    pub transform: Transform,
    pub color: Color,
}

impl FillPrimitive {
    #[must_use]
    pub fn new(path: Path, transform: Transform, color: Color) -> Self {
        Self {
            path,
            transform,
            color,
        }
    }

    pub fn validate(&self) -> GraphResult<()> {
        validate_geometry(&self.path, &self.transform)?;
        self.color.validate()
    }
}

/// Stroked path. `width` is in user-space units, so it is scaled by
/// `transform` like the geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePrimitive {
    pub path: Path,
    pub transform: Transform,
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
}

impl StrokePrimitive {
    #[must_use]
    pub fn new(path: Path, transform: Transform, color: Color, width: f64, cap: LineCap) -> Self {
        Self {
            path,
            transform,
            color,
            width,
            cap,
        }
    }

    pub fn validate(&self) -> GraphResult<()> {
        validate_geometry(&self.path, &self.transform)?;
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(GraphError::InvalidData(
                "stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

fn validate_geometry(path: &Path, transform: &Transform) -> GraphResult<()> {
    if !path.is_finite() {
        return Err(GraphError::InvalidData(
            "path coordinates must be finite".to_owned(),
        ));
    }
    if !transform.is_finite() {
        return Err(GraphError::InvalidData(
            "path transform must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in pixel space. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
    /// Horizontal compression around `x`; 1.0 draws the text unchanged.
    pub scale_x: f64,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
            scale_x: 1.0,
        }
    }

    #[must_use]
    pub fn with_scale_x(mut self, scale_x: f64) -> Self {
        self.scale_x = scale_x;
        self
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.text.is_empty() {
            return Err(GraphError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(GraphError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(GraphError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        if !self.scale_x.is_finite() || self.scale_x <= 0.0 {
            return Err(GraphError::InvalidData(
                "text scale must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// One stroke drawn into a scratch layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStroke {
    pub stroke: StrokePrimitive,
    pub blend: BlendMode,
}

/// Offscreen buffer of `width` x `height` pixels placed at `(x, y)`.
///
/// Strokes are composited onto the cleared buffer in order using their
/// blend mode, then the buffer is drawn onto the target with source-over.
/// Stroke transforms are relative to the buffer origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchLayer {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub strokes: Vec<LayerStroke>,
}

impl ScratchLayer {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            strokes: Vec::new(),
        }
    }

    pub fn push(&mut self, stroke: StrokePrimitive, blend: BlendMode) {
        self.strokes.push(LayerStroke { stroke, blend });
    }

    /// Size of the pixel buffer backing this layer.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let to_pixels = |value: f64| value.max(0.0).ceil().min(f64::from(u32::MAX)) as u32;
        (to_pixels(self.width), to_pixels(self.height))
    }

    pub fn validate(&self) -> GraphResult<()> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            || self.width < 0.0
            || self.height < 0.0
        {
            return Err(GraphError::InvalidData(
                "scratch layer bounds must be finite and >= 0".to_owned(),
            ));
        }
        for layer_stroke in &self.strokes {
            layer_stroke.stroke.validate()?;
        }
        Ok(())
    }
}
