use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::render::Color;

pub const DEFAULT_WIDTH: u32 = 560;
pub const DEFAULT_HEIGHT: u32 = 114;
pub const DEFAULT_HEIGHT_WITH_LEGEND: u32 = 132;
pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

/// Caller-supplied drawing parameters.
///
/// Serializable so hosts can persist chart settings; missing fields take
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphParams {
    /// Surface width in device pixels.
    pub width: u32,
    /// Surface height in device pixels.
    pub height: u32,
    /// Device pixel ratio. `0` is treated as `1`.
    pub scale_factor: f64,
    /// Explicit font size in CSS pixels; `0` scales the font with the surface.
    pub font_size: f64,
    pub color_background: Color,
    pub color_foreground: Color,
    pub legend: bool,
    pub prefer_dynamic_axis_limits: bool,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale_factor: DEFAULT_SCALE_FACTOR,
            font_size: 0.0,
            color_background: Color::rgb(1.0, 1.0, 1.0),
            color_foreground: Color::rgb(0.0, 0.0, 0.0),
            legend: false,
            prefer_dynamic_axis_limits: false,
        }
    }
}

impl GraphParams {
    /// Defaults with the legend strip enabled and the matching height.
    #[must_use]
    pub fn with_legend_defaults() -> Self {
        Self {
            height: DEFAULT_HEIGHT_WITH_LEGEND,
            legend: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, background: Color, foreground: Color) -> Self {
        self.color_background = background;
        self.color_foreground = foreground;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    #[must_use]
    pub fn with_dynamic_axis_limits(mut self, enabled: bool) -> Self {
        self.prefer_dynamic_axis_limits = enabled;
        self
    }

    /// Replaces unusable scale factors and font sizes with their defaults.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            self.scale_factor = DEFAULT_SCALE_FACTOR;
        }
        if !self.font_size.is_finite() || self.font_size < 0.0 {
            self.font_size = 0.0;
        }
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphParams;

    #[test]
    fn missing_fields_take_defaults() {
        let params: GraphParams =
            serde_json::from_str(r#"{"width": 800, "legend": true}"#).expect("params");
        assert_eq!(params.width, 800);
        assert_eq!(params.height, 114);
        assert!(params.legend);
        assert!(!params.prefer_dynamic_axis_limits);
    }

    #[test]
    fn normalize_replaces_zero_scale_factor() {
        let params = GraphParams::default().with_scale_factor(0.0).normalize();
        assert_eq!(params.scale_factor, 1.0);
    }

    #[test]
    fn legend_defaults_are_taller() {
        let params = GraphParams::with_legend_defaults();
        assert_eq!(params.height, 132);
        assert!(params.legend);
    }
}
