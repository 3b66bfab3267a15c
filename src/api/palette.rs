use crate::render::Color;

/// Upstream accent.
pub const COLOR_GREEN: Color = Color::rgba(96.0 / 255.0, 192.0 / 255.0, 0.0, 0.75);
/// Downstream accent.
pub const COLOR_BLUE: Color = Color::rgba(0.0, 127.0 / 255.0, 1.0, 0.75);
/// Pilot tones and uncorrected errors.
pub const COLOR_RED: Color = Color::rgba(204.0 / 255.0, 94.0 / 255.0, 82.0 / 255.0, 0.75);

/// Colors used by one chart, derived from the caller's background and
/// foreground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub graph: Color,
    pub grid: Color,
    pub neutral_fill: Color,
    pub neutral_stroke: Color,
    pub upstream: Color,
    pub downstream: Color,
    pub pilot_tones: Color,
    pub min_stroke: Color,
    pub max_stroke: Color,
}

impl Palette {
    /// Picks plot, grid and neutral grays that contrast with the background.
    /// A mostly transparent background is judged by the foreground instead.
    #[must_use]
    pub fn derive(background: Color, foreground: Color) -> Self {
        let brightness_background = background.brightness();
        let brightness_foreground = foreground.brightness();
        let brightness = if background.alpha < 0.75 {
            255.0 - brightness_foreground
        } else {
            brightness_background
        };

        let gray = if brightness > 223.0 {
            brightness - 20.0
        } else if brightness > 127.0 {
            255.0 - (223.0 - brightness) / 2.0
        } else if brightness > 31.0 {
            (brightness - 32.0) / 2.0
        } else {
            brightness + 20.0
        };

        let gray_grid = if brightness_foreground < brightness_background {
            (gray - 20.0).max(0.0)
        } else {
            (gray + 20.0).min(255.0)
        };

        let gray_neutral = if brightness > 127.0 { 95.0 } else { 159.0 };

        Self {
            background,
            text: foreground,
            graph: gray_color(gray, 1.0),
            grid: gray_color(gray_grid, 1.0),
            neutral_fill: gray_color(gray_neutral, 0.6),
            neutral_stroke: gray_color(gray_neutral, 0.75),
            upstream: COLOR_GREEN,
            downstream: COLOR_BLUE,
            pilot_tones: COLOR_RED,
            min_stroke: COLOR_BLUE,
            max_stroke: COLOR_GREEN,
        }
    }
}

fn gray_color(level: f64, alpha: f64) -> Color {
    let channel = level.round().clamp(0.0, 255.0) / 255.0;
    Color::rgba(channel, channel, channel, alpha)
}
