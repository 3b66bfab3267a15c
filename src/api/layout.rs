//! Plot geometry, axes and labels for one surface size.
//!
//! All values are device pixels. Rounded positions plus a half stroke
//! offset keep one pixel lines on pixel boundaries.

use tracing::debug;

use crate::api::label_format::format_label;
use crate::api::legend::{Legend, LegendStrip, layout_legend};
use crate::api::palette::Palette;
use crate::api::params::GraphParams;
use crate::core::{AxisPlan, Path, PlotRect, Transform, Viewport, determine_step};
use crate::render::{
    DrawCommand, LineCap, RectPrimitive, RenderFrame, StrokePrimitive, TextHAlign, TextMeasure,
    TextPrimitive,
};

/// Base font size in CSS pixels.
pub const BASE_FONT_SIZE: f64 = 10.5;
/// Width of one label digit at the base font size.
pub const DIGIT_WIDTH: f64 = 23.0 / 3.75;

const REFERENCE_WIDTH: f64 = 554.0;
const REFERENCE_HEIGHT: f64 = 114.0;
const LEGEND_STRIP_HEIGHT: f64 = 18.0;
const MIN_FONT_FACTOR: f64 = 1.0;
const MAX_FONT_FACTOR: f64 = 1.35;
const COMPRESSED_LABEL_SCALE: f64 = 0.7;

/// Derived layout of one chart. Cached by the controllers until the
/// surface, the parameters or an axis plan change.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub viewport: Viewport,
    pub palette: Palette,
    pub scale_factor: f64,
    pub font_factor: f64,
    pub font_size: f64,
    /// Width of axis lines and ticks; also the unit for band separators.
    pub stroke_width: f64,
    pub plot: PlotRect,
    pub step_x: i64,
    pub step_y: i64,
    pub axis_path: Path,
    pub grid_path: Path,
    pub labels: Vec<TextPrimitive>,
    pub legend: Vec<DrawCommand>,
}

impl LayoutPlan {
    /// Lays out the plot area, tick stubs, grid lines and labels for the
    /// given axis plans.
    #[must_use]
    pub fn compute(
        params: &GraphParams,
        x_axis: &AxisPlan,
        y_axis: &AxisPlan,
        legend: Option<&Legend>,
        measure: &dyn TextMeasure,
    ) -> Self {
        let params = params.normalize();
        let viewport = params.viewport();
        let palette = Palette::derive(params.color_background, params.color_foreground);
        let scale = params.scale_factor;
        let surface_width = f64::from(viewport.width);
        let surface_height = f64::from(viewport.height);

        let legend_base = if params.legend { LEGEND_STRIP_HEIGHT } else { 0.0 };
        let (font_factor, font_size) = if params.font_size > 0.0 {
            (params.font_size / BASE_FONT_SIZE, params.font_size * scale)
        } else {
            let factor = (surface_width / scale / REFERENCE_WIDTH)
                .min((surface_height / scale - legend_base) / REFERENCE_HEIGHT)
                .clamp(MIN_FONT_FACTOR, MAX_FONT_FACTOR);
            (factor, BASE_FONT_SIZE * factor * scale)
        };
        let ff = font_factor;

        let graph_x = ((y_axis.digits * DIGIT_WIDTH * ff + 5.0) * scale).round();
        let graph_y = (4.0 * ff * scale).round();
        let right_margin = (((x_axis.digits * DIGIT_WIDTH / 2.0 + 2.75) * ff - 1.0) * scale).round();
        let bottom_margin = ((14.0 * ff + 5.0) * scale).round();
        let legend_strip = if params.legend {
            (LEGEND_STRIP_HEIGHT * ff * scale).round()
        } else {
            0.0
        };
        let plot = PlotRect::new(
            graph_x,
            graph_y,
            (surface_width - graph_x - right_margin).max(0.0),
            (surface_height - graph_y - bottom_margin - legend_strip).max(0.0),
        );

        let stroke_width = if scale > 1.0 { scale.round() } else { 1.0 };
        let text_offset = 3.5 * ff * scale;

        let step_x = determine_step(
            &x_axis.steps,
            x_axis.range.span(),
            plot.width,
            (x_axis.digits * DIGIT_WIDTH + 4.0) * ff * scale,
        );
        let step_y = determine_step(&y_axis.steps, y_axis.range.span(), plot.height, font_size);

        let mut layout = Self {
            viewport,
            palette,
            scale_factor: scale,
            font_factor: ff,
            font_size,
            stroke_width,
            plot,
            step_x,
            step_y,
            axis_path: Path::new(),
            grid_path: Path::new(),
            labels: Vec::new(),
            legend: Vec::new(),
        };
        layout.layout_x_axis(x_axis, text_offset);
        layout.layout_y_axis(y_axis, text_offset);

        if let Some(legend) = legend.filter(|_| params.legend) {
            layout.legend = layout_legend(
                legend,
                LegendStrip {
                    surface_width,
                    top: surface_height - legend_strip,
                    height: legend_strip,
                    font_size,
                    font_factor: ff,
                    scale_factor: scale,
                    text_offset,
                    text_color: palette.text,
                },
                measure,
            );
        }

        debug!(
            width = viewport.width,
            height = viewport.height,
            plot_width = plot.width,
            plot_height = plot.height,
            step_x,
            step_y,
            "layout computed"
        );
        layout
    }

    fn layout_x_axis(&mut self, axis: &AxisPlan, text_offset: f64) {
        let PlotRect { x, y, width, height } = self.plot;
        let half = 0.5 * self.stroke_width;
        let scale = self.scale_factor;
        let baseline = y + height + half;

        self.axis_path.move_to(x - half, baseline);
        self.axis_path.line_to(x - half + width, baseline);

        let stub_start = y + height + (2.0 * scale).round() + half;
        let stub_end = y + height + scale.round() + half;
        let label_y = y + height + (2.0 + 8.0 * self.font_factor) * scale + text_offset;

        for value in axis.tick_values(self.step_x) {
            let pos = x - half + (width * axis.fraction(value as f64)).round();
            self.axis_path.move_to(pos, stub_start);
            self.axis_path.line_to(pos, stub_end);
            self.labels.push(TextPrimitive::new(
                format_label(axis.format, value, self.step_x, axis.label_end),
                pos,
                label_y,
                self.font_size,
                self.palette.text,
                TextHAlign::Center,
            ));
        }
    }

    fn layout_y_axis(&mut self, axis: &AxisPlan, text_offset: f64) {
        let PlotRect { x, y, width, height } = self.plot;
        let half = 0.5 * self.stroke_width;
        let scale = self.scale_factor;
        let step = self.step_y.max(1);

        self.axis_path.move_to(x - half, y + half);
        self.axis_path.line_to(x - half, y + height + half);

        let pos_of = |value: i64| y + height + half - (height * axis.fraction(value as f64)).round();
        let tick_end = x - scale.round() - half;
        let major_start = x - (4.0 * scale).round() - half;
        let minor_start = x - (2.0 * scale).round() - half;

        let ticks = axis.tick_values(step);
        let minor_step = step / 2;
        if minor_step > 0 {
            let first = ticks.first().copied().unwrap_or(axis.label_start) - minor_step;
            let mut value = first;
            while value <= axis.label_end {
                if value >= axis.label_start {
                    let pos = pos_of(value);
                    self.axis_path.move_to(minor_start, pos);
                    self.axis_path.line_to(tick_end, pos);
                }
                value += step;
            }
        }

        let label_scale = if axis.label_start.abs().max(axis.label_end.abs()) >= 100 {
            COMPRESSED_LABEL_SCALE
        } else {
            1.0
        };
        let label_x = x - (5.0 + 5.5 * self.font_factor) * scale;

        for value in ticks {
            let fraction = axis.fraction(value as f64);
            let pos = pos_of(value);
            self.axis_path.move_to(major_start, pos);
            self.axis_path.line_to(tick_end, pos);
            if fraction > 0.01 {
                self.grid_path.move_to(x + half, pos);
                self.grid_path.line_to(x + width - half, pos);
            }
            self.labels.push(
                TextPrimitive::new(
                    format_label(axis.format, value, step, axis.label_end),
                    label_x,
                    pos + text_offset,
                    self.font_size,
                    self.palette.text,
                    TextHAlign::Right,
                )
                .with_scale_x(label_scale),
            );
        }
    }

    /// Surface background, plot background and grid.
    pub fn paint_background(&self, frame: &mut RenderFrame) {
        let surface = self.viewport;
        frame.push_rect(RectPrimitive::new(
            0.0,
            0.0,
            f64::from(surface.width),
            f64::from(surface.height),
            self.palette.background,
        ));
        if !self.plot.is_degenerate() {
            frame.push_rect(RectPrimitive::new(
                self.plot.x,
                self.plot.y,
                self.plot.width,
                self.plot.height,
                self.palette.graph,
            ));
        }
        frame.push_stroke(StrokePrimitive::new(
            self.grid_path.clone(),
            Transform::identity(),
            self.palette.grid,
            self.stroke_width,
            LineCap::Butt,
        ));
    }

    /// Axis lines, tick stubs, labels and the legend.
    pub fn paint_axes(&self, frame: &mut RenderFrame) {
        frame.push_stroke(StrokePrimitive::new(
            self.axis_path.clone(),
            Transform::identity(),
            self.palette.text,
            self.stroke_width,
            LineCap::Square,
        ));
        for label in &self.labels {
            frame.push_text(label.clone());
        }
        for command in &self.legend {
            frame.push(command.clone());
        }
    }

    /// Device pixels per carrier (or period) for a domain `units` wide.
    #[must_use]
    pub fn scale_x(&self, units: usize) -> f64 {
        self.plot.width / units.max(1) as f64
    }
}
