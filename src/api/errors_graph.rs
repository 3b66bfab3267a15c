//! Error and retransmission counters over time.
//!
//! The six charts only differ in title and listed counters, so they share
//! one controller configured by an [`ErrorsVariant`].

use std::sync::Arc;

use crate::api::graph_core::{Graph, GraphCore, ShapeKey};
use crate::api::legend::Legend;
use crate::api::palette::{COLOR_BLUE, COLOR_GREEN, COLOR_RED};
use crate::api::params::GraphParams;
use crate::core::path_builders::{build_errors_path, build_errors_state_path};
use crate::core::{
    AxisPlan, AxisRange, ErrorCounter, ErrorsHistoryDataset, LabelFormat, Path, Transform,
};
use crate::render::{
    BlendMode, Color, FillPrimitive, LineCap, RenderFrame, ScratchLayer, StrokePrimitive,
    TextMeasure,
};
use tracing::debug;

const X_STEPS: [i64; 12] = [1, 2, 5, 10, 20, 30, 60, 120, 180, 360, 720, 1440];
const Y_STEPS: [i64; 24] = [
    1, 2, 4, 10, 20, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 25_000, 50_000, 100_000,
    250_000, 500_000, 1_000_000, 2_500_000, 5_000_000, 10_000_000, 25_000_000, 50_000_000,
];
const X_LABEL_DIGITS: f64 = 5.5;
const Y_LABEL_DIGITS: f64 = 5.0;
const MIN_COUNT_TOP: u64 = 5;
const COUNT_HEADROOM: f64 = 1.05;
const NO_DATA_ALPHA: f64 = 0.15;

/// One counter drawn by an errors chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorsSeries {
    pub counter: ErrorCounter,
    pub label: &'static str,
    pub color: Color,
}

impl ErrorsSeries {
    const fn new(counter: ErrorCounter, label: &'static str, color: Color) -> Self {
        Self {
            counter,
            label,
            color,
        }
    }
}

/// Title and counters of one errors chart. The first listed series ends up
/// on top where traces overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorsVariant {
    pub title: &'static str,
    pub series: &'static [ErrorsSeries],
}

impl ErrorsVariant {
    pub const DOWNSTREAM_RETRANSMISSIONS: Self = Self {
        title: "Downstream retransmissions",
        series: &[
            ErrorsSeries::new(ErrorCounter::DownstreamRtxTx, "Retransmitted (rtx-tx)", COLOR_GREEN),
            ErrorsSeries::new(ErrorCounter::DownstreamRtxC, "Corrected (rtx-c)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::DownstreamRtxUc, "Uncorrected (rtx-uc)", COLOR_RED),
        ],
    };

    pub const UPSTREAM_RETRANSMISSIONS: Self = Self {
        title: "Upstream retransmissions",
        series: &[
            ErrorsSeries::new(ErrorCounter::UpstreamRtxTx, "Retransmitted (rtx-tx)", COLOR_GREEN),
            ErrorsSeries::new(ErrorCounter::UpstreamRtxC, "Corrected (rtx-c)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::UpstreamRtxUc, "Uncorrected (rtx-uc)", COLOR_RED),
        ],
    };

    pub const DOWNSTREAM_ERRORS: Self = Self {
        title: "Downstream errors",
        series: &[
            ErrorsSeries::new(ErrorCounter::DownstreamFec, "Corrected (FEC)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::DownstreamCrc, "Uncorrected (CRC)", COLOR_RED),
        ],
    };

    pub const UPSTREAM_ERRORS: Self = Self {
        title: "Upstream errors",
        series: &[
            ErrorsSeries::new(ErrorCounter::UpstreamFec, "Corrected (FEC)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::UpstreamCrc, "Uncorrected (CRC)", COLOR_RED),
        ],
    };

    pub const DOWNSTREAM_ERRORED_SECONDS: Self = Self {
        title: "Downstream errored seconds",
        series: &[
            ErrorsSeries::new(ErrorCounter::DownstreamEs, "Errored (ES)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::DownstreamSes, "Severely errored (SES)", COLOR_RED),
        ],
    };

    pub const UPSTREAM_ERRORED_SECONDS: Self = Self {
        title: "Upstream errored seconds",
        series: &[
            ErrorsSeries::new(ErrorCounter::UpstreamEs, "Errored (ES)", COLOR_BLUE),
            ErrorsSeries::new(ErrorCounter::UpstreamSes, "Severely errored (SES)", COLOR_RED),
        ],
    };

    pub const ALL: [Self; 6] = [
        Self::DOWNSTREAM_RETRANSMISSIONS,
        Self::UPSTREAM_RETRANSMISSIONS,
        Self::DOWNSTREAM_ERRORS,
        Self::UPSTREAM_ERRORS,
        Self::DOWNSTREAM_ERRORED_SECONDS,
        Self::UPSTREAM_ERRORED_SECONDS,
    ];

    #[must_use]
    pub fn legend(&self) -> Legend {
        self.series
            .iter()
            .fold(Legend::new(self.title), |legend, series| {
                legend.with_item(series.color, series.label)
            })
    }
}

fn time_axis(data: Option<&ErrorsHistoryDataset>) -> AxisPlan {
    let total_minutes = data.map_or(24.0 * 60.0, ErrorsHistoryDataset::total_minutes);
    AxisPlan::new(
        AxisRange::new(total_minutes, 0.0),
        &X_STEPS,
        X_LABEL_DIGITS,
        LabelFormat::Duration,
    )
}

fn count_axis(variant: &ErrorsVariant, data: Option<&ErrorsHistoryDataset>) -> AxisPlan {
    let observed = data
        .into_iter()
        .flat_map(|data| variant.series.iter().map(|series| data.counter(series.counter)))
        .flat_map(|samples| samples.iter().flatten())
        .copied()
        .max()
        .unwrap_or(0);
    let top = COUNT_HEADROOM * observed.max(MIN_COUNT_TOP) as f64;
    AxisPlan::new(AxisRange::new(0.0, top), &Y_STEPS, Y_LABEL_DIGITS, LabelFormat::Count)
}

/// Counters of one [`ErrorsVariant`] over the retained periods, oldest on
/// the left.
#[derive(Debug, Clone)]
pub struct ErrorsGraph {
    variant: ErrorsVariant,
    core: GraphCore,
    data: Option<Arc<ErrorsHistoryDataset>>,
}

impl ErrorsGraph {
    #[must_use]
    pub fn new(
        variant: ErrorsVariant,
        params: GraphParams,
        data: Option<Arc<ErrorsHistoryDataset>>,
    ) -> Self {
        let mut graph = Self {
            core: GraphCore::new(
                params,
                time_axis(data.as_deref()),
                count_axis(&variant, data.as_deref()),
                variant.legend(),
            ),
            variant,
            data,
        };
        graph.refresh_axes();
        graph
    }

    pub fn set_data(&mut self, data: Option<Arc<ErrorsHistoryDataset>>) {
        self.data = data;
        self.refresh_axes();
    }

    #[must_use]
    pub fn variant(&self) -> &ErrorsVariant {
        &self.variant
    }

    #[must_use]
    pub fn data(&self) -> Option<&ErrorsHistoryDataset> {
        self.data.as_deref()
    }

    #[must_use]
    pub fn core(&self) -> &GraphCore {
        &self.core
    }

    fn refresh_axes(&mut self) {
        let data = self.data.as_deref();
        let shape = ShapeKey::new(
            data.map_or(0, |data| data.period_count),
            data.map_or(0.0, |data| data.period_length.num_seconds() as f64),
            self.core.params().prefer_dynamic_axis_limits,
        );
        if self.core.update_shape(shape) {
            self.core.set_x_axis(time_axis(data));
        }
        self.core.set_y_axis(count_axis(&self.variant, data));
    }

    fn paint_data(&self, frame: &mut RenderFrame, data: &ErrorsHistoryDataset) {
        let Some(layout) = self.core.layout() else {
            return;
        };
        let plot = layout.plot;
        if plot.is_degenerate() {
            return;
        }
        // Without a period count the samples have no place on the time axis.
        if data.period_count == 0 {
            debug!(title = self.variant.title, "errors history without periods, traces skipped");
            return;
        }

        let top = self.core.y_axis().range.top;
        let scale_x = layout.scale_x(data.period_count);
        let scale_y = plot.height / top;
        let s = layout.stroke_width;
        let samples: Vec<&[Option<u64>]> = self
            .variant
            .series
            .iter()
            .map(|series| data.counter(series.counter))
            .collect();

        let mut no_data = Path::new();
        build_errors_state_path(&mut no_data, &samples);
        frame.push_fill(FillPrimitive::new(
            no_data,
            Transform::identity()
                .translate(plot.x, plot.bottom() + s)
                .scale(scale_x, -plot.height - s),
            layout.palette.neutral_fill.with_alpha(NO_DATA_ALPHA),
        ));

        // Uniform scale keeps the line width undistorted.
        let transform = Transform::identity()
            .translate(0.0, plot.height)
            .scale(scale_x, -scale_x);
        let width = layout.scale_factor / scale_x;
        let mut layer = ScratchLayer::new(plot.x, plot.y, plot.width, plot.height);
        let last = self.variant.series.len().saturating_sub(1);

        for (index, series) in self.variant.series.iter().enumerate().rev() {
            let mut path = Path::with_precision(1);
            build_errors_path(&mut path, samples[index], scale_y, top, 1.0 / scale_x);
            let blend = if index == last {
                BlendMode::SourceOver
            } else {
                BlendMode::Multiply
            };
            layer.push(
                StrokePrimitive::new(path, transform, series.color, width, LineCap::Butt),
                blend,
            );
        }
        frame.push_layer(layer);
    }
}

impl Graph for ErrorsGraph {
    fn set_params(&mut self, params: GraphParams) {
        self.core.set_params(params);
        self.refresh_axes();
    }

    fn params(&self) -> &GraphParams {
        self.core.params()
    }

    fn layout_generation(&self) -> u64 {
        self.core.layout_generation()
    }

    fn build_frame(&mut self, measure: &dyn TextMeasure) -> RenderFrame {
        let Some(mut frame) = self.core.begin_frame(measure) else {
            return self.core.empty_frame();
        };
        if let Some(data) = self.data.as_deref() {
            self.paint_data(&mut frame, data);
        }
        self.core.finish_frame(&mut frame);
        frame
    }
}
