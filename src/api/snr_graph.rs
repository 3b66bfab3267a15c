use std::sync::Arc;

use crate::api::bands::BandOverlay;
use crate::api::bin_axes::{Y_LABEL_DIGITS, dimensions, frequency_axis};
use crate::api::graph_core::{Graph, GraphCore, ShapeKey};
use crate::api::legend::Legend;
use crate::api::palette::{COLOR_BLUE, COLOR_GREEN};
use crate::api::params::GraphParams;
use crate::core::path_builders::{
    FillScale, SNR_VALID_MAX, SNR_VALID_MIN, StrokeScale, build_fill_path, build_min_max_paths,
};
use crate::core::{
    AxisPlan, AxisRange, BinDataset, FloatAxisRule, HistoryDataset, LabelFormat, Path, Transform,
};
use crate::render::{
    BlendMode, FillPrimitive, LineCap, RenderFrame, ScratchLayer, StrokePrimitive, TextMeasure,
};

pub const SNR_AXIS: FloatAxisRule = FloatAxisRule {
    fixed: AxisRange::new(0.0, 65.0),
    valid_min: SNR_VALID_MIN,
    valid_max: SNR_VALID_MAX,
    min_range: 20.0,
    ignore_zero: true,
};
const SNR_Y_STEPS: [i64; 4] = [1, 2, 5, 10];
const SNR_TITLE: &str = "Signal-to-noise ratio (dB)";

/// Legend of the SNR chart; min/max entries only when a history is drawn.
#[must_use]
pub fn snr_legend(with_history: bool) -> Legend {
    let legend = Legend::new(SNR_TITLE);
    if with_history {
        legend
            .with_item(COLOR_BLUE, "Minimum")
            .with_item(COLOR_GREEN, "Maximum")
    } else {
        legend
    }
}

fn snr_y_axis(
    data: Option<&BinDataset>,
    history: Option<&HistoryDataset>,
    dynamic: bool,
) -> AxisPlan {
    let mut series: Vec<&[Option<f64>]> = Vec::with_capacity(6);
    if let Some(data) = data {
        series.push(&data.snr.downstream.data);
        series.push(&data.snr.upstream.data);
    }
    if let Some(history) = history {
        for minmax in [&history.snr.downstream, &history.snr.upstream] {
            series.push(&minmax.min);
            series.push(&minmax.max);
        }
    }
    let range = SNR_AXIS.resolve(dynamic, &series);
    AxisPlan::new(range, &SNR_Y_STEPS, Y_LABEL_DIGITS, LabelFormat::Integer)
}

/// Signal-to-noise ratio per carrier, optionally with the min/max history.
#[derive(Debug, Clone)]
pub struct SnrGraph {
    core: GraphCore,
    data: Option<Arc<BinDataset>>,
    history: Option<Arc<HistoryDataset>>,
}

impl SnrGraph {
    #[must_use]
    pub fn new(
        params: GraphParams,
        data: Option<Arc<BinDataset>>,
        history: Option<Arc<HistoryDataset>>,
    ) -> Self {
        let (bins, spacing) = dimensions(data.as_deref());
        let with_history = has_history(history.as_deref());
        let mut graph = Self {
            core: GraphCore::new(
                params,
                frequency_axis(bins, spacing),
                snr_y_axis(
                    data.as_deref(),
                    history.as_deref(),
                    params.prefer_dynamic_axis_limits,
                ),
                snr_legend(with_history),
            ),
            data,
            history,
        };
        graph.refresh_axes();
        graph
    }

    pub fn set_data(&mut self, data: Option<Arc<BinDataset>>, history: Option<Arc<HistoryDataset>>) {
        self.data = data;
        self.history = history;
        self.core.set_legend(snr_legend(has_history(self.history.as_deref())));
        self.refresh_axes();
    }

    #[must_use]
    pub fn data(&self) -> Option<&BinDataset> {
        self.data.as_deref()
    }

    #[must_use]
    pub fn history(&self) -> Option<&HistoryDataset> {
        self.history.as_deref()
    }

    #[must_use]
    pub fn core(&self) -> &GraphCore {
        &self.core
    }

    fn refresh_axes(&mut self) {
        let dynamic = self.core.params().prefer_dynamic_axis_limits;
        let (bins, spacing) = dimensions(self.data.as_deref());
        if self.core.update_shape(ShapeKey::new(bins, spacing, dynamic)) {
            self.core.set_x_axis(frequency_axis(bins, spacing));
        }
        let y_axis = snr_y_axis(self.data.as_deref(), self.history.as_deref(), dynamic);
        self.core.set_y_axis(y_axis);
    }

    fn paint_data(&self, frame: &mut RenderFrame, data: &BinDataset) {
        let Some(layout) = self.core.layout() else {
            return;
        };
        let plot = layout.plot;
        if plot.is_degenerate() {
            return;
        }

        let range = self.core.y_axis().range;
        let scale_x = layout.scale_x(data.bin_count);
        let scale_y = plot.height / range.span();
        let palette = &layout.palette;

        BandOverlay::build(&data.bands, data.bin_count, layout).paint(frame, layout, true);

        let fill_scale = FillScale {
            scale_y,
            offset_y: range.bottom,
            max_y: range.top,
            valid_min: SNR_VALID_MIN,
            valid_max: SNR_VALID_MAX,
        };
        let mut path = Path::with_precision(1);
        build_fill_path(&mut path, &data.snr.downstream, fill_scale);
        build_fill_path(&mut path, &data.snr.upstream, fill_scale);
        frame.push_fill(FillPrimitive::new(
            path,
            Transform::identity()
                .translate(plot.x, plot.bottom())
                .scale(scale_x, -1.0),
            palette.neutral_fill,
        ));

        let Some(history) = self.history.as_deref().filter(|history| !history.is_empty()) else {
            return;
        };

        let stroke_scale = StrokeScale {
            scale_y,
            offset_y: range.bottom,
            max_y: range.top,
            post_scale_y: 1.0 / scale_x,
        };
        let mut path_min = Path::with_precision(1);
        let mut path_max = Path::with_precision(1);
        for series in [&history.snr.downstream, &history.snr.upstream] {
            build_min_max_paths(&mut path_min, &mut path_max, series, stroke_scale);
        }

        // Uniform scale keeps the line width undistorted.
        let transform = Transform::identity()
            .translate(0.0, plot.height)
            .scale(scale_x, -scale_x);
        let width = layout.scale_factor / scale_x;
        let mut layer = ScratchLayer::new(plot.x, plot.y, plot.width, plot.height);
        layer.push(
            StrokePrimitive::new(path_min, transform, palette.min_stroke, width, LineCap::Butt),
            BlendMode::SourceOver,
        );
        layer.push(
            StrokePrimitive::new(path_max, transform, palette.max_stroke, width, LineCap::Butt),
            BlendMode::Multiply,
        );
        frame.push_layer(layer);
    }
}

fn has_history(history: Option<&HistoryDataset>) -> bool {
    history.is_some_and(|history| !history.is_empty())
}

impl Graph for SnrGraph {
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::SnrGraph;
    use crate::api::graph_core::Graph;
    use crate::api::params::GraphParams;
    use crate::core::{BinDataset, BinSeries, HistoryDataset, MinMaxSeries};
    use crate::render::{ApproxTextMeasure, BlendMode};

    fn dataset() -> Arc<BinDataset> {
        let mut data = BinDataset {
            bin_count: 64,
            ..BinDataset::default()
        };
        data.snr.downstream = BinSeries::new(1, vec![Some(40.0); 64]);
        Arc::new(data)
    }

    fn history() -> Arc<HistoryDataset> {
        let mut history = HistoryDataset::default();
        history.snr.downstream = MinMaxSeries {
            group_size: 1,
            min: vec![Some(35.0); 64],
            max: vec![Some(45.0); 64],
        };
        Arc::new(history)
    }

    #[test]
    fn history_is_blended_in_a_scratch_layer() {
        let mut graph = SnrGraph::new(GraphParams::default(), Some(dataset()), Some(history()));
        let frame = graph.build_frame(&ApproxTextMeasure);

        let layers: Vec<_> = frame.layers().collect();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].strokes[0].blend, BlendMode::SourceOver);
        assert_eq!(layers[0].strokes[1].blend, BlendMode::Multiply);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn legend_lists_min_max_only_with_history() {
        let mut graph = SnrGraph::new(GraphParams::default(), Some(dataset()), None);
        assert!(graph.core().legend().items.is_empty());

        graph.set_data(Some(dataset()), Some(history()));
        assert_eq!(graph.core().legend().items.len(), 2);
    }

    #[test]
    fn dynamic_range_includes_history() {
        let params = GraphParams::default().with_dynamic_axis_limits(true);
        let graph = SnrGraph::new(params, Some(dataset()), Some(history()));
        let range = graph.core().y_axis().range;
        assert!(range.bottom <= 35.0);
        assert!(range.top >= 45.0);
    }
}
