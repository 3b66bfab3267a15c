use std::sync::Arc;

use crate::api::bands::BandOverlay;
use crate::api::bin_axes::{Y_LABEL_DIGITS, bins_axis, dimensions};
use crate::api::graph_core::{Graph, GraphCore, ShapeKey};
use crate::api::legend::Legend;
use crate::api::palette::{COLOR_BLUE, COLOR_GREEN, COLOR_RED};
use crate::api::params::GraphParams;
use crate::core::axis::bits_axis_range;
use crate::core::path_builders::{build_bits_path, build_pilot_tones_path};
use crate::core::{AxisPlan, BinDataset, LabelFormat, Path, Transform};
use crate::render::{FillPrimitive, LineCap, RenderFrame, StrokePrimitive, TextMeasure};

pub const BITS_FIXED_TOP: f64 = 15.166_666_667;
pub const BITS_MIN_RANGE: f64 = 4.0;
const BITS_Y_STEPS: [i64; 2] = [1, 2];

#[must_use]
pub fn bits_legend() -> Legend {
    Legend::new("Bitloading (bits per carrier)")
        .with_item(COLOR_BLUE, "Downstream")
        .with_item(COLOR_GREEN, "Upstream")
        .with_item(COLOR_RED, "Pilot tones")
}

fn bits_y_axis(data: Option<&BinDataset>, dynamic: bool) -> AxisPlan {
    let range = match data {
        Some(data) => bits_axis_range(
            BITS_FIXED_TOP,
            BITS_MIN_RANGE,
            dynamic,
            &[&data.bits.downstream.data, &data.bits.upstream.data],
        ),
        None => bits_axis_range(BITS_FIXED_TOP, BITS_MIN_RANGE, false, &[]),
    };
    AxisPlan::new(range, &BITS_Y_STEPS, Y_LABEL_DIGITS, LabelFormat::Integer)
}

/// Bit loading per carrier with pilot tones and neutral band shading.
#[derive(Debug, Clone)]
pub struct BitsGraph {
    core: GraphCore,
    data: Option<Arc<BinDataset>>,
}

impl BitsGraph {
    #[must_use]
    pub fn new(params: GraphParams, data: Option<Arc<BinDataset>>) -> Self {
        let dynamic = params.prefer_dynamic_axis_limits;
        let (bins, _) = dimensions(data.as_deref());
        let mut graph = Self {
            core: GraphCore::new(
                params,
                bins_axis(bins),
                bits_y_axis(data.as_deref(), dynamic),
                bits_legend(),
            ),
            data,
        };
        graph.refresh_axes();
        graph
    }

    pub fn set_data(&mut self, data: Option<Arc<BinDataset>>) {
        self.data = data;
        self.refresh_axes();
    }

    #[must_use]
    pub fn data(&self) -> Option<&BinDataset> {
        self.data.as_deref()
    }

    #[must_use]
    pub fn core(&self) -> &GraphCore {
        &self.core
    }

    fn refresh_axes(&mut self) {
        let dynamic = self.core.params().prefer_dynamic_axis_limits;
        let (bins, spacing) = dimensions(self.data.as_deref());
        if self.core.update_shape(ShapeKey::new(bins, spacing, dynamic)) {
            self.core.set_x_axis(bins_axis(bins));
        }
        self.core.set_y_axis(bits_y_axis(self.data.as_deref(), dynamic));
    }

    fn paint_data(&self, frame: &mut RenderFrame, data: &BinDataset) {
        let Some(layout) = self.core.layout() else {
            return;
        };
        let plot = layout.plot;
        if plot.is_degenerate() {
            return;
        }

        let scale_x = layout.scale_x(data.bin_count);
        let scale_y = plot.height / self.core.y_axis().range.top;

        BandOverlay::build(&data.bands, data.bin_count, layout).paint(frame, layout, false);

        let mut pilot_tones = Path::new();
        let mut downstream = Path::new();
        let mut upstream = Path::new();
        build_pilot_tones_path(&mut pilot_tones, &data.pilot_tones, plot.height);
        build_bits_path(&mut downstream, &data.bits.downstream, scale_y);
        build_bits_path(&mut upstream, &data.bits.upstream, scale_y);

        let pilot_width = if scale_x < 1.5 { 1.5 / scale_x } else { 1.0 };
        let transform = Transform::identity()
            .translate(plot.x, plot.bottom())
            .scale(scale_x, -1.0);
        let palette = &layout.palette;

        frame.push_stroke(StrokePrimitive::new(
            pilot_tones,
            transform,
            palette.pilot_tones,
            pilot_width * layout.scale_factor,
            LineCap::Butt,
        ));
        frame.push_fill(FillPrimitive::new(upstream, transform, palette.upstream));
        frame.push_fill(FillPrimitive::new(downstream, transform, palette.downstream));
    }
}

impl Graph for BitsGraph {
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

    use super::{BITS_FIXED_TOP, BitsGraph};
    use crate::api::graph_core::Graph;
    use crate::api::params::GraphParams;
    use crate::core::{BinDataset, BinSeries};
    use crate::render::ApproxTextMeasure;

    fn dataset(values: Vec<Option<f64>>) -> Arc<BinDataset> {
        let mut data = BinDataset {
            bin_count: values.len(),
            ..BinDataset::default()
        };
        data.bits.downstream = BinSeries::new(1, values);
        Arc::new(data)
    }

    #[test]
    fn fixed_axis_ignores_data() {
        let graph = BitsGraph::new(GraphParams::default(), Some(dataset(vec![Some(3.0); 16])));
        assert_eq!(graph.core().y_axis().range.top, BITS_FIXED_TOP);
    }

    #[test]
    fn dynamic_axis_lowers_top_to_data() {
        let params = GraphParams::default().with_dynamic_axis_limits(true);
        let graph = BitsGraph::new(params, Some(dataset(vec![Some(6.0); 16])));
        assert_eq!(graph.core().y_axis().range.top, 6.75);
        assert_eq!(graph.core().y_axis().label_end, 6);
    }

    #[test]
    fn absent_data_draws_axes_only() {
        let mut graph = BitsGraph::new(GraphParams::default(), None);
        let frame = graph.build_frame(&ApproxTextMeasure);
        assert!(frame.fills().next().is_none());
        assert!(frame.texts().count() > 0);
    }

    #[test]
    fn data_adds_fills_between_background_and_axes() {
        let mut graph = BitsGraph::new(GraphParams::default(), Some(dataset(vec![Some(5.0); 64])));
        let frame = graph.build_frame(&ApproxTextMeasure);
        assert_eq!(frame.fills().count(), 1);
        assert!(frame.validate().is_ok());
    }
}
