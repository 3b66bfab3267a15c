use std::sync::Arc;

use crate::api::bands::BandOverlay;
use crate::api::bin_axes::{Y_LABEL_DIGITS, dimensions, frequency_axis};
use crate::api::graph_core::{Graph, GraphCore, ShapeKey};
use crate::api::legend::Legend;
use crate::api::params::GraphParams;
use crate::core::path_builders::{HLOG_VALID_MAX, HLOG_VALID_MIN, StrokeScale, build_hlog_path};
use crate::core::{AxisPlan, AxisRange, BinDataset, FloatAxisRule, LabelFormat, Path, Transform};
use crate::render::{LineCap, RenderFrame, StrokePrimitive, TextMeasure};

pub const HLOG_AXIS: FloatAxisRule = FloatAxisRule {
    fixed: AxisRange::new(-100.0, 7.0),
    valid_min: HLOG_VALID_MIN,
    valid_max: HLOG_VALID_MAX,
    min_range: 20.0,
    ignore_zero: false,
};
const HLOG_Y_STEPS: [i64; 5] = [1, 2, 5, 10, 20];

#[must_use]
pub fn hlog_legend() -> Legend {
    Legend::new("Channel characteristic (dB)")
}

fn hlog_y_axis(data: Option<&BinDataset>, dynamic: bool) -> AxisPlan {
    let range = match data {
        Some(data) => {
            HLOG_AXIS.resolve(dynamic, &[&data.hlog.downstream.data, &data.hlog.upstream.data])
        }
        None => HLOG_AXIS.fixed,
    };
    AxisPlan::new(range, &HLOG_Y_STEPS, Y_LABEL_DIGITS, LabelFormat::Integer)
}

/// Channel characteristic per carrier, stroked and broken at steep jumps.
#[derive(Debug, Clone)]
pub struct HlogGraph {
    core: GraphCore,
    data: Option<Arc<BinDataset>>,
}

impl HlogGraph {
    #[must_use]
    pub fn new(params: GraphParams, data: Option<Arc<BinDataset>>) -> Self {
        let (bins, spacing) = dimensions(data.as_deref());
        let mut graph = Self {
            core: GraphCore::new(
                params,
                frequency_axis(bins, spacing),
                hlog_y_axis(data.as_deref(), params.prefer_dynamic_axis_limits),
                hlog_legend(),
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
            self.core.set_x_axis(frequency_axis(bins, spacing));
        }
        self.core.set_y_axis(hlog_y_axis(self.data.as_deref(), dynamic));
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
        let scale = StrokeScale {
            scale_y: plot.height / range.span(),
            offset_y: range.bottom,
            max_y: range.top,
            post_scale_y: 1.0 / scale_x,
        };

        BandOverlay::build(&data.bands, data.bin_count, layout).paint(frame, layout, true);

        let mut path = Path::with_precision(1);
        build_hlog_path(&mut path, &data.hlog.downstream, scale);
        build_hlog_path(&mut path, &data.hlog.upstream, scale);
        frame.push_stroke(StrokePrimitive::new(
            path,
            Transform::identity()
                .translate(plot.x, plot.bottom())
                .scale(scale_x, -scale_x),
            layout.palette.neutral_stroke,
            layout.scale_factor / scale_x,
            LineCap::Butt,
        ));
    }
}

impl Graph for HlogGraph {
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

    use super::HlogGraph;
    use crate::api::graph_core::Graph;
    use crate::api::params::GraphParams;
    use crate::core::{BinDataset, BinSeries};
    use crate::render::ApproxTextMeasure;

    #[test]
    fn jump_splits_the_trace() {
        let mut values = vec![Some(-20.0); 32];
        values.extend(vec![Some(-50.0); 32]);
        let mut data = BinDataset {
            bin_count: 64,
            ..BinDataset::default()
        };
        data.hlog.downstream = BinSeries::new(1, values);

        let mut graph = HlogGraph::new(GraphParams::default(), Some(Arc::new(data)));
        let frame = graph.build_frame(&ApproxTextMeasure);

        let trace_color = graph.core().layout().expect("layout").palette.neutral_stroke;
        let traces: Vec<_> = frame
            .strokes()
            .filter(|stroke| stroke.color == trace_color)
            .collect();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].path.subpath_count(), 2);
    }
}
