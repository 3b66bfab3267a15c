use std::sync::Arc;

use crate::api::bands::BandOverlay;
use crate::api::bin_axes::{Y_LABEL_DIGITS, dimensions, frequency_axis};
use crate::api::graph_core::{Graph, GraphCore, ShapeKey};
use crate::api::legend::Legend;
use crate::api::params::GraphParams;
use crate::core::path_builders::{FillScale, build_fill_path};
use crate::core::{AxisPlan, AxisRange, BinDataset, FloatAxisRule, LabelFormat, Path, Transform};
use crate::render::{FillPrimitive, RenderFrame, TextMeasure};

pub const QLN_AXIS: FloatAxisRule = FloatAxisRule {
    fixed: AxisRange::new(-160.0, -69.0),
    valid_min: -150.0,
    valid_max: -23.0,
    min_range: 20.0,
    ignore_zero: false,
};
const QLN_Y_STEPS: [i64; 5] = [1, 2, 5, 10, 20];

#[must_use]
pub fn qln_legend() -> Legend {
    Legend::new("Quiet line noise (dBm/Hz)")
}

fn qln_y_axis(data: Option<&BinDataset>, dynamic: bool) -> AxisPlan {
    let range = match data {
        Some(data) => QLN_AXIS.resolve(dynamic, &[&data.qln.downstream.data, &data.qln.upstream.data]),
        None => QLN_AXIS.fixed,
    };
    AxisPlan::new(range, &QLN_Y_STEPS, Y_LABEL_DIGITS, LabelFormat::Integer)
}

/// Quiet line noise per carrier.
#[derive(Debug, Clone)]
pub struct QlnGraph {
    core: GraphCore,
    data: Option<Arc<BinDataset>>,
}

impl QlnGraph {
    #[must_use]
    pub fn new(params: GraphParams, data: Option<Arc<BinDataset>>) -> Self {
        let (bins, spacing) = dimensions(data.as_deref());
        let mut graph = Self {
            core: GraphCore::new(
                params,
                frequency_axis(bins, spacing),
                qln_y_axis(data.as_deref(), params.prefer_dynamic_axis_limits),
                qln_legend(),
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
        self.core.set_y_axis(qln_y_axis(self.data.as_deref(), dynamic));
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
        let scale = FillScale {
            scale_y: plot.height / range.span(),
            offset_y: range.bottom,
            max_y: range.top,
            valid_min: QLN_AXIS.valid_min,
            valid_max: QLN_AXIS.valid_max,
        };

        BandOverlay::build(&data.bands, data.bin_count, layout).paint(frame, layout, true);

        let mut path = Path::with_precision(1);
        build_fill_path(&mut path, &data.qln.downstream, scale);
        build_fill_path(&mut path, &data.qln.upstream, scale);
        frame.push_fill(FillPrimitive::new(
            path,
            Transform::identity()
                .translate(plot.x, plot.bottom())
                .scale(layout.scale_x(data.bin_count), -1.0),
            layout.palette.neutral_fill,
        ));
    }
}

impl Graph for QlnGraph {
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
