use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::api::layout::LayoutPlan;
use crate::api::legend::Legend;
use crate::api::params::GraphParams;
use crate::core::AxisPlan;
use crate::error::GraphResult;
use crate::render::{RenderFrame, Renderer, TextMeasure};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Inputs that decide the X axis of a chart: domain size, carrier spacing
/// (or period length) and the dynamic-limits flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeKey {
    pub domain: usize,
    pub unit: OrderedFloat<f64>,
    pub dynamic: bool,
}

impl ShapeKey {
    #[must_use]
    pub fn new(domain: usize, unit: f64, dynamic: bool) -> Self {
        Self {
            domain,
            unit: OrderedFloat(unit),
            dynamic,
        }
    }
}

/// State shared by every chart controller.
///
/// The layout is cached and only recomputed after parameters, axis plans or
/// the legend changed (the controller is then *stale*). Geometry of the data
/// is rebuilt on every frame.
#[derive(Debug, Clone)]
pub struct GraphCore {
    params: GraphParams,
    shape: Option<ShapeKey>,
    x_axis: AxisPlan,
    y_axis: AxisPlan,
    legend: Legend,
    layout: Option<LayoutPlan>,
    layout_generation: u64,
}

impl GraphCore {
    #[must_use]
    pub fn new(params: GraphParams, x_axis: AxisPlan, y_axis: AxisPlan, legend: Legend) -> Self {
        Self {
            params: params.normalize(),
            shape: None,
            x_axis,
            y_axis,
            legend,
            layout: None,
            layout_generation: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    #[must_use]
    pub fn x_axis(&self) -> &AxisPlan {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &AxisPlan {
        &self.y_axis
    }

    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// `true` until the next frame recomputes the layout.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.layout.is_none()
    }

    /// Number of layout recomputations so far.
    #[must_use]
    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    pub fn set_params(&mut self, params: GraphParams) {
        let params = params.normalize();
        if params != self.params {
            self.params = params;
            self.invalidate("params changed");
        }
    }

    /// Stores `shape` and reports whether it differs from the previous one.
    pub fn update_shape(&mut self, shape: ShapeKey) -> bool {
        if self.shape == Some(shape) {
            return false;
        }
        self.shape = Some(shape);
        true
    }

    pub fn set_x_axis(&mut self, axis: AxisPlan) {
        if axis != self.x_axis {
            debug!(bottom = axis.range.bottom, top = axis.range.top, "x axis plan changed");
            self.x_axis = axis;
            self.invalidate("x axis changed");
        }
    }

    pub fn set_y_axis(&mut self, axis: AxisPlan) {
        if axis != self.y_axis {
            debug!(bottom = axis.range.bottom, top = axis.range.top, "y axis plan changed");
            self.y_axis = axis;
            self.invalidate("y axis changed");
        }
    }

    pub fn set_legend(&mut self, legend: Legend) {
        if legend != self.legend {
            self.legend = legend;
            if self.params.legend {
                self.invalidate("legend changed");
            }
        }
    }

    fn invalidate(&mut self, reason: &'static str) {
        if self.layout.take().is_some() {
            trace!(reason, "layout invalidated");
        }
    }

    /// Recomputes the layout when stale. Returns `false` for a surface
    /// without pixels.
    pub fn ensure_layout(&mut self, measure: &dyn TextMeasure) -> bool {
        let viewport = self.params.viewport();
        if !viewport.is_valid() {
            debug!(
                width = viewport.width,
                height = viewport.height,
                "skipping layout for empty surface"
            );
            return false;
        }

        if self.layout.is_none() {
            let legend = self.params.legend.then_some(&self.legend);
            self.layout = Some(LayoutPlan::compute(
                &self.params,
                &self.x_axis,
                &self.y_axis,
                legend,
                measure,
            ));
            self.layout_generation += 1;
            debug!(generation = self.layout_generation, "layout recomputed");
        }
        true
    }

    /// Cached layout, if computed and still valid.
    #[must_use]
    pub fn layout(&self) -> Option<&LayoutPlan> {
        self.layout.as_ref()
    }

    /// Brings the layout up to date and starts a frame with the background
    /// painted. `None` for a surface without pixels.
    pub fn begin_frame(&mut self, measure: &dyn TextMeasure) -> Option<RenderFrame> {
        if !self.ensure_layout(measure) {
            return None;
        }
        let layout = self.layout.as_ref()?;
        let mut frame = RenderFrame::new(layout.viewport);
        layout.paint_background(&mut frame);
        Some(frame)
    }

    /// Paints axes, labels and legend on top of the data.
    pub fn finish_frame(&self, frame: &mut RenderFrame) {
        if let Some(layout) = &self.layout {
            layout.paint_axes(frame);
        }
        trace!(commands = frame.commands.len(), "frame built");
    }

    #[must_use]
    pub fn empty_frame(&self) -> RenderFrame {
        RenderFrame::new(self.params.viewport())
    }
}

/// Common surface of the chart controllers.
pub trait Graph {
    fn set_params(&mut self, params: GraphParams);

    fn params(&self) -> &GraphParams;

    /// Number of layout recomputations so far.
    fn layout_generation(&self) -> u64;

    /// Builds the complete frame for the current parameters and data.
    ///
    /// A surface without pixels yields an empty frame.
    fn build_frame(&mut self, measure: &dyn TextMeasure) -> RenderFrame;

    /// Builds a frame with the renderer's text metrics and hands it over.
    fn render<R>(&mut self, renderer: &mut R) -> GraphResult<()>
    where
        Self: Sized,
        R: Renderer + TextMeasure,
    {
        let frame = self.build_frame(&*renderer);
        if frame.is_empty() {
            return Ok(());
        }
        trace!(commands = frame.commands.len(), "render frame");
        renderer.render(&frame)
    }

    /// Renders into an external cairo context, e.g. a widget draw callback.
    #[cfg(feature = "cairo-backend")]
    fn render_on_cairo_context<R>(
        &mut self,
        renderer: &mut R,
        context: &cairo::Context,
    ) -> GraphResult<()>
    where
        Self: Sized,
        R: CairoContextRenderer + TextMeasure,
    {
        let frame = self.build_frame(&*renderer);
        if frame.is_empty() {
            return Ok(());
        }
        renderer.render_on_cairo_context(context, &frame)
    }
}
