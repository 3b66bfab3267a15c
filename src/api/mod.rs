//! Chart controllers and the layout pieces they share.

mod bands;
mod bin_axes;
mod bits_graph;
mod errors_graph;
mod graph_core;
mod hlog_graph;
mod label_format;
mod layout;
mod legend;
mod palette;
mod params;
mod qln_graph;
mod snr_graph;

pub use bands::BandOverlay;
pub use bin_axes::{bins_axis, frequency_axis};
pub use bits_graph::{BITS_FIXED_TOP, BITS_MIN_RANGE, BitsGraph, bits_legend};
pub use errors_graph::{ErrorsGraph, ErrorsSeries, ErrorsVariant};
pub use graph_core::{Graph, GraphCore, ShapeKey};
pub use hlog_graph::{HLOG_AXIS, HlogGraph, hlog_legend};
pub use label_format::format_label;
pub use layout::{BASE_FONT_SIZE, DIGIT_WIDTH, LayoutPlan};
pub use legend::{Legend, LegendItem};
pub use palette::{COLOR_BLUE, COLOR_GREEN, COLOR_RED, Palette};
pub use params::{
    DEFAULT_HEIGHT, DEFAULT_HEIGHT_WITH_LEGEND, DEFAULT_SCALE_FACTOR, DEFAULT_WIDTH, GraphParams,
};
pub use qln_graph::{QLN_AXIS, QlnGraph, qln_legend};
pub use snr_graph::{SNR_AXIS, SnrGraph, snr_legend};
