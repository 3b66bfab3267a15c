//! dsl-graphs: charts for xDSL line telemetry.
//!
//! Per-carrier snapshots (bit loading, SNR, QLN, Hlog) and error counter
//! histories are decoded from their compact text encoding, laid out into a
//! backend-agnostic [`render::RenderFrame`] and painted by a
//! [`render::Renderer`] such as the SVG writer or the optional cairo backend.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{
    BitsGraph, ErrorsGraph, ErrorsVariant, Graph, GraphParams, HlogGraph, QlnGraph, SnrGraph,
};
pub use error::{GraphError, GraphResult};
