pub mod axis;
pub mod codec;
pub mod dataset;
pub mod path;
pub mod path_builders;
pub mod types;

pub use axis::{AxisPlan, AxisRange, FloatAxisRule, LabelFormat, determine_step, first_tick};
pub use codec::{decode_counter_series, decode_series};
pub use dataset::{
    BinDataset, BinSeries, Direction, ErrorCounter, ErrorsHistoryDataset, FrequencyBand,
    HistoryDataset, MinMaxSeries,
};
pub use path::{Path, PathCommand, Transform};
pub use types::{PlotRect, Viewport};
