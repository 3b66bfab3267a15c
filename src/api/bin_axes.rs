//! X axes shared by the per-carrier charts.

use crate::core::{
    AxisPlan, AxisRange, BinDataset, LabelFormat,
    dataset::{DEFAULT_BIN_COUNT, DEFAULT_CARRIER_SPACING_KHZ},
};

pub const BIN_STEPS: [i64; 9] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048];
pub const FREQUENCY_STEPS: [i64; 9] = [50, 100, 200, 500, 1000, 1250, 2500, 5000, 10000];
pub const X_LABEL_DIGITS: f64 = 4.0;
pub const Y_LABEL_DIGITS: f64 = 3.75;

/// Bin count and carrier spacing, or the VDSL2 17a defaults without data.
#[must_use]
pub fn dimensions(data: Option<&BinDataset>) -> (usize, f64) {
    data.map_or((DEFAULT_BIN_COUNT, DEFAULT_CARRIER_SPACING_KHZ), |data| {
        (data.bin_count, data.carrier_spacing)
    })
}

/// Carrier index axis.
#[must_use]
pub fn bins_axis(bin_count: usize) -> AxisPlan {
    AxisPlan::new(
        AxisRange::new(0.0, bin_count as f64),
        &BIN_STEPS,
        X_LABEL_DIGITS,
        LabelFormat::Integer,
    )
}

/// Carrier frequency axis in kHz, labelled in MHz.
#[must_use]
pub fn frequency_axis(bin_count: usize, carrier_spacing: f64) -> AxisPlan {
    AxisPlan::new(
        AxisRange::new(0.0, bin_count as f64 * carrier_spacing),
        &FREQUENCY_STEPS,
        X_LABEL_DIGITS,
        LabelFormat::Frequency,
    )
}
