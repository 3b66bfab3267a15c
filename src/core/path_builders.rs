//! Turn decoded series into path geometry.
//!
//! X coordinates are in carrier (or period) units and Y coordinates are in
//! pixels measured up from the baseline. Callers map both to device space
//! with a [`Transform`](crate::core::path::Transform). Stroked builders take a
//! `post_scale_y` so that a uniform transform can be used and line widths are
//! not distorted.

use crate::core::dataset::{BinSeries, MinMaxSeries};
use crate::core::path::Path;

/// Vertical mapping for filled series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillScale {
    pub scale_y: f64,
    pub offset_y: f64,
    pub max_y: f64,
    pub valid_min: f64,
    pub valid_max: f64,
}

/// Vertical mapping for stroked series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeScale {
    pub scale_y: f64,
    pub offset_y: f64,
    pub max_y: f64,
    pub post_scale_y: f64,
}

/// Validity window of SNR samples.
pub const SNR_VALID_MIN: f64 = -32.0;
pub const SNR_VALID_MAX: f64 = 95.0;

/// Validity window of Hlog samples.
pub const HLOG_VALID_MIN: f64 = -96.2;
pub const HLOG_VALID_MAX: f64 = 6.0;
const HLOG_RESET_JUMP: f64 = 10.0;
const HLOG_INITIAL_LAST: f64 = -96.3;

fn group_width(group_size: usize) -> f64 {
    group_size.max(1) as f64
}

/// Vertical marker per pilot tone at the carrier centre.
pub fn build_pilot_tones_path(path: &mut Path, tones: &[usize], height: f64) {
    for &tone in tones {
        let pos = tone as f64 + 0.5;
        path.move_to(pos, 0.0);
        path.line_to(pos, height);
    }
}

/// Step polygons for bit loading, one per run of positive samples.
pub fn build_bits_path(path: &mut Path, series: &BinSeries, scale_y: f64) {
    let width = group_width(series.group_size);

    let mut last_valid = false;
    let mut last: Option<f64> = Some(0.0);
    let mut last_pos_y = 0.0;

    for (index, &sample) in series.data.iter().enumerate() {
        let value = sample.filter(|bits| *bits > 0.0);
        let valid = value.is_some();
        let changed = last != sample;
        let pos_x = index as f64 * width;

        if last_valid && !valid {
            path.line_to(pos_x, last_pos_y);
            path.line_to(pos_x, 0.0);
            path.close();
        }
        if !last_valid && valid {
            path.move_to(pos_x, 0.0);
        }
        if let Some(bits) = value {
            if changed {
                let pos_y = (bits * scale_y).round();
                if last_valid {
                    path.line_to(pos_x, last_pos_y);
                }
                path.line_to(pos_x, pos_y);
                last_pos_y = pos_y;
            }
        }

        last_valid = valid;
        last = sample;
    }

    if last_valid {
        let end_x = series.data.len() as f64 * width;
        path.line_to(end_x, last_pos_y);
        path.line_to(end_x, 0.0);
        path.close();
    }
}

/// Filled polygons for SNR and QLN, with sloped edges between neighbouring
/// carrier groups and values capped at the axis top.
pub fn build_fill_path(path: &mut Path, series: &BinSeries, scale: FillScale) {
    let width = group_width(series.group_size);

    let mut last_valid = false;
    let mut last_drawn = false;
    let mut last: Option<f64> = Some(scale.offset_y);
    let mut last_pos_y = 0.0;

    for (index, &sample) in series.data.iter().enumerate() {
        let value = sample.filter(|value| {
            *value > scale.offset_y && (scale.valid_min..=scale.valid_max).contains(value)
        });
        let valid = value.is_some();
        let changed = last != sample;
        let mut drawn = false;

        let pos_x = (index as f64 + 0.5) * width;
        let edge_x = pos_x - 0.5 * width;

        if last_valid && !valid {
            path.line_to(edge_x, last_pos_y);
            path.line_to(edge_x, 0.0);
            path.close();
        }
        if let Some(value) = value {
            let pos_y = (scale.max_y.min(value) - scale.offset_y) * scale.scale_y;
            if !last_valid {
                path.move_to(edge_x, 0.0);
                path.line_to(edge_x, pos_y);
            }
            if changed {
                if last_valid {
                    if !last_drawn {
                        path.line_to(pos_x - width, last_pos_y);
                    }
                    path.line_to(pos_x, pos_y);
                    drawn = true;
                }
                last_pos_y = pos_y;
            }
        }

        last_drawn = drawn;
        last_valid = valid;
        last = sample;
    }

    if last_valid {
        let end_x = series.data.len() as f64 * width;
        path.line_to(end_x, last_pos_y);
        path.line_to(end_x, 0.0);
        path.close();
    }
}

/// Pen state of one stroked trace.
#[derive(Debug, Clone, Copy)]
struct StrokeState {
    width: f64,
    post_scale_y: f64,
    last_valid: bool,
    last_drawn: bool,
    last: Option<f64>,
    last_pos_y: f64,
}

impl StrokeState {
    fn new(width: f64, post_scale_y: f64, initial: Option<f64>) -> Self {
        Self {
            width,
            post_scale_y,
            last_valid: false,
            last_drawn: false,
            last: initial,
            last_pos_y: 0.0,
        }
    }

    /// Advances by one sample. `pos_y` is only consulted for valid samples;
    /// `reset` breaks the trace before a valid sample.
    fn step(
        &mut self,
        path: &mut Path,
        index: usize,
        sample: Option<f64>,
        pos_y: Option<f64>,
        reset: bool,
    ) {
        let width = self.width;
        let post_scale_y = self.post_scale_y;
        let changed = self.last != sample;
        let mut drawn = false;

        let pos_x = (index as f64 + 0.5) * width;
        let edge_x = pos_x - 0.5 * width;
        let valid = pos_y.is_some();

        if (self.last_valid && !valid) || reset {
            path.line_to(edge_x, self.last_pos_y * post_scale_y);
        }
        if let Some(pos_y) = pos_y {
            if !self.last_valid || reset {
                path.move_to(edge_x, pos_y * post_scale_y);
                self.last_pos_y = pos_y;
            }
            if changed {
                if self.last_valid && !reset {
                    if !self.last_drawn {
                        path.line_to(pos_x - width, self.last_pos_y * post_scale_y);
                    }
                    path.line_to(pos_x, pos_y * post_scale_y);
                    drawn = true;
                }
                self.last_pos_y = pos_y;
            }
        }

        self.last_drawn = drawn;
        self.last_valid = valid;
        self.last = sample;
    }

    fn finish(&self, path: &mut Path, samples: usize) {
        if self.last_valid {
            path.line_to(samples as f64 * self.width, self.last_pos_y * self.post_scale_y);
        }
    }
}

fn in_snr_window(sample: Option<f64>) -> bool {
    sample.is_some_and(|value| (SNR_VALID_MIN..=SNR_VALID_MAX).contains(&value))
}

/// Stroke traces of the SNR minimum and maximum history.
///
/// A carrier group is drawn on both traces when either of its samples lies
/// in the SNR validity window, so the two traces break together.
pub fn build_min_max_paths(
    min_path: &mut Path,
    max_path: &mut Path,
    series: &MinMaxSeries,
    scale: StrokeScale,
) {
    let width = group_width(series.group_size);
    let mut min_state = StrokeState::new(width, scale.post_scale_y, Some(0.0));
    let mut max_state = StrokeState::new(width, scale.post_scale_y, Some(0.0));

    let pos_y = |value: f64| {
        ((scale.max_y.min(value) - scale.offset_y) * scale.scale_y - 0.5).max(0.0)
    };

    let count = series.min.len();
    for index in 0..count {
        let min = series.min[index];
        let max = series.max.get(index).copied().flatten();
        let valid = in_snr_window(min) || in_snr_window(max);

        let min_y = min.filter(|_| valid).map(pos_y);
        let max_y = max.filter(|_| valid).map(pos_y);
        min_state.step(min_path, index, min, min_y, false);
        max_state.step(max_path, index, max, max_y, false);
    }

    min_state.finish(min_path, count);
    max_state.finish(max_path, count);
}

/// Stroke trace for Hlog that breaks on jumps of 10 dB or more.
pub fn build_hlog_path(path: &mut Path, series: &BinSeries, scale: StrokeScale) {
    let width = group_width(series.group_size);
    let mut state = StrokeState::new(width, scale.post_scale_y, Some(HLOG_INITIAL_LAST));

    for (index, &sample) in series.data.iter().enumerate() {
        let value = sample.filter(|value| (HLOG_VALID_MIN..=HLOG_VALID_MAX).contains(value));
        let reset = match (state.last_valid, state.last, value) {
            (true, Some(last), Some(value)) => (value - last).abs() >= HLOG_RESET_JUMP,
            _ => false,
        };
        let pos_y = value.map(|value| {
            (scale.max_y.min(value) - scale.offset_y).max(0.0) * scale.scale_y - 0.5
        });
        state.step(path, index, sample, pos_y, reset);
    }

    state.finish(path, series.data.len());
}

/// Stroke trace for one error counter; gaps break the trace.
pub fn build_errors_path(
    path: &mut Path,
    data: &[Option<u64>],
    scale_y: f64,
    max_y: f64,
    post_scale_y: f64,
) {
    let mut state = StrokeState::new(1.0, post_scale_y, None);

    for (index, sample) in data.iter().enumerate() {
        let sample = sample.map(|count| count as f64);
        let pos_y = sample.map(|value| max_y.min(value) * scale_y - 0.5);
        state.step(path, index, sample, pos_y, false);
    }

    state.finish(path, data.len());
}

/// Unit-height rectangles over periods in which no series has data.
///
/// Only the periods covered by every series are considered.
pub fn build_errors_state_path(path: &mut Path, series: &[&[Option<u64>]]) {
    let count = series.iter().map(|data| data.len()).min().unwrap_or(0);
    let mut last_valid = true;

    for index in 0..count {
        let valid = series.iter().any(|data| data[index].is_some());
        let pos_x = index as f64;

        if last_valid && !valid {
            path.move_to(pos_x, 0.0);
            path.line_to(pos_x, 1.0);
        } else if !last_valid && valid {
            path.line_to(pos_x, 1.0);
            path.line_to(pos_x, 0.0);
            path.close();
        }

        last_valid = valid;
    }

    if !last_valid {
        let end_x = count as f64;
        path.line_to(end_x, 1.0);
        path.line_to(end_x, 0.0);
        path.close();
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FillScale, StrokeScale, build_bits_path, build_errors_path, build_errors_state_path,
        build_fill_path, build_hlog_path, build_min_max_paths, build_pilot_tones_path,
    };
    use crate::core::dataset::{BinSeries, MinMaxSeries};
    use crate::core::path::{Path, PathCommand};

    fn count(path: &Path, matcher: fn(&PathCommand) -> bool) -> usize {
        path.commands().iter().filter(|command| matcher(command)).count()
    }

    fn moves(path: &Path) -> usize {
        count(path, |command| matches!(command, PathCommand::MoveTo { .. }))
    }

    fn closes(path: &Path) -> usize {
        count(path, |command| matches!(command, PathCommand::Close))
    }

    #[test]
    fn constant_bits_form_one_rectangle() {
        let series = BinSeries::new(1, vec![Some(0.5); 32]);
        let mut path = Path::new();
        build_bits_path(&mut path, &series, 10.0);

        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 0.0, y: 5.0 },
                PathCommand::LineTo { x: 32.0, y: 5.0 },
                PathCommand::LineTo { x: 32.0, y: 0.0 },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn bits_gaps_split_polygons() {
        let series = BinSeries::new(
            1,
            vec![Some(2.0), Some(3.0), Some(0.0), None, Some(4.0), Some(4.0)],
        );
        let mut path = Path::new();
        build_bits_path(&mut path, &series, 1.0);
        assert_eq!(moves(&path), 2);
        assert_eq!(closes(&path), 2);
    }

    #[test]
    fn fill_path_respects_validity_and_group_size() {
        let series = BinSeries::new(4, vec![Some(10.0), Some(20.0), Some(99.0), Some(30.0)]);
        let scale = FillScale {
            scale_y: 1.0,
            offset_y: 0.0,
            max_y: 65.0,
            valid_min: -32.0,
            valid_max: 95.0,
        };
        let mut path = Path::new();
        build_fill_path(&mut path, &series, scale);

        assert_eq!(moves(&path), 2);
        assert_eq!(closes(&path), 2);
        assert_eq!(path.commands()[0], PathCommand::MoveTo { x: 0.0, y: 0.0 });
        assert_eq!(
            path.commands().last(),
            Some(&PathCommand::Close),
            "fill must end closed"
        );
        assert!(path.commands().contains(&PathCommand::LineTo { x: 16.0, y: 30.0 }));
    }

    #[test]
    fn fill_values_are_capped_at_axis_top() {
        let series = BinSeries::new(1, vec![Some(80.0)]);
        let scale = FillScale {
            scale_y: 2.0,
            offset_y: 0.0,
            max_y: 65.0,
            valid_min: -32.0,
            valid_max: 95.0,
        };
        let mut path = Path::new();
        build_fill_path(&mut path, &series, scale);
        assert!(path.commands().contains(&PathCommand::LineTo { x: 0.0, y: 130.0 }));
    }

    #[test]
    fn hlog_breaks_on_large_jumps() {
        let series = BinSeries::new(1, vec![Some(-20.0), Some(-21.0), Some(-40.0), Some(-41.0)]);
        let scale = StrokeScale {
            scale_y: 1.0,
            offset_y: -100.0,
            max_y: 7.0,
            post_scale_y: 1.0,
        };
        let mut path = Path::new();
        build_hlog_path(&mut path, &series, scale);
        assert_eq!(moves(&path), 2);
        assert!(path.commands().len() > 2 * moves(&path));
    }

    #[test]
    fn hlog_does_not_reset_into_invalid_sample() {
        let series = BinSeries::new(1, vec![Some(-20.0), Some(-120.0), Some(-20.0)]);
        let scale = StrokeScale {
            scale_y: 1.0,
            offset_y: -100.0,
            max_y: 7.0,
            post_scale_y: 1.0,
        };
        let mut path = Path::new();
        build_hlog_path(&mut path, &series, scale);
        assert_eq!(moves(&path), 2);
        for window in path.commands().windows(2) {
            assert!(
                !matches!(window, [PathCommand::MoveTo { .. }, PathCommand::MoveTo { .. }]),
                "dangling move in {:?}",
                path.commands()
            );
        }
    }

    #[test]
    fn min_max_traces_break_together() {
        let series = MinMaxSeries {
            group_size: 2,
            min: vec![Some(30.0), Some(31.0), None, Some(30.0)],
            max: vec![Some(40.0), Some(41.0), None, Some(42.0)],
        };
        let scale = StrokeScale {
            scale_y: 1.0,
            offset_y: 0.0,
            max_y: 65.0,
            post_scale_y: 0.5,
        };
        let mut min_path = Path::new();
        let mut max_path = Path::new();
        build_min_max_paths(&mut min_path, &mut max_path, &series, scale);
        assert_eq!(moves(&min_path), 2);
        assert_eq!(moves(&max_path), 2);
        assert_eq!(closes(&min_path), 0);
    }

    #[test]
    fn errors_trace_breaks_on_missing_periods() {
        let data = [Some(1), Some(1), None, Some(4), Some(2)];
        let mut path = Path::new();
        build_errors_path(&mut path, &data, 10.0, 100.0, 1.0);
        assert_eq!(moves(&path), 2);
        assert_eq!(path.commands()[0], PathCommand::MoveTo { x: 0.0, y: 9.5 });
    }

    #[test]
    fn state_path_marks_periods_without_any_data() {
        let first = [Some(1), None, None, Some(2), None];
        let second = [Some(0), None, Some(3), Some(2), None];
        let mut path = Path::new();
        build_errors_state_path(&mut path, &[&first, &second]);
        assert_eq!(moves(&path), 2);
        assert_eq!(closes(&path), 2);
        assert_eq!(path.commands()[0], PathCommand::MoveTo { x: 1.0, y: 0.0 });
    }

    #[test]
    fn pilot_tones_are_centered_on_carriers() {
        let mut path = Path::new();
        build_pilot_tones_path(&mut path, &[3, 9], 50.0);
        assert_eq!(path.commands()[0], PathCommand::MoveTo { x: 3.5, y: 0.0 });
        assert_eq!(path.commands()[3], PathCommand::LineTo { x: 9.5, y: 50.0 });
    }
}
