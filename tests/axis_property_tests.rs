use approx::assert_relative_eq;
use dsl_graphs::api::{BITS_FIXED_TOP, BITS_MIN_RANGE, SNR_AXIS};
use dsl_graphs::core::axis::bits_axis_range;
use dsl_graphs::core::{AxisPlan, AxisRange, LabelFormat, determine_step, first_tick};
use proptest::prelude::*;

#[test]
fn first_tick_snaps_onto_the_grid() {
    assert_eq!(first_tick(-96.0, 20.0), -80.0);
    assert_eq!(first_tick(0.0, 5.0), 0.0);
    assert_eq!(first_tick(1440.0, -120.0), 1440.0);
    assert_eq!(first_tick(1430.0, -120.0), 1320.0);
}

#[test]
fn step_selection_prefers_smallest_fitting_candidate() {
    assert_eq!(determine_step(&[1, 2, 5, 10], 65.0, 91.0, 15.0), 20);
    assert_eq!(determine_step(&[1, 2, 5, 10], 65.0, 910.0, 15.0), 2);
    assert_eq!(determine_step(&[1, 2], 0.0, 91.0, 15.0), 1);
}

#[test]
fn fixed_bits_axis_ignores_samples() {
    let samples = [Some(3.0), Some(4.0)];
    let range = bits_axis_range(BITS_FIXED_TOP, BITS_MIN_RANGE, false, &[&samples]);
    assert_eq!(range, AxisRange::new(0.0, BITS_FIXED_TOP));
}

#[test]
fn reversed_axis_fraction_runs_from_bottom() {
    let plan = AxisPlan::new(AxisRange::new(1440.0, 0.0), &[60, 120], 5.5, LabelFormat::Duration);
    assert_relative_eq!(plan.fraction(720.0), 0.5);
    assert_relative_eq!(plan.fraction(1440.0), 0.0);
    assert_eq!((plan.label_start, plan.label_end), (0, 1440));
}

#[test]
fn added_sample_can_shift_a_minimum_range_window() {
    let single = SNR_AXIS.resolve(true, &[&[Some(40.0)]]);
    assert_relative_eq!(single.bottom, 38.0 - 20.0 * 70.0 / 123.0, epsilon = 1e-9);
    assert_relative_eq!(single.top, 42.0 + 20.0 * 53.0 / 123.0, epsilon = 1e-9);

    let pair = SNR_AXIS.resolve(true, &[&[Some(40.0), Some(41.0)]]);
    assert_relative_eq!(pair.bottom, 38.0 - 19.0 * 70.0 / 122.0, epsilon = 1e-9);
    assert_relative_eq!(pair.top, 43.0 + 19.0 * 52.0 / 122.0, epsilon = 1e-9);

    // Wider span, but the bottom moved up.
    assert!(pair.span() >= single.span());
    assert!(pair.bottom > single.bottom);
}

proptest! {
    #[test]
    fn more_samples_never_narrow_an_unclamped_range(
        samples in proptest::collection::vec(1.0f64..60.0, 2..64),
        split in 1usize..64,
    ) {
        let split = split.min(samples.len() - 1);
        let subset: Vec<Option<f64>> = samples[..split].iter().copied().map(Some).collect();
        let superset: Vec<Option<f64>> = samples.iter().copied().map(Some).collect();

        let narrow = SNR_AXIS.resolve(true, &[&subset]);
        let wide = SNR_AXIS.resolve(true, &[&superset]);
        let unclamped = |range: AxisRange| {
            range.bottom > SNR_AXIS.valid_min && range.top < SNR_AXIS.valid_max
        };
        prop_assume!(unclamped(narrow) && unclamped(wide));

        prop_assert!(wide.span() >= narrow.span() - 1e-9);
    }

    #[test]
    fn first_tick_is_the_nearest_multiple_not_before_start(
        start in -10_000.0f64..10_000.0,
        step in prop::sample::select(vec![1.0f64, 2.0, 5.0, 10.0, 20.0, 60.0, 120.0]),
    ) {
        let tick = first_tick(start, step);
        prop_assert!(tick >= start - 1e-9);
        prop_assert!(tick < start + step);
        prop_assert!((tick / step - (tick / step).round()).abs() < 1e-9);

        let descending = first_tick(start, -step);
        prop_assert!(descending <= start + 1e-9);
        prop_assert!(descending > start - step);
    }

    #[test]
    fn chosen_step_fits_the_pixel_budget(
        range in 0.5f64..10_000.0,
        pixels in 40.0f64..2_000.0,
        spacing in 10.0f64..40.0,
    ) {
        let step = determine_step(&[1, 2, 5, 10, 20], range, pixels, spacing);
        let max_count = (pixels / spacing).floor().max(1.0);
        prop_assert!(step >= 1);
        prop_assert!(range / step as f64 <= max_count);
    }

    #[test]
    fn dynamic_snr_range_contains_samples(
        samples in proptest::collection::vec(1.0f64..60.0, 1..64),
    ) {
        let series: Vec<Option<f64>> = samples.iter().copied().map(Some).collect();
        let range = SNR_AXIS.resolve(true, &[&series]);

        let low = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let high = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(range.bottom <= low);
        prop_assert!(range.top >= high);
        prop_assert!(range.span() >= SNR_AXIS.min_range - 1e-9);
        prop_assert!(range.bottom >= SNR_AXIS.valid_min);
        prop_assert!(range.top <= SNR_AXIS.valid_max);
    }

    #[test]
    fn dynamic_bits_top_never_exceeds_fixed_top(
        samples in proptest::collection::vec(0.0f64..15.0, 0..64),
    ) {
        let series: Vec<Option<f64>> = samples.iter().copied().map(Some).collect();
        let range = bits_axis_range(BITS_FIXED_TOP, BITS_MIN_RANGE, true, &[&series]);
        prop_assert_eq!(range.bottom, 0.0);
        prop_assert!(range.top <= BITS_FIXED_TOP);
        prop_assert!(range.top >= BITS_MIN_RANGE);
    }
}
