use dsl_graphs::core::{BinSeries, decode_counter_series, decode_series};
use dsl_graphs::core::codec::{encode_float_series, encode_int_series};
use proptest::prelude::*;

#[test]
fn decodes_documented_examples() {
    assert_eq!(decode_series("Q50q10"), vec![Some(5.0), Some(6.0)]);
    assert_eq!(decode_series("P9.5r2"), vec![Some(9.5); 3]);
    assert_eq!(decode_series("Q10e Q20"), vec![Some(1.0), None, Some(2.0)]);
    assert_eq!(decode_series("Q5r31"), vec![Some(0.5); 32]);
    assert_eq!(
        decode_counter_series("P10eP20"),
        vec![Some(10), None, Some(20)]
    );
}

#[test]
fn unknown_bytes_are_skipped() {
    assert_eq!(decode_series("P1 ?P2"), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn encoded_series_keeps_group_size() {
    let series = BinSeries::from_encoded(4, "P3r3");
    assert_eq!(series.group_size, 4);
    assert_eq!(series.data, vec![Some(3.0); 4]);
}

proptest! {
    #[test]
    fn decode_is_deterministic(text in "[PNQpnqoOxXre0-9.]{0,40}") {
        prop_assert_eq!(decode_series(&text), decode_series(&text));
        prop_assert_eq!(decode_counter_series(&text), decode_counter_series(&text));
    }

    #[test]
    fn integer_series_survive_encoding(values in proptest::collection::vec(-500i64..500, 0..64)) {
        let encoded = encode_int_series(&values);
        let decoded = decode_series(&encoded);
        prop_assert_eq!(decoded.len(), values.len());
        for (got, want) in decoded.iter().zip(&values) {
            prop_assert_eq!(*got, Some(*want as f64));
        }
    }

    #[test]
    fn tenths_survive_encoding(raw in proptest::collection::vec(-900i32..900, 1..48)) {
        let values: Vec<f64> = raw.iter().map(|tenths| f64::from(*tenths) / 10.0).collect();
        let decoded = decode_series(&encode_float_series(&values));
        prop_assert_eq!(decoded.len(), values.len());
        for (got, want) in decoded.iter().zip(&values) {
            let got = got.expect("sample present");
            prop_assert!((got - want).abs() < 1e-9);
        }
    }
}
