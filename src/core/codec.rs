//! Compact run-length/delta text encoding of per-carrier and per-period series.
//!
//! A series is a sequence of tokens. Each token is an opcode byte followed by
//! an unsigned decimal number. Values are carried in tenths:
//!
//! | opcode | value |
//! |---|---|
//! | `P` / `N` | absolute, positive / negative, `digits[.tenth]` |
//! | `Q` / `O` | absolute, positive / negative, number is already in tenths |
//! | `p` / `n` | previous value plus / minus `digits[.tenth]` |
//! | `q` / `o` | previous value plus / minus a tenths count |
//! | `r` | repeat the last emitted sample `count` more times |
//! | `e` | gap (no sample) |

use std::fmt::Write as _;

use tracing::{trace, warn};

/// Upper bound on the number of samples a single decode may produce.
pub const MAX_DECODED_LEN: usize = 1 << 20;

/// Decodes an encoded series into optional samples.
///
/// Never fails: unknown opcodes are skipped, tokens missing their digits
/// contribute nothing, and output stops at [`MAX_DECODED_LEN`].
#[must_use]
pub fn decode_series(text: &str) -> Vec<Option<f64>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();

    let mut last_tenths: i64 = 0;
    let mut last_emitted: Option<f64> = Some(0.0);
    let mut index = 0;

    while index < bytes.len() {
        if out.len() >= MAX_DECODED_LEN {
            warn!(cap = MAX_DECODED_LEN, "encoded series truncated at output cap");
            break;
        }

        let opcode = bytes[index];
        index += 1;

        let digits_start = index;
        while index < bytes.len() && (bytes[index].is_ascii_digit() || bytes[index] == b'.') {
            index += 1;
        }
        let number = parse_number(&bytes[digits_start..index]);

        match opcode {
            b'e' => {
                out.push(None);
                last_emitted = None;
            }
            b'r' => {
                let Some((count, _)) = number else {
                    trace!(offset = digits_start - 1, "repeat token without count skipped");
                    continue;
                };
                let remaining = MAX_DECODED_LEN - out.len();
                let count = usize::try_from(count).unwrap_or(usize::MAX).min(remaining);
                out.extend(std::iter::repeat_n(last_emitted, count));
            }
            b'P' | b'Q' | b'N' | b'O' | b'p' | b'q' | b'n' | b'o' => {
                let Some((num, frac)) = number else {
                    trace!(
                        opcode = %char::from(opcode),
                        "value token without digits skipped"
                    );
                    continue;
                };
                let Some(tenths) = apply_opcode(opcode, last_tenths, num, frac) else {
                    trace!(opcode = %char::from(opcode), "value token overflow skipped");
                    continue;
                };
                let value = tenths as f64 / 10.0;
                out.push(Some(value));
                last_tenths = tenths;
                last_emitted = Some(value);
            }
            other => {
                trace!(opcode = other, "unknown series opcode skipped");
            }
        }
    }

    out
}

/// Decodes a series of non-negative integer counters. Negative or fractional
/// samples are rounded and negative ones are treated as gaps.
#[must_use]
pub fn decode_counter_series(text: &str) -> Vec<Option<u64>> {
    decode_series(text)
        .into_iter()
        .map(|value| {
            value.and_then(|v| {
                let rounded = v.round();
                (rounded >= 0.0).then_some(rounded as u64)
            })
        })
        .collect()
}

/// Returns the integer part and the single fractional digit of a token body.
///
/// The fraction is only honored in the `digits.d` form; anything else yields
/// a fraction of zero.
fn parse_number(body: &[u8]) -> Option<(i64, i64)> {
    let int_len = body.iter().take_while(|b| b.is_ascii_digit()).count();
    if int_len == 0 {
        return None;
    }

    let mut num: i64 = 0;
    for digit in &body[..int_len] {
        num = num.checked_mul(10)?.checked_add(i64::from(digit - b'0'))?;
    }

    let len = body.len();
    let frac = if len > 2 && body[len - 2] == b'.' && body[len - 1].is_ascii_digit() {
        i64::from(body[len - 1] - b'0')
    } else {
        0
    };

    Some((num, frac))
}

fn apply_opcode(opcode: u8, last: i64, num: i64, frac: i64) -> Option<i64> {
    let whole = num.checked_mul(10)?.checked_add(frac)?;
    match opcode {
        b'P' => Some(whole),
        b'Q' => Some(num),
        b'N' => whole.checked_neg(),
        b'O' => num.checked_neg(),
        b'p' => last.checked_add(whole),
        b'q' => last.checked_add(num),
        b'n' => last.checked_sub(whole),
        b'o' => last.checked_sub(num),
        _ => None,
    }
}

/// Encodes real samples with one decimal place of precision.
#[must_use]
pub fn encode_float_series(values: &[f64]) -> String {
    let mut out = String::new();
    let mut last: i64 = 0;
    let mut repeats: usize = 0;

    for value in values {
        let tenths = (value * 10.0).round() as i64;
        if tenths == last {
            repeats += 1;
            continue;
        }
        flush_repeats(&mut out, &mut repeats);

        let absolute = tenths_token(b'P', b'N', tenths);
        let relative = tenths_token(b'p', b'n', tenths - last);
        out.push_str(&shorter(absolute, relative));
        last = tenths;
    }
    flush_repeats(&mut out, &mut repeats);

    out
}

/// Encodes integer samples such as bit loading.
#[must_use]
pub fn encode_int_series(values: &[i64]) -> String {
    let mut out = String::new();
    let mut last: i64 = 0;
    let mut repeats: usize = 0;

    for &value in values {
        if value == last {
            repeats += 1;
            continue;
        }
        flush_repeats(&mut out, &mut repeats);

        let absolute = int_token(b'P', b'N', value);
        let relative = int_token(b'p', b'n', value - last);
        out.push_str(&shorter(absolute, relative));
        last = value;
    }
    flush_repeats(&mut out, &mut repeats);

    out
}

/// Encodes optional integer samples, writing `e` for gaps.
#[must_use]
pub fn encode_optional_int_series(values: &[Option<i64>]) -> String {
    let mut out = String::new();
    let mut last: Option<i64> = Some(0);
    let mut repeats: usize = 0;

    for &value in values {
        if value == last {
            repeats += 1;
            continue;
        }
        flush_repeats(&mut out, &mut repeats);

        match (value, last) {
            (None, _) => out.push('e'),
            (Some(current), Some(previous)) => {
                let absolute = int_token(b'P', b'N', current);
                let relative = int_token(b'p', b'n', current - previous);
                out.push_str(&shorter(absolute, relative));
            }
            (Some(current), None) => out.push_str(&int_token(b'P', b'N', current)),
        }
        last = value;
    }
    flush_repeats(&mut out, &mut repeats);

    out
}

fn flush_repeats(out: &mut String, repeats: &mut usize) {
    if *repeats > 0 {
        let _ = write!(out, "r{repeats}");
        *repeats = 0;
    }
}

fn shorter(absolute: String, relative: String) -> String {
    if absolute.len() <= relative.len() {
        absolute
    } else {
        relative
    }
}

fn tenths_token(positive: u8, negative: u8, value: i64) -> String {
    let (prefix, magnitude) = if value >= 0 {
        (positive, value)
    } else {
        (negative, -value)
    };
    let num = magnitude / 10;
    let frac = magnitude % 10;

    if num == 0 {
        // `Q`/`O`/`q`/`o` directly carry a tenths count.
        format!("{}{frac}", char::from(prefix + 1))
    } else if frac == 0 {
        format!("{}{num}", char::from(prefix))
    } else {
        format!("{}{num}.{frac}", char::from(prefix))
    }
}

fn int_token(positive: u8, negative: u8, value: i64) -> String {
    if value >= 0 {
        format!("{}{value}", char::from(positive))
    } else {
        format!("{}{}", char::from(negative), value.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode_counter_series, decode_series, encode_float_series, encode_int_series,
        encode_optional_int_series,
    };

    #[test]
    fn decodes_absolute_and_relative_tenths() {
        assert_eq!(decode_series("Q50q10"), vec![Some(5.0), Some(6.0)]);
        assert_eq!(decode_series("P9.5r2"), vec![Some(9.5); 3]);
        assert_eq!(decode_series("N12.5o5p3"), vec![Some(-12.5), Some(-13.0), Some(-10.0)]);
    }

    #[test]
    fn gap_token_breaks_series_without_touching_delta_state() {
        assert_eq!(
            decode_series("Q10e Q20"),
            vec![Some(1.0), None, Some(2.0)]
        );
        assert_eq!(decode_series("P3er2q5"), vec![Some(3.0), None, None, None, Some(3.5)]);
    }

    #[test]
    fn repeat_before_any_value_repeats_zero() {
        assert_eq!(decode_series("r2P1"), vec![Some(0.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn malformed_tokens_are_absorbed() {
        assert_eq!(decode_series("P4x7P"), vec![Some(4.0)]);
        assert_eq!(decode_series("P4r"), vec![Some(4.0)]);
        assert_eq!(decode_series("P.5Q3"), vec![Some(0.3)]);
        assert!(decode_series("").is_empty());
        assert_eq!(decode_series("P99999999999999999999999P1"), vec![Some(1.0)]);
    }

    #[test]
    fn decode_is_pure() {
        let text = "P12.3r4n2.1e r1Q7";
        assert_eq!(decode_series(text), decode_series(text));
    }

    #[test]
    fn counters_round_and_drop_negative_samples() {
        assert_eq!(
            decode_counter_series("P5eN2P7"),
            vec![Some(5), None, None, Some(7)]
        );
    }

    #[test]
    fn float_encoder_output_decodes_back() {
        let values = [0.0, 0.0, 12.3, 12.3, 12.3, 11.9, -3.0, 0.4, 45.0];
        let encoded = encode_float_series(&values);
        let decoded: Vec<f64> = decode_series(&encoded).into_iter().flatten().collect();
        assert_eq!(decoded.len(), values.len());
        for (got, want) in decoded.iter().zip(values) {
            assert!((got - want).abs() < 1e-9, "{got} != {want} in {encoded}");
        }
    }

    #[test]
    fn int_encoders_prefer_short_tokens_and_mark_gaps() {
        assert_eq!(encode_int_series(&[0, 0, 10, 11, 11]), "r2P10p1r1");
        assert_eq!(
            encode_optional_int_series(&[Some(4), None, None, Some(4)]),
            "P4er1P4"
        );
        assert_eq!(
            decode_counter_series("P4er1P4"),
            vec![Some(4), None, None, Some(4)]
        );
    }
}
