use crate::core::LabelFormat;

const NARROW_NBSP: char = '\u{202F}';
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Renders the tick `value` of an axis with the given `step` and last label
/// value `end`.
#[must_use]
pub fn format_label(format: LabelFormat, value: i64, step: i64, end: i64) -> String {
    match format {
        LabelFormat::Integer => value.to_string(),
        LabelFormat::Frequency => format_frequency(value),
        LabelFormat::Duration => format_duration(value, step),
        LabelFormat::Count => format_count(value, end),
    }
}

fn format_frequency(khz: i64) -> String {
    let mhz = khz as f64 / 1000.0;
    if khz % 100 == 0 {
        format!("{mhz:.1}")
    } else {
        format!("{mhz:.2}")
    }
}

fn format_duration(minutes: i64, step: i64) -> String {
    let step = step.max(1);
    if step % MINUTES_PER_DAY == 0 {
        format!("{}{NARROW_NBSP}d", minutes / MINUTES_PER_DAY)
    } else if step % (MINUTES_PER_DAY / 2) == 0 {
        format!("{:.1}{NARROW_NBSP}d", minutes as f64 / MINUTES_PER_DAY as f64)
    } else if step % 60 == 0 {
        format!("{}{NARROW_NBSP}h", minutes / 60)
    } else if step < 30 {
        format!("{minutes}{NARROW_NBSP}min")
    } else if step < 60 {
        format!("{:.1}{NARROW_NBSP}h", minutes as f64 / 60.0)
    } else {
        "?".to_owned()
    }
}

fn format_count(value: i64, end: i64) -> String {
    if value == 0 {
        return "0".to_owned();
    }

    for (threshold, unit, suffix) in [(1_000_000, 100_000, 'M'), (1_000, 100, 'k')] {
        if end >= threshold {
            return if value % threshold == 0 {
                format!("{}{NARROW_NBSP}{suffix}", value / threshold)
            } else if value % unit == 0 {
                format!("{:.1}{NARROW_NBSP}{suffix}", value as f64 / threshold as f64)
            } else {
                format!("{:.2}{NARROW_NBSP}{suffix}", value as f64 / threshold as f64)
            };
        }
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::format_label;
    use crate::core::LabelFormat;

    #[test]
    fn frequency_labels_are_megahertz() {
        assert_eq!(format_label(LabelFormat::Frequency, 2200, 1000, 35328), "2.2");
        assert_eq!(format_label(LabelFormat::Frequency, 1250, 1250, 35328), "1.25");
        assert_eq!(format_label(LabelFormat::Frequency, 0, 5000, 35328), "0.0");
    }

    #[test]
    fn duration_unit_follows_step() {
        assert_eq!(format_label(LabelFormat::Duration, 2880, 1440, 10080), "2\u{202F}d");
        assert_eq!(format_label(LabelFormat::Duration, 720, 720, 1440), "0.5\u{202F}d");
        assert_eq!(format_label(LabelFormat::Duration, 180, 60, 1440), "3\u{202F}h");
        assert_eq!(format_label(LabelFormat::Duration, 20, 10, 60), "20\u{202F}min");
        assert_eq!(format_label(LabelFormat::Duration, 90, 30, 180), "1.5\u{202F}h");
    }

    #[test]
    fn counts_use_suffix_of_label_end() {
        assert_eq!(format_label(LabelFormat::Count, 0, 500, 2000), "0");
        assert_eq!(format_label(LabelFormat::Count, 500, 500, 2000), "0.5\u{202F}k");
        assert_eq!(format_label(LabelFormat::Count, 2000, 500, 2000), "2\u{202F}k");
        assert_eq!(format_label(LabelFormat::Count, 250, 250, 1000), "0.25\u{202F}k");
        assert_eq!(format_label(LabelFormat::Count, 2_500_000, 2_500_000, 5_000_000), "2.5\u{202F}M");
        assert_eq!(format_label(LabelFormat::Count, 40, 20, 105), "40");
    }
}
