/// Axis tick label: `"1h30m"`, `"2h"`, `"45m"`; zero is `"0m"`.
pub fn format_tick(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    let (h, m) = (total / 60, total % 60);
    match (h, m) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

/// Tooltip elapsed time, always `"{h}h{m}m"` with whole minutes.
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let total = (elapsed_ms.max(0.0) / 60_000.0).floor() as u64;
    format!("{}h{}m", total / 60, total % 60)
}

/// One decimal place, no decimal point for whole numbers.
pub fn format_score(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// Score gained, with an explicit sign for positive values.
pub fn format_delta(value: f64) -> String {
    let text = format_score(value);
    if value > 0.0 && !text.starts_with('-') {
        format!("+{text}")
    } else {
        text
    }
}

/// Contest time used: `"2h 5m"` or `"45m"`.
pub fn format_time_used(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_omit_zero_parts() {
        assert_eq!(format_tick(0.0), "0m");
        assert_eq!(format_tick(15.0), "15m");
        assert_eq!(format_tick(60.0), "1h");
        assert_eq!(format_tick(90.0), "1h30m");
        assert_eq!(format_tick(300.0), "5h");
    }

    #[test]
    fn elapsed_keeps_both_parts() {
        assert_eq!(format_elapsed(0.0), "0h0m");
        assert_eq!(format_elapsed(59_999.0), "0h0m");
        assert_eq!(format_elapsed(65.0 * 60_000.0), "1h5m");
        assert_eq!(format_elapsed(-5.0), "0h0m");
    }

    #[test]
    fn scores_round_to_one_decimal() {
        assert_eq!(format_score(50.0), "50");
        assert_eq!(format_score(12.34), "12.3");
        assert_eq!(format_score(12.96), "13");
        assert_eq!(format_delta(7.5), "+7.5");
        assert_eq!(format_delta(0.0), "0");
    }

    #[test]
    fn time_used() {
        assert_eq!(format_time_used(45), "45m");
        assert_eq!(format_time_used(125), "2h 5m");
        assert_eq!(format_time_used(-3), "0m");
    }
}
