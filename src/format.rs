//! Human-readable population strings for the sidebar and chart axes.

use crate::data::Year;

/// Attribute holding the country name in the feature service
pub const COUNTRY_FIELD: &str = "COUNTRY";

/// Format a value with B/M/K suffixes at the given decimal precision per scale.
/// Values below one thousand are printed as plain integers.
pub fn format_magnitude(value: u64, billions: usize, millions: usize, thousands: usize) -> String {
    let v = value as f64;
    if v >= 1_000_000_000.0 {
        format!("{:.*}B", billions, v / 1_000_000_000.0)
    } else if v >= 1_000_000.0 {
        format!("{:.*}M", millions, v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.*}K", thousands, v / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Full-value display: two decimals at every scale.
/// Zero and absent both render as "N/A".
pub fn format_population(value: Option<u64>) -> String {
    match value {
        None | Some(0) => "N/A".to_string(),
        Some(v) => format_magnitude(v, 2, 2, 2),
    }
}

/// Axis tick label: one decimal for billions, none below. Zero is "0".
pub fn format_axis_label(value: u64) -> String {
    format_magnitude(value, 1, 0, 0)
}

/// Growth percentage with explicit sign
pub fn format_growth(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r >= 0.0 => format!("+{:.2}%", r),
        Some(r) => format!("{:.2}%", r),
        None => "N/A".to_string(),
    }
}

/// Feature service attribute name for a year's population
pub fn year_field_key(year: Year) -> String {
    format!("F{}_Population", year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_population() {
        assert_eq!(format_population(Some(999)), "999");
        assert_eq!(format_population(Some(1000)), "1.00K");
        assert_eq!(format_population(Some(1_500_000)), "1.50M");
        assert_eq!(format_population(Some(2_000_000_000)), "2.00B");
        assert_eq!(format_population(Some(7_954_448_391)), "7.95B");
    }

    #[test]
    fn test_zero_and_absent_are_not_available() {
        // Zero is deliberately indistinguishable from a missing value here.
        assert_eq!(format_population(Some(0)), "N/A");
        assert_eq!(format_population(None), "N/A");
    }

    #[test]
    fn test_format_axis_label() {
        assert_eq!(format_axis_label(0), "0");
        assert_eq!(format_axis_label(999), "999");
        assert_eq!(format_axis_label(1000), "1K");
        assert_eq!(format_axis_label(250_000_000), "250M");
        assert_eq!(format_axis_label(8_000_000_000), "8.0B");
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(format_magnitude(1_000_000_000, 2, 2, 2), "1.00B");
        assert_eq!(format_magnitude(999_999_999, 0, 0, 0), "1000M");
        assert_eq!(format_magnitude(1_000_000, 2, 2, 2), "1.00M");
    }

    #[test]
    fn test_format_growth() {
        assert_eq!(format_growth(Some(200.0)), "+200.00%");
        assert_eq!(format_growth(Some(-0.5)), "-0.50%");
        assert_eq!(format_growth(Some(0.0)), "+0.00%");
        assert_eq!(format_growth(None), "N/A");
    }

    #[test]
    fn test_year_field_key() {
        assert_eq!(year_field_key(Year(2022)), "F2022_Population");
        assert_eq!(year_field_key(Year(1970)), "F1970_Population");
    }
}
