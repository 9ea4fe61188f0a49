//! Display formatting for the metrics panel and narratives.
//!
//! Currency follows the Indian three-tier scale: crore (1,00,00,000) and
//! lakh (1,00,000) units with two decimals, plain thousands-grouped rupees
//! below that. Absent or zero amounts render as the literal "N/A".

use num_format::{Locale, ToFormattedString};

pub const CRORE: f64 = 10_000_000.0;
pub const LAKH: f64 = 100_000.0;

pub fn format_currency(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => return "N/A".to_string(),
    };
    if v >= CRORE {
        format!("₹{:.2} Cr", v / CRORE)
    } else if v >= LAKH {
        format!("₹{:.2} L", v / LAKH)
    } else {
        format!("₹{}", format_int(v))
    }
}

/// Thousands-grouped integer rendering (fractional part truncated).
pub fn format_int(value: f64) -> String {
    (value as i64).to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_tiers() {
        assert_eq!(format_currency(Some(25_000_000.0)), "₹2.50 Cr");
        assert_eq!(format_currency(Some(150_000.0)), "₹1.50 L");
        assert_eq!(format_currency(Some(5000.0)), "₹5,000");
    }

    #[test]
    fn test_format_currency_absent_values() {
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_currency(Some(0.0)), "N/A");
        assert_eq!(format_currency(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_format_currency_threshold_boundaries() {
        assert_eq!(format_currency(Some(10_000_000.0)), "₹1.00 Cr");
        assert_eq!(format_currency(Some(100_000.0)), "₹1.00 L");
        assert_eq!(format_currency(Some(99_999.0)), "₹99,999");
    }

    #[test]
    fn test_format_int_grouping() {
        assert_eq!(format_int(1_234_567.9), "1,234,567");
        assert_eq!(format_int(0.0), "0");
    }
}
