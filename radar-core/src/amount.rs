//! Rupee amount parsing.

/// Parse an amount as written in an SMS.
///
/// Thousands separators are dropped regardless of grouping, so Indian
/// (`1,23,456.78`) and western (`123,456.78`) forms give the same value.
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_and_western_grouping() {
        assert_eq!(parse_amount("1,23,456.78"), Some(123456.78));
        assert_eq!(parse_amount("123,456.78"), Some(123456.78));
        assert_eq!(parse_amount("1,499.00"), Some(1499.0));
        assert_eq!(parse_amount("60.0"), Some(60.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("12.3.4"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("inf"), None);
    }
}
