/// Divides `part` by `total`, returning 0.0 when `total` is zero.
pub fn ratio(part: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { part / total }
}

/// Rounds to `digits` decimal places, half away from zero.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_with_zero_total() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
        assert_eq!(ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_normal_values() {
        assert_eq!(ratio(50.0, 100.0), 0.5);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(2.0 / 3.0, 4), 0.6667);
        assert_eq!(round_to(1800.0, 4), 1800.0);
        assert_eq!(round_to(0.5, 0), 1.0);
    }
}
