//! Fixed decimal rounding used across costing and stock math.
//!
//! Both helpers round half away from zero (`f64::round`), which for the
//! non-negative quantities handled here behaves as round-half-up. Costs
//! are carried at 2 decimal places, quantities at 3.

/// Round a currency amount to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a quantity to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(19.199999999999999), 19.2);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235), 1.24);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(15.0000001), 15.0);
        assert_eq!(round3(0.0005), 0.001);
        assert_eq!(round3(2.3334), 2.333);
        assert_eq!(round3(-1.5005), -1.501);
    }
}
