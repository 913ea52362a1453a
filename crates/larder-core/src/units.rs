//! Gram/kilogram conversion.
//!
//! No bounds checking: negative and zero quantities convert like any other.

const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// Converts kilograms to grams.
pub fn to_grams(quantity: f64) -> f64 {
    quantity * GRAMS_PER_KILOGRAM
}

/// Converts grams to kilograms.
pub fn to_kilograms(quantity: f64) -> f64 {
    quantity / GRAMS_PER_KILOGRAM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_grams() {
        assert_eq!(to_grams(10.0), 10000.0);
        assert_eq!(to_grams(1.5), 1500.0);
        assert_eq!(to_grams(0.0), 0.0);
        assert_eq!(to_grams(-2.0), -2000.0);
    }

    #[test]
    fn test_to_kilograms() {
        assert_eq!(to_kilograms(1500.0), 1.5);
        assert_eq!(to_kilograms(10000.0), 10.0);
        assert_eq!(to_kilograms(-500.0), -0.5);
    }

    #[test]
    fn test_round_trip() {
        for x in [0.001, 0.5, 1.0, 3.25, 123.456, 99999.9, -7.5] {
            let back = to_kilograms(to_grams(x));
            assert!((back - x).abs() < 1e-9, "{} came back as {}", x, back);
        }
    }
}
