//! Deterministic value generator.
//!
//! Stands in for sensor readings: a coordinate pair is hashed and the digest is
//! mapped into the requested range. The key format (5 fractional digits) and the
//! 128-bit MD5 width are fixed so that values stay reproducible across
//! implementations of the dashboard.

use md5::{Digest, Md5};

/// Fractional digits used when formatting each coordinate into the hash key.
pub const KEY_PRECISION: usize = 5;

/// 2^128 as f64 (exact).
const DIGEST_SPAN: f64 = 340_282_366_920_938_463_463_374_607_431_768_211_456.0;

/// Hash key for a coordinate pair, e.g. `"23.07800-72.50100"`.
pub fn seed_key(a: f64, b: f64) -> String {
    format!("{a:.prec$}-{b:.prec$}", prec = KEY_PRECISION)
}

/// Digest of the key read as a big-endian u128.
fn digest_u128(key: &str) -> u128 {
    let digest = Md5::digest(key.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    u128::from_be_bytes(bytes)
}

/// Map a coordinate pair into [0, 1).
pub fn unit_value(a: f64, b: f64) -> f64 {
    digest_u128(&seed_key(a, b)) as f64 / DIGEST_SPAN
}

/// Map a coordinate pair into `[min_val, max_val)`.
///
/// Inputs are not validated: NaN and infinities format as text and hash like any
/// other key.
pub fn generate(a: f64, b: f64, min_val: f64, max_val: f64) -> f64 {
    min_val + unit_value(a, b) * (max_val - min_val)
}

/// Round to `digits` fractional digits the way decimal formatting does
/// (correctly rounded, ties to even on exact binary ties).
pub fn round_to(value: f64, digits: usize) -> f64 {
    format!("{value:.digits$}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn key_uses_five_fractional_digits() {
        assert_eq!(seed_key(0.0, 0.0), "0.00000-0.00000");
        assert_eq!(seed_key(23.078, -72.5), "23.07800--72.50000");
        assert_eq!(seed_key(1.234567, 2.0), "1.23457-2.00000");
    }

    #[test]
    fn digest_matches_reference() {
        assert_eq!(
            digest_u128("0.00000-0.00000"),
            0x67e9fd5b068c4710c8619db6d082dbe4
        );
    }

    #[test]
    fn known_values() {
        assert_relative_eq!(unit_value(0.0, 0.0), 0.4059141490202346, epsilon = 1e-15);
        assert_relative_eq!(generate(0.0, 0.0, 50.0, 150.0), 90.59141490202346, epsilon = 1e-12);
        assert_eq!(round_to(generate(0.0, 0.0, 50.0, 150.0), 2), 90.59);
    }

    #[test]
    fn deterministic_and_in_range() {
        let mut state: u64 = 7;
        for _ in 0..500 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let a = (state >> 11) as f64 / (1u64 << 53) as f64 * 180.0 - 90.0;
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let b = (state >> 11) as f64 / (1u64 << 53) as f64 * 360.0 - 180.0;

            let v1 = generate(a, b, 2.0, 9.0);
            let v2 = generate(a, b, 2.0, 9.0);
            assert_eq!(v1.to_bits(), v2.to_bits());
            assert!((2.0..9.0).contains(&v1), "out of range: {v1}");
        }
    }

    #[test]
    fn inputs_equal_after_formatting_collide() {
        assert_eq!(generate(1.000001, 2.0, 0.0, 1.0), generate(1.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn distinct_inputs_give_distinct_values() {
        let values: Vec<f64> = (0..50).map(|i| unit_value(i as f64, 0.0)).collect();
        for (i, a) in values.iter().enumerate() {
            for b in &values[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn round_to_matches_decimal_formatting() {
        assert_eq!(round_to(101.23456, 1), 101.2);
        assert_eq!(round_to(52.1349, 2), 52.13);
        assert_eq!(round_to(15.0, 1), 15.0);
        assert_eq!(round_to(-0.04, 1), -0.0);
    }
}
