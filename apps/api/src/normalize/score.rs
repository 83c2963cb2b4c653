//! Score normalization for provider replies.
//!
//! Providers are asked for an integer 0 – 100 but regularly answer with a
//! fraction in 0.0 – 1.0 instead. The two conventions overlap at exactly 1,
//! so the rule below is a heuristic: `raw <= 1` is read as a fraction.
//! An honest integer score of 1 therefore comes back as 100.

/// Upper bound of the canonical scale.
pub const MAX_SCORE: u8 = 100;

/// Resolves a raw provider score to an integer in `0..=100`.
///
/// - `raw <= 1`  → fractional, scaled by 100 then rounded
/// - `raw > 1`   → already on the 0 – 100 scale, rounded
///
/// Rounding is half away from zero, so 99.5 becomes 100. Values outside the
/// scale after rounding are clamped.
pub fn normalize_score(raw: f64) -> u8 {
    let scaled = if raw <= 1.0 { raw * 100.0 } else { raw };
    scaled.round().clamp(0.0, MAX_SCORE as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_is_scaled() {
        assert_eq!(normalize_score(0.85), 85);
        assert_eq!(normalize_score(0.72), 72);
        assert_eq!(normalize_score(0.0), 0);
    }

    #[test]
    fn test_percentage_is_kept() {
        assert_eq!(normalize_score(85.0), 85);
        assert_eq!(normalize_score(100.0), 100);
        assert_eq!(normalize_score(42.4), 42);
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(normalize_score(0.995), 100);
        assert_eq!(normalize_score(0.005), 1);
        assert_eq!(normalize_score(67.5), 68);
    }

    #[test]
    fn test_one_is_read_as_fraction() {
        // Ambiguous input: integer 1 out of 100 is indistinguishable from 1.0.
        assert_eq!(normalize_score(1.0), 100);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(normalize_score(150.0), 100);
        assert_eq!(normalize_score(-0.3), 0);
        assert_eq!(normalize_score(-20.0), 0);
    }

    #[test]
    fn test_matches_round_of_scaled_value() {
        for i in 0..=1000 {
            let s = i as f64 / 1000.0;
            assert_eq!(normalize_score(s) as f64, (s * 100.0).round(), "s = {s}");
        }
        for i in 2..=100 {
            let s = i as f64 + 0.25;
            assert_eq!(normalize_score(s) as f64, s.round(), "s = {s}");
        }
    }
}
