//! Statistics codec: confidence intervals, season/time encoding, point
//! weights.
//!
//! Pure functions, no state. Everything here feeds the chart pipelines.

/// z-score for a 95% two-sided confidence interval.
const Z_95: f64 = 1.96;

/// Season names in ordinal order. Index within a year is the ordinal
/// remainder, so `year * 4 + index` totally orders seasons chronologically.
pub const SEASON_NAMES: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];

/// Sentinel ordinal for labels that don't parse as a season.
pub const UNKNOWN_SEASON: i64 = -1;

// =============================================================================
// Wilson score interval
// =============================================================================

/// 95% Wilson score interval for a binomial proportion.
///
/// More stable than the normal approximation at the small sample sizes
/// common in per-season song statistics. `p` is the observed proportion,
/// `n` the sample size. The caller must guarantee `n > 0`; with `n == 0`
/// the result is NaN/infinite and must not be plotted.
pub fn wilson_interval(p: f64, n: u64) -> (f64, f64) {
    let n = n as f64;
    let a = p + Z_95 * Z_95 / (2.0 * n);
    let b = Z_95 * ((p * (1.0 - p) + Z_95 * Z_95 / (4.0 * n)) / n).sqrt();
    let c = 1.0 + Z_95 * Z_95 / n;
    ((a - b) / c, (a + b) / c)
}

// =============================================================================
// Season ordinal encoding
// =============================================================================

/// Encode a `"<Season> <Year>"` label as `year * 4 + season_index`.
///
/// Season names are case-sensitive and must be one of [`SEASON_NAMES`].
/// Returns [`UNKNOWN_SEASON`] when the name is unrecognized or the year is
/// non-numeric.
pub fn season_to_ordinal(label: &str) -> i64 {
    let mut parts = label.split(' ');
    let (name, year) = match (parts.next(), parts.next()) {
        (Some(name), Some(year)) => (name, year),
        _ => return UNKNOWN_SEASON,
    };
    let index = match SEASON_NAMES.iter().position(|&s| s == name) {
        Some(i) => i as i64,
        None => return UNKNOWN_SEASON,
    };
    match year.parse::<i64>() {
        Ok(y) => y * 4 + index,
        Err(_) => UNKNOWN_SEASON,
    }
}

/// Inverse of [`season_to_ordinal`]; the sentinel maps to `"Unknown"`.
pub fn ordinal_to_season(ordinal: i64) -> String {
    if ordinal == UNKNOWN_SEASON {
        return "Unknown".to_string();
    }
    let year = ordinal.div_euclid(4);
    let name = SEASON_NAMES[ordinal.rem_euclid(4) as usize];
    format!("{} {}", name, year)
}

// =============================================================================
// Point weight
// =============================================================================

/// Visual radius scale for a plotted point: log10(n) + 1.
///
/// Only meaningful for `sample_count > 0`; callers never pass zero.
pub fn point_weight(sample_count: u64) -> f64 {
    (sample_count as f64).log10() + 1.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wilson_contains_proportion() {
        for &p in &[0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            for &n in &[1u64, 5, 20, 100, 10_000] {
                let (lower, upper) = wilson_interval(p, n);
                let slack = 1e-9;
                assert!(lower >= -slack, "p={} n={} lower={}", p, n, lower);
                assert!(upper <= 1.0 + slack, "p={} n={} upper={}", p, n, upper);
                assert!(lower <= p + slack, "p={} n={} lower={}", p, n, lower);
                assert!(upper >= p - slack, "p={} n={} upper={}", p, n, upper);
            }
        }
    }

    #[test]
    fn test_wilson_narrows_with_sample_size() {
        let (l1, u1) = wilson_interval(0.5, 10);
        let (l2, u2) = wilson_interval(0.5, 1000);
        assert!(u2 - l2 < u1 - l1);
    }

    #[test]
    fn test_wilson_known_value() {
        // p=0.5, n=20: interval roughly [0.299, 0.701]
        let (lower, upper) = wilson_interval(0.5, 20);
        assert!((lower - 0.299).abs() < 0.01, "lower={}", lower);
        assert!((upper - 0.701).abs() < 0.01, "upper={}", upper);
    }

    #[test]
    fn test_season_roundtrip() {
        for year in [2007, 2013, 2020] {
            for name in SEASON_NAMES {
                let label = format!("{} {}", name, year);
                let ord = season_to_ordinal(&label);
                assert_ne!(ord, UNKNOWN_SEASON);
                assert_eq!(ordinal_to_season(ord), label);
            }
        }
    }

    #[test]
    fn test_season_ordering_is_chronological() {
        assert!(season_to_ordinal("Winter 2019") < season_to_ordinal("Spring 2019"));
        assert!(season_to_ordinal("Fall 2019") < season_to_ordinal("Winter 2020"));
    }

    #[test]
    fn test_season_sentinels() {
        assert_eq!(season_to_ordinal("Monsoon 2020"), UNKNOWN_SEASON);
        assert_eq!(season_to_ordinal("Winter"), UNKNOWN_SEASON);
        assert_eq!(season_to_ordinal("Winter year"), UNKNOWN_SEASON);
        assert_eq!(season_to_ordinal("winter 2020"), UNKNOWN_SEASON);
        assert_eq!(season_to_ordinal(""), UNKNOWN_SEASON);
        assert_eq!(ordinal_to_season(UNKNOWN_SEASON), "Unknown");
    }

    #[test]
    fn test_point_weight() {
        assert!((point_weight(1) - 1.0).abs() < 1e-12);
        assert!((point_weight(10) - 2.0).abs() < 1e-12);
        assert!((point_weight(1000) - 4.0).abs() < 1e-12);
    }
}
