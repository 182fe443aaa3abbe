//! Score normalization shared by every source's formula.

/// Bonus added when a signal's narrative came from AI analysis rather than
/// templates. Applied before the final clamp.
pub const AI_ANALYSIS_BONUS: i64 = 1;

/// Clamp a raw computed score into the persisted 0..=10 range.
#[must_use]
pub fn clamp_score(raw: i64) -> i32 {
    i32::try_from(raw.clamp(0, 10)).unwrap_or(0)
}

/// Clamp a float-valued formula result, rounding half-up first.
#[must_use]
pub fn clamp_score_f64(raw: f64) -> i32 {
    if raw.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    clamp_score(raw.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_stay_in_range_for_any_raw_value() {
        for raw in [-100_i64, -1, 0, 3, 10, 11, 1_000_000] {
            let clamped = clamp_score(raw);
            assert!((0..=10).contains(&clamped), "raw {raw} -> {clamped}");
        }
    }

    #[test]
    fn float_scores_round_then_clamp() {
        assert_eq!(clamp_score_f64(3.4), 3);
        assert_eq!(clamp_score_f64(3.5), 4);
        assert_eq!(clamp_score_f64(-2.7), 0);
        assert_eq!(clamp_score_f64(37.2), 10);
        assert_eq!(clamp_score_f64(f64::NAN), 0);
    }

    #[test]
    fn ai_bonus_cannot_push_past_ten() {
        assert_eq!(clamp_score(10 + AI_ANALYSIS_BONUS), 10);
    }
}
