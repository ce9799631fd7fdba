//! Ranking score derived from an agent's cumulative counters.
//!
//! `score = total_staked / STAKE_SCALE + loves * 0.1`
//!
//! The score is held as a fixed-point integer in units of `1 / STAKE_SCALE`,
//! so both terms are exact: a stake of one lamport contributes one unit and a
//! love contributes `LOVE_WEIGHT` units. The on-chain recomputation and the
//! off-chain mirror both call [`ranking_score`], which makes their results
//! identical for identical counters.

use crate::constants::{LOVE_WEIGHT, SCORE_DECIMALS, STAKE_SCALE};

/// Compute the fixed-point ranking score for the given counters.
pub fn ranking_score(total_staked: u64, loves: u64) -> u128 {
    // u64 + u64 * 1e8 always fits in u128
    total_staked as u128 + (loves as u128) * (LOVE_WEIGHT as u128)
}

/// Render a fixed-point score as a decimal string ("5.2", "0.000000001", "3").
pub fn format_score(units: u128) -> String {
    let scale = STAKE_SCALE as u128;
    let whole = units / scale;
    let frac = units % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = SCORE_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stake_and_loves_combine() {
        let units = ranking_score(5 * STAKE_SCALE, 2);
        assert_eq!(units, 5_200_000_000);
        assert_eq!(format_score(units), "5.2");
    }

    #[test]
    fn fresh_agent_scores_zero() {
        assert_eq!(ranking_score(0, 0), 0);
        assert_eq!(format_score(0), "0");
    }

    #[test]
    fn small_stakes_are_not_truncated() {
        assert_eq!(ranking_score(1, 0), 1);
        assert_eq!(format_score(1), "0.000000001");
        assert_eq!(format_score(ranking_score(STAKE_SCALE / 2, 1)), "0.6");
    }

    #[test]
    fn extreme_counters_do_not_overflow() {
        let units = ranking_score(u64::MAX, u64::MAX);
        assert_eq!(units, u64::MAX as u128 * (1 + LOVE_WEIGHT as u128));
    }
}
