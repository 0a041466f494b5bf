/// Fixed-point scaling factor.
///
/// All accumulated-reward-per-share values are multiplied by this constant
/// before storage to preserve sub-unit precision without floating-point
/// arithmetic. 10^12 gives 12 decimal places of precision, which is more
/// than sufficient for token amounts up to 10^18.
pub const PRECISION: i128 = 1_000_000_000_000;

/// The dev address receives `pool_reward / DEV_CUT_DENOMINATOR` minted
/// alongside every pool reward.
pub const DEV_CUT_DENOMINATOR: i128 = 10;

// ── Emission schedule ───────────────────────────────────────────────────────

/// Integrate the emission step function over the height interval `[from, to)`.
///
/// Emission is zero before `start`, `bonus_multiplier`× inside
/// `[start, bonus_end)`, and 1× from `bonus_end` on. The result is the
/// number of base-rate units accrued, i.e. multiply by `reward_per_height`
/// to get tokens:
///
/// ```text
/// units = Σ over h in [from, to) of rate_factor(h)
/// ```
///
/// `from` is clamped to `start` so calling before emission begins is
/// well-defined; `to ≤ from` yields 0.
#[allow(clippy::arithmetic_side_effects)]
pub fn accrued_units(from: u64, to: u64, start: u64, bonus_end: u64, bonus_multiplier: i128) -> i128 {
    let from = from.max(start);
    if to <= from {
        return 0;
    }

    if to <= bonus_end {
        // Entirely inside the bonus window.
        ((to - from) as i128).saturating_mul(bonus_multiplier)
    } else if from >= bonus_end {
        // Entirely after the bonus window.
        (to - from) as i128
    } else {
        // Straddles the window edge: split at bonus_end.
        ((bonus_end - from) as i128)
            .saturating_mul(bonus_multiplier)
            .saturating_add((to - bonus_end) as i128)
    }
}

// ── Per-pool accrual ────────────────────────────────────────────────────────

/// A pool's share of the emitted reward for `units` accrued units.
///
/// ```text
/// reward = units × reward_per_height × alloc_weight / total_weight
/// ```
///
/// Integer division truncates; the remainder is forfeited, not carried to
/// the next accrual. Returns 0 when `total_weight ≤ 0`.
#[allow(clippy::arithmetic_side_effects)]
pub fn pool_reward(
    units: i128,
    reward_per_height: i128,
    alloc_weight: i128,
    total_weight: i128,
) -> i128 {
    if total_weight <= 0 {
        return 0;
    }

    units
        .saturating_mul(reward_per_height)
        .saturating_mul(alloc_weight)
        / total_weight
}

/// The accumulator increment for distributing `reward` across `supply`
/// deposited units:
///
/// ```text
/// Δacc = reward × PRECISION / supply
/// ```
///
/// Returns 0 when `supply ≤ 0`; no depositors means nothing to distribute.
#[allow(clippy::arithmetic_side_effects)]
pub fn per_share_delta(reward: i128, supply: i128) -> i128 {
    if supply <= 0 {
        return 0;
    }

    reward.saturating_mul(PRECISION) / supply
}

/// The portion of every pool reward minted to the dev address alongside
/// the pool's own mint.
#[allow(clippy::arithmetic_side_effects)]
pub fn dev_cut(reward: i128) -> i128 {
    reward / DEV_CUT_DENOMINATOR
}

// ── Per-user settlement ─────────────────────────────────────────────────────

/// Reward owed to a position since its last settlement.
///
/// ```text
/// pending = amount × acc_per_share / PRECISION − reward_debt
/// ```
///
/// The subtraction isolates only the accumulation that happened since the
/// position's last debt snapshot, so prior settlements are never
/// double-counted. Floored at 0.
#[allow(clippy::arithmetic_side_effects)]
pub fn pending(amount: i128, acc_per_share: i128, reward_debt: i128) -> i128 {
    let accrued = amount.saturating_mul(acc_per_share) / PRECISION;

    accrued.saturating_sub(reward_debt).max(0)
}

/// The debt snapshot stored after a settlement: the accumulator value
/// already credited for `amount` deposited units.
#[allow(clippy::arithmetic_side_effects)]
pub fn reward_debt(amount: i128, acc_per_share: i128) -> i128 {
    amount.saturating_mul(acc_per_share) / PRECISION
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn units_zero_before_start() {
        assert_eq!(accrued_units(0, 90, 100, 1_000, 10), 0);
    }

    #[test]
    fn units_clamp_from_to_start() {
        // [50, 105) with start=100 counts only [100, 105), all bonus.
        assert_eq!(accrued_units(50, 105, 100, 1_000, 10), 50);
    }

    #[test]
    fn units_inside_bonus_window() {
        assert_eq!(accrued_units(100, 101, 100, 1_000, 10), 10);
        assert_eq!(accrued_units(101, 105, 100, 1_000, 10), 40);
    }

    #[test]
    fn units_after_bonus_window() {
        assert_eq!(accrued_units(1_000, 1_010, 100, 1_000, 10), 10);
    }

    #[test]
    fn units_straddle_bonus_end() {
        // [590, 606) with bonus end 600: 10 bonus heights + 6 plain.
        assert_eq!(accrued_units(590, 606, 500, 600, 10), 106);
    }

    #[test]
    fn units_empty_interval() {
        assert_eq!(accrued_units(200, 200, 100, 1_000, 10), 0);
    }

    #[test]
    fn pool_reward_weighted_share() {
        // 50 units × 100/height × weight 10 of 30 → truncated third.
        assert_eq!(pool_reward(50, 100, 10, 30), 1_666);
    }

    #[test]
    fn pool_reward_zero_total_weight() {
        assert_eq!(pool_reward(50, 100, 10, 0), 0);
    }

    #[test]
    fn per_share_delta_truncates() {
        // 4000 tokens over 30 shares: 133.333… per share, scaled.
        assert_eq!(per_share_delta(4_000, 30), 133_333_333_333_333);
    }

    #[test]
    fn per_share_delta_zero_supply() {
        assert_eq!(per_share_delta(1_000, 0), 0);
    }

    #[test]
    fn pending_closed_form() {
        // 20 units against a truncated accumulator, debt snapshot 8_000:
        // floor(20 × acc / PRECISION) − 8_000 = 14_190 − 8_000.
        let acc = 709_523_809_523_808i128;
        assert_eq!(pending(20, acc, 8_000), 6_190);
    }

    #[test]
    fn pending_zero_when_debt_current() {
        let acc = 500 * PRECISION;
        let debt = reward_debt(10, acc);
        assert_eq!(pending(10, acc, debt), 0);
    }

    #[test]
    fn pending_never_negative() {
        assert_eq!(pending(10, PRECISION, 1_000_000), 0);
    }

    #[test]
    fn dev_cut_is_tenth() {
        assert_eq!(dev_cut(1_000), 100);
        assert_eq!(dev_cut(9), 0);
    }

    #[test]
    fn no_overflow_on_large_amounts() {
        // saturating_mul clamps instead of wrapping; with PRECISION = 10^12
        // and 7-decimal token amounts, 10^15 deposited units are realistic.
        let large: i128 = 1_000_000_000_000_000;
        let acc = PRECISION.saturating_mul(1_000);
        assert_eq!(pending(large, acc, 0), large.saturating_mul(1_000));
    }
}
