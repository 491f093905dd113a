use soroban_sdk::{contracttype, Env, I256};

use crate::fixed_point::{self, SCALE};
use crate::ContractError;

// ── State types ─────────────────────────────────────────────────────────────

/// The reward stream currently configured for one pool.
///
/// A pool that never had a period has `period_finish == 0` and is therefore
/// already finished: it streams nothing until a period is started.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPeriod {
    /// Reward units emitted per second across the whole pool, scaled by
    /// `SCALE`.
    pub reward_rate: i128,
    /// Timestamp after which the period contributes no further reward.
    pub period_finish: u64,
    /// Length of the period in seconds.
    pub duration: u64,
    /// Timestamp at which the period was started.
    pub started_at: u64,
}

/// Running reward-per-unit accumulator of one pool.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccrualState {
    /// Cumulative reward earned per unit of stake, scaled by `SCALE`.
    pub reward_per_unit_stored: i128,
    /// Last timestamp the accumulator was advanced to.
    pub last_update_time: u64,
}

/// A user's position in the reward stream of one pool.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserCheckpoint {
    /// Accumulator value at the user's last settlement.
    pub reward_per_unit_paid: i128,
    /// Reward earned up to the last settlement and not claimed yet.
    pub accrued_unclaimed: i128,
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// Advance a reward-per-unit accumulator.
///
/// This is the O(1) accumulation step:
///
/// ```text
/// Δrpu = reward_rate × elapsed_seconds / total_supply
/// new_rpu = stored_rpu + Δrpu
/// ```
///
/// `reward_rate` already carries `SCALE`, so this is the usual
/// `elapsed × rate × SCALE / supply` with the scale folded into the rate.
///
/// When `total_supply` is zero `stored` is returned unchanged: nobody is
/// staked, so nothing is distributed and there is nothing to divide by.
///
/// # Arguments
/// * `env`          – host for the 256-bit intermediate product
/// * `stored`       – current `reward_per_unit_stored` (scaled by SCALE)
/// * `reward_rate`  – reward units per second across the pool (scaled)
/// * `elapsed`      – seconds since the last update
/// * `total_supply` – sum of all stakes in the pool
pub fn compute_reward_per_unit(
    env: &Env,
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_supply: i128,
) -> Result<i128, ContractError> {
    if total_supply <= 0 || elapsed == 0 || reward_rate == 0 {
        return Ok(stored);
    }

    let delta = fixed_point::mul_div(env, reward_rate, i128::from(elapsed), total_supply)?;
    fixed_point::add(stored, delta)
}

/// Calculate the total reward owed to a single user.
///
/// ```text
/// earned = balance × (current_rpu − user_rpu_paid) / SCALE + accrued
/// ```
///
/// The subtraction isolates only the accumulation that happened since the
/// user's last checkpoint, so earlier settlements are never double-counted.
/// A checkpoint ahead of the accumulator cannot come from a correct caller
/// and is reported as `StaleSettlement`.
///
/// # Arguments
/// * `balance`       – the user's stake during the interval being settled
/// * `current_rpu`   – latest `reward_per_unit_stored`
/// * `user_rpu_paid` – the value captured at the user's last settlement
/// * `accrued`       – already-accrued reward not claimed yet
pub fn earned(
    env: &Env,
    balance: i128,
    current_rpu: i128,
    user_rpu_paid: i128,
    accrued: i128,
) -> Result<i128, ContractError> {
    let index_delta = fixed_point::sub(current_rpu, user_rpu_paid)?;
    if index_delta < 0 {
        return Err(ContractError::StaleSettlement);
    }
    if balance <= 0 || index_delta == 0 {
        return Ok(accrued);
    }

    let new_rewards = fixed_point::mul_div(env, balance, index_delta, SCALE)?;
    fixed_point::add(accrued, new_rewards)
}

impl RewardPeriod {
    pub fn is_finished(&self, now: u64) -> bool {
        now >= self.period_finish
    }

    /// Reward funded into this period but not streamed by `now`, in whole
    /// reward units.
    pub fn leftover(&self, env: &Env, now: u64) -> Result<i128, ContractError> {
        self.scaled_leftover(env, now)
            .div(&I256::from_i128(env, SCALE))
            .to_i128()
            .ok_or(ContractError::RateOverflow)
    }

    fn scaled_leftover(&self, env: &Env, now: u64) -> I256 {
        if self.is_finished(now) {
            return I256::from_i128(env, 0);
        }
        let remaining = i128::from(self.period_finish - now);
        I256::from_i128(env, remaining).mul(&I256::from_i128(env, self.reward_rate))
    }

    /// Build the period that replaces this one when `amount` is streamed over
    /// `duration` seconds starting at `now`.
    ///
    /// Anything this period has not streamed yet is folded into the new rate,
    /// so restarting early never drops funded rewards:
    ///
    /// ```text
    /// rate = (amount × SCALE + leftover) / duration
    /// ```
    ///
    /// The sum is formed in 256 bits; a rate that does not fit back into
    /// `i128`, or that truncates to zero, is `RateOverflow`.
    pub fn next(
        &self,
        env: &Env,
        amount: i128,
        duration: u64,
        now: u64,
    ) -> Result<RewardPeriod, ContractError> {
        if duration == 0 {
            return Err(ContractError::ZeroDuration);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidPeriod);
        }
        let period_finish = now
            .checked_add(duration)
            .ok_or(ContractError::InvalidPeriod)?;

        let total = I256::from_i128(env, amount)
            .mul(&I256::from_i128(env, SCALE))
            .add(&self.scaled_leftover(env, now));
        let reward_rate = total
            .div(&I256::from_i128(env, i128::from(duration)))
            .to_i128()
            .ok_or(ContractError::RateOverflow)?;
        if reward_rate == 0 {
            return Err(ContractError::RateOverflow);
        }

        Ok(RewardPeriod {
            reward_rate,
            period_finish,
            duration,
            started_at: now,
        })
    }
}

impl AccrualState {
    /// Bring the accumulator up to `min(now, period_finish)`.
    ///
    /// This is the only place `reward_per_unit_stored` changes. Time before
    /// `period.started_at` belongs to an earlier stream and is never charged
    /// at this period's rate. Nothing is written unless the whole step
    /// succeeds.
    pub fn refresh(
        &mut self,
        env: &Env,
        period: &RewardPeriod,
        total_supply: i128,
        now: u64,
    ) -> Result<(), ContractError> {
        if now < self.last_update_time {
            return Err(ContractError::StaleSettlement);
        }

        let applicable = now.min(period.period_finish);
        let from = self.last_update_time.max(period.started_at);
        let elapsed = applicable.saturating_sub(from);

        let stored = compute_reward_per_unit(
            env,
            self.reward_per_unit_stored,
            period.reward_rate,
            elapsed,
            total_supply,
        )?;

        self.reward_per_unit_stored = stored;
        self.last_update_time = self.last_update_time.max(applicable);
        Ok(())
    }
}

impl UserCheckpoint {
    /// Fold everything earned since the last checkpoint into
    /// `accrued_unclaimed` and move the checkpoint to `state`.
    ///
    /// `balance` must be the balance held during the interval being settled,
    /// i.e. the value *before* any pending change. Returns the newly accrued
    /// amount; a second call against the same state returns zero.
    pub fn settle(
        &mut self,
        env: &Env,
        state: &AccrualState,
        balance: i128,
    ) -> Result<i128, ContractError> {
        let accrued = earned(
            env,
            balance,
            state.reward_per_unit_stored,
            self.reward_per_unit_paid,
            self.accrued_unclaimed,
        )?;
        let delta = fixed_point::sub(accrued, self.accrued_unclaimed)?;

        self.accrued_unclaimed = accrued;
        self.reward_per_unit_paid = state.reward_per_unit_stored;
        Ok(delta)
    }

    /// Remove up to `limit` from the unclaimed balance and return what was
    /// taken.
    pub fn take(&mut self, limit: i128) -> i128 {
        let taken = self.accrued_unclaimed.min(limit).max(0);
        self.accrued_unclaimed -= taken;
        taken
    }
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests; the environment only hosts 256-bit intermediates.

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn period(env: &Env, amount: i128, duration: u64, now: u64) -> RewardPeriod {
        RewardPeriod::default().next(env, amount, duration, now).unwrap()
    }

    #[test]
    fn rpu_unchanged_when_no_stakers() {
        let env = Env::default();
        let rpu = compute_reward_per_unit(&env, 500, 100, 60, 0).unwrap();
        assert_eq!(rpu, 500, "RPU must not change when total_supply is zero");
    }

    #[test]
    fn rpu_accumulates_correctly() {
        let env = Env::default();
        // 10 units/s (scaled), 100s, 1_000 staked:
        // Δrpu = 10 × SCALE × 100 / 1_000 = SCALE
        let rpu = compute_reward_per_unit(&env, 0, 10 * SCALE, 100, 1_000).unwrap();
        assert_eq!(rpu, SCALE);
    }

    #[test]
    fn rpu_overflow_is_an_error() {
        let env = Env::default();
        let result = compute_reward_per_unit(&env, i128::MAX - 1, SCALE, 100, 1);
        assert_eq!(result, Err(ContractError::ArithmeticOverflow));
    }

    #[test]
    fn earned_zero_when_no_new_accumulation() {
        let env = Env::default();
        assert_eq!(earned(&env, 500, 100, 100, 50), Ok(50));
    }

    #[test]
    fn earned_proportional_to_stake() {
        let env = Env::default();
        // RPU rose by SCALE since the checkpoint: every staked unit earned one.
        assert_eq!(earned(&env, 1_000, SCALE, 0, 0), Ok(1_000));
        assert_eq!(earned(&env, 250, SCALE, 0, 7), Ok(257));
    }

    #[test]
    fn earned_rejects_checkpoint_ahead_of_accumulator() {
        let env = Env::default();
        assert_eq!(earned(&env, 1, 10, 11, 0), Err(ContractError::StaleSettlement));
    }

    #[test]
    fn earned_handles_large_amounts() {
        let env = Env::default();
        // 10^15 units staked against an accumulated 1_000 reward per unit.
        let large_stake: i128 = 1_000_000_000_000_000;
        let e = earned(&env, large_stake, SCALE * 1_000, 0, 0).unwrap();
        assert_eq!(e, large_stake * 1_000);
    }

    #[test]
    fn new_period_rate_spreads_amount_over_duration() {
        let env = Env::default();
        let p = period(&env, 30_000, 30, 100);
        assert_eq!(p.reward_rate, 1_000 * SCALE);
        assert_eq!(p.period_finish, 130);
        assert_eq!(p.started_at, 100);
        assert!(!p.is_finished(129));
        assert!(p.is_finished(130));
    }

    #[test]
    fn never_started_period_is_finished() {
        assert!(RewardPeriod::default().is_finished(0));
    }

    #[test]
    fn next_period_rejects_bad_parameters() {
        let env = Env::default();
        let p = RewardPeriod::default();
        assert_eq!(p.next(&env, 1_000, 0, 0), Err(ContractError::ZeroDuration));
        assert_eq!(p.next(&env, 0, 10, 0), Err(ContractError::InvalidPeriod));
        assert_eq!(p.next(&env, -5, 10, 0), Err(ContractError::InvalidPeriod));
        assert_eq!(p.next(&env, 1, 10, u64::MAX), Err(ContractError::InvalidPeriod));
        assert_eq!(p.next(&env, i128::MAX, 10, 0), Err(ContractError::RateOverflow));
        // Rounds to a zero rate.
        assert_eq!(p.next(&env, 1, 1 << 62, 0), Err(ContractError::RateOverflow));
    }

    #[test]
    fn large_funding_gets_an_exact_rate() {
        let env = Env::default();
        // 1_000 tokens at 18 decimals: amount × SCALE is 10^39.
        let amount = 1_000 * SCALE;
        let duration = 1_000_000;
        let p = period(&env, amount, duration, 0);
        assert_eq!(p.reward_rate, amount * (SCALE / 1_000_000));
        assert_eq!(p.leftover(&env, duration / 2), Ok(amount / 2));

        // Two stakers split 2:1 over the full period.
        let mut state = AccrualState::default();
        state.refresh(&env, &p, 3 * SCALE, duration).unwrap();
        let first = earned(&env, 2 * SCALE, state.reward_per_unit_stored, 0, 0).unwrap();
        let second = earned(&env, SCALE, state.reward_per_unit_stored, 0, 0).unwrap();
        assert!(first + second <= amount);
        assert!(amount - (first + second) < 10);
        assert!((first - 2 * second).abs() <= 2);

        // Restarting halfway folds the other half in.
        let restarted = p.next(&env, amount, duration, duration / 2).unwrap();
        assert_eq!(restarted.leftover(&env, duration / 2), Ok(amount + amount / 2));
    }

    #[test]
    fn restart_folds_unstreamed_leftover() {
        let env = Env::default();
        // 3_000 over 30s; restart after 10s with another 3_000.
        let first = period(&env, 3_000, 30, 0);
        assert_eq!(first.leftover(&env, 10), Ok(2_000));

        let second = first.next(&env, 3_000, 30, 10).unwrap();
        // (3_000 + 2_000) / 30 per second.
        assert_eq!(second.reward_rate, 5_000 * SCALE / 30);
        assert_eq!(second.period_finish, 40);
    }

    #[test]
    fn restart_after_finish_carries_nothing() {
        let env = Env::default();
        let first = period(&env, 3_000, 30, 0);
        assert_eq!(first.leftover(&env, 45), Ok(0));
        let second = first.next(&env, 3_000, 30, 45).unwrap();
        assert_eq!(second.reward_rate, 100 * SCALE);
    }

    #[test]
    fn refresh_clamps_to_period_finish() {
        let env = Env::default();
        let p = period(&env, 3_000, 30, 0);
        let mut state = AccrualState::default();

        state.refresh(&env, &p, 100, 1_000).unwrap();
        // Only 30s of emission: 3_000 reward over 100 units.
        assert_eq!(state.reward_per_unit_stored, 30 * SCALE);
        assert_eq!(state.last_update_time, 30);

        // Touching again later changes nothing.
        let before = state.clone();
        state.refresh(&env, &p, 100, 5_000).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn refresh_with_zero_supply_only_moves_time() {
        let env = Env::default();
        let p = period(&env, 3_000, 30, 0);
        let mut state = AccrualState::default();
        state.refresh(&env, &p, 0, 10).unwrap();
        assert_eq!(state.reward_per_unit_stored, 0);
        assert_eq!(state.last_update_time, 10);

        // The first 10s are gone for good; the remaining 20s accrue.
        state.refresh(&env, &p, 100, 30).unwrap();
        assert_eq!(state.reward_per_unit_stored, 20 * SCALE);
    }

    #[test]
    fn refresh_ignores_gap_before_period_start() {
        let env = Env::default();
        let first = period(&env, 3_000, 30, 0);
        let mut state = AccrualState::default();
        state.refresh(&env, &first, 100, 30).unwrap();

        // Gap of 70s with no period, then a new one starts at 100.
        let second = first.next(&env, 3_000, 30, 100).unwrap();
        state.refresh(&env, &second, 100, 100).unwrap();
        assert_eq!(state.reward_per_unit_stored, 30 * SCALE);
        assert_eq!(state.last_update_time, 100);

        state.refresh(&env, &second, 100, 115).unwrap();
        assert_eq!(state.reward_per_unit_stored, 45 * SCALE);
    }

    #[test]
    fn refresh_rejects_time_going_backwards() {
        let env = Env::default();
        let p = period(&env, 3_000, 30, 0);
        let mut state = AccrualState::default();
        state.refresh(&env, &p, 100, 20).unwrap();
        let before = state.clone();

        assert_eq!(
            state.refresh(&env, &p, 100, 19),
            Err(ContractError::StaleSettlement)
        );
        assert_eq!(state, before, "failed refresh must not write");
    }

    #[test]
    fn settle_is_idempotent_at_a_fixed_state() {
        let env = Env::default();
        let p = period(&env, 30 * DAY as i128, 30 * DAY, 0);
        let mut state = AccrualState::default();
        state.refresh(&env, &p, 10, DAY).unwrap();

        let mut checkpoint = UserCheckpoint::default();
        let first = checkpoint.settle(&env, &state, 4).unwrap();
        assert!(first > 0);
        let snapshot = checkpoint.clone();

        assert_eq!(checkpoint.settle(&env, &state, 4), Ok(0));
        assert_eq!(checkpoint, snapshot);
    }

    #[test]
    fn take_drains_up_to_limit() {
        let mut checkpoint = UserCheckpoint {
            reward_per_unit_paid: 0,
            accrued_unclaimed: 100,
        };
        assert_eq!(checkpoint.take(30), 30);
        assert_eq!(checkpoint.accrued_unclaimed, 70);
        assert_eq!(checkpoint.take(1_000), 70);
        assert_eq!(checkpoint.accrued_unclaimed, 0);
        assert_eq!(checkpoint.take(5), 0);
    }
}
