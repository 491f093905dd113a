#![no_std]

//! Reward distribution engine.
//!
//! Streams funded reward tokens to the stakers of one or more value pools,
//! proportionally to each staker's time-weighted share, over bounded reward
//! periods. Pools report every stake change through [`IncentivesController::handle_action`]
//! before applying it; users claim accrued rewards across any set of pools.

#[cfg(test)]
extern crate std;

mod accounting;
mod claim;
pub mod events;
pub mod fixed_point;
pub mod rewards;
mod storage;

use common::interfaces::BalanceOracleClient;
use common::roles::{self, Role};
use common::ttl;
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Vec};

use rewards::{AccrualState, RewardPeriod, UserCheckpoint};

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InsufficientAuthorization = 3,
    InvalidInput = 4,
    ZeroDuration = 5,
    InvalidPeriod = 6,
    InsufficientFunds = 7,
    RateOverflow = 8,
    ArithmeticOverflow = 9,
    StaleSettlement = 10,
    StakingPoolNotSet = 11,
}

#[contract]
pub struct IncentivesController;

#[contractimpl]
impl IncentivesController {
    /// Initialize the engine with its admin, the reward token it pays out and
    /// the length of reward periods in seconds.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();
        if duration == 0 {
            return Err(ContractError::ZeroDuration);
        }

        storage::init_config(&env, &admin, &reward_token, duration);
        events::publish_initialized(&env, admin, reward_token, duration);

        Ok(())
    }

    pub fn version() -> u32 {
        1
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        storage::get_admin(&env)
    }

    pub fn get_reward_token(env: Env) -> Result<Address, ContractError> {
        storage::get_reward_token(&env)
    }

    // ── Roles ───────────────────────────────────────────────────────────────

    /// Allow `funder` to credit deposits and start reward periods.
    pub fn grant_funder(env: Env, admin: Address, funder: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        roles::grant_role(&env, &Role::Funder, &funder);
        events::publish_role_changed(&env, Role::Funder, funder, true);
        Ok(())
    }

    pub fn revoke_funder(env: Env, admin: Address, funder: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        roles::revoke_role(&env, &Role::Funder, &funder);
        events::publish_role_changed(&env, Role::Funder, funder, false);
        Ok(())
    }

    pub fn is_funder(env: Env, address: Address) -> bool {
        roles::has_role(&env, &Role::Funder, &address)
    }

    // ── Reward periods ──────────────────────────────────────────────────────

    /// Credit `amount` reward tokens, already transferred into this
    /// contract, to the unallocated reserve.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_funder(&env, &funder)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let reward_token = storage::get_reward_token(&env)?;
        let held = token::Client::new(&env, &reward_token).balance(&env.current_contract_address());
        let required = fixed_point::add(storage::liabilities(&env)?, amount)?;
        if held < required {
            log!(&env, "fund: custody balance below liabilities", held, required);
            return Err(ContractError::InsufficientFunds);
        }

        let reserve = fixed_point::add(storage::get_reserve(&env), amount)?;
        storage::set_reserve(&env, reserve);
        ttl::extend_instance(&env);

        events::publish_funded(&env, funder, amount, reserve);
        Ok(())
    }

    /// Stream `amount` from the reserve to `pool` over the configured
    /// duration, starting now.
    ///
    /// If the pool's current period has not finished, its unstreamed
    /// remainder is added to the new period.
    pub fn start_reward_period(
        env: Env,
        funder: Address,
        pool: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_funder(&env, &funder)?;
        let now = env.ledger().timestamp();
        let duration = storage::get_duration(&env);
        let supply = BalanceOracleClient::new(&env, &pool).total_supply();
        if supply < 0 {
            return Err(ContractError::InvalidInput);
        }

        // Close the outgoing stream at `now` before its rate is replaced.
        let previous = storage::get_period(&env, &pool);
        let mut state = storage::get_accrual(&env, &pool);
        state.refresh(&env, &previous, supply, now)?;

        let leftover = previous.leftover(&env, now)?;
        let period = previous.next(&env, amount, duration, now)?;
        state.refresh(&env, &period, supply, now)?;

        storage::commit(&env, &pool, amount)?;
        storage::set_accrual(&env, &pool, &state);
        storage::set_period(&env, &pool, &period);
        ttl::extend_instance(&env);

        events::publish_period_started(
            &env,
            pool,
            funder,
            amount,
            leftover,
            period.reward_rate,
            period.period_finish,
        );
        Ok(())
    }

    /// Set the length of periods started from now on. Running periods keep
    /// their own duration.
    pub fn set_rewards_period_duration(
        env: Env,
        admin: Address,
        seconds: u64,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        if seconds == 0 {
            return Err(ContractError::ZeroDuration);
        }
        storage::set_duration(&env, seconds);
        events::publish_duration_set(&env, seconds);
        Ok(())
    }

    pub fn get_rewards_period_duration(env: Env) -> u64 {
        storage::get_duration(&env)
    }

    pub fn is_rewards_period_finished(env: Env, pool: Address) -> bool {
        storage::get_period(&env, &pool).is_finished(env.ledger().timestamp())
    }

    // ── Stake changes ───────────────────────────────────────────────────────

    /// Settle `user` in `pool` ahead of a balance change.
    ///
    /// Must be invoked by the pool itself, with the supply and balance that
    /// were in effect up to now, before the change is applied.
    pub fn handle_action(
        env: Env,
        pool: Address,
        user: Address,
        total_supply: i128,
        user_balance: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        pool.require_auth();
        if total_supply < 0 || user_balance < 0 || user_balance > total_supply {
            log!(&env, "handle_action: rejected snapshot", total_supply, user_balance);
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        accounting::settle_user(&env, &pool, &user, total_supply, user_balance, now)?;
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Everything `user` could claim right now across `pools`, including
    /// rewards not yet folded into a checkpoint.
    pub fn get_rewards_balance(
        env: Env,
        pools: Vec<Address>,
        user: Address,
    ) -> Result<i128, ContractError> {
        let now = env.ledger().timestamp();
        let mut total: i128 = 0;
        for pool in accounting::unique_pools(&env, &pools).iter() {
            let oracle = BalanceOracleClient::new(&env, &pool);
            let checkpoint = accounting::preview_user(
                &env,
                &pool,
                &user,
                oracle.total_supply(),
                oracle.balance_of(&user),
                now,
            )?;
            total = fixed_point::add(total, checkpoint.accrued_unclaimed)?;
        }
        Ok(total)
    }

    /// Sum of the stored unclaimed balances only, as of each pool's last
    /// settlement of `user`.
    pub fn get_user_unclaimed_rewards(
        env: Env,
        pools: Vec<Address>,
        user: Address,
    ) -> Result<i128, ContractError> {
        let mut total: i128 = 0;
        for pool in accounting::unique_pools(&env, &pools).iter() {
            let checkpoint = storage::get_checkpoint(&env, &pool, &user);
            total = fixed_point::add(total, checkpoint.accrued_unclaimed)?;
        }
        Ok(total)
    }

    pub fn get_reward_period(env: Env, pool: Address) -> RewardPeriod {
        storage::get_period(&env, &pool)
    }

    pub fn get_accrual_state(env: Env, pool: Address) -> AccrualState {
        storage::get_accrual(&env, &pool)
    }

    pub fn get_user_checkpoint(env: Env, pool: Address, user: Address) -> UserCheckpoint {
        storage::get_checkpoint(&env, &pool, &user)
    }

    pub fn get_reserve(env: Env) -> i128 {
        storage::get_reserve(&env)
    }

    pub fn get_total_committed(env: Env) -> i128 {
        storage::get_committed(&env)
    }

    pub fn get_total_claimed(env: Env) -> i128 {
        storage::get_claimed(&env)
    }

    pub fn get_pool_committed(env: Env, pool: Address) -> i128 {
        storage::get_pool_committed(&env, &pool)
    }

    pub fn get_pool_claimed(env: Env, pool: Address) -> i128 {
        storage::get_pool_claimed(&env, &pool)
    }

    // ── Claims ──────────────────────────────────────────────────────────────

    /// Pay `user`'s rewards from `pools` to `to`, up to `amount`.
    ///
    /// Returns the amount paid, which is zero when nothing has accrued.
    pub fn claim_rewards(
        env: Env,
        user: Address,
        pools: Vec<Address>,
        amount: i128,
        to: Address,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        claim::claim(&env, &user, &user, &pools, amount, &to)
    }

    /// Same as [`Self::claim_rewards`], by the claimer the admin registered
    /// for `user`.
    pub fn claim_rewards_on_behalf(
        env: Env,
        claimer: Address,
        user: Address,
        pools: Vec<Address>,
        amount: i128,
        to: Address,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        claimer.require_auth();
        if storage::get_claimer(&env, &user) != Some(claimer.clone()) {
            return Err(ContractError::InsufficientAuthorization);
        }
        claim::claim(&env, &user, &claimer, &pools, amount, &to)
    }

    pub fn set_claimer(
        env: Env,
        admin: Address,
        user: Address,
        claimer: Address,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::set_claimer(&env, &user, &claimer);
        events::publish_claimer_set(&env, user, claimer);
        Ok(())
    }

    pub fn get_claimer(env: Env, user: Address) -> Option<Address> {
        storage::get_claimer(&env, &user)
    }

    // ── Staking pool ────────────────────────────────────────────────────────
    // Single-pool shorthands over the configured staking pool.

    pub fn set_staking_pool(env: Env, admin: Address, pool: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::set_staking_pool(&env, &pool);
        events::publish_staking_pool_set(&env, pool);
        Ok(())
    }

    pub fn get_staking_pool(env: Env) -> Option<Address> {
        storage::get_staking_pool(&env)
    }

    /// Rewards `user` could claim from the staking pool right now.
    pub fn earned(env: Env, user: Address) -> Result<i128, ContractError> {
        let pool = storage::get_staking_pool(&env).ok_or(ContractError::StakingPoolNotSet)?;
        Self::get_rewards_balance(env.clone(), Vec::from_array(&env, [pool]), user)
    }

    /// Claim everything `user` has earned in the staking pool.
    pub fn claim_reward(env: Env, user: Address, to: Address) -> Result<i128, ContractError> {
        let pool = storage::get_staking_pool(&env).ok_or(ContractError::StakingPoolNotSet)?;
        Self::claim_rewards(env.clone(), user, Vec::from_array(&env, [pool]), i128::MAX, to)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !storage::is_initialized(env) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = storage::get_admin(env)?;
        caller.require_auth();
        if *caller != admin {
            return Err(ContractError::InsufficientAuthorization);
        }
        Ok(())
    }

    fn require_funder(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = storage::get_admin(env)?;
        caller.require_auth();
        if !roles::require_role_or_admin(env, &Role::Funder, caller, &admin) {
            log!(env, "funder gate rejected caller", caller.clone());
            return Err(ContractError::InsufficientAuthorization);
        }
        Ok(())
    }
}


#[cfg(test)]
mod test_invariants;
