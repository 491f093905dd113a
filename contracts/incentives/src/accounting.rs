//! Pool refresh and user settlement against stored state.
//!
//! Every balance-changing path goes through [`settle_user`] with the balance
//! that was in effect up to `now`, before the change is applied.

use soroban_sdk::{Address, Env, Vec};

use crate::events;
use crate::rewards::UserCheckpoint;
use crate::storage;
use crate::ContractError;

/// Refresh `pool` and fold the user's accrual into their checkpoint.
///
/// Both entries are computed before either is written.
pub fn settle_user(
    env: &Env,
    pool: &Address,
    user: &Address,
    total_supply: i128,
    balance: i128,
    now: u64,
) -> Result<UserCheckpoint, ContractError> {
    let period = storage::get_period(env, pool);
    let mut state = storage::get_accrual(env, pool);
    state.refresh(env, &period, total_supply, now)?;

    let mut checkpoint = storage::get_checkpoint(env, pool, user);
    let accrued = checkpoint.settle(env, &state, balance)?;

    storage::set_accrual(env, pool, &state);
    storage::set_checkpoint(env, pool, user, &checkpoint);

    if accrued > 0 {
        events::publish_rewards_accrued(
            env,
            pool.clone(),
            user.clone(),
            accrued,
            state.reward_per_unit_stored,
        );
    }
    Ok(checkpoint)
}

/// What [`settle_user`] would produce at `now`, without writing anything.
pub fn preview_user(
    env: &Env,
    pool: &Address,
    user: &Address,
    total_supply: i128,
    balance: i128,
    now: u64,
) -> Result<UserCheckpoint, ContractError> {
    let period = storage::get_period(env, pool);
    let mut state = storage::get_accrual(env, pool);
    state.refresh(env, &period, total_supply, now)?;

    let mut checkpoint = storage::get_checkpoint(env, pool, user);
    checkpoint.settle(env, &state, balance)?;
    Ok(checkpoint)
}

/// `pools` with repeated entries dropped, first occurrence wins.
pub fn unique_pools(env: &Env, pools: &Vec<Address>) -> Vec<Address> {
    let mut unique = Vec::new(env);
    for pool in pools.iter() {
        if !unique.contains(&pool) {
            unique.push_back(pool);
        }
    }
    unique
}
