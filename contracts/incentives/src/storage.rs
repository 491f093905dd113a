use common::ttl;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::fixed_point;
use crate::rewards::{AccrualState, RewardPeriod, UserCheckpoint};
use crate::ContractError;

// ── Instance keys ───────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const DURATION: Symbol = symbol_short!("DURATION");
const STAKING_POOL: Symbol = symbol_short!("STK_POOL");

/// Funded into custody but not committed to any period yet.
const RESERVE: Symbol = symbol_short!("RESERVE");
/// Sum of every amount ever committed to a period.
const COMMITTED: Symbol = symbol_short!("COMMITTED");
/// Sum of every amount ever paid out.
const CLAIMED: Symbol = symbol_short!("CLAIMED");

// ── Persistent key prefixes ─────────────────────────────────────────────────

const PERIOD: Symbol = symbol_short!("PERIOD");
const ACCRUAL: Symbol = symbol_short!("ACCRUAL");
const CHECKPOINT: Symbol = symbol_short!("CHKPT");
const POOL_COMMITTED: Symbol = symbol_short!("POOL_FND");
const POOL_CLAIMED: Symbol = symbol_short!("POOL_CLM");
const CLAIMER: Symbol = symbol_short!("CLAIMER");

// ── Configuration ───────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub fn get_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&ADMIN)
        .ok_or(ContractError::NotInitialized)
}

pub fn get_reward_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&REWARD_TOKEN)
        .ok_or(ContractError::NotInitialized)
}

pub fn get_duration(env: &Env) -> u64 {
    env.storage().instance().get(&DURATION).unwrap_or(0)
}

pub fn set_duration(env: &Env, seconds: u64) {
    env.storage().instance().set(&DURATION, &seconds);
}

pub fn get_staking_pool(env: &Env) -> Option<Address> {
    env.storage().instance().get(&STAKING_POOL)
}

pub fn set_staking_pool(env: &Env, pool: &Address) {
    env.storage().instance().set(&STAKING_POOL, pool);
}

pub fn init_config(env: &Env, admin: &Address, reward_token: &Address, duration: u64) {
    env.storage().instance().set(&ADMIN, admin);
    env.storage().instance().set(&REWARD_TOKEN, reward_token);
    env.storage().instance().set(&DURATION, &duration);
    env.storage().instance().set(&INITIALIZED, &true);
    ttl::extend_instance(env);
}

// ── Funding ledger ──────────────────────────────────────────────────────────

pub fn get_reserve(env: &Env) -> i128 {
    env.storage().instance().get(&RESERVE).unwrap_or(0)
}

pub fn set_reserve(env: &Env, amount: i128) {
    env.storage().instance().set(&RESERVE, &amount);
}

pub fn get_committed(env: &Env) -> i128 {
    env.storage().instance().get(&COMMITTED).unwrap_or(0)
}

pub fn get_claimed(env: &Env) -> i128 {
    env.storage().instance().get(&CLAIMED).unwrap_or(0)
}

/// Reward tokens custody must hold: unallocated reserve plus everything
/// committed to periods and not paid out yet.
pub fn liabilities(env: &Env) -> Result<i128, ContractError> {
    let outstanding = fixed_point::sub(get_committed(env), get_claimed(env))?;
    fixed_point::add(get_reserve(env), outstanding)
}

/// Move `amount` from the reserve into `pool`'s committed total.
pub fn commit(env: &Env, pool: &Address, amount: i128) -> Result<(), ContractError> {
    let reserve = get_reserve(env);
    if amount > reserve {
        return Err(ContractError::InsufficientFunds);
    }
    set_reserve(env, reserve - amount);

    let committed = fixed_point::add(get_committed(env), amount)?;
    env.storage().instance().set(&COMMITTED, &committed);

    let key = (POOL_COMMITTED, pool.clone());
    let pool_committed = fixed_point::add(get_pool_committed(env, pool), amount)?;
    env.storage().persistent().set(&key, &pool_committed);
    ttl::extend_persistent(env, &key);
    Ok(())
}

/// Record a payout of `amount` drawn from `pool`.
pub fn record_pool_claim(env: &Env, pool: &Address, amount: i128) -> Result<(), ContractError> {
    let key = (POOL_CLAIMED, pool.clone());
    let pool_claimed = fixed_point::add(get_pool_claimed(env, pool), amount)?;
    env.storage().persistent().set(&key, &pool_claimed);
    ttl::extend_persistent(env, &key);
    Ok(())
}

pub fn record_claim(env: &Env, amount: i128) -> Result<(), ContractError> {
    let claimed = fixed_point::add(get_claimed(env), amount)?;
    env.storage().instance().set(&CLAIMED, &claimed);
    Ok(())
}

pub fn get_pool_committed(env: &Env, pool: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(POOL_COMMITTED, pool.clone()))
        .unwrap_or(0)
}

pub fn get_pool_claimed(env: &Env, pool: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(POOL_CLAIMED, pool.clone()))
        .unwrap_or(0)
}

// ── Per-pool and per-user reward state ──────────────────────────────────────
// Entries are created lazily and default to zero; a zeroed entry is a valid
// resting state and is never removed.

pub fn get_period(env: &Env, pool: &Address) -> RewardPeriod {
    env.storage()
        .persistent()
        .get(&(PERIOD, pool.clone()))
        .unwrap_or_default()
}

pub fn set_period(env: &Env, pool: &Address, period: &RewardPeriod) {
    let key = (PERIOD, pool.clone());
    env.storage().persistent().set(&key, period);
    ttl::extend_persistent(env, &key);
}

pub fn get_accrual(env: &Env, pool: &Address) -> AccrualState {
    env.storage()
        .persistent()
        .get(&(ACCRUAL, pool.clone()))
        .unwrap_or_default()
}

pub fn set_accrual(env: &Env, pool: &Address, state: &AccrualState) {
    let key = (ACCRUAL, pool.clone());
    env.storage().persistent().set(&key, state);
    ttl::extend_persistent(env, &key);
}

pub fn get_checkpoint(env: &Env, pool: &Address, user: &Address) -> UserCheckpoint {
    env.storage()
        .persistent()
        .get(&(CHECKPOINT, pool.clone(), user.clone()))
        .unwrap_or_default()
}

pub fn set_checkpoint(env: &Env, pool: &Address, user: &Address, checkpoint: &UserCheckpoint) {
    let key = (CHECKPOINT, pool.clone(), user.clone());
    env.storage().persistent().set(&key, checkpoint);
    ttl::extend_persistent(env, &key);
}

// ── Claimers ────────────────────────────────────────────────────────────────

pub fn get_claimer(env: &Env, user: &Address) -> Option<Address> {
    env.storage().persistent().get(&(CLAIMER, user.clone()))
}

pub fn set_claimer(env: &Env, user: &Address, claimer: &Address) {
    let key = (CLAIMER, user.clone());
    env.storage().persistent().set(&key, claimer);
    ttl::extend_persistent(env, &key);
}
