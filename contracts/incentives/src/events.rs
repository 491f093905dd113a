use common::roles::Role;
use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub reward_token: Address,
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundedEvent {
    pub funder: Address,
    pub amount: i128,
    pub reserve: i128,
}

/// Emitted whenever a pool's reward stream is (re)started.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodStartedEvent {
    pub pool: Address,
    pub funder: Address,
    pub amount: i128,
    /// Unstreamed remainder of the replaced period, in whole reward units.
    pub leftover: i128,
    pub reward_rate: i128,
    pub period_finish: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DurationSetEvent {
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsAccruedEvent {
    pub pool: Address,
    pub user: Address,
    pub amount: i128,
    pub reward_per_unit: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsClaimedEvent {
    pub user: Address,
    pub claimer: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimerSetEvent {
    pub user: Address,
    pub claimer: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingPoolSetEvent {
    pub pool: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChangedEvent {
    pub role: Role,
    pub account: Address,
    pub granted: bool,
}

pub fn publish_initialized(env: &Env, admin: Address, reward_token: Address, duration: u64) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            reward_token,
            duration,
        },
    );
}

pub fn publish_funded(env: &Env, funder: Address, amount: i128, reserve: i128) {
    env.events().publish(
        (symbol_short!("FUNDED"), funder.clone()),
        FundedEvent {
            funder,
            amount,
            reserve,
        },
    );
}

pub fn publish_period_started(
    env: &Env,
    pool: Address,
    funder: Address,
    amount: i128,
    leftover: i128,
    reward_rate: i128,
    period_finish: u64,
) {
    env.events().publish(
        (symbol_short!("PERIOD"), pool.clone()),
        PeriodStartedEvent {
            pool,
            funder,
            amount,
            leftover,
            reward_rate,
            period_finish,
        },
    );
}

pub fn publish_duration_set(env: &Env, duration: u64) {
    env.events()
        .publish((symbol_short!("DURATION"),), DurationSetEvent { duration });
}

pub fn publish_rewards_accrued(
    env: &Env,
    pool: Address,
    user: Address,
    amount: i128,
    reward_per_unit: i128,
) {
    env.events().publish(
        (symbol_short!("ACCRUED"), pool.clone(), user.clone()),
        RewardsAccruedEvent {
            pool,
            user,
            amount,
            reward_per_unit,
        },
    );
}

pub fn publish_rewards_claimed(env: &Env, user: Address, claimer: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        RewardsClaimedEvent {
            user,
            claimer,
            to,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_claimer_set(env: &Env, user: Address, claimer: Address) {
    env.events().publish(
        (symbol_short!("CLAIMER"), user.clone()),
        ClaimerSetEvent { user, claimer },
    );
}

pub fn publish_staking_pool_set(env: &Env, pool: Address) {
    env.events()
        .publish((symbol_short!("STK_POOL"),), StakingPoolSetEvent { pool });
}

pub fn publish_role_changed(env: &Env, role: Role, account: Address, granted: bool) {
    env.events().publish(
        (symbol_short!("ROLE"), account.clone()),
        RoleChangedEvent {
            role,
            account,
            granted,
        },
    );
}
