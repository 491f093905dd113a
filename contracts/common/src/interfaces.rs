//! Cross-contract surfaces shared by the reward engine, its operator and the
//! value-pool ledgers it tracks.

use soroban_sdk::{contractclient, Address, Env};

/// Read side of a tracked value pool.
///
/// When called from inside a stake-change notification the values must be the
/// ones in effect *before* the pending balance mutation.
#[contractclient(name = "BalanceOracleClient")]
pub trait BalanceOracle {
    fn balance_of(env: Env, user: Address) -> i128;
    fn total_supply(env: Env) -> i128;
}

/// Notification entry point a pool calls before it changes a user's balance.
#[contractclient(name = "RewardsHookClient")]
pub trait RewardsHook {
    fn handle_action(env: Env, pool: Address, user: Address, total_supply: i128, user_balance: i128);
}

/// Administrative surface of the reward engine used by the period operator.
#[contractclient(name = "RewardsDistributorClient")]
pub trait RewardsDistributor {
    fn fund(env: Env, funder: Address, amount: i128);
    fn start_reward_period(env: Env, funder: Address, pool: Address, amount: i128);
    fn set_rewards_period_duration(env: Env, admin: Address, seconds: u64);
    fn is_rewards_period_finished(env: Env, pool: Address) -> bool;
}
