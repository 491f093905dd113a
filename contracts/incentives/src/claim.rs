use common::interfaces::BalanceOracleClient;
use soroban_sdk::{token, Address, Env, Vec};

use crate::accounting;
use crate::events;
use crate::fixed_point;
use crate::rewards::UserCheckpoint;
use crate::storage;
use crate::ContractError;

/// Settle `user` on every pool in `pools` and pay up to `amount` to `to`.
///
/// Pools are drained in list order, each one fully before the next. Returns
/// the amount paid; claiming with nothing accrued (or `amount == 0`) pays
/// nothing and succeeds.
///
/// The checkpoint decrements and the custody transfer run in the same
/// invocation, so a failing transfer rolls the decrements back with it.
pub fn claim(
    env: &Env,
    user: &Address,
    claimer: &Address,
    pools: &Vec<Address>,
    amount: i128,
    to: &Address,
) -> Result<i128, ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidInput);
    }
    if amount == 0 {
        return Ok(0);
    }
    let now = env.ledger().timestamp();

    let mut settled: Vec<(Address, UserCheckpoint)> = Vec::new(env);
    let mut unclaimed: i128 = 0;
    for pool in accounting::unique_pools(env, pools).iter() {
        let oracle = BalanceOracleClient::new(env, &pool);
        let checkpoint = accounting::settle_user(
            env,
            &pool,
            user,
            oracle.total_supply(),
            oracle.balance_of(user),
            now,
        )?;
        unclaimed = fixed_point::add(unclaimed, checkpoint.accrued_unclaimed)?;
        settled.push_back((pool, checkpoint));
    }

    let claimable = unclaimed.min(amount);
    if claimable == 0 {
        return Ok(0);
    }

    let mut remaining = claimable;
    for (pool, mut checkpoint) in settled.iter() {
        if remaining == 0 {
            break;
        }
        let taken = checkpoint.take(remaining);
        if taken == 0 {
            continue;
        }
        remaining -= taken;
        storage::set_checkpoint(env, &pool, user, &checkpoint);
        storage::record_pool_claim(env, &pool, taken)?;
    }
    storage::record_claim(env, claimable)?;

    let reward_token = storage::get_reward_token(env)?;
    token::Client::new(env, &reward_token).transfer(
        &env.current_contract_address(),
        to,
        &claimable,
    );

    events::publish_rewards_claimed(env, user.clone(), claimer.clone(), to.clone(), claimable);

    Ok(claimable)
}
