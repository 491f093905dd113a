#![no_main]

//! Random stake, period and claim sequences against the engine and two pools.
//! After every step custody must cover the engine's liabilities and nothing
//! may be paid beyond what was committed. Engine calls never fail here; a pool
//! may only reject its own bad input.

use arbitrary::Arbitrary;
use incentives::{IncentivesController, IncentivesControllerClient};
use libfuzzer_sys::fuzz_target;
use pool_mock::{PoolError, PoolMock, PoolMockClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{StellarAssetClient, TokenClient},
    Address, Env, Vec,
};

const USERS: usize = 3;
const DURATION: u64 = 7 * 86_400;

/// A pool call may be refused for its own input, never because the engine's
/// stake-change hook failed underneath it.
fn check_pool<T, E: core::fmt::Debug>(result: Result<T, Result<PoolError, E>>) {
    if let Err(err) = result {
        assert!(
            matches!(
                err,
                Ok(PoolError::InvalidAmount | PoolError::InsufficientBalance)
            ),
            "pool call failed in the engine: {err:?}"
        );
    }
}

#[derive(Arbitrary, Debug)]
enum Action {
    Advance { seconds: u32 },
    Mint { pool: bool, user: u8, amount: u32 },
    Burn { pool: bool, user: u8, amount: u32 },
    Transfer { pool: bool, from: u8, to: u8, amount: u32 },
    Start { pool: bool, amount: u32 },
    Claim { user: u8, amount: u32, both: bool },
}

fuzz_target!(|actions: std::vec::Vec<Action>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let token = TokenClient::new(&env, &asset.address());
    let token_admin = StellarAssetClient::new(&env, &asset.address());

    let incentives =
        IncentivesControllerClient::new(&env, &env.register(IncentivesController, ()));
    incentives.initialize(&admin, &asset.address(), &DURATION);

    let pools: [PoolMockClient; 2] = core::array::from_fn(|_| {
        let pool = PoolMockClient::new(&env, &env.register(PoolMock, ()));
        pool.set_incentives(&incentives.address);
        pool
    });
    let users: std::vec::Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();
    let pick = |i: u8| &users[i as usize % USERS];
    let pool_of = |second: bool| &pools[second as usize];

    let mut paid: i128 = 0;
    for action in actions.iter().take(64) {
        match *action {
            Action::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds % (3 * DURATION as u32)));
            }
            Action::Mint { pool, user, amount } => {
                check_pool(pool_of(pool).try_mint(pick(user), &i128::from(amount)));
            }
            Action::Burn { pool, user, amount } => {
                check_pool(pool_of(pool).try_burn(pick(user), &i128::from(amount)));
            }
            Action::Transfer { pool, from, to, amount } => {
                check_pool(pool_of(pool).try_transfer(pick(from), pick(to), &i128::from(amount)));
            }
            Action::Start { pool, amount } => {
                let amount = i128::from(amount.max(1));
                token_admin.mint(&incentives.address, &amount);
                incentives.fund(&admin, &amount);
                incentives.start_reward_period(&admin, &pool_of(pool).address, &amount);
            }
            Action::Claim { user, amount, both } => {
                let mut list = Vec::new(&env);
                list.push_back(pools[0].address.clone());
                if both {
                    list.push_back(pools[1].address.clone());
                }
                let user = pick(user);
                paid += incentives.claim_rewards(user, &list, &i128::from(amount), user);
            }
        }

        let committed = incentives.get_total_committed();
        let claimed = incentives.get_total_claimed();
        let reserve = incentives.get_reserve();
        let held = token.balance(&incentives.address);

        assert_eq!(claimed, paid);
        assert!(claimed <= committed);
        assert!(held >= reserve + committed - claimed);

        let mut owed = 0;
        for pool in &pools {
            let list = Vec::from_array(&env, [pool.address.clone()]);
            for user in &users {
                owed += incentives.get_rewards_balance(&list, user);
            }
        }
        assert!(claimed + owed <= committed);
    }
});
