//! Property tests over random interleavings of stake changes, period starts,
//! claims and time.
//!
//! These drive the pure accrual types directly, with the pool ledger and
//! funding totals modelled alongside, so thousands of sequences run without
//! deploying a contract. The environment only hosts 256-bit arithmetic.

use std::vec::Vec;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::Env;

use crate::rewards::{earned, AccrualState, RewardPeriod, UserCheckpoint};

const DAY: u64 = 86_400;
const DURATION: u64 = 30 * DAY;
const USERS: usize = 3;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Advance(#[proptest(strategy = "1u64..=864_000")] u64),
    Deposit(
        #[proptest(strategy = "0usize..3")] usize,
        #[proptest(strategy = "1i128..=1_000_000_000")] i128,
    ),
    Withdraw(
        #[proptest(strategy = "0usize..3")] usize,
        #[proptest(strategy = "1i128..=1_000_000_000")] i128,
    ),
    Start(#[proptest(strategy = "1i128..=1_000_000_000_000")] i128),
    Claim(#[proptest(strategy = "0usize..3")] usize),
}

/// One pool with its ledger, as the contract would see it.
struct Pool {
    env: Env,
    now: u64,
    period: RewardPeriod,
    state: AccrualState,
    checkpoints: Vec<UserCheckpoint>,
    balances: Vec<i128>,
    committed: i128,
    claimed: i128,
}

impl Pool {
    fn new() -> Self {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();
        Pool {
            env,
            now: 1_000,
            period: RewardPeriod::default(),
            state: AccrualState::default(),
            checkpoints: (0..USERS).map(|_| UserCheckpoint::default()).collect(),
            balances: (0..USERS).map(|_| 0).collect(),
            committed: 0,
            claimed: 0,
        }
    }

    fn supply(&self) -> i128 {
        self.balances.iter().sum()
    }

    fn settle(&mut self, user: usize) {
        let supply = self.supply();
        self.state
            .refresh(&self.env, &self.period, supply, self.now)
            .unwrap();
        self.checkpoints[user]
            .settle(&self.env, &self.state, self.balances[user])
            .unwrap();
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Advance(seconds) => self.now += seconds,
            Op::Deposit(user, amount) => {
                self.settle(user);
                self.balances[user] += amount;
            }
            Op::Withdraw(user, amount) => {
                let amount = amount.min(self.balances[user]);
                self.settle(user);
                self.balances[user] -= amount;
            }
            Op::Start(amount) => {
                let supply = self.supply();
                let env = &self.env;
                self.state.refresh(env, &self.period, supply, self.now).unwrap();
                self.period = self.period.next(env, amount, DURATION, self.now).unwrap();
                self.state.refresh(env, &self.period, supply, self.now).unwrap();
                self.committed += amount;
            }
            Op::Claim(user) => {
                self.settle(user);
                self.claimed += self.checkpoints[user].take(i128::MAX);
            }
        }
    }

    /// Everything owed right now, settled or not.
    fn owed(&self) -> i128 {
        let mut state = self.state.clone();
        state
            .refresh(&self.env, &self.period, self.supply(), self.now)
            .unwrap();
        (0..USERS)
            .map(|user| {
                let mut checkpoint = self.checkpoints[user].clone();
                checkpoint
                    .settle(&self.env, &state, self.balances[user])
                    .unwrap();
                checkpoint.accrued_unclaimed
            })
            .sum()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_payouts_never_exceed_funding(ops in prop::collection::vec(any::<Op>(), 1..60)) {
        let mut pool = Pool::new();
        for op in &ops {
            pool.apply(op);
            prop_assert!(pool.claimed + pool.owed() <= pool.committed);
        }
    }

    #[test]
    fn prop_accumulator_never_decreases(ops in prop::collection::vec(any::<Op>(), 1..60)) {
        let mut pool = Pool::new();
        for op in &ops {
            let before = pool.state.clone();
            pool.apply(op);
            prop_assert!(pool.state.reward_per_unit_stored >= before.reward_per_unit_stored);
            prop_assert!(pool.state.last_update_time >= before.last_update_time);
            prop_assert!(pool.state.last_update_time <= pool.now);
            for checkpoint in &pool.checkpoints {
                prop_assert!(checkpoint.reward_per_unit_paid <= pool.state.reward_per_unit_stored);
                prop_assert!(checkpoint.accrued_unclaimed >= 0);
            }
        }
    }

    #[test]
    fn prop_settling_twice_changes_nothing(ops in prop::collection::vec(any::<Op>(), 1..40)) {
        let mut pool = Pool::new();
        for op in &ops {
            pool.apply(op);
        }

        let env = &pool.env;
        let mut state = pool.state.clone();
        state.refresh(env, &pool.period, pool.supply(), pool.now).unwrap();
        let refreshed = state.clone();
        state.refresh(env, &pool.period, pool.supply(), pool.now).unwrap();
        prop_assert_eq!(&state, &refreshed);

        for user in 0..USERS {
            let mut checkpoint = pool.checkpoints[user].clone();
            checkpoint.settle(env, &state, pool.balances[user]).unwrap();
            let settled = checkpoint.clone();
            prop_assert_eq!(checkpoint.settle(env, &state, pool.balances[user]), Ok(0));
            prop_assert_eq!(checkpoint, settled);
        }
    }

    #[test]
    fn prop_rewards_are_proportional_to_stake(
        first in 1i128..=1_000_000_000_000,
        second in 1i128..=1_000_000_000_000,
        amount in 1i128..=1_000_000_000_000,
        elapsed in 1u64..=DURATION,
    ) {
        let env = Env::default();
        let period = RewardPeriod::default().next(&env, amount, DURATION, 0).unwrap();
        let mut state = AccrualState::default();
        state.refresh(&env, &period, first + second, elapsed).unwrap();

        let e1 = earned(&env, first, state.reward_per_unit_stored, 0, 0).unwrap();
        let e2 = earned(&env, second, state.reward_per_unit_stored, 0, 0).unwrap();

        // Truncation costs each side less than one unit.
        prop_assert!((e1 * second - e2 * first).abs() <= first.max(second));
        prop_assert!(e1 + e2 <= amount);
    }
}
