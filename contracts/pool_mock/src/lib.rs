#![no_std]

//! Minimal value-pool ledger for exercising the reward engine.
//!
//! Balances are plain integers. Every mutation first reports the affected
//! parties' *pre-change* balance and the pre-change supply to the configured
//! rewards hook, mirroring how a production pool token must behave.

use common::interfaces::RewardsHookClient;
use soroban_sdk::{contract, contracterror, contractimpl, symbol_short, Address, Env, Symbol};

const HOOK: Symbol = symbol_short!("HOOK");
const SUPPLY: Symbol = symbol_short!("SUPPLY");
const BALANCE: Symbol = symbol_short!("BAL");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PoolError {
    InvalidAmount = 1,
    InsufficientBalance = 2,
}

#[contract]
pub struct PoolMock;

#[contractimpl]
impl PoolMock {
    /// Point the pool at the reward engine it must notify.
    pub fn set_incentives(env: Env, incentives: Address) {
        env.storage().instance().set(&HOOK, &incentives);
    }

    pub fn get_incentives(env: Env) -> Option<Address> {
        env.storage().instance().get(&HOOK)
    }

    pub fn mint(env: Env, user: Address, amount: i128) -> Result<(), PoolError> {
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        let supply = Self::total_supply(env.clone());
        let balance = Self::balance_of(env.clone(), user.clone());
        Self::notify(&env, &user, supply, balance);

        Self::write_balance(&env, &user, balance + amount);
        env.storage().instance().set(&SUPPLY, &(supply + amount));
        Ok(())
    }

    pub fn burn(env: Env, user: Address, amount: i128) -> Result<(), PoolError> {
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        let supply = Self::total_supply(env.clone());
        let balance = Self::balance_of(env.clone(), user.clone());
        if balance < amount {
            return Err(PoolError::InsufficientBalance);
        }
        Self::notify(&env, &user, supply, balance);

        Self::write_balance(&env, &user, balance - amount);
        env.storage().instance().set(&SUPPLY, &(supply - amount));
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), PoolError> {
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        let supply = Self::total_supply(env.clone());
        let from_balance = Self::balance_of(env.clone(), from.clone());
        if from_balance < amount {
            return Err(PoolError::InsufficientBalance);
        }
        let to_balance = Self::balance_of(env.clone(), to.clone());

        // Both parties settle against the supply that was in effect up to now.
        Self::notify(&env, &from, supply, from_balance);
        if from != to {
            Self::notify(&env, &to, supply, to_balance);
            Self::write_balance(&env, &from, from_balance - amount);
            Self::write_balance(&env, &to, to_balance + amount);
        }
        Ok(())
    }

    pub fn balance_of(env: Env, user: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(BALANCE, user))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage().instance().get(&SUPPLY).unwrap_or(0)
    }

    fn write_balance(env: &Env, user: &Address, amount: i128) {
        env.storage()
            .persistent()
            .set(&(BALANCE, user.clone()), &amount);
    }

    fn notify(env: &Env, user: &Address, supply: i128, balance: i128) {
        if let Some(hook) = env.storage().instance().get::<_, Address>(&HOOK) {
            RewardsHookClient::new(env, &hook).handle_action(
                &env.current_contract_address(),
                user,
                &supply,
                &balance,
            );
        }
    }
}
