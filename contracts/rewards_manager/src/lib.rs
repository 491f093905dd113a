#![no_std]

//! Operator for a single reward stream.
//!
//! Holds reward tokens between periods. When the rewards initializer asks for
//! the next period, the whole balance is moved into the reward engine's
//! custody, credited, and streamed to the configured pool.

pub mod events;

use common::interfaces::RewardsDistributorClient;
use common::ttl;
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol};

const OWNER: Symbol = symbol_short!("OWNER");
const INITIALIZER: Symbol = symbol_short!("INITR");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const REWARDS_CONTRACT: Symbol = symbol_short!("RWD_CTR");
const POOL: Symbol = symbol_short!("POOL");
const INITIALIZED: Symbol = symbol_short!("INIT");

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ManagerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    RewardsContractNotSet = 4,
    PoolNotSet = 5,
    NothingToDistribute = 6,
}

#[contract]
pub struct RewardsManager;

#[contractimpl]
impl RewardsManager {
    pub fn initialize(
        env: Env,
        owner: Address,
        rewards_initializer: Address,
        reward_token: Address,
    ) -> Result<(), ManagerError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ManagerError::AlreadyInitialized);
        }
        owner.require_auth();

        env.storage().instance().set(&OWNER, &owner);
        env.storage().instance().set(&INITIALIZER, &rewards_initializer);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&INITIALIZED, &true);
        ttl::extend_instance(&env);

        events::publish_initialized(&env, owner, rewards_initializer, reward_token);
        Ok(())
    }

    // ── Owner configuration ─────────────────────────────────────────────────

    /// Point the manager at the reward engine it feeds.
    pub fn set_rewards_contract(
        env: Env,
        owner: Address,
        rewards_contract: Address,
    ) -> Result<(), ManagerError> {
        Self::require_owner(&env, &owner)?;
        env.storage()
            .instance()
            .set(&REWARDS_CONTRACT, &rewards_contract);
        Ok(())
    }

    pub fn set_pool(env: Env, owner: Address, pool: Address) -> Result<(), ManagerError> {
        Self::require_owner(&env, &owner)?;
        env.storage().instance().set(&POOL, &pool);
        Ok(())
    }

    /// Forward a period length change to the engine. The manager must be the
    /// engine's admin.
    pub fn set_rewards_period_duration(
        env: Env,
        owner: Address,
        seconds: u64,
    ) -> Result<(), ManagerError> {
        Self::require_owner(&env, &owner)?;
        let rewards = Self::rewards_contract(&env)?;
        RewardsDistributorClient::new(&env, &rewards)
            .set_rewards_period_duration(&env.current_contract_address(), &seconds);
        Ok(())
    }

    pub fn set_rewards_initializer(
        env: Env,
        owner: Address,
        rewards_initializer: Address,
    ) -> Result<(), ManagerError> {
        Self::require_owner(&env, &owner)?;
        env.storage()
            .instance()
            .set(&INITIALIZER, &rewards_initializer);
        Ok(())
    }

    pub fn transfer_ownership(
        env: Env,
        owner: Address,
        new_owner: Address,
    ) -> Result<(), ManagerError> {
        Self::require_owner(&env, &owner)?;
        env.storage().instance().set(&OWNER, &new_owner);
        events::publish_ownership_transferred(&env, owner, new_owner);
        Ok(())
    }

    // ── Periods ─────────────────────────────────────────────────────────────

    /// Stream everything the manager holds to the pool as a new period.
    ///
    /// Returns the amount handed to the engine. The manager must pass the
    /// engine's funder gate.
    pub fn start_next_rewards_period(env: Env, initializer: Address) -> Result<i128, ManagerError> {
        Self::require_initialized(&env)?;
        initializer.require_auth();
        let expected: Address = env
            .storage()
            .instance()
            .get(&INITIALIZER)
            .ok_or(ManagerError::NotInitialized)?;
        if initializer != expected {
            return Err(ManagerError::Unauthorized);
        }

        let rewards = Self::rewards_contract(&env)?;
        let pool: Address = env
            .storage()
            .instance()
            .get(&POOL)
            .ok_or(ManagerError::PoolNotSet)?;
        let reward_token: Address = env
            .storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ManagerError::NotInitialized)?;

        let this = env.current_contract_address();
        let token = token::Client::new(&env, &reward_token);
        let amount = token.balance(&this);
        if amount <= 0 {
            log!(&env, "start_next_rewards_period: empty balance");
            return Err(ManagerError::NothingToDistribute);
        }

        token.transfer(&this, &rewards, &amount);
        let distributor = RewardsDistributorClient::new(&env, &rewards);
        distributor.fund(&this, &amount);
        distributor.start_reward_period(&this, &pool, &amount);
        ttl::extend_instance(&env);

        events::publish_period_started(&env, rewards, pool, amount);
        Ok(amount)
    }

    pub fn is_rewards_period_finished(env: Env) -> Result<bool, ManagerError> {
        let rewards = Self::rewards_contract(&env)?;
        let pool: Address = env
            .storage()
            .instance()
            .get(&POOL)
            .ok_or(ManagerError::PoolNotSet)?;
        Ok(RewardsDistributorClient::new(&env, &rewards).is_rewards_period_finished(&pool))
    }

    // ── Getters ─────────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Result<Address, ManagerError> {
        env.storage()
            .instance()
            .get(&OWNER)
            .ok_or(ManagerError::NotInitialized)
    }

    pub fn get_rewards_initializer(env: Env) -> Result<Address, ManagerError> {
        env.storage()
            .instance()
            .get(&INITIALIZER)
            .ok_or(ManagerError::NotInitialized)
    }

    pub fn get_rewards_contract(env: Env) -> Option<Address> {
        env.storage().instance().get(&REWARDS_CONTRACT)
    }

    pub fn get_pool(env: Env) -> Option<Address> {
        env.storage().instance().get(&POOL)
    }

    pub fn get_reward_token(env: Env) -> Result<Address, ManagerError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ManagerError::NotInitialized)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ManagerError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ManagerError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), ManagerError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(ManagerError::NotInitialized)?;
        caller.require_auth();
        if *caller != owner {
            return Err(ManagerError::Unauthorized);
        }
        Ok(())
    }

    fn rewards_contract(env: &Env) -> Result<Address, ManagerError> {
        env.storage()
            .instance()
            .get(&REWARDS_CONTRACT)
            .ok_or(ManagerError::RewardsContractNotSet)
    }
}
