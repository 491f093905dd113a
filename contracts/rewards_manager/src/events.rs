use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub rewards_initializer: Address,
    pub reward_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodStartedEvent {
    pub rewards_contract: Address,
    pub pool: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub previous_owner: Address,
    pub new_owner: Address,
}

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    rewards_initializer: Address,
    reward_token: Address,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            rewards_initializer,
            reward_token,
        },
    );
}

pub fn publish_period_started(env: &Env, rewards_contract: Address, pool: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("NEXT_PER"), pool.clone()),
        PeriodStartedEvent {
            rewards_contract,
            pool,
            amount,
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWNER"), new_owner.clone()),
        OwnershipTransferredEvent {
            previous_owner,
            new_owner,
        },
    );
}
