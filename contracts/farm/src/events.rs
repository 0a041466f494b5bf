#![allow(deprecated)]

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub dev: Address,
    pub reward_token: Address,
    pub reward_per_height: i128,
    pub start_height: u64,
    pub bonus_end_height: u64,
    pub bonus_multiplier: i128,
    pub timestamp: u64,
}

/// Fired when the owner registers a new pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u64,
    pub deposit_token: Address,
    pub alloc_weight: i128,
    pub timestamp: u64,
}

/// Fired when the owner changes a pool's allocation weight.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolWeightSetEvent {
    pub pool_id: u64,
    pub alloc_weight: i128,
    pub timestamp: u64,
}

/// Fired when a user deposits into a pool (a zero amount is a harvest).
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub pool_id: u64,
    pub user: Address,
    pub amount: i128,
    pub total_deposited: i128,
    pub timestamp: u64,
}

/// Fired when a user withdraws part of their position.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub pool_id: u64,
    pub user: Address,
    pub amount: i128,
    pub total_deposited: i128,
    pub timestamp: u64,
}

/// Fired when a user abandons pending rewards to recover their deposit.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub pool_id: u64,
    pub user: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired whenever settled rewards are paid out to a user.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub pool_id: u64,
    pub user: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the owner changes the base emission rate.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardRateSetEvent {
    pub new_rate: i128,
    pub timestamp: u64,
}

/// Fired when the dev-cut recipient reassigns itself.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DevSetEvent {
    pub old_dev: Address,
    pub new_dev: Address,
    pub timestamp: u64,
}

/// Fired when ownership moves to a new principal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub old_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    dev: Address,
    reward_token: Address,
    reward_per_height: i128,
    start_height: u64,
    bonus_end_height: u64,
    bonus_multiplier: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            dev,
            reward_token,
            reward_per_height,
            start_height,
            bonus_end_height,
            bonus_multiplier,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_added(env: &Env, pool_id: u64, deposit_token: Address, alloc_weight: i128) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolAddedEvent {
            pool_id,
            deposit_token,
            alloc_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_weight_set(env: &Env, pool_id: u64, alloc_weight: i128) {
    env.events().publish(
        (symbol_short!("WGT_SET"), pool_id),
        PoolWeightSetEvent {
            pool_id,
            alloc_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(env: &Env, pool_id: u64, user: Address, amount: i128, total_deposited: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone()),
        DepositedEvent {
            pool_id,
            user,
            amount,
            total_deposited,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, pool_id: u64, user: Address, amount: i128, total_deposited: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), user.clone()),
        WithdrawnEvent {
            pool_id,
            user,
            amount,
            total_deposited,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdrawn(env: &Env, pool_id: u64, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EMERG_WD"), user.clone()),
        EmergencyWithdrawnEvent {
            pool_id,
            user,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_paid(env: &Env, pool_id: u64, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), user.clone()),
        RewardPaidEvent {
            pool_id,
            user,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_rate_set(env: &Env, new_rate: i128) {
    env.events().publish(
        (symbol_short!("RWD_RATE"),),
        RewardRateSetEvent {
            new_rate,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_dev_set(env: &Env, old_dev: Address, new_dev: Address) {
    env.events().publish(
        (symbol_short!("DEV_SET"), new_dev.clone()),
        DevSetEvent {
            old_dev,
            new_dev,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, old_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWN_XFER"), new_owner.clone()),
        OwnershipTransferredEvent {
            old_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}
