#![no_std]

pub mod emission;
pub mod events;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");
const DEV: Symbol = symbol_short!("DEV");
const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const REWARD_RATE: Symbol = symbol_short!("RWD_RATE");
const START_HEIGHT: Symbol = symbol_short!("START_H");
const BONUS_END: Symbol = symbol_short!("BONUS_END");
const BONUS_MULT: Symbol = symbol_short!("BONUS_MUL");
const TOTAL_WEIGHT: Symbol = symbol_short!("TOT_WGT");
const POOL_COUNT: Symbol = symbol_short!("POOL_CTR");

// Per-pool and per-position persistent storage uses tuple keys:
//   (POOL, pool_id)        → Pool
//   (POS, pool_id, user)   → UserPosition
const POOL: Symbol = symbol_short!("POOL");
const USER_POS: Symbol = symbol_short!("POS");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InvalidPoolId = 5,
    InsufficientPosition = 6,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// One deposit-token bucket with its own emission share and accumulator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    /// Token accepted by this pool. Immutable once created.
    pub deposit_token: Address,
    /// Share of global emission relative to the sum of all pool weights.
    pub alloc_weight: i128,
    /// Height at which the accumulator was last brought current.
    pub last_accrual_height: u64,
    /// Cumulative reward per deposited unit, scaled by `emission::PRECISION`.
    /// Never decreases for the life of the pool.
    pub acc_reward_per_share: i128,
    /// Sum of all positions' deposited amounts.
    pub total_deposited: i128,
}

/// A user's stake in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    /// Accumulator value already credited: `amount × acc_per_share / PRECISION`
    /// at the last settlement. Subtracted when computing newly owed reward.
    pub reward_debt: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct FarmContract;

#[contractimpl]
impl FarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `owner`             – may mutate the pool registry and emission rate.
    /// * `dev`               – receives 1/10 of every pool reward, minted alongside.
    /// * `reward_token`      – SAC address of the emitted token. The contract
    ///                         must be made its asset admin for minting to work.
    /// * `reward_per_height` – base emission in tokens per ledger height.
    /// * `start_height`      – emission begins at this ledger sequence.
    /// * `bonus_end_height`  – the multiplier applies to `[start, bonus_end)`.
    /// * `bonus_multiplier`  – integer factor ≥ 1 inside the bonus window.
    pub fn initialize(
        env: Env,
        owner: Address,
        dev: Address,
        reward_token: Address,
        reward_per_height: i128,
        start_height: u64,
        bonus_end_height: u64,
        bonus_multiplier: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_per_height < 0 || bonus_multiplier < 1 {
            return Err(ContractError::InvalidInput);
        }
        if bonus_end_height < start_height {
            return Err(ContractError::InvalidInput);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&OWNER, &owner);
        env.storage().instance().set(&DEV, &dev);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&REWARD_RATE, &reward_per_height);
        env.storage().instance().set(&START_HEIGHT, &start_height);
        env.storage().instance().set(&BONUS_END, &bonus_end_height);
        env.storage().instance().set(&BONUS_MULT, &bonus_multiplier);
        // TOTAL_WEIGHT and POOL_COUNT start at zero; unwrap_or(0) handles
        // absent keys, so no explicit init needed.

        events::publish_initialized(
            &env,
            owner,
            dev,
            reward_token,
            reward_per_height,
            start_height,
            bonus_end_height,
            bonus_multiplier,
        );

        Ok(())
    }

    // ── Pool registry ───────────────────────────────────────────────────────

    /// Register a new pool for `deposit_token` and return its id.
    ///
    /// When `with_update` is set, every existing pool is brought current
    /// first so the weight change only affects accrual from this height on.
    ///
    /// Registering the same token twice creates two independent pools that
    /// split its deposits and emission between their accumulators; the
    /// registry does not enforce uniqueness.
    pub fn add_pool(
        env: Env,
        caller: Address,
        alloc_weight: i128,
        deposit_token: Address,
        with_update: bool,
    ) -> Result<u64, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if alloc_weight < 0 {
            return Err(ContractError::InvalidInput);
        }

        if with_update {
            Self::accrue_all(&env)?;
        }

        let total: i128 = env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0);
        env.storage()
            .instance()
            .set(&TOTAL_WEIGHT, &total.saturating_add(alloc_weight));

        let start_height: u64 = env.storage().instance().get(&START_HEIGHT).unwrap_or(0);
        let pool_id: u64 = env.storage().instance().get(&POOL_COUNT).unwrap_or(0);
        let pool = Pool {
            deposit_token: deposit_token.clone(),
            alloc_weight,
            last_accrual_height: Self::current_height(&env).max(start_height),
            acc_reward_per_share: 0,
            total_deposited: 0,
        };
        Self::store_pool(&env, pool_id, &pool);
        env.storage()
            .instance()
            .set(&POOL_COUNT, &(pool_id.saturating_add(1)));

        events::publish_pool_added(&env, pool_id, deposit_token, alloc_weight);

        Ok(pool_id)
    }

    /// Change a pool's allocation weight.
    ///
    /// Pass `with_update` to flush all pools at the old weights first;
    /// otherwise already-elapsed heights are re-priced at the new split.
    pub fn set_pool_weight(
        env: Env,
        caller: Address,
        pool_id: u64,
        alloc_weight: i128,
        with_update: bool,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if alloc_weight < 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut pool = Self::load_pool(&env, pool_id)?;

        if with_update {
            Self::accrue_all(&env)?;
            pool = Self::load_pool(&env, pool_id)?;
        }

        let total: i128 = env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0);
        let new_total = total
            .saturating_sub(pool.alloc_weight)
            .saturating_add(alloc_weight);
        env.storage().instance().set(&TOTAL_WEIGHT, &new_total);

        pool.alloc_weight = alloc_weight;
        Self::store_pool(&env, pool_id, &pool);

        events::publish_pool_weight_set(&env, pool_id, alloc_weight);

        Ok(())
    }

    // ── Accrual ─────────────────────────────────────────────────────────────

    /// Bring one pool's accumulator current. Idempotent per height: a
    /// second call at the same sequence is a no-op. Callable by anyone.
    pub fn update_pool(env: Env, pool_id: u64) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;

        let mut pool = Self::load_pool(&env, pool_id)?;
        Self::accrue_pool(&env, &mut pool)?;
        Self::store_pool(&env, pool_id, &pool);

        Ok(())
    }

    /// Bring every pool current. O(pool count); intended for rare admin
    /// moments, not the per-user hot path.
    pub fn update_all_pools(env: Env) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        Self::accrue_all(&env)
    }

    // ── User ledger ─────────────────────────────────────────────────────────

    /// Deposit `amount` of the pool's token. A zero amount is legal and
    /// simply harvests pending rewards.
    ///
    /// The pool accumulator is updated first so the deposit does not
    /// retroactively earn on the newly added tokens, then any pending
    /// reward is paid before the position grows.
    pub fn deposit(
        env: Env,
        user: Address,
        pool_id: u64,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount < 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut pool = Self::load_pool(&env, pool_id)?;
        Self::accrue_pool(&env, &mut pool)?;

        let mut pos = Self::load_position(&env, pool_id, &user);
        Self::settle(&env, pool_id, &pool, &pos, &user)?;

        if amount > 0 {
            token::Client::new(&env, &pool.deposit_token).transfer(
                &user,
                &env.current_contract_address(),
                &amount,
            );
            pos.amount = pos.amount.saturating_add(amount);
            pool.total_deposited = pool.total_deposited.saturating_add(amount);
        }
        pos.reward_debt = emission::reward_debt(pos.amount, pool.acc_reward_per_share);

        Self::store_position(&env, pool_id, &user, &pos);
        Self::store_pool(&env, pool_id, &pool);

        events::publish_deposited(&env, pool_id, user, amount, pool.total_deposited);

        Ok(())
    }

    /// Withdraw `amount` of the pool's token, paying out pending rewards
    /// along the way. Fails with `InsufficientPosition` when `amount`
    /// exceeds the deposited balance.
    pub fn withdraw(
        env: Env,
        user: Address,
        pool_id: u64,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount < 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut pool = Self::load_pool(&env, pool_id)?;
        let mut pos = Self::load_position(&env, pool_id, &user);
        if pos.amount < amount {
            return Err(ContractError::InsufficientPosition);
        }

        Self::accrue_pool(&env, &mut pool)?;
        Self::settle(&env, pool_id, &pool, &pos, &user)?;

        if amount > 0 {
            pos.amount = pos.amount.saturating_sub(amount);
            pool.total_deposited = pool.total_deposited.saturating_sub(amount);
            token::Client::new(&env, &pool.deposit_token).transfer(
                &env.current_contract_address(),
                &user,
                &amount,
            );
        }
        pos.reward_debt = emission::reward_debt(pos.amount, pool.acc_reward_per_share);

        Self::store_position(&env, pool_id, &user, &pos);
        Self::store_pool(&env, pool_id, &pool);

        events::publish_withdrawn(&env, pool_id, user, amount, pool.total_deposited);

        Ok(())
    }

    /// Return the full deposit without touching the reward token.
    ///
    /// Escape hatch: forfeits all unclaimed pending reward, but never
    /// depends on reward-token health. Returns the amount handed back.
    pub fn emergency_withdraw(
        env: Env,
        user: Address,
        pool_id: u64,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        let mut pool = Self::load_pool(&env, pool_id)?;
        let pos = Self::load_position(&env, pool_id, &user);

        let amount = pos.amount;
        if amount > 0 {
            pool.total_deposited = pool.total_deposited.saturating_sub(amount);
            token::Client::new(&env, &pool.deposit_token).transfer(
                &env.current_contract_address(),
                &user,
                &amount,
            );
        }

        Self::store_position(
            &env,
            pool_id,
            &user,
            &UserPosition {
                amount: 0,
                reward_debt: 0,
            },
        );
        Self::store_pool(&env, pool_id, &pool);

        events::publish_emergency_withdrawn(&env, pool_id, user, amount);

        Ok(amount)
    }

    // ── View functions ──────────────────────────────────────────────────────

    /// Real-time pending reward for a position, without mutating state.
    ///
    /// Simulates the accrual a real `update_pool` would perform at the
    /// current height, so the result matches what `deposit(user, id, 0)`
    /// would pay out in the same ledger.
    pub fn pending_reward(env: Env, pool_id: u64, user: Address) -> Result<i128, ContractError> {
        let pool = Self::load_pool(&env, pool_id)?;
        let pos = Self::load_position(&env, pool_id, &user);

        let mut acc = pool.acc_reward_per_share;
        let current = Self::current_height(&env);
        if current > pool.last_accrual_height && pool.total_deposited > 0 {
            let start: u64 = env.storage().instance().get(&START_HEIGHT).unwrap_or(0);
            let bonus_end: u64 = env.storage().instance().get(&BONUS_END).unwrap_or(0);
            let bonus_mult: i128 = env.storage().instance().get(&BONUS_MULT).unwrap_or(1);
            let rate: i128 = env.storage().instance().get(&REWARD_RATE).unwrap_or(0);
            let total_weight: i128 = env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0);

            let units = emission::accrued_units(
                pool.last_accrual_height,
                current,
                start,
                bonus_end,
                bonus_mult,
            );
            let reward = emission::pool_reward(units, rate, pool.alloc_weight, total_weight);
            acc = acc.saturating_add(emission::per_share_delta(reward, pool.total_deposited));
        }

        Ok(emission::pending(pos.amount, acc, pos.reward_debt))
    }

    /// Number of registered pools. Pool ids are dense: `0..pool_length()`.
    pub fn pool_length(env: Env) -> u64 {
        env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
    }

    pub fn get_pool(env: Env, pool_id: u64) -> Result<Pool, ContractError> {
        Self::load_pool(&env, pool_id)
    }

    /// The stored position for `(pool, user)`; zeroed when none exists.
    pub fn get_user_position(env: Env, pool_id: u64, user: Address) -> UserPosition {
        Self::load_position(&env, pool_id, &user)
    }

    pub fn get_reward_rate(env: Env) -> i128 {
        env.storage().instance().get(&REWARD_RATE).unwrap_or(0)
    }

    pub fn get_total_weight(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0)
    }

    pub fn get_start_height(env: Env) -> u64 {
        env.storage().instance().get(&START_HEIGHT).unwrap_or(0)
    }

    pub fn get_bonus_end_height(env: Env) -> u64 {
        env.storage().instance().get(&BONUS_END).unwrap_or(0)
    }

    pub fn get_bonus_multiplier(env: Env) -> i128 {
        env.storage().instance().get(&BONUS_MULT).unwrap_or(1)
    }

    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&OWNER)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_dev(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DEV)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Admin functions ─────────────────────────────────────────────────────

    /// Change the base emission rate.
    ///
    /// Every pool is flushed at the old rate first, so the change is
    /// forward-only: already-elapsed heights keep their original pricing.
    pub fn set_reward_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if new_rate < 0 {
            return Err(ContractError::InvalidInput);
        }

        Self::accrue_all(&env)?;

        env.storage().instance().set(&REWARD_RATE, &new_rate);

        events::publish_reward_rate_set(&env, new_rate);

        Ok(())
    }

    /// Reassign the dev-cut recipient. Only the current recipient may call.
    pub fn set_dev(env: Env, caller: Address, new_dev: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let dev: Address = env
            .storage()
            .instance()
            .get(&DEV)
            .ok_or(ContractError::NotInitialized)?;
        if caller != dev {
            return Err(ContractError::Unauthorized);
        }

        env.storage().instance().set(&DEV, &new_dev);

        events::publish_dev_set(&env, dev, new_dev);

        Ok(())
    }

    /// Hand the registry- and rate-mutating capability to a new principal.
    /// Takes effect immediately: the old owner's calls fail from the next
    /// invocation on. The new owner may be a timelock contract.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        env.storage().instance().set(&OWNER, &new_owner);

        events::publish_ownership_transferred(&env, caller, new_owner);

        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn current_height(env: &Env) -> u64 {
        u64::from(env.ledger().sequence())
    }

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` is not the stored owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != owner {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn load_pool(env: &Env, pool_id: u64) -> Result<Pool, ContractError> {
        env.storage()
            .persistent()
            .get(&(POOL, pool_id))
            .ok_or(ContractError::InvalidPoolId)
    }

    fn store_pool(env: &Env, pool_id: u64, pool: &Pool) {
        env.storage().persistent().set(&(POOL, pool_id), pool);
    }

    fn load_position(env: &Env, pool_id: u64, user: &Address) -> UserPosition {
        env.storage()
            .persistent()
            .get(&(USER_POS, pool_id, user.clone()))
            .unwrap_or(UserPosition {
                amount: 0,
                reward_debt: 0,
            })
    }

    fn store_position(env: &Env, pool_id: u64, user: &Address, pos: &UserPosition) {
        env.storage()
            .persistent()
            .set(&(USER_POS, pool_id, user.clone()), pos);
    }

    /// Catch a pool's accumulator up to the current height.
    ///
    /// The interval reward is minted here (`reward / 10` to the dev
    /// address, `reward` into the contract's own custody) atomically
    /// with the accumulator advance; a trap anywhere rolls back both.
    /// Intervals with nothing deposited are forfeited, not carried forward.
    fn accrue_pool(env: &Env, pool: &mut Pool) -> Result<(), ContractError> {
        let current = Self::current_height(env);
        if current <= pool.last_accrual_height {
            return Ok(());
        }
        if pool.total_deposited <= 0 {
            pool.last_accrual_height = current;
            return Ok(());
        }

        let start: u64 = env.storage().instance().get(&START_HEIGHT).unwrap_or(0);
        let bonus_end: u64 = env.storage().instance().get(&BONUS_END).unwrap_or(0);
        let bonus_mult: i128 = env.storage().instance().get(&BONUS_MULT).unwrap_or(1);
        let rate: i128 = env.storage().instance().get(&REWARD_RATE).unwrap_or(0);
        let total_weight: i128 = env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0);

        let units = emission::accrued_units(
            pool.last_accrual_height,
            current,
            start,
            bonus_end,
            bonus_mult,
        );
        let reward = emission::pool_reward(units, rate, pool.alloc_weight, total_weight);

        if reward > 0 {
            let reward_token: Address = env
                .storage()
                .instance()
                .get(&REWARD_TOKEN)
                .ok_or(ContractError::NotInitialized)?;
            let dev: Address = env
                .storage()
                .instance()
                .get(&DEV)
                .ok_or(ContractError::NotInitialized)?;

            let minter = token::StellarAssetClient::new(env, &reward_token);
            let cut = emission::dev_cut(reward);
            if cut > 0 {
                minter.mint(&dev, &cut);
            }
            minter.mint(&env.current_contract_address(), &reward);

            pool.acc_reward_per_share = pool
                .acc_reward_per_share
                .saturating_add(emission::per_share_delta(reward, pool.total_deposited));
        }

        pool.last_accrual_height = current;

        Ok(())
    }

    fn accrue_all(env: &Env) -> Result<(), ContractError> {
        let count: u64 = env.storage().instance().get(&POOL_COUNT).unwrap_or(0);
        for pool_id in 0..count {
            let mut pool = Self::load_pool(env, pool_id)?;
            Self::accrue_pool(env, &mut pool)?;
            Self::store_pool(env, pool_id, &pool);
        }
        Ok(())
    }

    /// Pay out whatever the position is owed against the current
    /// accumulator. Callers reset `reward_debt` afterwards.
    fn settle(
        env: &Env,
        pool_id: u64,
        pool: &Pool,
        pos: &UserPosition,
        user: &Address,
    ) -> Result<i128, ContractError> {
        if pos.amount <= 0 {
            return Ok(0);
        }

        let owed = emission::pending(pos.amount, pool.acc_reward_per_share, pos.reward_debt);
        if owed <= 0 {
            return Ok(0);
        }

        let paid = Self::safe_reward_transfer(env, user, owed)?;
        if paid > 0 {
            events::publish_reward_paid(env, pool_id, user.clone(), paid);
        }

        Ok(paid)
    }

    /// Transfer up to `amount` reward tokens from the contract's custody,
    /// capped at its balance so rounding drift can never brick a
    /// withdrawal. Returns the amount actually moved.
    fn safe_reward_transfer(env: &Env, to: &Address, amount: i128) -> Result<i128, ContractError> {
        let reward_token: Address = env
            .storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)?;

        let client = token::Client::new(env, &reward_token);
        let held = client.balance(&env.current_contract_address());
        let paid = amount.min(held);
        if paid > 0 {
            client.transfer(&env.current_contract_address(), to, &paid);
        }

        Ok(paid)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
