#![no_std]

pub mod access;
pub mod accumulator;
pub mod events;
pub mod pool;
pub mod registry;
pub mod schedule;

use common::{math, ttl, CommonError, ReentrancyGuard};
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env, Vec};

pub use accumulator::SCALE;
pub use registry::{AssetDescriptor, AssetRole};
pub use schedule::{ScheduleState, ScheduleStatus};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    ZeroAmount = 4,
    UnknownAsset = 5,
    InsufficientStake = 6,
    InsufficientAllowanceOrBalance = 7,
    PeriodActive = 8,
    ZeroDuration = 9,
    ArithmeticOverflow = 10,
    NoCollateral = 11,
    DuplicateAsset = 12,
    InsufficientRewardBalance = 13,
    Reentrant = 14,
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NegativeOperand | CommonError::ArithmeticOverflow => {
                ContractError::ArithmeticOverflow
            }
            CommonError::Reentrant => ContractError::Reentrant,
        }
    }
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Snapshot of a staker's position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    /// Sum of the staker's positions across every asset.
    pub weight: i128,
    pub pending_rewards: i128,
    pub reward_per_token_paid: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingRewardsContract;

#[contractimpl]
impl StakingRewardsContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `owner`             – the only address allowed to configure rewards.
    /// * `reward_asset`      – token paid out as rewards.
    /// * `collateral_assets` – tokens accepted for staking; list
    ///                         `reward_asset` here too to make it stakeable.
    pub fn initialize(
        env: Env,
        owner: Address,
        reward_asset: Address,
        collateral_assets: Vec<Address>,
    ) -> Result<(), ContractError> {
        if access::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        owner.require_auth();

        let descriptors = registry::build(&env, &reward_asset, &collateral_assets)?;

        access::set_owner(&env, &owner);
        registry::store(&env, &reward_asset, &descriptors);
        // Schedule, accumulator and reserve start at zero; their loaders
        // default absent keys, so no explicit init needed.
        ttl::extend_instance(&env);

        events::publish_initialized(&env, owner, reward_asset, collateral_assets);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of `asset`.
    ///
    /// The pool pulls the tokens with `transfer_from`, so the staker must
    /// have approved the pool for at least `amount` beforehand. The staker is
    /// checkpointed first so the new tokens do not earn retroactively.
    pub fn stake(
        env: Env,
        staker: Address,
        asset: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_positive(amount)?;
        Self::require_collateral(&env, &asset)?;
        let _guard = ReentrancyGuard::acquire(&env)?;

        let pool_address = env.current_contract_address();
        let ledger = token::Client::new(&env, &asset);
        if ledger.allowance(&staker, &pool_address) < amount || ledger.balance(&staker) < amount {
            log!(&env, "stake not covered by allowance or balance", amount);
            return Err(ContractError::InsufficientAllowanceOrBalance);
        }

        // 1. Checkpoint, 2. credit, 3. pull tokens.
        accumulator::update_staker(&env, &staker)?;
        let new_total = pool::credit(&env, &staker, &asset, amount)?;
        ledger.transfer_from(&pool_address, &staker, &pool_address, &amount);

        ttl::extend_instance(&env);
        events::publish_deposit(&env, staker, asset, amount, new_total);

        Ok(())
    }

    /// Return `amount` of `asset` to the staker.
    pub fn withdraw(
        env: Env,
        staker: Address,
        asset: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_positive(amount)?;
        Self::require_collateral(&env, &asset)?;
        let _guard = ReentrancyGuard::acquire(&env)?;

        if pool::staked_of(&env, &staker, &asset) < amount {
            return Err(ContractError::InsufficientStake);
        }

        accumulator::update_staker(&env, &staker)?;
        let new_total = pool::debit(&env, &staker, &asset, amount)?;
        token::Client::new(&env, &asset).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        ttl::extend_instance(&env);
        events::publish_withdrawn(&env, staker, asset, amount, new_total);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim everything `staker` has accrued. Returns the amount paid.
    ///
    /// Claiming with nothing accrued is a no-op that returns zero.
    pub fn get_rewards(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;

        let reward = Self::settle_rewards(&env, &staker)?;
        Self::pay_reward(&env, &staker, reward)?;

        ttl::extend_instance(&env);
        Ok(reward)
    }

    /// Withdraw every position `staker` holds and claim their rewards in one
    /// call. Returns the reward paid.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;

        // Effects for every asset first, then all token movements.
        accumulator::update_staker(&env, &staker)?;
        let mut returned: Vec<(Address, i128, i128)> = Vec::new(&env);
        for asset in registry::collateral_assets(&env)?.iter() {
            let staked = pool::staked_of(&env, &staker, &asset);
            if staked > 0 {
                let new_total = pool::debit(&env, &staker, &asset, staked)?;
                returned.push_back((asset, staked, new_total));
            }
        }
        let reward = Self::settle_rewards(&env, &staker)?;

        let pool_address = env.current_contract_address();
        for (asset, amount, new_total) in returned.iter() {
            token::Client::new(&env, &asset).transfer(&pool_address, &staker, &amount);
            events::publish_withdrawn(&env, staker.clone(), asset, amount, new_total);
        }
        Self::pay_reward(&env, &staker, reward)?;

        ttl::extend_instance(&env);
        Ok(reward)
    }

    // ── Owner functions ──────────────────────────────────────────────────────

    /// Start or extend a distribution window with `amount` reward tokens.
    ///
    /// The accumulator is flushed at the old rate before the rate changes.
    /// Any emission the running window still owes rolls into the new one.
    /// The reward tokens must already sit in the pool: the call fails with
    /// `InsufficientRewardBalance` unless the pool's free reward balance
    /// covers everything committed to stakers.
    pub fn set_reward_amount(env: Env, caller: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        access::require_owner(&env, &caller)?;
        Self::require_positive(amount)?;
        if schedule::load(&env).duration == 0 {
            return Err(ContractError::ZeroDuration);
        }

        let now = env.ledger().timestamp();
        let (_, mut window) = accumulator::update_accumulator(&env)?;

        let leftover = window.leftover(now)?;
        let rate = window.next_rate(now, amount)?;
        window.start(now, rate)?;

        let committed = window.reward_for_duration()?;
        let reserve = math::checked_add(
            math::checked_sub(schedule::reward_reserve(&env), leftover)?,
            committed,
        )?;

        let reward_asset = registry::reward_asset(&env)?;
        let balance =
            token::Client::new(&env, &reward_asset).balance(&env.current_contract_address());
        let free = balance.saturating_sub(pool::asset_total(&env, &reward_asset));
        if free < reserve {
            log!(&env, "reward not funded", free, reserve);
            return Err(ContractError::InsufficientRewardBalance);
        }

        schedule::store(&env, &window);
        schedule::set_reward_reserve(&env, reserve);
        ttl::extend_instance(&env);

        events::publish_reward_added(&env, amount, rate, window.period_finish);

        Ok(())
    }

    /// Set the length of the next distribution window, in seconds.
    ///
    /// Fails with `PeriodActive` while a window is still streaming.
    pub fn set_duration(env: Env, caller: Address, duration: u64) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        access::require_owner(&env, &caller)?;

        schedule::set_duration(&env, duration)?;
        ttl::extend_instance(&env);

        events::publish_duration_set(&env, duration);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn is_initialized(env: Env) -> bool {
        access::is_initialized(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        access::owner(&env)
    }

    /// Every registered asset, reward descriptor first.
    pub fn get_assets(env: Env) -> Result<Vec<AssetDescriptor>, ContractError> {
        registry::load(&env)
    }

    pub fn get_reward_asset(env: Env) -> Result<Address, ContractError> {
        registry::reward_asset(&env)
    }

    /// Role of `asset` in the pool, or `None` if it is not registered.
    pub fn get_asset_role(env: Env, asset: Address) -> Option<AssetRole> {
        registry::role_of(&env, &asset)
    }

    pub fn get_staked(env: Env, staker: Address, asset: Address) -> i128 {
        pool::staked_of(&env, &staker, &asset)
    }

    pub fn get_weight(env: Env, staker: Address) -> i128 {
        pool::weight_of(&env, &staker)
    }

    pub fn get_asset_total(env: Env, asset: Address) -> i128 {
        pool::asset_total(&env, &asset)
    }

    /// Return the flattened sum of all stakes across every asset.
    pub fn get_total_staked(env: Env) -> i128 {
        pool::total_staked(&env)
    }

    /// Reward tokens committed to stakers and not yet paid out.
    pub fn get_reward_reserve(env: Env) -> i128 {
        schedule::reward_reserve(&env)
    }

    pub fn get_schedule(env: Env) -> ScheduleState {
        schedule::load(&env).as_of(env.ledger().timestamp())
    }

    pub fn get_status(env: Env) -> ScheduleStatus {
        schedule::load(&env).status(env.ledger().timestamp())
    }

    /// Current emission per second; zero once the window has elapsed.
    pub fn get_reward_rate(env: Env) -> i128 {
        schedule::load(&env)
            .as_of(env.ledger().timestamp())
            .reward_rate
    }

    pub fn get_duration(env: Env) -> u64 {
        schedule::load(&env).duration
    }

    pub fn get_period_finish(env: Env) -> u64 {
        schedule::load(&env).period_finish
    }

    pub fn last_time_reward_applicable(env: Env) -> u64 {
        schedule::load(&env).last_time_reward_applicable(env.ledger().timestamp())
    }

    pub fn get_reward_for_duration(env: Env) -> Result<i128, ContractError> {
        schedule::load(&env)
            .as_of(env.ledger().timestamp())
            .reward_for_duration()
    }

    /// Current value of the reward index, projected to now.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        accumulator::reward_per_token(
            &env,
            &accumulator::load(&env),
            &schedule::load(&env),
            env.ledger().timestamp(),
        )
    }

    /// Real-time claimable reward for `staker`, without mutating state.
    pub fn earned(env: Env, staker: Address) -> Result<i128, ContractError> {
        accumulator::preview_earned(&env, &staker)
    }

    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let user = accumulator::load_user(&env, &staker);
        Ok(StakerInfo {
            weight: pool::weight_of(&env, &staker),
            pending_rewards: accumulator::preview_earned(&env, &staker)?,
            reward_per_token_paid: user.reward_per_token_paid,
        })
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !access::is_initialized(env) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_positive(amount: i128) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        Ok(())
    }

    fn require_collateral(env: &Env, asset: &Address) -> Result<(), ContractError> {
        if !registry::is_collateral(env, asset)? {
            log!(env, "asset not accepted for staking", asset.clone());
            return Err(ContractError::UnknownAsset);
        }
        Ok(())
    }

    /// Checkpoint `staker` and drain their accrued reward. State only; the
    /// transfer happens in [`Self::pay_reward`].
    fn settle_rewards(env: &Env, staker: &Address) -> Result<i128, ContractError> {
        let mut user = accumulator::update_staker(env, staker)?;
        let reward = user.accrued;
        if reward == 0 {
            return Ok(0);
        }

        user.accrued = 0;
        accumulator::store_user(env, staker, &user);
        schedule::release_reward(env, reward)?;

        Ok(reward)
    }

    fn pay_reward(env: &Env, staker: &Address, reward: i128) -> Result<(), ContractError> {
        if reward == 0 {
            return Ok(());
        }

        let reward_asset = registry::reward_asset(env)?;
        token::Client::new(env, &reward_asset).transfer(
            &env.current_contract_address(),
            staker,
            &reward,
        );

        events::publish_reward_paid(env, staker.clone(), reward);

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_access;
