//! Staked-weight ledger.
//!
//! Three views of the same deposits are kept in step:
//! - per (staker, asset) positions in persistent storage,
//! - a per-staker weight (sum over assets) so checkpoints stay O(1),
//! - per-asset totals plus the flattened `total_staked` in instance storage.
//!
//! Raw amounts of different assets are added together as if they were the
//! same unit. Callers must checkpoint the staker before crediting or
//! debiting.

use common::{math, ttl};
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::accumulator;
use crate::ContractError;

const POSITION: Symbol = symbol_short!("POS");
const WEIGHT: Symbol = symbol_short!("WEIGHT");
const ASSET_TOTAL: Symbol = symbol_short!("AST_TOT");

pub fn staked_of(env: &Env, staker: &Address, asset: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(POSITION, staker.clone(), asset.clone()))
        .unwrap_or(0)
}

pub fn weight_of(env: &Env, staker: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(WEIGHT, staker.clone()))
        .unwrap_or(0)
}

pub fn asset_total(env: &Env, asset: &Address) -> i128 {
    env.storage()
        .instance()
        .get(&(ASSET_TOTAL, asset.clone()))
        .unwrap_or(0)
}

pub fn total_staked(env: &Env) -> i128 {
    accumulator::load(env).total_staked
}

/// Add `amount` of `asset` to `staker`. Returns the new flattened total.
pub fn credit(
    env: &Env,
    staker: &Address,
    asset: &Address,
    amount: i128,
) -> Result<i128, ContractError> {
    let position = math::checked_add(staked_of(env, staker, asset), amount)?;
    let weight = math::checked_add(weight_of(env, staker), amount)?;
    let per_asset = math::checked_add(asset_total(env, asset), amount)?;

    let mut acc = accumulator::load(env);
    acc.total_staked = math::checked_add(acc.total_staked, amount)?;

    write(env, staker, asset, position, weight, per_asset);
    accumulator::store(env, &acc);

    Ok(acc.total_staked)
}

/// Remove `amount` of `asset` from `staker`. Returns the new flattened total.
pub fn debit(
    env: &Env,
    staker: &Address,
    asset: &Address,
    amount: i128,
) -> Result<i128, ContractError> {
    let staked = staked_of(env, staker, asset);
    if staked < amount {
        return Err(ContractError::InsufficientStake);
    }

    let position = math::checked_sub(staked, amount)?;
    let weight = math::checked_sub(weight_of(env, staker), amount)?;
    let per_asset = math::checked_sub(asset_total(env, asset), amount)?;

    let mut acc = accumulator::load(env);
    acc.total_staked = math::checked_sub(acc.total_staked, amount)?;

    write(env, staker, asset, position, weight, per_asset);
    accumulator::store(env, &acc);

    Ok(acc.total_staked)
}

fn write(
    env: &Env,
    staker: &Address,
    asset: &Address,
    position: i128,
    weight: i128,
    per_asset: i128,
) {
    let persistent = env.storage().persistent();

    // An emptied position is dropped rather than stored as zero.
    let position_key = (POSITION, staker.clone(), asset.clone());
    if position == 0 {
        persistent.remove(&position_key);
    } else {
        persistent.set(&position_key, &position);
        ttl::extend_persistent(env, &position_key);
    }

    let weight_key = (WEIGHT, staker.clone());
    if weight == 0 {
        persistent.remove(&weight_key);
    } else {
        persistent.set(&weight_key, &weight);
        ttl::extend_persistent(env, &weight_key);
    }

    env.storage()
        .instance()
        .set(&(ASSET_TOTAL, asset.clone()), &per_asset);
}
