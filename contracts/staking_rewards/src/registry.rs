//! Fixed set of assets the pool accepts.
//!
//! The registry is written once by `initialize` and never mutated. It holds
//! exactly one `Reward` descriptor followed by the `Collateral` descriptors
//! in the order they were supplied. The reward asset becomes stakeable only
//! when its id is also listed as collateral.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::ContractError;

const ASSETS: Symbol = symbol_short!("ASSETS");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
/// `(ASSET, id) -> AssetRole`, so membership checks are a single read.
const ASSET: Symbol = symbol_short!("ASSET");

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetRole {
    Reward,
    Collateral,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetDescriptor {
    pub id: Address,
    pub role: AssetRole,
}

/// Validate the constructor arguments and build the descriptor list.
pub fn build(
    env: &Env,
    reward_asset: &Address,
    collateral_assets: &Vec<Address>,
) -> Result<Vec<AssetDescriptor>, ContractError> {
    if collateral_assets.is_empty() {
        return Err(ContractError::NoCollateral);
    }

    let mut descriptors = Vec::new(env);
    descriptors.push_back(AssetDescriptor {
        id: reward_asset.clone(),
        role: AssetRole::Reward,
    });

    for (i, id) in collateral_assets.iter().enumerate() {
        let repeated = collateral_assets
            .iter()
            .skip(i + 1)
            .any(|other| other == id);
        if repeated {
            return Err(ContractError::DuplicateAsset);
        }
        descriptors.push_back(AssetDescriptor {
            id,
            role: AssetRole::Collateral,
        });
    }

    Ok(descriptors)
}

pub fn store(env: &Env, reward_asset: &Address, descriptors: &Vec<AssetDescriptor>) {
    let instance = env.storage().instance();
    instance.set(&ASSETS, descriptors);
    instance.set(&REWARD_TOKEN, reward_asset);

    // Collateral wins when the reward asset is also listed as collateral.
    for descriptor in descriptors.iter() {
        let key = (ASSET, descriptor.id.clone());
        if instance.get::<_, AssetRole>(&key) != Some(AssetRole::Collateral) {
            instance.set(&key, &descriptor.role);
        }
    }
}

pub fn role_of(env: &Env, asset: &Address) -> Option<AssetRole> {
    env.storage().instance().get(&(ASSET, asset.clone()))
}

pub fn load(env: &Env) -> Result<Vec<AssetDescriptor>, ContractError> {
    env.storage()
        .instance()
        .get(&ASSETS)
        .ok_or(ContractError::NotInitialized)
}

pub fn reward_asset(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&REWARD_TOKEN)
        .ok_or(ContractError::NotInitialized)
}

/// Ids of every stakeable asset, in registration order.
pub fn collateral_assets(env: &Env) -> Result<Vec<Address>, ContractError> {
    let mut ids = Vec::new(env);
    for descriptor in load(env)?.iter() {
        if descriptor.role == AssetRole::Collateral {
            ids.push_back(descriptor.id);
        }
    }
    Ok(ids)
}

pub fn is_collateral(env: &Env, asset: &Address) -> Result<bool, ContractError> {
    if !env.storage().instance().has(&ASSETS) {
        return Err(ContractError::NotInitialized);
    }
    Ok(role_of(env, asset) == Some(AssetRole::Collateral))
}
