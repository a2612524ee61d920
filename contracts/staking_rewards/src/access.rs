//! Single-owner access control.
//!
//! The owner is recorded by `initialize` and there is no operation that
//! replaces it. Callers must already have passed `require_auth()`; this
//! module only checks identity.

use soroban_sdk::{log, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const OWNER: Symbol = symbol_short!("OWNER");

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&OWNER)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
}

pub fn owner(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&OWNER)
        .ok_or(ContractError::NotInitialized)
}

/// Guard: revert if `caller` is not the recorded owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
    if *caller != owner(env)? {
        log!(env, "owner-only call rejected", caller.clone());
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}
