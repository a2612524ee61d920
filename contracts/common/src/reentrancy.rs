//! # Scoped reentrancy guard
//!
//! A guarded entry point acquires the guard before touching state and holds
//! it until it returns. The flag lives in temporary storage and is cleared
//! when the guard is dropped, so every exit path (including early `?`
//! returns) releases it. A failed invocation is rolled back by the host
//! anyway, which also discards the flag.
//!
//! ```ignore
//! let _guard = ReentrancyGuard::acquire(&env)?;
//! // checks, effects, then token interactions
//! ```

use soroban_sdk::{symbol_short, Env, Symbol};

use crate::CommonError;

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Held for the duration of a guarded call.
pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    /// Take the guard, or fail with [`CommonError::Reentrant`] if it is
    /// already held.
    pub fn acquire(env: &Env) -> Result<Self, CommonError> {
        let storage = env.storage().temporary();
        if storage.has(&LOCKED) {
            return Err(CommonError::Reentrant);
        }
        storage.set(&LOCKED, &true);
        Ok(Self { env: env.clone() })
    }

    pub fn is_held(env: &Env) -> bool {
        env.storage().temporary().has(&LOCKED)
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&LOCKED);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{contract, contractimpl, Env};

    #[contract]
    pub struct TestContract;

    #[contractimpl]
    impl TestContract {}

    fn with_contract_env<F: FnOnce(&Env)>(f: F) {
        let env = Env::default();
        let contract_id = env.register(TestContract, ());
        env.as_contract(&contract_id, || {
            f(&env);
        });
    }

    #[test]
    fn guard_is_free_by_default() {
        with_contract_env(|env| {
            assert!(!ReentrancyGuard::is_held(env));
        });
    }

    #[test]
    fn second_acquire_while_held_is_rejected() {
        with_contract_env(|env| {
            let _guard = ReentrancyGuard::acquire(env).unwrap();
            assert!(ReentrancyGuard::is_held(env));
            let err = ReentrancyGuard::acquire(env).err();
            assert_eq!(err, Some(CommonError::Reentrant));
        });
    }

    #[test]
    fn drop_releases_the_guard() {
        with_contract_env(|env| {
            {
                let _guard = ReentrancyGuard::acquire(env).unwrap();
            }
            assert!(!ReentrancyGuard::is_held(env));
            assert!(ReentrancyGuard::acquire(env).is_ok());
        });
    }

    #[test]
    fn early_return_releases_the_guard() {
        fn guarded(env: &Env, fail: bool) -> Result<u32, CommonError> {
            let _guard = ReentrancyGuard::acquire(env)?;
            if fail {
                return Err(CommonError::ArithmeticOverflow);
            }
            Ok(1)
        }

        with_contract_env(|env| {
            assert_eq!(guarded(env, true), Err(CommonError::ArithmeticOverflow));
            assert!(!ReentrancyGuard::is_held(env));
            assert_eq!(guarded(env, false), Ok(1));
        });
    }
}
