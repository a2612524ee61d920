//! Storage TTL conventions.
//!
//! Instance storage is bumped on every entry point; persistent per-user
//! entries are bumped whenever they are written.

use soroban_sdk::{Env, IntoVal, Val};

/// Remaining ledgers below which an entry is extended (~1 day).
pub const TTL_THRESHOLD: u32 = 17_280;
/// Ledgers an entry is extended to (~30 days).
pub const TTL_EXTEND_TO: u32 = 518_400;

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
