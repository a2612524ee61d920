//! Reward-per-token accumulator and per-staker checkpoints.
//!
//! `reward_per_token_stored` is the cumulative reward earned by one unit of
//! staked weight since genesis, scaled by [`SCALE`]. A staker's reward is
//! settled lazily: whenever their weight is about to change (or they claim),
//! the index delta since their last checkpoint is multiplied by their weight
//! and added to `accrued`.
//!
//! Every mutation of `total_staked` or `reward_rate` must be preceded by
//! [`update_accumulator`], otherwise elapsed time is priced against the new
//! weight or rate.

use common::{math, ttl};
use soroban_sdk::{contracttype, log, symbol_short, Address, Env, Symbol};

use crate::pool;
use crate::schedule::{self, ScheduleState};
use crate::ContractError;

/// Fixed-point scaling factor for the reward index.
///
/// Small per-second rates divided by a large total weight would truncate to
/// zero without it. Scaled products go through [`math::mul_div`], which
/// multiplies in 256 bits.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

const ACCUMULATOR: Symbol = symbol_short!("ACC");
const USER_REWARD: Symbol = symbol_short!("USR_RWD");

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccumulatorState {
    pub reward_per_token_stored: i128,
    /// Raw amounts of every asset summed together.
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserRewardState {
    pub reward_per_token_paid: i128,
    pub accrued: i128,
}

// ── Core reward math ────────────────────────────────────────────────────────

/// Project the index forward to `now`.
///
/// ```text
/// applicable = min(now, period_finish) − last_update_time     (clamped at 0)
/// rpt        = stored + applicable × rate × SCALE / total_staked
/// ```
///
/// With nothing staked the index does not move; [`update_accumulator`]
/// releases emission for that time from the reserve.
pub fn reward_per_token(
    env: &Env,
    acc: &AccumulatorState,
    schedule: &ScheduleState,
    now: u64,
) -> Result<i128, ContractError> {
    let applicable = schedule
        .last_time_reward_applicable(now)
        .saturating_sub(schedule.last_update_time);

    if acc.total_staked == 0 || applicable == 0 {
        return Ok(acc.reward_per_token_stored);
    }

    let emitted = math::checked_mul(schedule.reward_rate, applicable as i128)?;
    let delta = math::mul_div(env, emitted, SCALE, acc.total_staked)?;

    Ok(math::checked_add(acc.reward_per_token_stored, delta)?)
}

/// Reward owed to a staker of `weight` once the index has reached `rpt`.
///
/// ```text
/// earned = accrued + weight × (rpt − reward_per_token_paid) / SCALE
/// ```
pub fn earned(
    env: &Env,
    weight: i128,
    rpt: i128,
    user: &UserRewardState,
) -> Result<i128, ContractError> {
    let delta = math::checked_sub(rpt, user.reward_per_token_paid)?;
    let fresh = math::mul_div(env, delta, weight, SCALE)?;

    Ok(math::checked_add(user.accrued, fresh)?)
}

// ── Storage ─────────────────────────────────────────────────────────────────

pub fn load(env: &Env) -> AccumulatorState {
    env.storage()
        .instance()
        .get(&ACCUMULATOR)
        .unwrap_or_default()
}

pub fn store(env: &Env, acc: &AccumulatorState) {
    env.storage().instance().set(&ACCUMULATOR, acc);
}

pub fn load_user(env: &Env, staker: &Address) -> UserRewardState {
    env.storage()
        .persistent()
        .get(&(USER_REWARD, staker.clone()))
        .unwrap_or_default()
}

pub fn store_user(env: &Env, staker: &Address, user: &UserRewardState) {
    let key = (USER_REWARD, staker.clone());
    env.storage().persistent().set(&key, user);
    ttl::extend_persistent(env, &key);
}

// ── Checkpoints ─────────────────────────────────────────────────────────────

/// Fold the time elapsed since the last checkpoint into the index.
///
/// Returns the updated state so callers about to change the rate or the
/// total weight can keep working on the same snapshot.
pub fn update_accumulator(env: &Env) -> Result<(AccumulatorState, ScheduleState), ContractError> {
    let now = env.ledger().timestamp();
    let mut acc = load(env);
    let mut schedule = schedule::load(env);

    acc.reward_per_token_stored = reward_per_token(env, &acc, &schedule, now)?;

    let applicable = schedule.last_time_reward_applicable(now);
    if applicable > schedule.last_update_time {
        if acc.total_staked == 0 {
            // Emitted while nobody was staked: no recipient, free it for the
            // next window.
            let elapsed = (applicable - schedule.last_update_time) as i128;
            let unstreamed = math::checked_mul(schedule.reward_rate, elapsed)?;
            schedule::release_reward(env, unstreamed)?;
            log!(env, "unstreamed emission released", unstreamed);
        }
        schedule.last_update_time = applicable;
    }
    let schedule = schedule.as_of(now);

    store(env, &acc);
    schedule::store(env, &schedule);

    log!(
        env,
        "checkpoint",
        acc.reward_per_token_stored,
        schedule.last_update_time
    );

    Ok((acc, schedule))
}

/// Checkpoint the accumulator, then settle `staker` against it.
pub fn update_staker(env: &Env, staker: &Address) -> Result<UserRewardState, ContractError> {
    let (acc, _) = update_accumulator(env)?;
    let weight = pool::weight_of(env, staker);

    let mut user = load_user(env, staker);
    user.accrued = earned(env, weight, acc.reward_per_token_stored, &user)?;
    user.reward_per_token_paid = acc.reward_per_token_stored;
    store_user(env, staker, &user);

    Ok(user)
}

/// Read-only projection of [`update_staker`]: what `staker` could claim now.
pub fn preview_earned(env: &Env, staker: &Address) -> Result<i128, ContractError> {
    let rpt = reward_per_token(env, &load(env), &schedule::load(env), env.ledger().timestamp())?;
    earned(env, pool::weight_of(env, staker), rpt, &load_user(env, staker))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math only; the storage-backed paths are covered by the contract tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn window(rate: i128, last: u64, finish: u64) -> ScheduleState {
        ScheduleState {
            reward_rate: rate,
            period_finish: finish,
            last_update_time: last,
            duration: finish - last,
        }
    }

    fn acc(stored: i128, total: i128) -> AccumulatorState {
        AccumulatorState {
            reward_per_token_stored: stored,
            total_staked: total,
        }
    }

    #[test]
    fn rpt_unchanged_when_nothing_staked() {
        let env = Env::default();
        let rpt = reward_per_token(&env, &acc(500, 0), &window(100, 0, 1_000), 60).unwrap();
        assert_eq!(rpt, 500);
    }

    #[test]
    fn rpt_accumulates_over_elapsed_time() {
        let env = Env::default();
        // 10/s for 100 s over 1_000 weight -> 1 unit per unit of weight.
        let rpt = reward_per_token(&env, &acc(0, 1_000), &window(10, 0, 1_000), 100).unwrap();
        assert_eq!(rpt, SCALE);
    }

    #[test]
    fn rpt_stops_at_period_finish() {
        let env = Env::default();
        let s = window(10, 0, 100);
        let at_finish = reward_per_token(&env, &acc(0, 1_000), &s, 100).unwrap();
        let long_after = reward_per_token(&env, &acc(0, 1_000), &s, 10_000).unwrap();
        assert_eq!(at_finish, long_after);
    }

    #[test]
    fn rpt_ignores_clock_before_last_update() {
        let env = Env::default();
        let rpt = reward_per_token(&env, &acc(42, 1_000), &window(10, 500, 1_000), 400).unwrap();
        assert_eq!(rpt, 42);
    }

    #[test]
    fn earned_keeps_prior_accrual_when_index_unchanged() {
        let env = Env::default();
        let user = UserRewardState {
            reward_per_token_paid: 100,
            accrued: 50,
        };
        assert_eq!(earned(&env, 500, 100, &user).unwrap(), 50);
    }

    #[test]
    fn earned_proportional_to_weight() {
        let env = Env::default();
        let user = UserRewardState::default();
        assert_eq!(earned(&env, 1_000, SCALE, &user).unwrap(), 1_000);
        assert_eq!(earned(&env, 250, SCALE * 4, &user).unwrap(), 1_000);
    }

    #[test]
    fn earned_rejects_index_behind_checkpoint() {
        let env = Env::default();
        let user = UserRewardState {
            reward_per_token_paid: 10,
            accrued: 0,
        };
        assert_eq!(earned(&env, 1, 5, &user), Err(ContractError::ArithmeticOverflow));
    }

    #[test]
    fn overflow_fails_closed() {
        let env = Env::default();
        let s = window(i128::MAX, 0, 1_000);
        assert_eq!(
            reward_per_token(&env, &acc(0, 1), &s, 10),
            Err(ContractError::ArithmeticOverflow)
        );
    }

    #[test]
    fn stellar_decimal_amounts_fit() {
        let env = Env::default();
        // 10_000 tokens with 7 decimals over one day, 1_000 tokens staked.
        let one = 10_000_000i128;
        let s = window(10_000 * one / 86_400, 0, 86_400);
        let rpt = reward_per_token(&env, &acc(0, 1_000 * one), &s, 86_400).unwrap();
        let paid = earned(&env, 1_000 * one, rpt, &UserRewardState::default()).unwrap();
        assert!(paid <= 10_000 * one);
        assert!(10_000 * one - paid < 86_400 * 2);
    }

    #[test]
    fn eighteen_decimal_amounts_fit() {
        let env = Env::default();
        // 1_000 tokens with 18 decimals staked, 1_000 tokens over 100 s.
        let one = 1_000_000_000_000_000_000i128;
        let s = window(10 * one, 0, 100);
        let rpt = reward_per_token(&env, &acc(0, 1_000 * one), &s, 37).unwrap();
        assert_eq!(rpt, 370_000_000_000_000_000);
        let paid = earned(&env, 1_000 * one, rpt, &UserRewardState::default()).unwrap();
        assert_eq!(paid, 370 * one);
    }
}
