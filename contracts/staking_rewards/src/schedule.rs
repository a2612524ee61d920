//! Reward schedule: emission rate and the active distribution window.
//!
//! `reward_rate` reward-asset units are emitted per second between
//! `last_update_time` and `period_finish`. Nothing is emitted for time at or
//! after `period_finish` until the owner starts a new window.
//!
//! The schedule also owns the reward reserve: reward-asset units committed
//! to stakers (scheduled emissions) that have not been paid out yet. It is
//! the figure `set_reward_amount` checks the pool's free balance against.

use common::math;
use soroban_sdk::{contracttype, log, symbol_short, Env, Symbol};

use crate::ContractError;

const SCHEDULE: Symbol = symbol_short!("SCHEDULE");
const RESERVE: Symbol = symbol_short!("RESERVE");

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScheduleState {
    pub reward_rate: i128,
    pub period_finish: u64,
    pub last_update_time: u64,
    /// Length of the next window. Zero means unset.
    pub duration: u64,
}

/// Coarse lifecycle of the schedule.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleStatus {
    NoActiveSchedule,
    Distributing,
    Elapsed,
}

impl ScheduleState {
    /// The latest instant rewards are still emitted for: `min(now, period_finish)`.
    pub fn last_time_reward_applicable(&self, now: u64) -> u64 {
        now.min(self.period_finish)
    }

    pub fn is_active(&self, now: u64) -> bool {
        now < self.period_finish
    }

    pub fn status(&self, now: u64) -> ScheduleStatus {
        if self.period_finish == 0 {
            ScheduleStatus::NoActiveSchedule
        } else if self.is_active(now) {
            ScheduleStatus::Distributing
        } else {
            ScheduleStatus::Elapsed
        }
    }

    /// The schedule as seen at `now`: once the window has elapsed and no new
    /// one was started, the rate reads as zero.
    pub fn as_of(mut self, now: u64) -> Self {
        if self.status(now) == ScheduleStatus::Elapsed {
            self.reward_rate = 0;
        }
        self
    }

    /// Total emission of a full window at the current rate.
    pub fn reward_for_duration(&self) -> Result<i128, ContractError> {
        Ok(math::checked_mul(self.reward_rate, self.duration as i128)?)
    }

    /// Undistributed emission still owed by the running window at `now`.
    pub fn leftover(&self, now: u64) -> Result<i128, ContractError> {
        if !self.is_active(now) {
            return Ok(0);
        }
        let remaining = (self.period_finish - now) as i128;
        Ok(math::checked_mul(remaining, self.reward_rate)?)
    }

    /// Rate for a new window funded with `amount`, rolling any leftover of
    /// the running window into it.
    ///
    /// ```text
    /// elapsed window:  rate = amount / duration
    /// running window:  rate = (amount + (period_finish - now) * rate) / duration
    /// ```
    pub fn next_rate(&self, now: u64, amount: i128) -> Result<i128, ContractError> {
        if self.duration == 0 {
            return Err(ContractError::ZeroDuration);
        }
        let funded = math::checked_add(amount, self.leftover(now)?)?;
        Ok(funded / self.duration as i128)
    }

    /// Open a new window at `now` emitting `reward_rate` per second.
    pub fn start(&mut self, now: u64, reward_rate: i128) -> Result<(), ContractError> {
        self.period_finish = now
            .checked_add(self.duration)
            .ok_or(ContractError::ArithmeticOverflow)?;
        self.reward_rate = reward_rate;
        self.last_update_time = now;
        Ok(())
    }
}

pub fn load(env: &Env) -> ScheduleState {
    env.storage()
        .instance()
        .get(&SCHEDULE)
        .unwrap_or_default()
}

pub fn store(env: &Env, schedule: &ScheduleState) {
    env.storage().instance().set(&SCHEDULE, schedule);
}

/// Change the length of the next window.
///
/// Rejected while a window is streaming so already-running emission is never
/// re-timed.
pub fn set_duration(env: &Env, new_duration: u64) -> Result<(), ContractError> {
    let now = env.ledger().timestamp();
    let mut schedule = load(env);

    if schedule.is_active(now) {
        log!(env, "duration change during active period", schedule.period_finish);
        return Err(ContractError::PeriodActive);
    }
    if new_duration == 0 {
        return Err(ContractError::ZeroDuration);
    }

    schedule.duration = new_duration;
    store(env, &schedule);
    Ok(())
}

// ── Reward reserve ───────────────────────────────────────────────────────────

pub fn reward_reserve(env: &Env) -> i128 {
    env.storage().instance().get(&RESERVE).unwrap_or(0)
}

pub fn set_reward_reserve(env: &Env, reserve: i128) {
    env.storage().instance().set(&RESERVE, &reserve);
}

/// Release `amount` from the reserve once it has been paid to a staker.
pub fn release_reward(env: &Env, amount: i128) -> Result<(), ContractError> {
    let reserve = math::checked_sub(reward_reserve(env), amount)?;
    set_reward_reserve(env, reserve);
    Ok(())
}

// ── Unit tests ──────────────────────────────────────────────────────────────
