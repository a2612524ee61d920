//! Shared utilities and error types for the staking-rewards contract suite.
//!
//! This crate provides:
//! - [`CommonError`], the error codes raised by the shared helpers.
//! - Checked fixed-point arithmetic ([`math`]).
//! - Storage TTL conventions ([`ttl`]).
//! - A scoped reentrancy guard ([`reentrancy`]).

#![no_std]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod math;
pub mod reentrancy;
pub mod ttl;

pub use reentrancy::ReentrancyGuard;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes shared by every contract in the workspace.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 29  | Contract-specific              |
/// | 30 – 39 | Arithmetic / input validation  |
/// | 40 – 49 | Contract state                 |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    // ── Arithmetic (30–39) ───────────────────────────────────
    /// An operand was negative where only non-negative values are defined.
    NegativeOperand = 30,

    /// A checked operation overflowed or divided by zero.
    ArithmeticOverflow = 31,

    // ── Contract state (40–49) ───────────────────────────────
    /// A guarded entry point was entered while another guarded call was
    /// still in flight.
    Reentrant = 40,
}

#[cfg(test)]
mod tests {
    use super::CommonError;

    #[test]
    fn common_error_discriminants_are_stable() {
        assert_eq!(CommonError::NegativeOperand as u32, 30);
        assert_eq!(CommonError::ArithmeticOverflow as u32, 31);
        assert_eq!(CommonError::Reentrant as u32, 40);
    }
}
