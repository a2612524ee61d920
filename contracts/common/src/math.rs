//! Checked fixed-point helpers.
//!
//! All values handled here are non-negative token quantities or scaled
//! indices. Every helper fails closed: overflow and division by zero are
//! reported as [`CommonError::ArithmeticOverflow`], never wrapped or
//! saturated.

use soroban_sdk::{Env, I256};

use crate::CommonError;

/// Compute `floor(a * b / denominator)` for non-negative operands.
///
/// The product is formed in 256 bits on the host, so only a quotient that
/// does not fit back into an `i128` is reported as overflow.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, CommonError> {
    if a < 0 || b < 0 || denominator < 0 {
        return Err(CommonError::NegativeOperand);
    }
    if denominator == 0 {
        return Err(CommonError::ArithmeticOverflow);
    }

    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator))
        .to_i128()
        .ok_or(CommonError::ArithmeticOverflow)
}

pub fn checked_add(a: i128, b: i128) -> Result<i128, CommonError> {
    a.checked_add(b).ok_or(CommonError::ArithmeticOverflow)
}

/// Subtraction that also refuses to go below zero.
pub fn checked_sub(a: i128, b: i128) -> Result<i128, CommonError> {
    match a.checked_sub(b) {
        Some(v) if v >= 0 => Ok(v),
        _ => Err(CommonError::ArithmeticOverflow),
    }
}

pub fn checked_mul(a: i128, b: i128) -> Result<i128, CommonError> {
    a.checked_mul(b).ok_or(CommonError::ArithmeticOverflow)
}
