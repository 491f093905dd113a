use soroban_sdk::{Env, I256};

use crate::ContractError;

/// Fixed-point scaling factor.
///
/// Reward rates and reward-per-unit values carry 18 decimal places on top of
/// the reward token's own decimals.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// `a × b / denominator`, multiplying first and truncating toward zero.
///
/// Every rate and per-unit computation goes through here. The product is
/// taken in 256 bits, so only a quotient that does not fit `i128` errors with
/// `ArithmeticOverflow`.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, ContractError> {
    if denominator <= 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

pub fn add(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_add(b).ok_or(ContractError::ArithmeticOverflow)
}

pub fn sub(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_sub(b).ok_or(ContractError::ArithmeticOverflow)
}
