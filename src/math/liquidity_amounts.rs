//! Conversions between token amounts and liquidity for a price range.
//!
//! These helpers sit outside the swap path. Position managers use them to
//! work out how much liquidity a deposit buys, and what a given amount of
//! liquidity is worth at the current price.

use crate::error::MathError;
use crate::math::full_math::{mul_div, sqrt};
use crate::{Q96, Q192, RESOLUTION};
use alloy_primitives::U256;

/// Encodes `reserve1 / reserve0` as a Q64.96 square-root price.
pub fn encode_sqrt_ratio_x96(reserve1: U256, reserve0: U256) -> Result<U256, MathError> {
    Ok(sqrt(mul_div(reserve1, Q192, reserve0)?))
}

#[inline]
fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

#[inline]
fn to_u128(x: U256) -> Result<u128, MathError> {
    u128::try_from(x).map_err(|_| MathError::Overflow)
}

/// Liquidity bought by `amount0` of token0 across `[a, b]`.
pub fn get_liquidity_for_amount0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<u128, MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let intermediate = mul_div(a, b, Q96)?;
    to_u128(mul_div(amount0, intermediate, b - a)?)
}

/// Liquidity bought by `amount1` of token1 across `[a, b]`.
pub fn get_liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    to_u128(mul_div(amount1, Q96, b - a)?)
}

/// Maximum liquidity that `amount0` and `amount1` can back at the current
/// price.
///
/// Below the range only token0 counts, above it only token1, and inside it
/// the smaller of the two implied liquidities wins. A price exactly on the
/// lower bound counts as below.
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= a {
        get_liquidity_for_amount0(a, b, amount0)
    } else if sqrt_ratio_x96 < b {
        let liquidity0 = get_liquidity_for_amount0(sqrt_ratio_x96, b, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(a, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(a, b, amount1)
    }
}

/// Token0 value of `liquidity` across `[a, b]`, rounded down.
pub fn get_amount0_for_liquidity(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(mul_div(U256::from(liquidity) << RESOLUTION, b - a, b)? / a)
}

/// Token1 value of `liquidity` across `[a, b]`, rounded down.
pub fn get_amount1_for_liquidity(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    mul_div(U256::from(liquidity), b - a, Q96)
}

/// Token amounts `liquidity` is worth at the current price, split the same
/// way as [`get_liquidity_for_amounts`].
pub fn get_amounts_for_liquidity(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<(U256, U256), MathError> {
    let (a, b) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= a {
        Ok((get_amount0_for_liquidity(a, b, liquidity)?, U256::ZERO))
    } else if sqrt_ratio_x96 < b {
        Ok((
            get_amount0_for_liquidity(sqrt_ratio_x96, b, liquidity)?,
            get_amount1_for_liquidity(a, sqrt_ratio_x96, liquidity)?,
        ))
    } else {
        Ok((U256::ZERO, get_amount1_for_liquidity(a, b, liquidity)?))
    }
}
