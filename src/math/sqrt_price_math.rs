//! Price movement and token deltas for a fixed amount of liquidity.
//!
//! Every function rounds in the pool's favour: prices move so that the
//! trader pays at least, and receives at most, the exact real-valued amount.

use crate::RESOLUTION;
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{
    Q96, U160_MAX,
    error::{Error, MathError, StateError},
};
use alloy_primitives::{I256, U256};

/// Next sqrt price after adding (`add`) or removing `amount` of token0,
/// rounded up.
///
/// Uses `L * sqrtP / (L + amount * sqrtP)`, falling back to
/// `L / (L / sqrtP + amount)` when the product overflows.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96);
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let product = amount.wrapping_mul(sqrt_p_x96);
    let product_fits = product / amount == sqrt_p_x96;

    if add {
        if product_fits {
            let (denominator, overflow) = numerator1.overflowing_add(product);
            if !overflow {
                return Ok(mul_div_rounding_up(numerator1, sqrt_p_x96, denominator)?);
            }
        }
        let denominator = (numerator1 / sqrt_p_x96)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(div_rounding_up(numerator1, denominator)?)
    } else {
        if !product_fits || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        let next = mul_div_rounding_up(numerator1, sqrt_p_x96, numerator1 - product)?;
        if next > U160_MAX {
            return Err(MathError::Overflow.into());
        }
        Ok(next)
    }
}

/// Next sqrt price after adding (`add`) or removing `amount` of token1,
/// rounded down: `sqrtP ± amount / L`.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }
    let liquidity = U256::from(liquidity);

    if add {
        let quotient = if amount <= U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        match sqrt_p_x96.checked_add(quotient) {
            Some(next) if next <= U160_MAX => Ok(next),
            _ => Err(MathError::Overflow.into()),
        }
    } else {
        let quotient = if amount <= U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)?
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        if sqrt_p_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(sqrt_p_x96 - quotient)
    }
}

/// Next sqrt price after `amount_in` of the input token enters the pool.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price after `amount_out` of the output token leaves the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}

/// Token0 between two prices: `L * (sqrtB - sqrtA) / (sqrtA * sqrtB)`.
pub fn get_amount_0_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    if sqrt_ratio_a_x96.is_zero() {
        return Err(StateError::SqrtRatioIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?,
            sqrt_ratio_a_x96,
        )?)
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Token1 between two prices: `L * (sqrtB - sqrtA)`.
pub fn get_amount_1_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change. Added liquidity
/// rounds up (owed to the pool), removed liquidity rounds down.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let magnitude = get_amount_0_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        liquidity >= 0,
    )?;
    signed(magnitude, liquidity < 0)
}

/// Signed token1 delta for a signed liquidity change, rounded like
/// [`get_amount_0_delta`].
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let magnitude = get_amount_1_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        liquidity >= 0,
    )?;
    signed(magnitude, liquidity < 0)
}

fn signed(magnitude: U256, negative: bool) -> Result<I256, Error> {
    let value = I256::try_from(magnitude).map_err(|_| MathError::Overflow)?;
    Ok(if negative { -value } else { value })
}
