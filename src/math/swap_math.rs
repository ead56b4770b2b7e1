use crate::U256_E6;
use crate::error::Error;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta_base, get_amount_1_delta_base, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use alloy_primitives::{I256, U256};

/// Computes one swap step inside a single liquidity range.
///
/// The direction is implied by the prices: `sqrt_ratio_current_x96 >=
/// sqrt_ratio_target_x96` means token0 is sold for token1. A non‑negative
/// `amount_remaining` is an exact input budget (fee included), a negative
/// one is the exact output still owed to the trader.
///
/// Returns `(sqrt_ratio_next_x96, amount_in, amount_out, fee_amount)`.
/// `amount_in` excludes the fee. When the budget is too small to move the
/// price at all, the whole remainder is taken as fee with zero amounts.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<(U256, U256, U256, U256), Error> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let remaining = amount_remaining.unsigned_abs();
    let fee = U256::from(fee_pips);
    let fee_complement = U256_E6.saturating_sub(fee);

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_ratio_next_x96 = if exact_in {
        let remaining_less_fee = mul_div(remaining, fee_complement, U256_E6)?;
        amount_in = if zero_for_one {
            get_amount_0_delta_base(
                sqrt_ratio_target_x96,
                sqrt_ratio_current_x96,
                liquidity,
                true,
            )?
        } else {
            get_amount_1_delta_base(
                sqrt_ratio_current_x96,
                sqrt_ratio_target_x96,
                liquidity,
                true,
            )?
        };

        if remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta_base(
                sqrt_ratio_target_x96,
                sqrt_ratio_current_x96,
                liquidity,
                false,
            )?
        } else {
            get_amount_0_delta_base(
                sqrt_ratio_current_x96,
                sqrt_ratio_target_x96,
                liquidity,
                false,
            )?
        };

        if remaining >= amount_out {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_output(sqrt_ratio_current_x96, liquidity, remaining, zero_for_one)?
        }
    };

    let max = sqrt_ratio_target_x96 == sqrt_ratio_next_x96;

    if zero_for_one {
        if !(max && exact_in) {
            amount_in =
                get_amount_0_delta_base(sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, true)?;
        }
        if !(max && !exact_in) {
            amount_out =
                get_amount_1_delta_base(sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)?;
        }
    } else {
        if !(max && exact_in) {
            amount_in =
                get_amount_1_delta_base(sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, true)?;
        }
        if !(max && !exact_in) {
            amount_out =
                get_amount_0_delta_base(sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, false)?;
        }
    }

    // never hand out more than was asked for
    if !exact_in && amount_out > remaining {
        amount_out = remaining;
    }

    let fee_amount = if exact_in && !max {
        remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, fee_complement)?
    };

    Ok((sqrt_ratio_next_x96, amount_in, amount_out, fee_amount))
}
