use crate::Q128;
use crate::error::{Error, MathError, PoolError, SettlementError};
use crate::math::full_math::mul_div;
use crate::math::liquidity_math::add_delta;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_bitmap::next_initialized_tick_within_one_word;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::pool::amm_pool::{Pool, PoolState};
use crate::pool::config::PoolConfig;
use crate::pool::events::{EventSink, PoolEvent};
use crate::pool::liquidity::ensure_external;
use crate::pool::settlement::{SettlementCallback, TokenLedger};
use alloy_primitives::{Address, I256, U256};
use tracing::{instrument, trace};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

#[derive(Copy, Clone, Debug)]
pub struct SwapParams {
    /// Swap direction: `true` for token0 → token1, `false` for token1 → token0.
    pub zero_for_one: bool,
    /// Signed amount being swapped. Positive means “exact in”, negative means “exact out”.
    pub amount_specified: I256,
    /// Sqrt‑price limit in Q96 that bounds how far the price is allowed to move.
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    #[inline]
    pub fn new(zero_for_one: bool, amount_specified: I256, sqrt_price_limit_x96: U256) -> Self {
        Self {
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
        }
    }
}

/// Outcome of a committed swap. Positive deltas were paid into the pool,
/// negative ones were sent to the recipient.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub amount0_delta: I256,
    pub amount1_delta: I256,
    /// Total fee charged in the input token, protocol share included.
    pub fees_paid: U256,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
}

// the top level state of the swap, the results of which are recorded in storage at the end
#[derive(Clone, Debug, Default)]
pub(crate) struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_specified_remaining: I256,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: I256,
    sqrt_price_x96: U256,
    tick: i32,
    // global fee growth of the input token
    fee_growth_global_x128: U256,
    // amount of input token paid as protocol fee
    protocol_fee: u128,
    // the current liquidity in range
    liquidity: u128,
    // accumulated swap fees
    swap_fee: U256,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start_x96: U256,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or not
    initialized: bool,
    // sqrt(price) for the next tick (1/0)
    sqrt_price_next_x96: U256,
    // how much is being swapped in this step
    amount_in: U256,
    // how much is being swapped out
    amount_out: U256,
    // how much fee is being paid in
    fee_amount: U256,
}

/// A tick the price moved through, with the global fee growth at that
/// moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TickCrossing {
    tick: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
}

/// A fully computed swap that has not touched pool state yet.
#[derive(Clone, Debug)]
pub(crate) struct SwapComputation {
    zero_for_one: bool,
    state: SwapState,
    crossings: Vec<TickCrossing>,
    pub(crate) amount0: I256,
    pub(crate) amount1: I256,
}

#[inline]
fn to_i256(x: U256) -> Result<I256, MathError> {
    I256::try_from(x).map_err(|_| MathError::Overflow)
}

impl PoolState {
    /// Runs the swap loop against the current state without writing it.
    pub(crate) fn compute_swap(
        &self,
        config: &PoolConfig,
        params: &SwapParams,
    ) -> Result<SwapComputation, Error> {
        let amount_specified = params.amount_specified;
        if amount_specified.is_zero() {
            return Err(PoolError::ZeroAmount.into());
        }

        let zero_for_one = params.zero_for_one;
        let sqrt_price_limit_x96 = params.sqrt_price_limit_x96;
        let limit_valid = if zero_for_one {
            sqrt_price_limit_x96 < self.slot0.sqrt_price_x96 && sqrt_price_limit_x96 > MIN_SQRT_RATIO
        } else {
            sqrt_price_limit_x96 > self.slot0.sqrt_price_x96 && sqrt_price_limit_x96 < MAX_SQRT_RATIO
        };
        if !limit_valid {
            return Err(PoolError::PriceLimitInvalid.into());
        }

        let fee_protocol = if zero_for_one {
            self.fee_protocol % 16
        } else {
            self.fee_protocol >> 4
        };
        let exact_input = amount_specified.is_positive();

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: self.slot0.sqrt_price_x96,
            tick: self.slot0.tick,
            fee_growth_global_x128: if zero_for_one {
                self.fee_growth_global_0_x128
            } else {
                self.fee_growth_global_1_x128
            },
            protocol_fee: 0,
            liquidity: self.liquidity,
            swap_fee: U256::ZERO,
        };
        let mut crossings = Vec::new();

        while !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..StepComputations::default()
            };

            (step.tick_next, step.initialized) = next_initialized_tick_within_one_word(
                &self.bitmap,
                state.tick,
                config.tick_spacing,
                zero_for_one,
            )?;

            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);

            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            let sqrt_price_target_x96 = if zero_for_one {
                step.sqrt_price_next_x96.max(sqrt_price_limit_x96)
            } else {
                step.sqrt_price_next_x96.min(sqrt_price_limit_x96)
            };

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                sqrt_price_target_x96,
                state.liquidity,
                state.amount_specified_remaining,
                config.fee,
            )?;

            let amount_in_with_fee = to_i256(
                step.amount_in
                    .checked_add(step.fee_amount)
                    .ok_or(MathError::Overflow)?,
            )?;
            let amount_out = to_i256(step.amount_out)?;

            if exact_input {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_sub(amount_in_with_fee)
                    .ok_or(MathError::Overflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_sub(amount_out)
                    .ok_or(MathError::Overflow)?;
            } else {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_add(amount_out)
                    .ok_or(MathError::Overflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_add(amount_in_with_fee)
                    .ok_or(MathError::Overflow)?;
            }

            state.swap_fee = state.swap_fee.saturating_add(step.fee_amount);

            if fee_protocol > 0 {
                let delta = step.fee_amount / U256::from(fee_protocol);
                step.fee_amount -= delta;
                state.protocol_fee = u128::try_from(delta)
                    .ok()
                    .and_then(|delta| state.protocol_fee.checked_add(delta))
                    .ok_or(MathError::Overflow)?;
            }

            // with no liquidity in range the fee has nobody to go to
            if state.liquidity > 0 {
                state.fee_growth_global_x128 = state.fee_growth_global_x128.wrapping_add(mul_div(
                    step.fee_amount,
                    Q128,
                    U256::from(state.liquidity),
                )?);
            }

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    let crossing = if zero_for_one {
                        TickCrossing {
                            tick: step.tick_next,
                            fee_growth_global_0_x128: state.fee_growth_global_x128,
                            fee_growth_global_1_x128: self.fee_growth_global_1_x128,
                        }
                    } else {
                        TickCrossing {
                            tick: step.tick_next,
                            fee_growth_global_0_x128: self.fee_growth_global_0_x128,
                            fee_growth_global_1_x128: state.fee_growth_global_x128,
                        }
                    };
                    crossings.push(crossing);

                    let mut liquidity_net = self.ticks.get(step.tick_next).liquidity_net;
                    if zero_for_one {
                        liquidity_net = liquidity_net.checked_neg().ok_or(MathError::Overflow)?;
                    }
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }

            trace!(
                tick_next = step.tick_next,
                initialized = step.initialized,
                amount_in = %step.amount_in,
                amount_out = %step.amount_out,
                fee = %step.fee_amount,
                tick = state.tick,
                liquidity = state.liquidity,
                "swap step"
            );
        }

        let specified_used = amount_specified
            .checked_sub(state.amount_specified_remaining)
            .ok_or(MathError::Overflow)?;
        let (amount0, amount1) = if zero_for_one == exact_input {
            (specified_used, state.amount_calculated)
        } else {
            (state.amount_calculated, specified_used)
        };

        Ok(SwapComputation {
            zero_for_one,
            state,
            crossings,
            amount0,
            amount1,
        })
    }

    /// Writes a swap produced by [`PoolState::compute_swap`].
    pub(crate) fn apply_swap(&mut self, swap: &SwapComputation) {
        for crossing in &swap.crossings {
            self.ticks.cross(
                crossing.tick,
                crossing.fee_growth_global_0_x128,
                crossing.fee_growth_global_1_x128,
            );
        }

        let state = &swap.state;
        self.slot0 = Slot0 {
            sqrt_price_x96: state.sqrt_price_x96,
            tick: state.tick,
        };
        self.liquidity = state.liquidity;

        if swap.zero_for_one {
            self.fee_growth_global_0_x128 = state.fee_growth_global_x128;
            self.protocol_fees.token0 = self.protocol_fees.token0.wrapping_add(state.protocol_fee);
        } else {
            self.fee_growth_global_1_x128 = state.fee_growth_global_x128;
            self.protocol_fees.token1 = self.protocol_fees.token1.wrapping_add(state.protocol_fee);
        }
    }
}

impl<E: EventSink> Pool<E> {
    /// Executes a swap and settles it.
    ///
    /// The input is requested from `callback` and verified against the
    /// pool's ledger balance before the output is sent to `recipient`. Pool
    /// state is only written once both legs have settled.
    #[instrument(skip(self, ledger, callback), fields(pool = %self.config.address), level = "debug")]
    pub fn swap(
        &mut self,
        ledger: &mut dyn TokenLedger,
        callback: &mut dyn SettlementCallback,
        recipient: Address,
        params: SwapParams,
    ) -> Result<SwapResult, Error> {
        let _guard = self.lock.acquire()?;
        ensure_external(&self.config, recipient)?;
        let swap = self.state.compute_swap(&self.config, &params)?;
        let (amount0, amount1) = (swap.amount0, swap.amount1);

        let config = &self.config;
        let (token_in, amount_in, token_out, amount_out) = if swap.zero_for_one {
            (config.token0, amount0, config.token1, amount1)
        } else {
            (config.token1, amount1, config.token0, amount0)
        };
        let amount_in = if amount_in.is_positive() {
            amount_in.unsigned_abs()
        } else {
            U256::ZERO
        };
        let amount_out = if amount_out.is_negative() {
            amount_out.unsigned_abs()
        } else {
            U256::ZERO
        };

        if ledger.balance_of(token_out, config.address) < amount_out {
            return Err(SettlementError::InsufficientBalance {
                token: token_out,
                account: config.address,
            }
            .into());
        }

        let balance_before = ledger.balance_of(token_in, config.address);
        callback.swap_callback(ledger, config, amount0, amount1)?;
        let paid = ledger
            .balance_of(token_in, config.address)
            .saturating_sub(balance_before);
        if paid < amount_in {
            return Err(PoolError::InsufficientInput.into());
        }

        ledger.transfer(token_out, config.address, recipient, amount_out)?;

        self.state.apply_swap(&swap);

        let result = SwapResult {
            amount0_delta: amount0,
            amount1_delta: amount1,
            fees_paid: swap.state.swap_fee,
            sqrt_price_x96: swap.state.sqrt_price_x96,
            tick: swap.state.tick,
            liquidity: swap.state.liquidity,
        };

        self.events.emit(PoolEvent::Swap {
            recipient,
            amount0,
            amount1,
            sqrt_price_x96: result.sqrt_price_x96,
            liquidity: result.liquidity,
            tick: result.tick,
        });
        Ok(result)
    }
}
