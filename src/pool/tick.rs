//! Per-tick liquidity and fee-growth bookkeeping.
//!
//! Fee growth fields are Q128.128 accumulators that wrap modulo 2^256.
//! Only differences between them are meaningful.

use crate::FastMap;
use crate::error::{Error, MathError};
use crate::math::liquidity_math::add_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use alloy_primitives::U256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInfo {
    /// Total liquidity of all positions that use this tick as a bound.
    pub liquidity_gross: u128,
    /// Liquidity added when the price crosses this tick upwards.
    pub liquidity_net: i128,
    /// Fee growth on the other side of this tick, relative to the current tick.
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
}

impl TickInfo {
    /// Applies a liquidity change to this tick and returns whether it
    /// flipped between referenced and unreferenced.
    ///
    /// A tick initialized at or below `tick_current` assumes all fee growth
    /// so far happened below it. The tick is left unchanged on error.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool, Error> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = add_delta(liquidity_gross_before, liquidity_delta)?;
        if liquidity_gross_after > max_liquidity {
            return Err(MathError::Overflow.into());
        }

        let liquidity_net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(MathError::Overflow)?;

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 && tick <= tick_current {
            self.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
            self.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
        }
        self.liquidity_gross = liquidity_gross_after;
        self.liquidity_net = liquidity_net;

        Ok(flipped)
    }
}

/// Largest `liquidity_gross` a single tick may carry for `tick_spacing`, so
/// that the sum over every usable tick still fits in `u128`.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Fee growth inside `[tick_lower, tick_upper)` from the two boundary ticks.
///
/// Every subtraction wraps; a negative intermediate is expected whenever the
/// boundaries were initialized at different times.
pub fn fee_growth_inside(
    tick_lower: i32,
    lower: &TickInfo,
    tick_upper: i32,
    upper: &TickInfo,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let (below_0, below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(lower.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    };

    let (above_0, above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    };

    (
        fee_growth_global_0_x128
            .wrapping_sub(below_0)
            .wrapping_sub(above_0),
        fee_growth_global_1_x128
            .wrapping_sub(below_1)
            .wrapping_sub(above_1),
    )
}

/// Sparse tick storage. Absent ticks read as [`TickInfo::default`].
#[derive(Debug, Clone, Default)]
pub struct TickManager {
    ticks: FastMap<i32, TickInfo>,
}

impl TickManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the tick's state, all-zero when absent.
    #[inline]
    pub fn get(&self, tick: i32) -> TickInfo {
        self.ticks.get(&tick).copied().unwrap_or_default()
    }

    #[inline]
    pub fn info(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Number of ticks currently referenced by a position.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Updates `tick` in place. See [`TickInfo::update`].
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool, Error> {
        let mut info = self.get(tick);
        let flipped = info.update(
            tick,
            tick_current,
            liquidity_delta,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
            upper,
            max_liquidity,
        )?;
        self.ticks.insert(tick, info);
        Ok(flipped)
    }

    /// Stores a tick, dropping it when nothing references it any more.
    pub(crate) fn write(&mut self, tick: i32, info: TickInfo) {
        if info.liquidity_gross == 0 {
            self.clear(tick);
        } else {
            self.ticks.insert(tick, info);
        }
    }

    /// Removes all state for `tick`.
    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Flips the fee-growth reference frame of `tick` as the price moves
    /// through it and returns its `liquidity_net`.
    pub fn cross(
        &mut self,
        tick: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> i128 {
        let info = self.ticks.entry(tick).or_default();
        info.fee_growth_outside_0_x128 =
            fee_growth_global_0_x128.wrapping_sub(info.fee_growth_outside_0_x128);
        info.fee_growth_outside_1_x128 =
            fee_growth_global_1_x128.wrapping_sub(info.fee_growth_outside_1_x128);
        info.liquidity_net
    }

    pub fn fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> (U256, U256) {
        fee_growth_inside(
            tick_lower,
            &self.get(tick_lower),
            tick_upper,
            &self.get(tick_upper),
            tick_current,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
        )
    }
}
