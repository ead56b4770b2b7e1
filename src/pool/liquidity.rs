//! Minting, burning and collecting positions.

use crate::error::{Error, MathError, PoolError, SettlementError};
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_bitmap::flip_tick;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick};
use crate::pool::amm_pool::{Pool, PoolState};
use crate::pool::config::PoolConfig;
use crate::pool::events::{EventSink, PoolEvent};
use crate::pool::position::{PositionInfo, PositionKey};
use crate::pool::settlement::{SettlementCallback, TokenLedger};
use crate::pool::tick::{TickInfo, fee_growth_inside};
use alloy_primitives::{Address, I256, U256};
use tracing::{debug, instrument};

/// Result of a liquidity change, computed but not yet written to the pool.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PositionChange {
    key: PositionKey,
    liquidity_delta: i128,
    lower: TickInfo,
    upper: TickInfo,
    flipped_lower: bool,
    flipped_upper: bool,
    position: PositionInfo,
    pool_liquidity: u128,
    amount0: I256,
    amount1: I256,
}

fn check_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<(), PoolError> {
    let invalid = tick_lower >= tick_upper
        || tick_lower < MIN_TICK
        || tick_upper > MAX_TICK
        || tick_lower % tick_spacing != 0
        || tick_upper % tick_spacing != 0;

    if invalid {
        return Err(PoolError::InvalidRange {
            tick_lower,
            tick_upper,
        });
    }
    Ok(())
}

impl PoolState {
    /// Works out the effect of adding `liquidity_delta` to a position.
    /// Nothing is written.
    pub(crate) fn modify_position(
        &self,
        config: &PoolConfig,
        key: PositionKey,
        liquidity_delta: i128,
    ) -> Result<PositionChange, Error> {
        check_ticks(key.tick_lower, key.tick_upper, config.tick_spacing)?;

        let tick = self.slot0.tick;
        let fg0 = self.fee_growth_global_0_x128;
        let fg1 = self.fee_growth_global_1_x128;

        let mut lower = self.ticks.get(key.tick_lower);
        let mut upper = self.ticks.get(key.tick_upper);
        let (mut flipped_lower, mut flipped_upper) = (false, false);

        if liquidity_delta != 0 {
            let max = config.max_liquidity_per_tick;
            flipped_lower =
                lower.update(key.tick_lower, tick, liquidity_delta, fg0, fg1, false, max)?;
            flipped_upper =
                upper.update(key.tick_upper, tick, liquidity_delta, fg0, fg1, true, max)?;
        }

        let (fee_growth_inside_0, fee_growth_inside_1) = fee_growth_inside(
            key.tick_lower,
            &lower,
            key.tick_upper,
            &upper,
            tick,
            fg0,
            fg1,
        );

        let mut position = self.positions.get(&key).copied().unwrap_or_default();
        position.update(liquidity_delta, fee_growth_inside_0, fee_growth_inside_1)?;

        let mut amount0 = I256::ZERO;
        let mut amount1 = I256::ZERO;
        let mut pool_liquidity = self.liquidity;

        if liquidity_delta != 0 {
            let sqrt_lower = get_sqrt_ratio_at_tick(key.tick_lower)?;
            let sqrt_upper = get_sqrt_ratio_at_tick(key.tick_upper)?;

            if tick < key.tick_lower {
                amount0 = get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity_delta)?;
            } else if tick < key.tick_upper {
                let sqrt_price = self.slot0.sqrt_price_x96;
                amount0 = get_amount_0_delta(sqrt_price, sqrt_upper, liquidity_delta)?;
                amount1 = get_amount_1_delta(sqrt_lower, sqrt_price, liquidity_delta)?;
                pool_liquidity = add_delta(pool_liquidity, liquidity_delta)?;
            } else {
                amount1 = get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity_delta)?;
            }
        }

        Ok(PositionChange {
            key,
            liquidity_delta,
            lower,
            upper,
            flipped_lower,
            flipped_upper,
            position,
            pool_liquidity,
            amount0,
            amount1,
        })
    }

    /// Writes a change produced by [`PoolState::modify_position`].
    pub(crate) fn apply_position_change(
        &mut self,
        config: &PoolConfig,
        change: &PositionChange,
    ) -> Result<(), Error> {
        let key = change.key;
        if change.liquidity_delta != 0 {
            for (tick, info, flipped) in [
                (key.tick_lower, change.lower, change.flipped_lower),
                (key.tick_upper, change.upper, change.flipped_upper),
            ] {
                if flipped {
                    flip_tick(&mut self.bitmap, tick, config.tick_spacing)?;
                }
                self.ticks.write(tick, info);
            }
        }

        self.positions.insert(key, change.position);
        self.liquidity = change.pool_liquidity;
        Ok(())
    }
}

/// A transfer from the pool to itself moves nothing, so owed balances paid
/// that way would be lost.
pub(crate) fn ensure_external(config: &PoolConfig, recipient: Address) -> Result<(), PoolError> {
    if recipient == config.address {
        return Err(PoolError::InvalidRecipient);
    }
    Ok(())
}

fn to_u128(amount: U256) -> Result<u128, MathError> {
    u128::try_from(amount).map_err(|_| MathError::Overflow)
}

impl<E: EventSink> Pool<E> {
    /// Adds `amount` of liquidity to `owner`'s position over
    /// `[tick_lower, tick_upper)` and returns the token amounts charged.
    ///
    /// The amounts are rounded up and requested from `callback`. The call
    /// fails with [`PoolError::InsufficientInput`] unless the pool's ledger
    /// balance grew by at least that much.
    #[instrument(skip(self, ledger, callback), fields(pool = %self.config.address), level = "debug")]
    pub fn mint(
        &mut self,
        ledger: &mut dyn TokenLedger,
        callback: &mut dyn SettlementCallback,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let _guard = self.lock.acquire()?;
        if amount == 0 {
            return Err(PoolError::ZeroAmount.into());
        }
        let liquidity_delta = i128::try_from(amount).map_err(|_| MathError::Overflow)?;

        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let change = self.state.modify_position(&self.config, key, liquidity_delta)?;
        let amount0 = change.amount0.unsigned_abs();
        let amount1 = change.amount1.unsigned_abs();

        let config = &self.config;
        let balance0_before = ledger.balance_of(config.token0, config.address);
        let balance1_before = ledger.balance_of(config.token1, config.address);

        callback.mint_callback(ledger, config, amount0, amount1)?;

        let paid0 = ledger
            .balance_of(config.token0, config.address)
            .saturating_sub(balance0_before);
        let paid1 = ledger
            .balance_of(config.token1, config.address)
            .saturating_sub(balance1_before);
        if paid0 < amount0 || paid1 < amount1 {
            return Err(PoolError::InsufficientInput.into());
        }

        self.state.apply_position_change(&self.config, &change)?;
        debug!(%amount0, %amount1, liquidity = self.state.liquidity, "minted");

        self.events.emit(PoolEvent::Mint {
            owner,
            tick_lower,
            tick_upper,
            amount,
            amount0,
            amount1,
        });
        Ok((amount0, amount1))
    }

    /// Removes `amount` of liquidity from `owner`'s position. The released
    /// tokens, rounded down, are credited to the position's owed balances
    /// and must be taken out with [`Pool::collect`].
    #[instrument(skip(self), fields(pool = %self.config.address), level = "debug")]
    pub fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let _guard = self.lock.acquire()?;
        let liquidity_delta = i128::try_from(amount)
            .map(|amount| -amount)
            .map_err(|_| MathError::Overflow)?;

        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let mut change = self.state.modify_position(&self.config, key, liquidity_delta)?;
        let amount0 = change.amount0.unsigned_abs();
        let amount1 = change.amount1.unsigned_abs();

        if !amount0.is_zero() || !amount1.is_zero() {
            let position = &mut change.position;
            position.tokens_owed_0 = position.tokens_owed_0.wrapping_add(to_u128(amount0)?);
            position.tokens_owed_1 = position.tokens_owed_1.wrapping_add(to_u128(amount1)?);
        }

        self.state.apply_position_change(&self.config, &change)?;

        self.events.emit(PoolEvent::Burn {
            owner,
            tick_lower,
            tick_upper,
            amount,
            amount0,
            amount1,
        });
        Ok((amount0, amount1))
    }

    /// Credits fees earned by an existing position without changing its
    /// liquidity.
    pub fn poke(&mut self, owner: Address, tick_lower: i32, tick_upper: i32) -> Result<(), Error> {
        self.burn(owner, tick_lower, tick_upper, 0).map(|_| ())
    }

    /// Pays out up to the requested amounts of what `owner`'s position is
    /// owed to `recipient` and returns what was actually paid. The pool's own
    /// address is not a valid recipient.
    #[instrument(skip(self, ledger), fields(pool = %self.config.address), level = "debug")]
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &mut self,
        ledger: &mut dyn TokenLedger,
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        let _guard = self.lock.acquire()?;
        ensure_external(&self.config, recipient)?;

        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let Some(position) = self.state.positions.get(&key).copied() else {
            return Ok((0, 0));
        };

        let amount0 = amount0_requested.min(position.tokens_owed_0);
        let amount1 = amount1_requested.min(position.tokens_owed_1);
        pay_out(ledger, &self.config, recipient, amount0, amount1)?;

        if let Some(position) = self.state.positions.get_mut(&key) {
            position.tokens_owed_0 -= amount0;
            position.tokens_owed_1 -= amount1;
        }

        self.events.emit(PoolEvent::Collect {
            owner,
            recipient,
            tick_lower,
            tick_upper,
            amount0,
            amount1,
        });
        Ok((amount0, amount1))
    }
}

/// Sends both tokens from the pool to `recipient`, or neither.
pub(crate) fn pay_out(
    ledger: &mut dyn TokenLedger,
    config: &PoolConfig,
    recipient: Address,
    amount0: u128,
    amount1: u128,
) -> Result<(), Error> {
    ensure_external(config, recipient)?;
    let amount0 = U256::from(amount0);
    let amount1 = U256::from(amount1);
    for (token, amount) in [(config.token0, amount0), (config.token1, amount1)] {
        if ledger.balance_of(token, config.address) < amount {
            return Err(SettlementError::InsufficientBalance {
                token,
                account: config.address,
            }
            .into());
        }
    }
    ledger.transfer(config.token0, config.address, recipient, amount0)?;
    ledger.transfer(config.token1, config.address, recipient, amount1)
}
