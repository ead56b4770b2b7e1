use crate::Q128;
use crate::error::{Error, PoolError};
use crate::math::full_math::mul_div;
use crate::math::liquidity_math::add_delta;
use alloy_primitives::{Address, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    #[inline]
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionInfo {
    pub liquidity: u128,
    /// Fee growth inside the range as of the last update.
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Fees and burned principal waiting to be collected.
    pub tokens_owed_0: u128,
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    /// Credits fees earned since the last update and applies
    /// `liquidity_delta`.
    ///
    /// A zero delta on an empty position is rejected so fees can't be poked
    /// into existence. Owed amounts are kept modulo 2^128; owners must
    /// collect before they wrap.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), Error> {
        let liquidity_next = if liquidity_delta == 0 {
            if self.liquidity == 0 {
                return Err(PoolError::EmptyPosition.into());
            }
            self.liquidity
        } else {
            add_delta(self.liquidity, liquidity_delta)?
        };

        let liquidity = U256::from(self.liquidity);
        let owed_0 = mul_div(
            fee_growth_inside_0_x128.wrapping_sub(self.fee_growth_inside_0_last_x128),
            liquidity,
            Q128,
        )?;
        let owed_1 = mul_div(
            fee_growth_inside_1_x128.wrapping_sub(self.fee_growth_inside_1_last_x128),
            liquidity,
            Q128,
        )?;

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;
        self.tokens_owed_0 = self.tokens_owed_0.wrapping_add(low_u128(owed_0));
        self.tokens_owed_1 = self.tokens_owed_1.wrapping_add(low_u128(owed_1));

        Ok(())
    }
}

/// Low 128 bits of `x`.
#[inline]
pub(crate) fn low_u128(x: U256) -> u128 {
    let limbs = x.as_limbs();
    u128::from(limbs[0]) | (u128::from(limbs[1]) << 64)
}
