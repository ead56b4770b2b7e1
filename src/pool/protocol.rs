//! Owner-only protocol fee switch and collection.

use crate::error::{Error, PoolError};
use crate::pool::amm_pool::Pool;
use crate::pool::events::{EventSink, PoolEvent};
use crate::pool::liquidity::pay_out;
use crate::pool::settlement::TokenLedger;
use alloy_primitives::Address;
use tracing::instrument;

#[inline]
fn valid_fee_protocol(fee: u8) -> bool {
    fee == 0 || (4..=10).contains(&fee)
}

impl<E: EventSink> Pool<E> {
    fn ensure_owner(&self, sender: Address) -> Result<(), PoolError> {
        if sender != self.config.owner {
            return Err(PoolError::NotAuthorized(sender));
        }
        Ok(())
    }

    /// Sets the share of swap fees kept by the protocol, as `1/fee` of each
    /// token's fees. 0 turns it off for that token.
    #[instrument(skip(self), fields(pool = %self.config.address), level = "debug")]
    pub fn set_fee_protocol(
        &mut self,
        sender: Address,
        fee_protocol0: u8,
        fee_protocol1: u8,
    ) -> Result<(), Error> {
        let _guard = self.lock.acquire()?;
        self.ensure_owner(sender)?;
        if !valid_fee_protocol(fee_protocol0) || !valid_fee_protocol(fee_protocol1) {
            return Err(PoolError::InvalidFeeProtocol(fee_protocol0, fee_protocol1).into());
        }

        let old = self.state.fee_protocol;
        self.state.fee_protocol = fee_protocol0 + (fee_protocol1 << 4);

        self.events.emit(PoolEvent::SetFeeProtocol {
            fee_protocol0_old: old % 16,
            fee_protocol1_old: old >> 4,
            fee_protocol0_new: fee_protocol0,
            fee_protocol1_new: fee_protocol1,
        });
        Ok(())
    }

    /// Sends up to the requested protocol fees to `recipient`.
    ///
    /// A full withdrawal leaves one unit behind, so an accrued balance never
    /// drops back to zero.
    #[instrument(skip(self, ledger), fields(pool = %self.config.address), level = "debug")]
    pub fn collect_protocol(
        &mut self,
        ledger: &mut dyn TokenLedger,
        sender: Address,
        recipient: Address,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        let _guard = self.lock.acquire()?;
        self.ensure_owner(sender)?;

        let fees = self.state.protocol_fees;
        let mut amount0 = amount0_requested.min(fees.token0);
        let mut amount1 = amount1_requested.min(fees.token1);
        if amount0 > 0 && amount0 == fees.token0 {
            amount0 -= 1;
        }
        if amount1 > 0 && amount1 == fees.token1 {
            amount1 -= 1;
        }

        pay_out(ledger, &self.config, recipient, amount0, amount1)?;
        self.state.protocol_fees.token0 -= amount0;
        self.state.protocol_fees.token1 -= amount1;

        self.events.emit(PoolEvent::CollectProtocol {
            sender,
            recipient,
            amount0,
            amount1,
        });
        Ok((amount0, amount1))
    }
}
