//! Token movement at the edge of the pool.
//!
//! The pool never holds balances itself. A [`TokenLedger`] owns them and is
//! trusted to report balances truthfully. A [`SettlementCallback`] is the
//! untrusted party that pays what the pool asks for. Whatever it claims, the
//! pool re-reads its own ledger balance afterwards.

use crate::FastMap;
use crate::error::{Error, MathError, SettlementError};
use crate::pool::config::PoolConfig;
use alloy_primitives::{Address, I256, U256};

pub trait TokenLedger {
    fn balance_of(&self, token: Address, account: Address) -> U256;

    /// Moves `amount` of `token`. Must fail without effect when `from`
    /// holds too little.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error>;
}

pub trait SettlementCallback {
    /// Called during `mint` with the amounts the pool expects to receive.
    fn mint_callback(
        &mut self,
        ledger: &mut dyn TokenLedger,
        pool: &PoolConfig,
        amount0_owed: U256,
        amount1_owed: U256,
    ) -> Result<(), Error>;

    /// Called during `swap`. Positive deltas are owed to the pool.
    fn swap_callback(
        &mut self,
        ledger: &mut dyn TokenLedger,
        pool: &PoolConfig,
        amount0_delta: I256,
        amount1_delta: I256,
    ) -> Result<(), Error>;
}

/// Balances kept in a hash map keyed by `(token, account)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: FastMap<(Address, Address), U256>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` of `token` to `account` out of thin air.
    pub fn deposit(&mut self, token: Address, account: Address, amount: U256) {
        let balance = self.balances.entry((token, account)).or_default();
        *balance = balance.saturating_add(amount);
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(SettlementError::InsufficientBalance {
                token,
                account: from,
            }
            .into());
        }
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;

        self.balances.insert((token, from), from_balance - amount);
        self.balances.insert((token, to), to_balance);
        Ok(())
    }
}

/// Pays exactly what the pool asks for from a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactPayer {
    pub payer: Address,
}

impl ExactPayer {
    pub fn new(payer: Address) -> Self {
        Self { payer }
    }
}

impl SettlementCallback for ExactPayer {
    fn mint_callback(
        &mut self,
        ledger: &mut dyn TokenLedger,
        pool: &PoolConfig,
        amount0_owed: U256,
        amount1_owed: U256,
    ) -> Result<(), Error> {
        ledger.transfer(pool.token0, self.payer, pool.address, amount0_owed)?;
        ledger.transfer(pool.token1, self.payer, pool.address, amount1_owed)
    }

    fn swap_callback(
        &mut self,
        ledger: &mut dyn TokenLedger,
        pool: &PoolConfig,
        amount0_delta: I256,
        amount1_delta: I256,
    ) -> Result<(), Error> {
        if amount0_delta.is_positive() {
            ledger.transfer(
                pool.token0,
                self.payer,
                pool.address,
                amount0_delta.unsigned_abs(),
            )?;
        }
        if amount1_delta.is_positive() {
            ledger.transfer(
                pool.token1,
                self.payer,
                pool.address,
                amount1_delta.unsigned_abs(),
            )?;
        }
        Ok(())
    }
}
