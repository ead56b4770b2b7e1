//! Deployment-time pool parameters.

use crate::error::ConfigError;
use crate::pool::tick::max_liquidity_per_tick;
use alloy_primitives::Address;

/// Fees are expressed in hundredths of a bip.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Exclusive upper bound on tick spacing; keeps a bitmap word index in `i16`.
pub const MAX_TICK_SPACING: i32 = 16384;

/// Fee tier and its tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeTier {
    /// 0.05%, spacing 10.
    Low,
    /// 0.3%, spacing 60.
    Medium,
    /// 1%, spacing 200.
    High,
    Custom { fee: u32, tick_spacing: i32 },
}

impl FeeTier {
    #[inline]
    pub fn fee(&self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10000,
            FeeTier::Custom { fee, .. } => *fee,
        }
    }

    #[inline]
    pub fn tick_spacing(&self) -> i32 {
        match self {
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
            FeeTier::Custom { tick_spacing, .. } => *tick_spacing,
        }
    }

    /// Maps a standard fee back to its tier.
    pub fn from_fee(fee: u32) -> Option<Self> {
        match fee {
            500 => Some(FeeTier::Low),
            3000 => Some(FeeTier::Medium),
            10000 => Some(FeeTier::High),
            _ => None,
        }
    }
}

/// Immutable parameters of a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Account that holds the pool's token balances in the ledger.
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    /// The only account allowed to change or collect protocol fees.
    pub owner: Address,
    pub max_liquidity_per_tick: u128,
}

impl PoolConfig {
    /// Builds a pool config, ordering the two tokens so that
    /// `token0 < token1`.
    pub fn new(
        address: Address,
        token_a: Address,
        token_b: Address,
        tier: FeeTier,
        owner: Address,
    ) -> Result<Self, ConfigError> {
        if token_a == token_b {
            return Err(ConfigError::IdenticalTokens);
        }
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        if token0 == Address::ZERO {
            return Err(ConfigError::ZeroAddress);
        }

        let fee = tier.fee();
        if fee >= FEE_DENOMINATOR {
            return Err(ConfigError::FeeTooHigh(fee));
        }
        let tick_spacing = tier.tick_spacing();
        if tick_spacing <= 0 || tick_spacing >= MAX_TICK_SPACING {
            return Err(ConfigError::InvalidTickSpacing(tick_spacing));
        }

        Ok(Self {
            address,
            token0,
            token1,
            fee,
            tick_spacing,
            owner,
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
        })
    }
}
