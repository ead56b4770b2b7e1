use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - out of bounds")]
    OutOfBounds,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("State error - sqrtRatio is 0")]
    SqrtRatioIsZero,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - liquidity is 0")]
    LiquidityIsZero,

    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,
}

/// Failures of the pool state machine and its admin surface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool error - invalid tick range [{tick_lower}, {tick_upper})")]
    InvalidRange { tick_lower: i32, tick_upper: i32 },
    #[error("Pool error - already initialized")]
    AlreadyInitialized,
    #[error("Pool error - locked or not initialized")]
    Locked,
    #[error("Pool error - sqrtPriceLimit is on the wrong side of the price or out of bounds")]
    PriceLimitInvalid,
    #[error("Pool error - settlement left the pool under-funded")]
    InsufficientInput,
    #[error("Pool error - caller {0} is not the pool owner")]
    NotAuthorized(Address),
    #[error("Pool error - fee protocol ({0}, {1}) must be 0 or within 4..=10")]
    InvalidFeeProtocol(u8, u8),
    #[error("Pool error - amount is 0")]
    ZeroAmount,
    #[error("Pool error - position has no liquidity")]
    EmptyPosition,
    #[error("Pool error - the pool itself cannot receive tokens")]
    InvalidRecipient,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config error - token0 and token1 are the same address")]
    IdenticalTokens,
    #[error("Config error - token address is zero")]
    ZeroAddress,
    #[error("Config error - fee {0} must be below 1_000_000 pips")]
    FeeTooHigh(u32),
    #[error("Config error - tick spacing {0} must be within 1..16384")]
    InvalidTickSpacing(i32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Settlement error - {account} holds too little of token {token}")]
    InsufficientBalance { token: Address, account: Address },
    #[error("Settlement error - callback refused to pay")]
    Refused,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    PoolError(#[from] crate::error::PoolError),

    #[error(transparent)]
    ConfigError(#[from] crate::error::ConfigError),

    #[error(transparent)]
    SettlementError(#[from] crate::error::SettlementError),
}
