//! Concentrated-liquidity AMM core in pure Rust.
//!
//! This crate exposes:
//! - Exact fixed‑point primitives (`math::*`): 512‑bit intermediate
//!   `mul_div`, tick ↔ sqrt‑price conversion, the tick bitmap and the
//!   single‑step swap solver.
//! - Liquidity ↔ token amount helpers for position managers
//!   (`math::liquidity_amounts`).
//! - An in‑memory [`Pool`] that tracks ticks, positions and fee growth and
//!   executes mint / burn / collect / swap / protocol‑fee operations, with
//!   token settlement delegated to a [`pool::settlement::TokenLedger`].
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use clmm_core::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert_eq!(sqrt_price, U256::from(1u8) << RESOLUTION);
//! assert_eq!(tick_math::get_tick_at_sqrt_ratio(sqrt_price).unwrap(), 0);
//! ```
//!
//! ## Providing liquidity and swapping
//! ```no_run
//! use clmm_core::{
//!     math::tick_math::{MAX_SQRT_RATIO, get_sqrt_ratio_at_tick},
//!     pool::config::{FeeTier, PoolConfig},
//!     pool::settlement::{ExactPayer, MemoryLedger},
//!     pool::swap::SwapParams,
//!     Address, Pool, I256, U256,
//! };
//!
//! let owner = Address::repeat_byte(0xaa);
//! let lp = Address::repeat_byte(0x01);
//! let token_a = Address::repeat_byte(0x10);
//! let token_b = Address::repeat_byte(0x20);
//! let config = PoolConfig::new(Address::repeat_byte(0xff), token_a, token_b, FeeTier::Medium, owner)
//!     .unwrap();
//! let (token0, token1) = (config.token0, config.token1);
//!
//! let mut ledger = MemoryLedger::default();
//! ledger.deposit(token0, lp, U256::from(10u128.pow(24)));
//! ledger.deposit(token1, lp, U256::from(10u128.pow(24)));
//!
//! let mut pool = Pool::with_tracing(config);
//! pool.initialize(get_sqrt_ratio_at_tick(0).unwrap()).unwrap();
//!
//! let mut payer = ExactPayer::new(lp);
//! pool.mint(&mut ledger, &mut payer, lp, -600, 600, 10u128.pow(18)).unwrap();
//!
//! let params = SwapParams::new(
//!     false,
//!     I256::try_from(U256::from(10u64.pow(15))).unwrap(),
//!     MAX_SQRT_RATIO - U256::from(1u8),
//! );
//! let result = pool.swap(&mut ledger, &mut payer, lp, params).unwrap();
//! println!("amount0: {}, amount1: {}", result.amount0_delta, result.amount1_delta);
//! ```

pub use alloy_primitives::{Address, I256, U256};

pub mod error;
mod hash;
pub mod math;

pub use hash::FastMap;

pub mod pool;

pub use pool::amm_pool::Pool;

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);

const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);
const U256_E6: U256 = U256::from_limbs([1000000, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
pub const Q192: U256 = U256::from_limbs([0, 0, 0, 1]);
