use crate::FastMap;
use crate::error::{Error, PoolError};
use crate::math::tick_bitmap::get_word;
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::pool::config::PoolConfig;
use crate::pool::events::{EventSink, PoolEvent, TracingEvents};
use crate::pool::lock::Lock;
use crate::pool::position::{PositionInfo, PositionKey};
use crate::pool::swap::Slot0;
use crate::pool::tick::{TickInfo, TickManager};
use alloy_primitives::{Address, U256};
use tracing::instrument;

/// Protocol fees accrued and not yet collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolFees {
    pub token0: u128,
    pub token1: u128,
}

/// Everything a pool operation may change. Operations build their result
/// against a borrowed `PoolState` and only write it back once nothing can
/// fail any more.
#[derive(Debug, Clone, Default)]
pub(crate) struct PoolState {
    pub(crate) slot0: Slot0,
    pub(crate) liquidity: u128,
    pub(crate) fee_growth_global_0_x128: U256,
    pub(crate) fee_growth_global_1_x128: U256,
    /// `fee0 + (fee1 << 4)`, each half 0 or 4..=10.
    pub(crate) fee_protocol: u8,
    pub(crate) protocol_fees: ProtocolFees,
    pub(crate) ticks: TickManager,
    pub(crate) bitmap: FastMap<i16, U256>,
    pub(crate) positions: FastMap<PositionKey, PositionInfo>,
}

/// A single concentrated-liquidity pool.
///
/// Operations run one at a time. Every mutating entry point holds the
/// pool's reentrancy lock for its whole duration, and the lock stays closed
/// until [`Pool::initialize`] succeeds, so nothing but `initialize` works on
/// a fresh pool.
///
/// Cloning a pool snapshots its whole state, which is handy for dry runs.
#[derive(Debug, Clone)]
pub struct Pool<E: EventSink = TracingEvents> {
    pub(crate) config: PoolConfig,
    pub(crate) lock: Lock,
    pub(crate) state: PoolState,
    pub(crate) events: E,
}

impl Pool<TracingEvents> {
    /// Creates a pool whose events go to `tracing`.
    pub fn with_tracing(config: PoolConfig) -> Self {
        Self::new(config, TracingEvents)
    }
}

impl<E: EventSink> Pool<E> {
    pub fn new(config: PoolConfig, events: E) -> Self {
        Self {
            config,
            lock: Lock::default(),
            state: PoolState::default(),
            events,
        }
    }

    /// Sets the starting price and opens the pool. Returns the tick of that
    /// price.
    #[instrument(skip(self), fields(pool = %self.config.address), level = "debug")]
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<i32, Error> {
        if self.is_initialized() {
            return Err(PoolError::AlreadyInitialized.into());
        }
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;

        self.state.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
        };
        self.lock.open();

        self.events.emit(PoolEvent::Initialize {
            sqrt_price_x96,
            tick,
        });
        Ok(tick)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.state.slot0.sqrt_price_x96.is_zero()
    }

    /// Whether no operation currently holds the reentrancy lock.
    #[inline]
    pub fn is_unlocked(&self) -> bool {
        self.lock.is_unlocked()
    }

    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    #[inline]
    pub fn slot0(&self) -> Slot0 {
        self.state.slot0
    }

    /// Liquidity active at the current tick.
    #[inline]
    pub fn liquidity(&self) -> u128 {
        self.state.liquidity
    }

    #[inline]
    pub fn fee_growth_global(&self) -> (U256, U256) {
        (
            self.state.fee_growth_global_0_x128,
            self.state.fee_growth_global_1_x128,
        )
    }

    /// Protocol fee denominators for `(token0, token1)`; 0 means disabled.
    #[inline]
    pub fn fee_protocol(&self) -> (u8, u8) {
        (self.state.fee_protocol % 16, self.state.fee_protocol >> 4)
    }

    #[inline]
    pub fn protocol_fees(&self) -> ProtocolFees {
        self.state.protocol_fees
    }

    #[inline]
    pub fn tick_spacing(&self) -> i32 {
        self.config.tick_spacing
    }

    #[inline]
    pub fn max_liquidity_per_tick(&self) -> u128 {
        self.config.max_liquidity_per_tick
    }

    /// State of an initialized tick, `None` for ticks no position uses.
    pub fn tick(&self, tick: i32) -> Option<&TickInfo> {
        self.state.ticks.info(tick)
    }

    pub fn ticks(&self) -> &TickManager {
        &self.state.ticks
    }

    /// Raw bitmap word at `word_pos`.
    pub fn tick_bitmap(&self, word_pos: i16) -> U256 {
        get_word(&self.state.bitmap, word_pos)
    }

    pub fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> Option<&PositionInfo> {
        self.state
            .positions
            .get(&PositionKey::new(owner, tick_lower, tick_upper))
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }
}
