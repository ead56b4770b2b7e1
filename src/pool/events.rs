//! Structured records of every state change a pool makes.

use alloy_primitives::{Address, I256, U256};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    Initialize {
        sqrt_price_x96: U256,
        tick: i32,
    },
    Mint {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    Collect {
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0: u128,
        amount1: u128,
    },
    Swap {
        recipient: Address,
        amount0: I256,
        amount1: I256,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
    },
    SetFeeProtocol {
        fee_protocol0_old: u8,
        fee_protocol1_old: u8,
        fee_protocol0_new: u8,
        fee_protocol1_new: u8,
    },
    CollectProtocol {
        sender: Address,
        recipient: Address,
        amount0: u128,
        amount1: u128,
    },
}

/// Receives events after the operation that produced them has committed.
pub trait EventSink {
    fn emit(&mut self, event: PoolEvent);
}

/// Forwards events to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn emit(&mut self, event: PoolEvent) {
        info!(target: "clmm_core::events", ?event, "pool event");
    }
}

/// Keeps every event in memory, in emission order.
impl EventSink for Vec<PoolEvent> {
    fn emit(&mut self, event: PoolEvent) {
        self.push(event);
    }
}

/// Discards everything.
impl EventSink for () {
    fn emit(&mut self, _event: PoolEvent) {}
}
