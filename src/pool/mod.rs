pub mod amm_pool;
pub mod config;
pub mod events;
mod liquidity;
mod lock;
pub mod position;
mod protocol;
pub mod settlement;
pub mod swap;
pub mod tick;
