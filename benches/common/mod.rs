#![allow(dead_code)]

use clmm_core::math::{
    bit_math, full_math, liquidity_amounts, sqrt_price_math, swap_math, tick_bitmap, tick_math,
};
use clmm_core::pool::config::{FeeTier, PoolConfig};
use clmm_core::pool::events::PoolEvent;
use clmm_core::pool::settlement::{ExactPayer, MemoryLedger};
use clmm_core::pool::swap::SwapParams;
use alloy_primitives::address;
use clmm_core::{Address, FastMap, I256, Pool, Q96, U256};
use criterion::{BatchSize, Criterion, black_box};

const E18: u128 = 1_000_000_000_000_000_000;

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    let ticks = [-887272, -200_000, -60, 0, 1, 60, 200_000, 887272];
    let prices: Vec<U256> = ticks
        .iter()
        .map(|t| tick_math::get_sqrt_ratio_at_tick(*t).unwrap())
        .collect();

    group.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| {
            for tick in ticks {
                black_box(tick_math::get_sqrt_ratio_at_tick(black_box(tick)).unwrap());
            }
        })
    });
    group.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| {
            for price in &prices {
                black_box(tick_math::get_tick_at_sqrt_ratio(black_box(*price)).unwrap());
            }
        })
    });
    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqrt_price_math");
    let lower = tick_math::get_sqrt_ratio_at_tick(-600).unwrap();
    let upper = tick_math::get_sqrt_ratio_at_tick(600).unwrap();
    let amount = U256::from(10u128.pow(15));

    group.bench_function("get_amount_0_delta", |b| {
        b.iter(|| sqrt_price_math::get_amount_0_delta(black_box(lower), black_box(upper), E18 as i128))
    });
    group.bench_function("get_amount_1_delta", |b| {
        b.iter(|| sqrt_price_math::get_amount_1_delta(black_box(lower), black_box(upper), E18 as i128))
    });
    group.bench_function("get_next_sqrt_price_from_input", |b| {
        b.iter(|| {
            sqrt_price_math::get_next_sqrt_price_from_input(black_box(Q96), E18, black_box(amount), true)
        })
    });
    group.bench_function("get_next_sqrt_price_from_output", |b| {
        b.iter(|| {
            sqrt_price_math::get_next_sqrt_price_from_output(black_box(Q96), E18, black_box(amount), false)
        })
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_math");
    let target = tick_math::get_sqrt_ratio_at_tick(-600).unwrap();
    let exact_in = I256::try_from(10i128.pow(15)).unwrap();
    let exact_out = I256::try_from(-(10i128.pow(15))).unwrap();

    group.bench_function("compute_swap_step_exact_in", |b| {
        b.iter(|| swap_math::compute_swap_step(black_box(Q96), black_box(target), E18, exact_in, 3000))
    });
    group.bench_function("compute_swap_step_exact_out", |b| {
        b.iter(|| swap_math::compute_swap_step(black_box(Q96), black_box(target), E18, exact_out, 3000))
    });
    group.finish();
}

pub fn bench_full_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_math");
    let a = U256::MAX / U256::from(3u8);
    let b = U256::from(u128::MAX);
    let d = U256::MAX / U256::from(7u8);

    group.bench_function("mul_div", |bench| {
        bench.iter(|| full_math::mul_div(black_box(a), black_box(b), black_box(d)))
    });
    group.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| full_math::mul_div_rounding_up(black_box(a), black_box(b), black_box(d)))
    });
    group.bench_function("sqrt", |bench| bench.iter(|| full_math::sqrt(black_box(a))));
    group.finish();
}

pub fn bench_tick_bitmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_bitmap");
    let mut bitmap: FastMap<i16, U256> = FastMap::default();
    for tick in (-6000..=6000).step_by(600) {
        tick_bitmap::flip_tick(&mut bitmap, tick, 60).unwrap();
    }

    group.bench_function("next_initialized_tick_lte", |b| {
        b.iter(|| tick_bitmap::next_initialized_tick_within_one_word(&bitmap, black_box(3000), 60, true))
    });
    group.bench_function("next_initialized_tick_gt", |b| {
        b.iter(|| tick_bitmap::next_initialized_tick_within_one_word(&bitmap, black_box(-3000), 60, false))
    });
    group.bench_function("flip_tick_twice", |b| {
        b.iter_batched(
            || bitmap.clone(),
            |mut bitmap| {
                tick_bitmap::flip_tick(&mut bitmap, 120, 60).unwrap();
                tick_bitmap::flip_tick(&mut bitmap, 120, 60).unwrap();
                black_box(bitmap)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_bit_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_math");
    let x = U256::from(0x1234_5678_9abc_def0u64) << 77usize;

    group.bench_function("most_significant_bit", |b| {
        b.iter(|| bit_math::most_significant_bit(black_box(x)))
    });
    group.bench_function("least_significant_bit", |b| {
        b.iter(|| bit_math::least_significant_bit(black_box(x)))
    });
    group.finish();
}

pub fn bench_liquidity_amounts(c: &mut Criterion) {
    let mut group = c.benchmark_group("liquidity_amounts");
    let lower = tick_math::get_sqrt_ratio_at_tick(-600).unwrap();
    let upper = tick_math::get_sqrt_ratio_at_tick(600).unwrap();
    let amount = U256::from(10u128.pow(18));

    group.bench_function("get_liquidity_for_amounts", |b| {
        b.iter(|| {
            liquidity_amounts::get_liquidity_for_amounts(black_box(Q96), lower, upper, amount, amount)
        })
    });
    group.bench_function("get_amounts_for_liquidity", |b| {
        b.iter(|| liquidity_amounts::get_amounts_for_liquidity(black_box(Q96), lower, upper, E18))
    });
    group.finish();
}

// ============================================================
// POOL
// ============================================================

const POOL: Address = address!("0xffffffffffffffffffffffffffffffffffffffff");
const OWNER: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const TRADER: Address = address!("0x0101010101010101010101010101010101010101");
const TOKEN_A: Address = address!("0x1010101010101010101010101010101010101010");
const TOKEN_B: Address = address!("0x2020202020202020202020202020202020202020");

type BenchPool = Pool<()>;

/// A medium-tier pool at tick 0 with a ladder of positions every 600 ticks,
/// so a large swap crosses many initialized ticks.
fn laddered_pool() -> (BenchPool, MemoryLedger) {
    let config = PoolConfig::new(POOL, TOKEN_A, TOKEN_B, FeeTier::Medium, OWNER).unwrap();
    let mut pool = Pool::new(config, ());
    pool.initialize(Q96).unwrap();

    let mut ledger = MemoryLedger::new();
    let plenty = U256::from(1u8) << 200usize;
    ledger.deposit(TOKEN_A, TRADER, plenty);
    ledger.deposit(TOKEN_B, TRADER, plenty);

    let mut payer = ExactPayer::new(TRADER);
    for step in 1..=20 {
        let width = step * 600;
        pool.mint(&mut ledger, &mut payer, TRADER, -width, width, E18)
            .unwrap();
    }
    (pool, ledger)
}

pub fn bench_pool_swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_swap");
    let setup = laddered_pool();

    let small = SwapParams::new(
        true,
        I256::try_from(10i128.pow(15)).unwrap(),
        tick_math::MIN_SQRT_RATIO + U256::from(1u8),
    );
    let crossing = SwapParams::new(
        true,
        I256::try_from(10i128.pow(19)).unwrap(),
        tick_math::get_sqrt_ratio_at_tick(-9000).unwrap(),
    );

    for (name, params) in [("within_range", small), ("crossing_ticks", crossing)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || setup.clone(),
                |(mut pool, mut ledger)| {
                    let mut payer = ExactPayer::new(TRADER);
                    black_box(pool.swap(&mut ledger, &mut payer, TRADER, params).unwrap())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

pub fn bench_pool_mint_burn(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_liquidity");
    let setup = laddered_pool();

    group.bench_function("mint_new_range", |b| {
        b.iter_batched(
            || setup.clone(),
            |(mut pool, mut ledger)| {
                let mut payer = ExactPayer::new(TRADER);
                black_box(
                    pool.mint(&mut ledger, &mut payer, TRADER, -660, 540, E18)
                        .unwrap(),
                )
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("burn_existing", |b| {
        b.iter_batched(
            || setup.clone(),
            |(mut pool, _)| black_box(pool.burn(TRADER, -600, 600, E18 / 2).unwrap()),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

/// Events recorded by a full mint / swap / burn / collect cycle.
pub fn lifecycle_events() -> Vec<PoolEvent> {
    let config = PoolConfig::new(POOL, TOKEN_A, TOKEN_B, FeeTier::Medium, OWNER).unwrap();
    let mut pool = Pool::new(config, Vec::new());
    pool.initialize(Q96).unwrap();
    let mut ledger = MemoryLedger::new();
    ledger.deposit(TOKEN_A, TRADER, U256::from(E18));
    ledger.deposit(TOKEN_B, TRADER, U256::from(E18));
    let mut payer = ExactPayer::new(TRADER);

    pool.mint(&mut ledger, &mut payer, TRADER, -600, 600, E18).unwrap();
    let params = SwapParams::new(
        false,
        I256::try_from(10i128.pow(14)).unwrap(),
        tick_math::MAX_SQRT_RATIO - U256::from(1u8),
    );
    pool.swap(&mut ledger, &mut payer, TRADER, params).unwrap();
    pool.burn(TRADER, -600, 600, E18).unwrap();
    pool.collect(&mut ledger, TRADER, TRADER, -600, 600, u128::MAX, u128::MAX)
        .unwrap();
    pool.events().clone()
}

pub fn bench_pool_lifecycle(c: &mut Criterion) {
    c.bench_function("pool_lifecycle", |b| b.iter(|| black_box(lifecycle_events())));
}
