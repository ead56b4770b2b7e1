// Property-based checks of pool bookkeeping under random operation sequences.
// Run with: cargo test --test pool_proptest

use alloy_primitives::address;
use clmm_core::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, get_sqrt_ratio_at_tick};
use clmm_core::pool::config::{FeeTier, PoolConfig};
use clmm_core::pool::events::PoolEvent;
use clmm_core::pool::settlement::{ExactPayer, MemoryLedger, TokenLedger};
use clmm_core::pool::swap::SwapParams;
use clmm_core::{Address, I256, Pool, U256};
use proptest::prelude::*;

const POOL: Address = address!("0x1000000000000000000000000000000000000000");
const OWNER: Address = address!("0x00000000000000000000000000000000000000aa");
const TRADER: Address = address!("0x0000000000000000000000000000000000007a7e");
const LPS: [Address; 3] = [
    address!("0x00000000000000000000000000000000000a11ce"),
    address!("0x0000000000000000000000000000000000000b0b"),
    address!("0x0000000000000000000000000000000000000ca7"),
];
const TOKEN_A: Address = address!("0x0000000000000000000000000000000000000001");
const TOKEN_B: Address = address!("0x0000000000000000000000000000000000000002");

const SPACING: i32 = 60;
/// Largest multiple of the spacing inside the tick range.
const MAX_USABLE: i32 = 887220;
const E18: u128 = 1_000_000_000_000_000_000;

type TestPool = Pool<Vec<PoolEvent>>;

fn setup(start_tick: i32) -> (TestPool, MemoryLedger) {
    let config = PoolConfig::new(POOL, TOKEN_A, TOKEN_B, FeeTier::Medium, OWNER).unwrap();
    let mut pool = Pool::new(config, Vec::new());
    pool.initialize(get_sqrt_ratio_at_tick(start_tick).unwrap())
        .unwrap();

    let mut ledger = MemoryLedger::new();
    let plenty = U256::from(1u8) << 200usize;
    for account in LPS.iter().chain([&TRADER]) {
        ledger.deposit(TOKEN_A, *account, plenty);
        ledger.deposit(TOKEN_B, *account, plenty);
    }
    (pool, ledger)
}

/// A valid `[lower, upper)` range from a raw lower index and a width in
/// spacings.
fn range(lower_index: i32, width: u8) -> (i32, i32) {
    let width = (i32::from(width) % 40 + 1) * SPACING;
    let lower = (lower_index * SPACING).clamp(-MAX_USABLE, MAX_USABLE - width);
    (lower, lower + width)
}

fn pool_balances(pool: &TestPool, ledger: &MemoryLedger) -> (U256, U256) {
    let config = pool.config();
    (
        ledger.balance_of(config.token0, config.address),
        ledger.balance_of(config.token1, config.address),
    )
}

#[derive(Debug, Clone)]
enum Op {
    Mint { lp: usize, lower: i32, width: u8, liquidity: u128 },
    Burn { position: usize, quarters: u8 },
    Swap { zero_for_one: bool, exact_in: bool, amount: u64 },
    Poke { position: usize },
    Collect { position: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..LPS.len(), -300i32..300, any::<u8>(), 1u128..=E18).prop_map(
            |(lp, lower, width, liquidity)| Op::Mint { lp, lower, width, liquidity }
        ),
        (any::<usize>(), 1u8..=4).prop_map(|(position, quarters)| Op::Burn { position, quarters }),
        (any::<bool>(), any::<bool>(), 1u64..100_000_000_000_000_000).prop_map(
            |(zero_for_one, exact_in, amount)| Op::Swap { zero_for_one, exact_in, amount }
        ),
        any::<usize>().prop_map(|position| Op::Poke { position }),
        any::<usize>().prop_map(|position| Op::Collect { position }),
    ]
}

/// Liquidity of every tracked position whose range holds the current tick.
fn active_liquidity(pool: &TestPool, positions: &[(Address, i32, i32)]) -> u128 {
    let tick = pool.slot0().tick;
    positions
        .iter()
        .filter(|(_, lower, upper)| *lower <= tick && tick < *upper)
        .filter_map(|(owner, lower, upper)| pool.position(*owner, *lower, *upper))
        .map(|position| position.liquidity)
        .sum()
}

/// Protocol fees plus everything credited to positions.
fn liabilities(pool: &TestPool, positions: &[(Address, i32, i32)]) -> (U256, U256) {
    let fees = pool.protocol_fees();
    positions
        .iter()
        .filter_map(|(owner, lower, upper)| pool.position(*owner, *lower, *upper))
        .fold(
            (U256::from(fees.token0), U256::from(fees.token1)),
            |(owed0, owed1), position| {
                (
                    owed0 + U256::from(position.tokens_owed_0),
                    owed1 + U256::from(position.tokens_owed_1),
                )
            },
        )
}

fn pick(positions: &[(Address, i32, i32)], index: usize) -> Option<(Address, i32, i32)> {
    positions.get(index % positions.len().max(1)).copied()
}

fn apply(
    pool: &mut TestPool,
    ledger: &mut MemoryLedger,
    positions: &mut Vec<(Address, i32, i32)>,
    op: Op,
) {
    match op {
        Op::Mint { lp, lower, width, liquidity } => {
            let owner = LPS[lp];
            let (lower, upper) = range(lower, width);
            pool.mint(ledger, &mut ExactPayer::new(owner), owner, lower, upper, liquidity)
                .unwrap();
            if !positions.contains(&(owner, lower, upper)) {
                positions.push((owner, lower, upper));
            }
        }
        Op::Burn { position, quarters } => {
            if let Some((owner, lower, upper)) = pick(positions, position) {
                let liquidity = pool.position(owner, lower, upper).unwrap().liquidity;
                let amount = liquidity / 4 * u128::from(quarters);
                if amount > 0 {
                    pool.burn(owner, lower, upper, amount).unwrap();
                }
            }
        }
        Op::Swap { zero_for_one, exact_in, amount } => {
            let amount = I256::try_from(amount).unwrap();
            let amount = if exact_in { amount } else { -amount };
            let limit = if zero_for_one {
                MIN_SQRT_RATIO + U256::from(1u8)
            } else {
                MAX_SQRT_RATIO - U256::from(1u8)
            };
            // a swap pinned at its price limit is rejected and changes nothing
            let _ = pool.swap(
                ledger,
                &mut ExactPayer::new(TRADER),
                TRADER,
                SwapParams::new(zero_for_one, amount, limit),
            );
        }
        Op::Poke { position } => {
            if let Some((owner, lower, upper)) = pick(positions, position) {
                if pool.position(owner, lower, upper).unwrap().liquidity > 0 {
                    pool.poke(owner, lower, upper).unwrap();
                }
            }
        }
        Op::Collect { position } => {
            if let Some((owner, lower, upper)) = pick(positions, position) {
                pool.collect(ledger, owner, owner, lower, upper, u128::MAX, u128::MAX)
                    .unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: mint then burn of the same liquidity returns the deposit
    /// within one unit, never more, and clears both ticks
    #[test]
    fn prop_mint_burn_round_trip(
        start_tick in -800_000i32..800_000,
        lower in -14_000i32..14_000,
        width in any::<u8>(),
        liquidity in 1u128..=E18,
    ) {
        let (mut pool, mut ledger) = setup(start_tick);
        let (lower, upper) = range(lower, width);
        let owner = LPS[0];

        let (in0, in1) = pool
            .mint(&mut ledger, &mut ExactPayer::new(owner), owner, lower, upper, liquidity)
            .unwrap();
        let (out0, out1) = pool.burn(owner, lower, upper, liquidity).unwrap();

        prop_assert!(out0 <= in0 && in0 - out0 <= U256::from(1u8));
        prop_assert!(out1 <= in1 && in1 - out1 <= U256::from(1u8));
        prop_assert_eq!(pool.position(owner, lower, upper).unwrap().liquidity, 0);
        prop_assert_eq!(pool.liquidity(), 0);
        prop_assert!(pool.tick(lower).is_none());
        prop_assert!(pool.tick(upper).is_none());

        let collected = pool
            .collect(&mut ledger, owner, owner, lower, upper, u128::MAX, u128::MAX)
            .unwrap();
        prop_assert_eq!((U256::from(collected.0), U256::from(collected.1)), (out0, out1));
        prop_assert_eq!(pool_balances(&pool, &ledger), (in0 - out0, in1 - out1));
    }

    /// Property: a shared tick survives until its last position is gone
    #[test]
    fn prop_shared_tick_cleared_with_last_position(
        start_tick in -800_000i32..800_000,
        lower in -14_000i32..14_000,
        widths in (any::<u8>(), any::<u8>()),
        liquidity in (1u128..=E18, 1u128..=E18),
    ) {
        let (mut pool, mut ledger) = setup(start_tick);
        let (lower, first_upper) = range(lower, widths.0);
        let second_upper = (lower + (i32::from(widths.1) % 40 + 1) * SPACING).min(MAX_USABLE);
        prop_assume!(second_upper > lower && second_upper != first_upper);
        let (alice, bob) = (LPS[0], LPS[1]);

        pool.mint(&mut ledger, &mut ExactPayer::new(alice), alice, lower, first_upper, liquidity.0)
            .unwrap();
        pool.mint(&mut ledger, &mut ExactPayer::new(bob), bob, lower, second_upper, liquidity.1)
            .unwrap();

        pool.burn(alice, lower, first_upper, liquidity.0).unwrap();
        prop_assert!(pool.tick(first_upper).is_none());
        let shared = pool.tick(lower).copied();
        prop_assert_eq!(shared.map(|tick| tick.liquidity_gross), Some(liquidity.1));

        pool.burn(bob, lower, second_upper, liquidity.1).unwrap();
        prop_assert!(pool.tick(lower).is_none());
        prop_assert!(pool.ticks().is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: under any interleaving of mint, burn, swap, poke and collect
    /// the active liquidity matches the positions in range, the pool always
    /// holds what it owes, and a full withdrawal leaves no ticks behind
    #[test]
    fn prop_interleaved_operations_stay_solvent(
        start_tick in -50_000i32..50_000,
        fee_protocol in prop_oneof![Just(0u8), 4u8..=10],
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let (mut pool, mut ledger) = setup(start_tick);
        pool.set_fee_protocol(OWNER, fee_protocol, fee_protocol).unwrap();
        let mut positions = Vec::new();

        for op in ops {
            apply(&mut pool, &mut ledger, &mut positions, op);

            prop_assert_eq!(pool.liquidity(), active_liquidity(&pool, &positions));
            let (owed0, owed1) = liabilities(&pool, &positions);
            let (balance0, balance1) = pool_balances(&pool, &ledger);
            prop_assert!(balance0 >= owed0 && balance1 >= owed1);
            prop_assert!(pool.is_unlocked());
        }

        for (owner, lower, upper) in positions.clone() {
            let liquidity = pool.position(owner, lower, upper).unwrap().liquidity;
            if liquidity > 0 {
                pool.burn(owner, lower, upper, liquidity).unwrap();
            }
        }
        let (owed0, owed1) = liabilities(&pool, &positions);
        let (balance0, balance1) = pool_balances(&pool, &ledger);
        prop_assert!(balance0 >= owed0 && balance1 >= owed1);

        for (owner, lower, upper) in positions.clone() {
            pool.collect(&mut ledger, owner, owner, lower, upper, u128::MAX, u128::MAX)
                .unwrap();
        }

        prop_assert_eq!(pool.liquidity(), 0);
        prop_assert!(pool.ticks().is_empty());
        let fees = pool.protocol_fees();
        let (balance0, balance1) = pool_balances(&pool, &ledger);
        prop_assert!(balance0 >= U256::from(fees.token0));
        prop_assert!(balance1 >= U256::from(fees.token1));
    }
}
