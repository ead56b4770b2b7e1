use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// log_sqrt(1.0001)(2) in Q128.128, plus the error bounds of the tick estimate.
const LOG_SQRT_10001: I256 =
    I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
const TICK_LOW_ERROR: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH_ERROR: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

/// `1 / sqrt(1.0001)^(2^k)` in Q128.128 for every bit `2^k` of a tick
/// magnitude.
const BIT_RATIOS: [(u32, U256); 20] = [
    (0x1, U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])),
    (0x2, U256::from_limbs([6459403834229662010, 18444899583751176498, 0, 0])),
    (0x4, U256::from_limbs([17226890335427755468, 18443055278223354162, 0, 0])),
    (0x8, U256::from_limbs([2032852871939366096, 18439367220385604838, 0, 0])),
    (0x10, U256::from_limbs([14545316742740207172, 18431993317065449817, 0, 0])),
    (0x20, U256::from_limbs([5129152022828963008, 18417254355718160513, 0, 0])),
    (0x40, U256::from_limbs([4894419605888772193, 18387811781193591352, 0, 0])),
    (0x80, U256::from_limbs([1280255884321894483, 18329067761203520168, 0, 0])),
    (0x100, U256::from_limbs([15924666964335305636, 18212142134806087854, 0, 0])),
    (0x200, U256::from_limbs([8010504389359918676, 17980523815641551639, 0, 0])),
    (0x400, U256::from_limbs([10668036004952895731, 17526086738831147013, 0, 0])),
    (0x800, U256::from_limbs([4878133418470705625, 16651378430235024244, 0, 0])),
    (0x1000, U256::from_limbs([9537173718739605541, 15030750278693429944, 0, 0])),
    (0x2000, U256::from_limbs([9972618978014552549, 12247334978882834399, 0, 0])),
    (0x4000, U256::from_limbs([10428997489610666743, 8131365268884726200, 0, 0])),
    (0x8000, U256::from_limbs([9305304367709015974, 3584323654723342297, 0, 0])),
    (0x10000, U256::from_limbs([14301143598189091785, 696457651847595233, 0, 0])),
    (0x20000, U256::from_limbs([7393154844743099908, 26294789957452057, 0, 0])),
    (0x40000, U256::from_limbs([2209338891292245656, 37481735321082, 0, 0])),
    (0x80000, U256::from_limbs([10518117631919034274, 76158723, 0, 0])),
];

/// Returns `sqrt(1.0001^tick) * 2^96`, rounded up, or
/// `StateError::TickOutOfBounds` if `|tick| > MAX_TICK`.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let (_, first) = BIT_RATIOS[0];
    let mut ratio = if abs_tick & 1 != 0 { first } else { U256::ONE << 128usize };

    for (bit, multiplier) in &BIT_RATIOS[1..] {
        if abs_tick & bit != 0 {
            ratio = ratio.wrapping_mul(*multiplier) >> 128usize;
        }
    }

    // The table holds reciprocals, so positive ticks invert the product.
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so that the tick lookup in
    // `get_tick_at_sqrt_ratio` stays consistent.
    let truncated = ratio.as_limbs()[0] & 0xFFFF_FFFF != 0;
    Ok((ratio >> 32usize) + U256::from(truncated as u8))
}

/// Returns the greatest tick whose sqrt ratio is `<= sqrt_price_x96`.
///
/// Fails with `StateError::SqrtPriceOutOfBounds` unless
/// `MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << 32usize;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as usize;

    // Normalise to a Q1.127 mantissa.
    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256::from(128u8))) << 64usize;

    // Fourteen fractional bits by repeated squaring are enough to separate
    // adjacent ticks.
    for shift in (50..=63usize).rev() {
        r = r.wrapping_mul(r) >> 127usize;
        let f = r >> 128usize;
        log_2 |= I256::from_raw(f << shift);
        r >>= f.as_limbs()[0] as usize;
    }

    let log_sqrt10001 = log_2.wrapping_mul(LOG_SQRT_10001);

    let tick_low = ((log_sqrt10001 - TICK_LOW_ERROR) >> 128usize).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH_ERROR) >> 128usize).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}
