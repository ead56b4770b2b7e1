use crate::error::MathError;
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Computes `floor(a * b / denominator)` with a full 512‑bit intermediate
/// product, so `a * b` may exceed 256 bits as long as the quotient does not.
///
/// Fails with `DivisionByZero` for a zero denominator and with `Overflow`
/// when the quotient does not fit in 256 bits.
#[inline]
pub fn mul_div(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    // 512-bit product [prod1 prod0] = a * b, using mulmod(a, b, 2^256 - 1)
    // and the Chinese remainder theorem to recover the high word.
    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);
    let (mut prod1, borrow) = mm.overflowing_sub(prod0);
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0 / denominator);
    }

    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    // Make the division exact by subtracting the remainder from [prod1 prod0].
    let remainder = a.mul_mod(b, denominator);
    let (low, borrow) = prod0.overflowing_sub(remainder);
    prod0 = low;
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    // Factor powers of two out of the denominator; always >= 1.
    let twos = denominator & denominator.wrapping_neg();
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);

    // Shift bits from prod1 into prod0: flip `twos` to 2^256 / twos.
    let flipped = twos.wrapping_neg().wrapping_div(twos).wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(flipped);

    // Inverse of the (now odd) denominator mod 2^256. The seed is correct
    // to four bits; each Newton-Raphson step doubles that.
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], but returns `ceil(a * b / denominator)`, failing with
/// `Overflow` if the rounded result no longer fits in 256 bits.
#[inline]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div(a, b, denominator)?;

    if a.mul_mod(b, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// Returns `ceil(a / b)`.
#[inline]
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::ONE)
    }
}

/// Integer square root, `floor(sqrt(x))`, by Newton iteration.
///
/// The seed `2^ceil(bits / 2)` is never below the true root, so the
/// iteration decreases monotonically and stops at the floor.
pub fn sqrt(x: U256) -> U256 {
    if x.is_zero() {
        return U256::ZERO;
    }

    let mut y = U256::ONE << x.bit_len().div_ceil(2);
    loop {
        let z = (y + x / y) >> 1usize;
        if z >= y {
            return y;
        }
        y = z;
    }
}
