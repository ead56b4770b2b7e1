use crate::error::MathError;
use alloy_primitives::U256;

/// Index of the highest set bit, so that `2^msb <= x < 2^(msb + 1)`.
///
/// Zero has no set bit and yields `MathError::ZeroValue`.
#[inline]
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok((x.bit_len() - 1) as u8)
}

/// Index of the lowest set bit, so that `x % 2^lsb == 0` and
/// `(x >> lsb) & 1 == 1`.
///
/// Zero has no set bit and yields `MathError::ZeroValue`.
#[inline]
pub fn least_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros() as u8)
}
