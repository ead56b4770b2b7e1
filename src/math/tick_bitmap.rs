//! Sparse bitmap of initialized ticks.
//!
//! Ticks are first compressed by the pool's tick spacing; compressed tick `c`
//! lives in word `c >> 8` at bit `c mod 256`. Absent words are all-zero.

use crate::FastMap;
use crate::U256_1;
use crate::error::MathError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use alloy_primitives::U256;

/// `(word, bit)` coordinates of a compressed tick.
#[inline]
pub fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, compressed.rem_euclid(256) as u8)
}

/// Tick index divided by spacing, rounded towards negative infinity.
#[inline]
pub fn compress(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing)
}

/// Word `word`, or zero if nothing in it was ever set.
pub fn get_word(bitmap: &FastMap<i16, U256>, word: i16) -> U256 {
    bitmap.get(&word).copied().unwrap_or(U256::ZERO)
}

/// Toggles the initialized bit of `tick`.
///
/// `tick` must be a multiple of `tick_spacing`; otherwise the bitmap is left
/// untouched and `MathError::OutOfBounds` is returned. Words that become zero
/// are dropped from the map.
pub fn flip_tick(
    bitmap: &mut FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
) -> Result<(), MathError> {
    if tick % tick_spacing != 0 {
        return Err(MathError::OutOfBounds);
    }

    let (word_pos, bit_pos) = position(tick / tick_spacing);
    let word = get_word(bitmap, word_pos) ^ (U256_1 << bit_pos);
    if word.is_zero() {
        bitmap.remove(&word_pos);
    } else {
        bitmap.insert(word_pos, word);
    }
    Ok(())
}

/// Whether the bit for `tick` is set.
pub fn is_initialized(bitmap: &FastMap<i16, U256>, tick: i32, tick_spacing: i32) -> bool {
    if tick % tick_spacing != 0 {
        return false;
    }
    let (word_pos, bit_pos) = position(tick / tick_spacing);
    get_word(bitmap, word_pos).bit(bit_pos as usize)
}

/// Finds the next initialized tick in the word that holds `tick`.
///
/// With `lte` the search runs towards lower ticks and includes `tick`
/// itself; otherwise it runs towards higher ticks, starting strictly after
/// `tick`. When the word has no set bit in that direction the word's
/// boundary tick is returned with `initialized == false`, and callers must
/// continue from there.
pub fn next_initialized_tick_within_one_word(
    bitmap: &FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool), MathError> {
    let compressed = compress(tick, tick_spacing);

    if lte {
        let (word_pos, bit_pos) = position(compressed);
        // all bits at or below bit_pos
        let mask = (U256_1 << bit_pos) - U256_1 + (U256_1 << bit_pos);
        let masked = get_word(bitmap, word_pos) & mask;

        if masked.is_zero() {
            Ok(((compressed - bit_pos as i32) * tick_spacing, false))
        } else {
            let msb = most_significant_bit(masked)?;
            Ok(((compressed - (bit_pos - msb) as i32) * tick_spacing, true))
        }
    } else {
        let (word_pos, bit_pos) = position(compressed + 1);
        // all bits at or above bit_pos
        let mask = !((U256_1 << bit_pos) - U256_1);
        let masked = get_word(bitmap, word_pos) & mask;

        if masked.is_zero() {
            Ok(((compressed + 1 + (u8::MAX - bit_pos) as i32) * tick_spacing, false))
        } else {
            let lsb = least_significant_bit(masked)?;
            Ok(((compressed + 1 + (lsb - bit_pos) as i32) * tick_spacing, true))
        }
    }
}
