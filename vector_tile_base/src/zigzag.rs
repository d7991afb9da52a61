//! ZigZag mapping between signed and unsigned integers.
//!
//! Small magnitudes, positive or negative, map to small unsigned values:
//! `0 → 0, -1 → 1, 1 → 2, -2 → 3, …`. All arithmetic is wrapping two's complement,
//! so every `i64` round-trips and every `u64` decodes.

/// Maps a signed 64 bit integer to its zigzag code.
#[must_use]
pub fn encode(value: i64) -> u64 {
	((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`encode`].
#[must_use]
pub fn decode(value: u64) -> i64 {
	((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// 32 bit variant of [`encode`].
#[must_use]
pub fn encode_32(value: i32) -> u32 {
	((value << 1) ^ (value >> 31)) as u32
}

/// 32 bit variant of [`decode`].
#[must_use]
pub fn decode_32(value: u32) -> i32 {
	((value >> 1) as i32) ^ -((value & 1) as i32)
}
