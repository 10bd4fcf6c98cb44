use crate::block::RegisterBlock;

pub use tokio_modbus::{Address, Quantity};

/// 16-bit value stored in a Modbus register.
pub type Word = u16;

/// Decode the register pair at `low_addr` as an unsigned 32-bit integer.
///
/// The device stores the low word first: `value = block[low] | block[low+1] << 16`.
pub fn u32_from_pair(block: &RegisterBlock, low_addr: Address) -> u32 {
    let words = block.words(low_addr, 2);
    u32::from(words[0]) | (u32::from(words[1]) << 16)
}

/// Decode the register pair at `low_addr` as an IEEE-754 binary32 float.
///
/// The 32-bit pattern is reinterpreted as-is; NaN and infinity payloads
/// survive the round trip untouched.
pub fn f32_from_pair(block: &RegisterBlock, low_addr: Address) -> f32 {
    f32::from_bits(u32_from_pair(block, low_addr))
}

/// Decode the register pair at `low_addr` as an error flag.
///
/// Any nonzero 32-bit value collapses to `true`; the device reports error
/// codes in these pairs but only their presence is meaningful downstream.
pub fn flag_from_pair(block: &RegisterBlock, low_addr: Address) -> bool {
    u32_from_pair(block, low_addr) != 0
}

/// Encode an unsigned 32-bit integer as a low-word-first register pair.
pub fn u32_to_pair(value: u32) -> [Word; 2] {
    [value as Word, (value >> 16) as Word]
}

/// Encode a small integer as a register pair with a zero high word.
///
/// Used by the time-write path; written time fields never exceed 16 bits.
pub fn pair_from_u16(value: u16) -> [Word; 2] {
    [value, 0]
}
