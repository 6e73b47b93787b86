//! # Frame Bit Order
//!
//! The pad protocol is LSB-first on the wire while the SPI controller shifts
//! MSB-first, so every byte is reflected before it goes out and after it
//! comes back.

/// Reflect the bit order of a byte (bit 7 ↔ bit 0, bit 6 ↔ bit 1, ...)
///
/// # Examples
///
/// ```
/// use psxpad::protocol::frame::reverse_bits;
///
/// assert_eq!(reverse_bits(0x01), 0x80);
/// assert_eq!(reverse_bits(reverse_bits(0x42)), 0x42);
/// ```
#[inline]
pub fn reverse_bits(byte: u8) -> u8 {
    byte.reverse_bits()
}

/// Reflect every byte of `bytes` in place
pub fn reverse_in_place(bytes: &mut [u8]) {
    for byte in bytes.iter_mut() {
        *byte = reverse_bits(*byte);
    }
}

/// Copy `src` into `dst` with each byte reflected
///
/// Only `min(src.len(), dst.len())` bytes are written.
pub fn reverse_into(src: &[u8], dst: &mut [u8]) {
    for (out, &byte) in dst.iter_mut().zip(src) {
        *out = reverse_bits(byte);
    }
}
