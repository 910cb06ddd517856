
use bytes::BufMut;

use crate::error::{Error, Result};

/// get_padding_size returns the padding required to make the length a multiple of 4
pub(crate) fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

/// put_padding zero-fills the octets that align `len` to the next 32-bit boundary
pub(crate) fn put_padding(mut buf: &mut [u8], len: usize) {
    for _ in 0..get_padding_size(len) {
        buf.put_u8(0);
    }
}

fn check_bit_range(bytes: &[u8], offset: usize, width: usize) -> Result<()> {
    if width == 0 || width > 32 || offset + width > bytes.len() * 8 {
        return Err(Error::InvalidSizeOrStartIndex);
    }
    Ok(())
}

/// get_nbits reads `width` bits starting `offset` bits into `bytes`.
/// Bit 0 is the most significant bit of the first byte.
pub(crate) fn get_nbits(bytes: &[u8], offset: usize, width: usize) -> Result<u32> {
    check_bit_range(bytes, offset, width)?;

    let mut val = 0u32;
    for bit in offset..offset + width {
        let b = (bytes[bit / 8] >> (7 - bit % 8)) & 1;
        val = (val << 1) | b as u32;
    }

    Ok(val)
}

/// set_nbits will truncate `val` to `width` bits and store it `offset` bits into `bytes`,
/// leaving the surrounding bits untouched.
pub(crate) fn set_nbits(bytes: &mut [u8], offset: usize, width: usize, val: u32) -> Result<()> {
    check_bit_range(bytes, offset, width)?;

    for (i, bit) in (offset..offset + width).enumerate() {
        let mask = 1u8 << (7 - bit % 8);
        if (val >> (width - 1 - i)) & 1 == 1 {
            bytes[bit / 8] |= mask;
        } else {
            bytes[bit / 8] &= !mask;
        }
    }

    Ok(())
}
