//! Helpers for packed, little-endian layouts with LSB-first bitfields.

pub(crate) fn flag(byte: u8, bit: u8) -> bool {
    byte & (1 << bit) != 0
}

pub(crate) fn set_flag(byte: &mut u8, bit: u8, value: bool) {
    if value {
        *byte |= 1 << bit;
    } else {
        *byte &= !(1 << bit);
    }
}

pub(crate) fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn write_i16(data: &mut [u8], offset: usize, value: i16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

pub(crate) fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Pack a signed value into the low `width` bits, saturating at the range of
/// a `width` bit two's complement integer.
pub(crate) fn pack_signed(value: i16, width: u32) -> u32 {
    let max = (1i32 << (width - 1)) - 1;
    let min = -(1i32 << (width - 1));
    let clamped = (value as i32).clamp(min, max);
    (clamped as u32) & ((1u32 << width) - 1)
}

/// Sign-extend the low `width` bits of `raw`.
pub(crate) fn unpack_signed(raw: u32, width: u32) -> i16 {
    let shift = 32 - width;
    (((raw << shift) as i32) >> shift) as i16
}
