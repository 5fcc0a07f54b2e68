//! Checksum arithmetic
//!
//! Every algorithm is a plain [`ChecksumFn`]: it takes the protected bytes and a
//! seed and returns the raw 32 bit accumulator. Final xor and width masking are
//! applied by the caller, see [`AlgorithmDescriptor`][crate::AlgorithmDescriptor].

/// Signature shared by every registered algorithm
pub type ChecksumFn = fn(data: &[u8], seed: u32) -> u32;

const ADLER_MOD: u32 = 65521;
/// Largest block that can be summed before `b` would overflow 32 bits
const ADLER_BLOCK: usize = 5550;

pub(crate) const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Byte sum with wraparound
pub fn sum(data: &[u8], seed: u32) -> u32 {
    data.iter()
        .fold(seed, |acc, &byte| acc.wrapping_add(byte as u32))
}

pub fn xor8(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |acc, &byte| acc ^ byte as u32)
}

/// Same as [`xor8`] but only the low 7 bits survive
pub fn xor7(data: &[u8], seed: u32) -> u32 {
    xor8(data, seed) & 0x7F
}

/// Build a 256 entry table for an 8 bit CRC
///
/// For reflected tables the polynomial is given in normal form and reflected here.
pub const fn crc8_table(poly: u8, reflected: bool) -> [u8; 256] {
    let mut table = [0u8; 256];
    let rpoly = poly.reverse_bits();
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if reflected {
                if crc & 1 != 0 {
                    (crc >> 1) ^ rpoly
                } else {
                    crc >> 1
                }
            } else if crc & 0x80 != 0 {
                (crc << 1) ^ poly
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Build a 256 entry table for a 16 bit CRC
pub const fn crc16_table(poly: u16, reflected: bool) -> [u16; 256] {
    let mut table = [0u16; 256];
    let rpoly = poly.reverse_bits();
    let mut i = 0;
    while i < 256 {
        let mut crc = if reflected { i as u16 } else { (i as u16) << 8 };
        let mut bit = 0;
        while bit < 8 {
            crc = if reflected {
                if crc & 1 != 0 {
                    (crc >> 1) ^ rpoly
                } else {
                    crc >> 1
                }
            } else if crc & 0x8000 != 0 {
                (crc << 1) ^ poly
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Build a 256 entry table for a 32 bit CRC
pub const fn crc32_table(poly: u32, reflected: bool) -> [u32; 256] {
    let mut table = [0u32; 256];
    let rpoly = poly.reverse_bits();
    let mut i = 0;
    while i < 256 {
        let mut crc = if reflected { i as u32 } else { (i as u32) << 24 };
        let mut bit = 0;
        while bit < 8 {
            crc = if reflected {
                if crc & 1 != 0 {
                    (crc >> 1) ^ rpoly
                } else {
                    crc >> 1
                }
            } else if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ poly
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub static CRC8_07: [u8; 256] = crc8_table(0x07, false);
pub static CRC8_31_REFLECTED: [u8; 256] = crc8_table(0x31, true);
pub static CRC16_8005: [u16; 256] = crc16_table(0x8005, false);
pub static CRC16_8005_REFLECTED: [u16; 256] = crc16_table(0x8005, true);
pub static CRC16_1021: [u16; 256] = crc16_table(0x1021, false);
pub static CRC32_04C11DB7: [u32; 256] = crc32_table(0x04C1_1DB7, false);
pub static CRC32_04C11DB7_REFLECTED: [u32; 256] = crc32_table(0x04C1_1DB7, true);

// The state is kept in 32 bits on purpose: with a negated seed the high bits of a
// reflected CRC shift down into the significant ones.

/// CRC-8, polynomial 0x07
pub fn crc8(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC8_07[((crc ^ byte as u32) & 0xFF) as usize] as u32
    })
}

/// CRC-8 with the reflected polynomial 0x31 (Dallas/Maxim)
pub fn ccitt8(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC8_31_REFLECTED[((crc ^ byte as u32) & 0xFF) as usize] as u32
    })
}

/// CRC-16, polynomial 0x8005
pub fn crc16(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC16_8005[(((crc >> 8) ^ byte as u32) & 0xFF) as usize] as u32 ^ (crc << 8)
    })
}

/// CRC-16, polynomial 0x8005 reflected (ARC and Modbus family)
pub fn crc16_reflected(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC16_8005_REFLECTED[((crc ^ byte as u32) & 0xFF) as usize] as u32 ^ (crc >> 8)
    })
}

/// CRC-16/CCITT, polynomial 0x1021
pub fn ccitt16(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC16_1021[(((crc >> 8) ^ byte as u32) & 0xFF) as usize] as u32 ^ (crc << 8)
    })
}

/// CRC-32, polynomial 0x04C11DB7 shifted left (BZIP2 orientation)
pub fn crc32(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC32_04C11DB7[(((crc >> 24) ^ byte as u32) & 0xFF) as usize] ^ (crc << 8)
    })
}

/// CRC-32, polynomial 0x04C11DB7 reflected (the common zlib/Ethernet CRC)
pub fn crc32_reflected(data: &[u8], seed: u32) -> u32 {
    data.iter().fold(seed, |crc, &byte| {
        CRC32_04C11DB7_REFLECTED[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// Adler-32
///
/// The seed carries `a` in its low and `b` in its high 16 bits. Both sums are
/// folded (`2^16 = 15 mod 65521`) after every block of at most 5550 bytes and
/// fully reduced once at the end.
pub fn adler32(data: &[u8], seed: u32) -> u32 {
    let mut a = seed & 0xFFFF;
    let mut b = (seed >> 16) & 0xFFFF;

    for block in data.chunks(ADLER_BLOCK) {
        for &byte in block {
            a = a.wrapping_add(byte as u32);
            b = b.wrapping_add(a);
        }
        a = (a & 0xFFFF) + (a >> 16) * 15;
        b = (b & 0xFFFF) + (b >> 16) * 15;
    }
    if a >= ADLER_MOD {
        a -= ADLER_MOD;
    }
    b = (b & 0xFFFF) + (b >> 16) * 15;
    if b >= ADLER_MOD {
        b -= ADLER_MOD;
    }
    (b << 16) | a
}

/// Adds the value of every ASCII hex digit, anything else is skipped
pub fn hexsum(data: &[u8], seed: u32) -> u32 {
    data.iter()
        .filter_map(|&byte| (byte as char).to_digit(16))
        .fold(seed, |acc, digit| acc.wrapping_add(digit))
}

/// Checksum of the Julich MERLIN Fermi chopper
///
/// Adds the ASCII codes of `#`, `0`-`9` and `A`-`H` (the device treats `G` and
/// `H` as hex digits too). A payload made only of `#` and `0` sums to zero.
/// The result is the two hex characters of the low byte, first character in the
/// high byte.
pub fn julich(data: &[u8], seed: u32) -> u32 {
    let mut sum = seed;
    let mut fillers = 0;

    for &byte in data {
        match byte {
            b'#' | b'0' => {
                fillers += 1;
                sum = sum.wrapping_add(byte as u32);
            }
            b'1'..=b'9' | b'A'..=b'H' => sum = sum.wrapping_add(byte as u32),
            _ => {}
        }
    }

    if fillers == data.len() {
        sum = 0;
    }

    let low = (sum & 0xFF) as usize;
    (HEX_UPPER[low >> 4] as u32) << 8 | HEX_UPPER[low & 0x0F] as u32
}

/// Modbus CRC of the SKF MB350PC chopper
///
/// Bit at a time with polynomial 0xA001, always starting from 0xFFFF.
pub fn skf_modbus(data: &[u8], _seed: u32) -> u32 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _bit in 0..8 {
            let carry = crc & 1;
            crc >>= 1;
            if carry != 0 {
                crc ^= 0xA001;
            }
        }
    }
    crc as u32
}
