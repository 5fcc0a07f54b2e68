use std::str::FromStr;

use nom::Finish;

use crate::{
    error::{ChecksumError, Result},
    parser::{flags, resolved_directive},
    registry::{AlgorithmDescriptor, Registry},
};

/// Number of significant checksum bytes
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Width {
    One = 1,
    Two = 2,
    Four = 4,
}

impl Width {
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Mask keeping the low `bytes * 8` bits
    pub const fn mask(self) -> u32 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
            Self::Four => 0xFFFF_FFFF,
        }
    }

    /// Digits needed to print any value of this width in decimal: `ceil(bytes * 2.5)`
    pub const fn decimal_digits(self) -> usize {
        (self.bytes() * 5 + 1) / 2
    }
}

impl TryFrom<u8> for Width {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(other),
        }
    }
}

/// How the checksum bytes are represented on the wire
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum TrailerFormat {
    /// One raw byte per checksum byte
    #[default]
    Binary,
    /// Two uppercase hex characters per checksum byte
    Hex,
    /// Two characters per checksum byte, each `0x30 | nibble` (`0`-`9` and `:`-`?`)
    PackedNibble,
    /// Zero padded decimal, see [`Width::decimal_digits`]. Has no byte order.
    Decimal,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

/// Trailer layout chosen per call
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Encoding {
    pub format: TrailerFormat,
    pub byte_order: ByteOrder,
}

impl Encoding {
    pub const fn new(format: TrailerFormat, byte_order: ByteOrder) -> Self {
        Self { format, byte_order }
    }

    /// Build an encoding from printf style flag characters
    ///
    /// | flag | meaning |
    /// |------|---------|
    /// | `+`  | decimal |
    /// | `#`  | little endian |
    /// | `0`  | ASCII hex |
    /// | `-`  | packed nibble |
    ///
    /// Unknown characters are rejected. See [`crate::parser::flags`].
    pub fn from_flags(input: &str) -> Option<Self> {
        match flags(input).finish() {
            Ok(("", encoding)) => Some(encoding),
            _ => None,
        }
    }

    /// Number of trailer bytes this encoding produces for `width`
    pub const fn trailer_len(&self, width: Width) -> usize {
        match self.format {
            TrailerFormat::Decimal => width.decimal_digits(),
            TrailerFormat::Hex | TrailerFormat::PackedNibble => 2 * width.bytes(),
            TrailerFormat::Binary => width.bytes(),
        }
    }
}

/// Bounds of the protected region inside a message buffer
///
/// The region begins at `start` and stops `suffix` bytes before the end of the
/// already written output (encoder) or before the read cursor (decoder).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Region {
    pub start: usize,
    pub suffix: usize,
}

impl Region {
    pub const fn new(start: usize, suffix: usize) -> Self {
        Self { start, suffix }
    }

    /// Resolve to a byte range given where the region ends (buffer length or cursor)
    pub fn bounds(&self, end: usize, len: usize) -> Result<std::ops::Range<usize>> {
        match end.checked_sub(self.suffix) {
            Some(stop) if self.start <= stop && end <= len => Ok(self.start..stop),
            _ => Err(ChecksumError::InvalidRegion {
                start: self.start,
                end: end.saturating_sub(self.suffix),
                len,
            }),
        }
    }
}

/// An algorithm selection with the negate and complement modifiers applied
///
/// Created once per directive and reused for every message.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ResolvedDirective {
    /// Position of the algorithm in its [`Registry`]
    pub index: u8,
    /// Seed handed to the algorithm
    pub init: u32,
    /// Xored into the raw result before masking
    pub xor_out: u32,
}

impl ResolvedDirective {
    /// Size of [`ResolvedDirective::to_bytes`]
    pub const ENCODED_LEN: usize = 9;

    pub fn new(index: u8, descriptor: &AlgorithmDescriptor, negate: bool, complement: bool) -> Self {
        let mut init = descriptor.init;
        let mut xor_out = descriptor.xor_out;
        if negate {
            init = !init;
            xor_out = !xor_out;
        }
        if complement {
            xor_out = !xor_out;
        }
        Self {
            index,
            init,
            xor_out,
        }
    }

    pub fn descriptor<'r>(&self, registry: &'r Registry) -> Result<&'r AlgorithmDescriptor> {
        registry
            .get(self.index)
            .ok_or(ChecksumError::UnregisteredAlgorithm(self.index))
    }

    /// Checksum of `data`, xored and masked to the algorithm width
    pub fn checksum(&self, registry: &Registry, data: &[u8]) -> Result<u32> {
        let descriptor = self.descriptor(registry)?;
        Ok((self.xor_out ^ (descriptor.compute)(data, self.init)) & descriptor.width.mask())
    }

    /// Opaque form stored alongside a parsed format: `init`, `xor_out` (little endian), `index`
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut bytes = [0; Self::ENCODED_LEN];
        bytes[..4].copy_from_slice(&self.init.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.xor_out.to_le_bytes());
        bytes[8] = self.index;
        bytes
    }
}

impl<'a> TryFrom<&'a [u8]> for ResolvedDirective {
    type Error = nom::error::Error<&'a [u8]>;

    fn try_from(value: &'a [u8]) -> std::result::Result<Self, Self::Error> {
        match resolved_directive(value).finish() {
            Ok((_, directive)) => Ok(directive),
            Err(e) => Err(e),
        }
    }
}

/// Resolves against [`Registry::standard`]; the string must hold exactly one directive
impl FromStr for ResolvedDirective {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self> {
        match Registry::standard().resolve(s)? {
            ("", directive) => Ok(directive),
            _ => Err(ChecksumError::MalformedDirective),
        }
    }
}
