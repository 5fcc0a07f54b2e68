use log::debug;

use crate::{
    engine::HEX_UPPER,
    error::Result,
    protocol::{ByteOrder, Encoding, Region, ResolvedDirective, TrailerFormat, Width},
    registry::Registry,
};

/// Append the checksum of the protected part of `output` to `output`
///
/// The protected part starts at `region.start` and ends `region.suffix` bytes
/// before the current end of `output`. Returns the number of bytes appended.
///
/// # Errors
///
/// [`ChecksumError::UnregisteredAlgorithm`][crate::ChecksumError::UnregisteredAlgorithm]
/// if `directive` does not belong to `registry`, and
/// [`ChecksumError::InvalidRegion`][crate::ChecksumError::InvalidRegion] if the region
/// does not fit in `output`.
pub fn encode_checksum(
    registry: &Registry,
    directive: &ResolvedDirective,
    encoding: Encoding,
    output: &mut Vec<u8>,
    region: Region,
) -> Result<usize> {
    let descriptor = directive.descriptor(registry)?;
    let protected = region.bounds(output.len(), output.len())?;

    debug!(
        "checksum {}: output to check: \"{}\"",
        descriptor.name,
        output[protected.clone()].escape_ascii()
    );
    let sum = directive.checksum(registry, &output[protected])?;
    debug!("checksum {}: output checksum is 0x{:X}", descriptor.name, sum);

    let before = output.len();
    write_trailer(sum, descriptor.width, encoding, output);
    debug!(
        "checksum {}: appended \"{}\"",
        descriptor.name,
        output[before..].escape_ascii()
    );
    Ok(output.len() - before)
}

/// Serialize an already masked checksum value
pub fn write_trailer(sum: u32, width: Width, encoding: Encoding, output: &mut Vec<u8>) {
    if encoding.format == TrailerFormat::Decimal {
        output.extend(format!("{:01$}", sum, width.decimal_digits()).bytes());
        return;
    }

    let be = sum.to_be_bytes();
    let le = sum.to_le_bytes();
    let bytes = match encoding.byte_order {
        ByteOrder::BigEndian => &be[4 - width.bytes()..],
        ByteOrder::LittleEndian => &le[..width.bytes()],
    };

    for &byte in bytes {
        match encoding.format {
            TrailerFormat::Hex => {
                output.push(HEX_UPPER[(byte >> 4) as usize]);
                output.push(HEX_UPPER[(byte & 0x0F) as usize]);
            }
            TrailerFormat::PackedNibble => {
                output.push(0x30 | (byte >> 4));
                output.push(0x30 | (byte & 0x0F));
            }
            TrailerFormat::Binary | TrailerFormat::Decimal => output.push(byte),
        }
    }
}
