use log::debug;
use nom::Finish;

use crate::{
    error::{ChecksumError, Result, TrailerFault},
    parser::{decimal, trailer_bytes},
    protocol::{ByteOrder, Encoding, Region, ResolvedDirective, TrailerFormat},
    registry::Registry,
};

/// Check the checksum trailer found at `cursor` against the protected part of `input`
///
/// The protected part starts at `region.start` and ends `region.suffix` bytes
/// before `cursor`. On success returns how many trailer bytes were consumed. For
/// decimal trailers that can be fewer than the padded digit count when the
/// sender did not pad, down to none at all for a checksum of 0.
///
/// # Errors
///
/// - [`ChecksumError::InputTooShort`] when fewer bytes than the encoding needs follow `cursor`
/// - [`ChecksumError::InvalidTrailerEncoding`] when the trailer cannot be decoded
/// - [`ChecksumError::ChecksumMismatch`] when the decoded value differs
/// - [`ChecksumError::UnregisteredAlgorithm`] and [`ChecksumError::InvalidRegion`] for
///   arguments that do not fit together
pub fn verify_checksum(
    registry: &Registry,
    directive: &ResolvedDirective,
    encoding: Encoding,
    input: &[u8],
    region: Region,
    cursor: usize,
) -> Result<usize> {
    let descriptor = directive.descriptor(registry)?;
    let protected = region.bounds(cursor, input.len())?;

    debug!(
        "checksum {}: input to check: \"{}\"",
        descriptor.name,
        input[protected.clone()].escape_ascii()
    );

    let width = descriptor.width;
    let expected = encoding.trailer_len(width);
    let trailer = &input[cursor..];
    if trailer.len() < expected {
        debug!(
            "checksum {}: input \"{}\" too short for checksum",
            descriptor.name,
            trailer.escape_ascii()
        );
        return Err(ChecksumError::InputTooShort {
            expected,
            available: trailer.len(),
        });
    }

    let sum = directive.checksum(registry, &input[protected])?;
    debug!(
        "checksum {}: input checksum is 0x{:02$X}",
        descriptor.name,
        sum,
        2 * width.bytes()
    );

    let (received, consumed) = match encoding.format {
        TrailerFormat::Decimal => decimal(width.decimal_digits())(trailer)
            .finish()
            .map_or((0, 0), |(_, parsed)| parsed),
        format => {
            let (_, bytes) = trailer_bytes(format, width)(trailer)
                .finish()
                .map_err(|e| {
                    let offset = cursor + trailer.len() - e.input.len();
                    let fault = match format {
                        TrailerFormat::PackedNibble => TrailerFault::OutOfRange(input[offset]),
                        _ => TrailerFault::NotHexByte,
                    };
                    debug!(
                        "checksum {}: input \"{}\" {}",
                        descriptor.name,
                        trailer[..expected].escape_ascii(),
                        fault
                    );
                    ChecksumError::InvalidTrailerEncoding { offset, fault }
                })?;
            let received = match encoding.byte_order {
                ByteOrder::BigEndian => bytes.iter().fold(0u64, |acc, &b| acc << 8 | b as u64),
                ByteOrder::LittleEndian => {
                    bytes.iter().rev().fold(0u64, |acc, &b| acc << 8 | b as u64)
                }
            };
            (received, expected)
        }
    };

    if received != sum as u64 {
        debug!(
            "checksum {}: input 0x{:X} does not match checksum 0x{:X}",
            descriptor.name, received, sum
        );
        return Err(ChecksumError::ChecksumMismatch {
            computed: sum,
            received,
        });
    }
    Ok(consumed)
}
