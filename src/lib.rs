#![doc = include_str!("../README.md")]
mod decoder;
mod encoder;
mod error;
mod protocol;
mod registry;
pub mod engine;
pub mod parser;

pub use decoder::*;
pub use encoder::*;
pub use error::{ChecksumError, RegistryError, TrailerFault};
pub use protocol::*;
pub use registry::*;

/// Checksum of `data` using a standard algorithm with its default seed and final xor
///
/// Returns `None` for names that are not in [`Registry::standard`].
pub fn checksum(name: &str, data: &[u8]) -> Option<u32> {
    let registry = Registry::standard();
    registry
        .find(name)
        .and_then(|index| registry.get(index))
        .map(|algorithm| algorithm.checksum(data))
}
