use std::fmt;

/// What was wrong with a trailer that could not be decoded
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum TrailerFault {
    /// Two characters that do not form a hex byte
    NotHexByte,
    /// A packed nibble byte outside 0x30 - 0x3F
    OutOfRange(u8),
}

impl fmt::Display for TrailerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHexByte => f.write_str("not a hex byte"),
            Self::OutOfRange(byte) => write!(f, "byte 0x{byte:02X} is not in range 0x30 - 0x3F"),
        }
    }
}

/// Errors raised while resolving directives and encoding or verifying checksums.
///
/// All of them are local to one call, the caller decides whether to retry.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ChecksumError {
    /// The directive has no closing `>`.
    #[error("missing closing '>' in checksum directive")]
    MalformedDirective,

    /// No registered algorithm carries this name.
    #[error("unknown checksum algorithm \"{0}\"")]
    UnknownAlgorithm(String),

    /// A serialized directive points past the end of the registry.
    #[error("no checksum algorithm registered at index {0}")]
    UnregisteredAlgorithm(u8),

    /// The protected region does not fit in the buffer.
    #[error("checksum region {start}..{end} outside buffer of {len} bytes")]
    InvalidRegion { start: usize, end: usize, len: usize },

    /// Fewer bytes remain after the cursor than the trailer needs.
    #[error("input too short for checksum ({available} bytes available, {expected} required)")]
    InputTooShort { expected: usize, available: usize },

    #[error("invalid checksum trailer at offset {offset}: {fault}")]
    InvalidTrailerEncoding { offset: usize, fault: TrailerFault },

    /// The received trailer does not match the recomputed checksum.
    #[error("checksum mismatch (computed {computed:#X}, received {received:#X})")]
    ChecksumMismatch { computed: u32, received: u64 },
}

pub type Result<T> = std::result::Result<T, ChecksumError>;

/// Problems found while building a [`Registry`][crate::Registry]
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("checksum algorithm \"{0}\" registered twice")]
    DuplicateName(&'static str),

    #[error("checksum algorithm \"{name}\" is hidden by \"{by}\" registered before it")]
    Shadowed { name: &'static str, by: &'static str },

    #[error("{0} checksum algorithms do not fit a one byte index")]
    TooManyAlgorithms(usize),
}
