use std::borrow::Cow;

use log::debug;
use nom::Finish;

use crate::{
    engine::{self, ChecksumFn},
    error::{ChecksumError, RegistryError, Result},
    parser::directive,
    protocol::{ResolvedDirective, Width},
};

/// A named checksum algorithm
///
/// Any [`ChecksumFn`] can be registered, the engine functions are just the
/// ones shipped in [`STANDARD_ALGORITHMS`].
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmDescriptor {
    /// Matched case-insensitively by directives
    pub name: &'static str,
    pub compute: ChecksumFn,
    /// Default seed
    pub init: u32,
    /// Default final xor
    pub xor_out: u32,
    pub width: Width,
}

impl AlgorithmDescriptor {
    pub const fn new(
        name: &'static str,
        compute: ChecksumFn,
        init: u32,
        xor_out: u32,
        width: Width,
    ) -> Self {
        Self {
            name,
            compute,
            init,
            xor_out,
            width,
        }
    }

    /// Checksum with the default seed and final xor
    pub fn checksum(&self, data: &[u8]) -> u32 {
        (self.xor_out ^ (self.compute)(data, self.init)) & self.width.mask()
    }
}

/// The algorithms known to every directive, in index order
///
/// The trailing comment of each row is its value for `"123456789"`.
#[rustfmt::skip]
pub const STANDARD_ALGORITHMS: &[AlgorithmDescriptor] = &[
    //                       name          func                     init         xorout       width
    AlgorithmDescriptor::new("sum",        engine::sum,             0x00,        0x00,        Width::One),  // 0xDD
    AlgorithmDescriptor::new("sum8",       engine::sum,             0x00,        0x00,        Width::One),  // 0xDD
    AlgorithmDescriptor::new("sum16",      engine::sum,             0x0000,      0x0000,      Width::Two),  // 0x01DD
    AlgorithmDescriptor::new("sum32",      engine::sum,             0x0000_0000, 0x0000_0000, Width::Four), // 0x000001DD
    AlgorithmDescriptor::new("xor",        engine::xor8,            0x00,        0x00,        Width::One),  // 0x31
    AlgorithmDescriptor::new("xor8",       engine::xor8,            0x00,        0x00,        Width::One),  // 0x31
    AlgorithmDescriptor::new("xor7",       engine::xor7,            0x00,        0x00,        Width::One),  // 0x31
    AlgorithmDescriptor::new("crc8",       engine::crc8,            0x00,        0x00,        Width::One),  // 0xF4
    AlgorithmDescriptor::new("ccitt8",     engine::ccitt8,          0x00,        0x00,        Width::One),  // 0xA1
    AlgorithmDescriptor::new("crc16",      engine::crc16,           0x0000,      0x0000,      Width::Two),  // 0xFEE8
    AlgorithmDescriptor::new("crc16r",     engine::crc16_reflected, 0x0000,      0x0000,      Width::Two),  // 0xBB3D
    AlgorithmDescriptor::new("modbus",     engine::crc16_reflected, 0xFFFF,      0x0000,      Width::Two),  // 0x4B37
    AlgorithmDescriptor::new("ccitt16",    engine::ccitt16,         0xFFFF,      0x0000,      Width::Two),  // 0x29B1
    AlgorithmDescriptor::new("ccitt16a",   engine::ccitt16,         0x1D0F,      0x0000,      Width::Two),  // 0xE5CC
    AlgorithmDescriptor::new("ccitt16x",   engine::ccitt16,         0x0000,      0x0000,      Width::Two),  // 0x31C3
    AlgorithmDescriptor::new("crc16c",     engine::ccitt16,         0x0000,      0x0000,      Width::Two),  // 0x31C3
    AlgorithmDescriptor::new("xmodem",     engine::ccitt16,         0x0000,      0x0000,      Width::Two),  // 0x31C3
    AlgorithmDescriptor::new("crc32",      engine::crc32,           0xFFFF_FFFF, 0xFFFF_FFFF, Width::Four), // 0xFC891918
    AlgorithmDescriptor::new("crc32r",     engine::crc32_reflected, 0xFFFF_FFFF, 0xFFFF_FFFF, Width::Four), // 0xCBF43926
    AlgorithmDescriptor::new("jamcrc",     engine::crc32_reflected, 0xFFFF_FFFF, 0x0000_0000, Width::Four), // 0x340BC6D9
    AlgorithmDescriptor::new("adler32",    engine::adler32,         0x0000_0001, 0x0000_0000, Width::Four), // 0x091E01DE
    AlgorithmDescriptor::new("hexsum8",    engine::hexsum,          0x00,        0x00,        Width::One),  // 0x2D
    AlgorithmDescriptor::new("julich",     engine::julich,          0x00,        0x00,        Width::Two),  // 0x4444
    AlgorithmDescriptor::new("skf_modbus", engine::skf_modbus,      0x00,        0x00,        Width::Two),  // 0x4B37
];

static STANDARD: Registry = Registry {
    algorithms: Cow::Borrowed(STANDARD_ALGORITHMS),
};

/// Name and index lookup over an immutable list of algorithms
///
/// Indexes are stable for the lifetime of a registry and are what
/// [`ResolvedDirective`] stores, so a directive must be used with the registry
/// that resolved it.
#[derive(Debug, Clone)]
pub struct Registry {
    algorithms: Cow<'static, [AlgorithmDescriptor]>,
}

impl Registry {
    /// The built-in table, see [`STANDARD_ALGORITHMS`]
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    /// Build a registry from a custom list
    ///
    /// # Errors
    ///
    /// Names must be unique ignoring case and the list must fit a one byte index.
    /// Every full name must also resolve to its own entry, so a name may not
    /// extend an earlier one: `crc16` after `crc16r` would be unreachable.
    pub fn new(algorithms: Vec<AlgorithmDescriptor>) -> std::result::Result<Self, RegistryError> {
        if algorithms.len() > u8::MAX as usize + 1 {
            return Err(RegistryError::TooManyAlgorithms(algorithms.len()));
        }
        for (i, algorithm) in algorithms.iter().enumerate() {
            let earlier = &algorithms[..i];
            if earlier
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(algorithm.name))
            {
                return Err(RegistryError::DuplicateName(algorithm.name));
            }
            if let Some(other) = earlier
                .iter()
                .find(|other| starts_with_ignore_case(other.name, algorithm.name))
            {
                return Err(RegistryError::Shadowed {
                    name: algorithm.name,
                    by: other.name,
                });
            }
        }
        Ok(Self {
            algorithms: Cow::Owned(algorithms),
        })
    }

    /// The standard table followed by `extra`, which keeps every standard index valid
    pub fn standard_with(
        extra: impl IntoIterator<Item = AlgorithmDescriptor>,
    ) -> std::result::Result<Self, RegistryError> {
        let mut algorithms = STANDARD_ALGORITHMS.to_vec();
        algorithms.extend(extra);
        Self::new(algorithms)
    }

    pub fn get(&self, index: u8) -> Option<&AlgorithmDescriptor> {
        self.algorithms.get(index as usize)
    }

    /// Index of the algorithm called `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<u8> {
        self.algorithms
            .iter()
            .position(|algorithm| algorithm.name.eq_ignore_ascii_case(name))
            .map(|index| index as u8)
    }

    /// Index of the first algorithm whose name starts with `abbrev`, ignoring case
    ///
    /// This is how directives name algorithms: `crc1` is `crc16` and `mod` is
    /// `modbus`. An empty `abbrev` matches nothing.
    pub fn find_abbreviated(&self, abbrev: &str) -> Option<u8> {
        if abbrev.is_empty() {
            return None;
        }
        self.algorithms
            .iter()
            .position(|algorithm| starts_with_ignore_case(algorithm.name, abbrev))
            .map(|index| index as u8)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmDescriptor> {
        self.algorithms.iter()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Resolve the directive at the start of `input`
    ///
    /// Returns the text after the closing `>` together with the directive.
    ///
    /// The name may be abbreviated, see [`Registry::find_abbreviated`]. A name
    /// that matches nothing but starts with a lowercase `n` is retried without
    /// the `n`, and a match then counts as negated: `nsum>` is `-sum>`. The
    /// shorthand would shadow a registered name starting with `n` that is only
    /// reachable through it, so keep that in mind when registering vendor
    /// algorithms.
    ///
    /// # Errors
    ///
    /// [`ChecksumError::MalformedDirective`] without a closing `>`,
    /// [`ChecksumError::UnknownAlgorithm`] when no name matches.
    pub fn resolve<'a>(&self, input: &'a str) -> Result<(&'a str, ResolvedDirective)> {
        let (rest, parsed) = directive(input)
            .finish()
            .map_err(|_| ChecksumError::MalformedDirective)?;

        let mut negate = parsed.negate;
        let index = match self.find_abbreviated(parsed.name) {
            Some(index) => index,
            None => {
                let retry = parsed
                    .name
                    .strip_prefix('n')
                    .and_then(|name| self.find_abbreviated(name));
                match retry {
                    Some(index) => {
                        negate = true;
                        index
                    }
                    None => return Err(ChecksumError::UnknownAlgorithm(parsed.name.to_owned())),
                }
            }
        };

        // Index is always valid here, lookups only return positions of this registry
        let descriptor = &self.algorithms[index as usize];
        let resolved = ResolvedDirective::new(index, descriptor, negate, parsed.complement);
        debug!(
            "checksum directive {:?} resolved to {} (init 0x{:X}, xorout 0x{:X})",
            &input[..input.len() - rest.len()],
            descriptor.name,
            resolved.init,
            resolved.xor_out
        );
        Ok((rest, resolved))
    }
}

fn starts_with_ignore_case(name: &str, abbrev: &str) -> bool {
    name.get(..abbrev.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(abbrev))
}
