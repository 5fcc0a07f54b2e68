use nom_checksum::*;
use proptest::prelude::*;

const CHECK: &[u8] = b"123456789";

const FORMATS: [TrailerFormat; 4] = [
    TrailerFormat::Binary,
    TrailerFormat::Hex,
    TrailerFormat::PackedNibble,
    TrailerFormat::Decimal,
];

const ORDERS: [ByteOrder; 2] = [ByteOrder::BigEndian, ByteOrder::LittleEndian];

/// Algorithms where any single flipped bit changes the result
const DETECTS_SINGLE_BIT: &[&str] = &[
    "sum", "sum16", "sum32", "xor8", "crc8", "ccitt8", "crc16", "crc16r", "modbus", "ccitt16",
    "ccitt16a", "xmodem", "crc32", "crc32r", "jamcrc", "adler32", "skf_modbus",
];

fn encodings() -> impl Iterator<Item = Encoding> {
    FORMATS
        .into_iter()
        .flat_map(|format| ORDERS.into_iter().map(move |order| Encoding::new(format, order)))
}

fn resolve(directive: &str) -> ResolvedDirective {
    let (rest, resolved) = Registry::standard().resolve(directive).unwrap();
    assert_eq!(rest, "");
    resolved
}

#[test]
fn known_answers() {
    let expected: &[(&str, u32)] = &[
        ("sum", 0xDD),
        ("sum8", 0xDD),
        ("sum16", 0x01DD),
        ("sum32", 0x000001DD),
        ("xor", 0x31),
        ("xor8", 0x31),
        ("xor7", 0x31),
        ("crc8", 0xF4),
        ("ccitt8", 0xA1),
        ("crc16", 0xFEE8),
        ("crc16r", 0xBB3D),
        ("modbus", 0x4B37),
        ("ccitt16", 0x29B1),
        ("ccitt16a", 0xE5CC),
        ("ccitt16x", 0x31C3),
        ("crc16c", 0x31C3),
        ("xmodem", 0x31C3),
        ("crc32", 0xFC891918),
        ("crc32r", 0xCBF43926),
        ("jamcrc", 0x340BC6D9),
        ("adler32", 0x091E01DE),
        ("hexsum8", 0x2D),
        ("julich", 0x4444),
        ("skf_modbus", 0x4B37),
    ];
    assert_eq!(expected.len(), Registry::standard().len());

    for &(name, value) in expected {
        let directive = resolve(&format!("{name}>"));
        assert_eq!(
            directive.checksum(Registry::standard(), CHECK),
            Ok(value),
            "{name}"
        );
        assert_eq!(checksum(name, CHECK), Some(value), "{name}");
    }
}

#[test]
fn glob_import_keeps_std_result() {
    fn parse(s: &str) -> Result<u8, std::num::ParseIntError> {
        s.parse()
    }
    assert_eq!(parse("7"), Ok(7));
}

#[test]
fn abbreviated_directives() {
    assert_eq!(resolve("crc1>"), resolve("crc16>"));
    assert_eq!(resolve("Mod>"), resolve("modbus>"));
    assert_ne!(resolve("ccitt16>"), resolve("ccitt16a>"));
    assert_eq!(
        Registry::standard().resolve("Nsum>"),
        Err(ChecksumError::UnknownAlgorithm("Nsum".into()))
    );
}

#[test]
fn widths() {
    let registry = Registry::standard();
    let width = |name: &str| registry.get(registry.find(name).unwrap()).unwrap().width;
    assert_eq!(width("xor7"), Width::One);
    assert_eq!(width("ccitt16a"), Width::Two);
    assert_eq!(width("adler32"), Width::Four);
    assert_eq!(width("julich"), Width::Two);
}

#[test]
fn negate_and_complement_algebra() {
    let plain = resolve("crc16>");
    let neg = resolve("-crc16>");
    let not = resolve("~crc16>");
    let both = resolve("-~crc16>");

    assert_eq!(neg.init, !plain.init);
    assert_eq!(not.init, plain.init);
    assert_eq!(not.xor_out, !plain.xor_out);
    assert_eq!(both.init, !plain.init);
    assert_eq!(both.xor_out, plain.xor_out);

    assert_eq!(resolve("negcrc16>"), neg);
    assert_eq!(resolve("NOTcrc16>"), not);
    assert_eq!(resolve("ncrc16>"), neg);

    // The complemented value is the bitwise inverse within the width
    let registry = Registry::standard();
    let value = plain.checksum(registry, CHECK).unwrap();
    assert_eq!(not.checksum(registry, CHECK).unwrap(), !value & 0xFFFF);
}

#[test]
fn directive_errors() {
    assert_eq!(
        Registry::standard().resolve("crc16"),
        Err(ChecksumError::MalformedDirective)
    );
    assert_eq!(
        Registry::standard().resolve("-~crc99>"),
        Err(ChecksumError::UnknownAlgorithm("crc99".into()))
    );
}

#[test]
fn one_byte_short_for_every_encoding() {
    let registry = Registry::standard();
    for (index, algorithm) in registry.iter().enumerate() {
        let directive = ResolvedDirective::new(index as u8, algorithm, false, false);
        for encoding in encodings() {
            let mut message = CHECK.to_vec();
            let len = encode_checksum(registry, &directive, encoding, &mut message, Region::default())
                .unwrap();
            assert_eq!(len, encoding.trailer_len(algorithm.width));
            message.pop();

            assert_eq!(
                verify_checksum(registry, &directive, encoding, &message, Region::default(), CHECK.len()),
                Err(ChecksumError::InputTooShort {
                    expected: len,
                    available: len - 1
                }),
                "{} {:?}",
                algorithm.name,
                encoding
            );
        }
    }
}

#[test]
fn stored_directive_still_verifies() {
    let registry = Registry::standard();
    let stored = resolve("~modbus>").to_bytes();
    let encoding = Encoding::from_flags("0#").unwrap();

    let mut message = b"@01RD\r".to_vec();
    let directive = ResolvedDirective::try_from(&stored[..]).unwrap();
    encode_checksum(registry, &directive, encoding, &mut message, Region::new(1, 1)).unwrap();

    let cursor = 6;
    assert_eq!(
        verify_checksum(registry, &directive, encoding, &message, Region::new(1, 1), cursor),
        Ok(4)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip(
        prefix in proptest::collection::vec(any::<u8>(), 0..8),
        payload in proptest::collection::vec(any::<u8>(), 0..256),
        suffix in proptest::collection::vec(any::<u8>(), 0..4),
        negate in any::<bool>(),
        complement in any::<bool>(),
    ) {
        let registry = Registry::standard();
        let region = Region::new(prefix.len(), suffix.len());

        for (index, algorithm) in registry.iter().enumerate() {
            let directive = ResolvedDirective::new(index as u8, algorithm, negate, complement);
            for encoding in encodings() {
                let mut message = [&prefix[..], &payload[..], &suffix[..]].concat();
                let cursor = message.len();
                let appended = encode_checksum(registry, &directive, encoding, &mut message, region).unwrap();
                prop_assert_eq!(appended, encoding.trailer_len(algorithm.width));
                prop_assert_eq!(
                    verify_checksum(registry, &directive, encoding, &message, region, cursor),
                    Ok(appended),
                    "{} {:?}", algorithm.name, encoding
                );
            }
        }
    }

    #[test]
    fn flipped_payload_bit_is_rejected(
        payload in proptest::collection::vec(any::<u8>(), 1..256),
        position in any::<prop::sample::Index>(),
        bit in 0..8u8,
    ) {
        let registry = Registry::standard();
        for name in DETECTS_SINGLE_BIT {
            let directive = resolve(&format!("{name}>"));
            for encoding in encodings() {
                let mut message = payload.clone();
                encode_checksum(registry, &directive, encoding, &mut message, Region::default()).unwrap();
                message[position.index(payload.len())] ^= 1 << bit;

                let result = verify_checksum(registry, &directive, encoding, &message, Region::default(), payload.len());
                prop_assert!(
                    matches!(result, Err(ChecksumError::ChecksumMismatch { .. })),
                    "{} {:?}: {:?}", name, encoding, result
                );
            }
        }
    }

    #[test]
    fn flipped_trailer_bit_is_rejected(
        payload in proptest::collection::vec(any::<u8>(), 0..64),
        position in any::<prop::sample::Index>(),
        bit in 0..8u8,
    ) {
        let registry = Registry::standard();
        for (index, algorithm) in registry.iter().enumerate() {
            let directive = ResolvedDirective::new(index as u8, algorithm, false, false);
            for encoding in encodings() {
                // Letters differ from their other case only in bit 5
                if encoding.format == TrailerFormat::Hex && bit == 5 {
                    continue;
                }

                let mut message = payload.clone();
                let len = encode_checksum(registry, &directive, encoding, &mut message, Region::default()).unwrap();
                message[payload.len() + position.index(len)] ^= 1 << bit;

                let result = verify_checksum(registry, &directive, encoding, &message, Region::default(), payload.len());
                let sum = directive.checksum(registry, &payload).unwrap();
                if encoding.format == TrailerFormat::Decimal && sum == 0 && result.is_ok() {
                    // "00000" cut short by a non-digit still reads as 0
                    continue;
                }
                if matches!(encoding.format, TrailerFormat::Binary | TrailerFormat::Decimal) {
                    prop_assert!(
                        matches!(result, Err(ChecksumError::ChecksumMismatch { .. })),
                        "{} {:?}: {:?}", algorithm.name, encoding, result
                    );
                } else {
                    prop_assert!(
                        matches!(
                            result,
                            Err(ChecksumError::ChecksumMismatch { .. } | ChecksumError::InvalidTrailerEncoding { .. })
                        ),
                        "{} {:?}: {:?}", algorithm.name, encoding, result
                    );
                }
            }
        }
    }
}
