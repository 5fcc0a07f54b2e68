use nom::{
    bytes::complete::{tag_no_case, take, take_until, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{map, opt, verify},
    multi::{count, fold_many0},
    number::complete::{be_u8, le_u32, le_u8},
    sequence::terminated,
    IResult,
};

use crate::protocol::*;

/// A directive as written, before its name is looked up
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Directive<'a> {
    pub negate: bool,
    pub complement: bool,
    /// Everything between the modifiers and the closing `>`
    pub name: &'a str,
}

/// `-`, `neg` or both
fn negate(input: &str) -> IResult<&str, bool> {
    let (input, dash) = opt(char('-'))(input)?;
    let (input, word) = opt(tag_no_case("neg"))(input)?;
    Ok((input, dash.is_some() || word.is_some()))
}

/// `~`, `not` or both
fn complement(input: &str) -> IResult<&str, bool> {
    let (input, tilde) = opt(char('~'))(input)?;
    let (input, word) = opt(tag_no_case("not"))(input)?;
    Ok((input, tilde.is_some() || word.is_some()))
}

/// Parse a checksum directive up to and including its closing `>`
///
/// `[-|neg][~|not]<name>>`, modifiers are matched ignoring case. Fails only when
/// there is no `>`.
pub fn directive(input: &str) -> IResult<&str, Directive<'_>> {
    let (input, negate) = negate(input)?;
    let (input, complement) = complement(input)?;
    let (input, name) = terminated(take_until(">"), char('>'))(input)?;
    Ok((
        input,
        Directive {
            negate,
            complement,
            name,
        },
    ))
}

/// Parse printf style encoding flags
///
/// Decimal wins over ASCII hex, which wins over packed nibble. Byte order is
/// independent of the rest.
pub fn flags(input: &str) -> IResult<&str, Encoding> {
    let (input, (decimal, little, hex, nibble)) = fold_many0(
        one_of("+#0-"),
        || (false, false, false, false),
        |(decimal, little, hex, nibble), flag| match flag {
            '+' => (true, little, hex, nibble),
            '#' => (decimal, true, hex, nibble),
            '0' => (decimal, little, true, nibble),
            _ => (decimal, little, hex, true),
        },
    )(input)?;

    let format = if decimal {
        TrailerFormat::Decimal
    } else if hex {
        TrailerFormat::Hex
    } else if nibble {
        TrailerFormat::PackedNibble
    } else {
        TrailerFormat::Binary
    };
    let byte_order = if little {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };
    Ok((input, Encoding::new(format, byte_order)))
}

/// Parse the serialized form produced by [`ResolvedDirective::to_bytes`]
pub fn resolved_directive(input: &[u8]) -> IResult<&[u8], ResolvedDirective> {
    let (input, init) = le_u32(input)?;
    let (input, xor_out) = le_u32(input)?;
    let (input, index) = le_u8(input)?;
    Ok((
        input,
        ResolvedDirective {
            index,
            init,
            xor_out,
        },
    ))
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Two ASCII hex digits, either case
pub fn hex_byte(input: &[u8]) -> IResult<&[u8], u8> {
    map(
        verify(take(2usize), |pair: &[u8]| {
            pair.iter().all(u8::is_ascii_hexdigit)
        }),
        |pair: &[u8]| hex_value(pair[0]) << 4 | hex_value(pair[1]),
    )(input)
}

/// One byte in 0x30 - 0x3F, yields its low nibble
fn packed_nibble(input: &[u8]) -> IResult<&[u8], u8> {
    map(verify(be_u8, |byte: &u8| byte & 0xF0 == 0x30), |byte| {
        byte & 0x0F
    })(input)
}

/// Two packed nibbles, high nibble first
pub fn packed_byte(input: &[u8]) -> IResult<&[u8], u8> {
    let (input, high) = packed_nibble(input)?;
    let (input, low) = packed_nibble(input)?;
    Ok((input, high << 4 | low))
}

/// `width` checksum bytes in wire order, decoded according to `format`
///
/// Not meant for [`TrailerFormat::Decimal`], which is read as a whole number by
/// [`decimal`].
pub fn trailer_bytes<'a>(
    format: TrailerFormat,
    width: Width,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], Vec<u8>> {
    move |input| match format {
        TrailerFormat::Hex => count(hex_byte, width.bytes())(input),
        TrailerFormat::PackedNibble => count(packed_byte, width.bytes())(input),
        TrailerFormat::Binary | TrailerFormat::Decimal => {
            count(be_u8, width.bytes())(input)
        }
    }
}

/// Up to `max_digits` decimal digits
///
/// Yields the value and how many digits were read. No digits at all reads as 0.
pub fn decimal<'a>(max_digits: usize) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], (u64, usize)> {
    move |input| {
        let (input, digits) = take_while_m_n(0, max_digits, |b: u8| b.is_ascii_digit())(input)?;
        let value = digits
            .iter()
            .fold(0u64, |acc, digit| acc * 10 + (digit - b'0') as u64);
        Ok((input, (value, digits.len())))
    }
}
