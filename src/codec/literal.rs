// Operator-supplied literals: 32-bit words and RDO reference codes

use super::types::RdoReference;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{digit1, hex_digit1},
    combinator::{all_consuming, map},
    error::Error,
    sequence::preceded,
    Parser,
};
use std::num::IntErrorKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("Unable to decode '{0}' as a decimal or 0x-prefixed hex number")]
    InvalidLiteral(String),

    #[error("'{0}' does not fit in 32 bits")]
    OutOfRange(String),

    #[error("Unknown RDO reference '{0}', expected one of F, B, V, P, A, E or S")]
    UnknownReference(String),
}

pub type Result<T> = std::result::Result<T, LiteralError>;

enum Digits<'a> {
    Hex(&'a str),
    Decimal(&'a str),
}

/// Parse a 32-bit word given in decimal or with a `0x` prefix in hex
pub fn parse_word(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let mut parser = all_consuming(alt((
        map(
            preceded(tag_no_case::<_, _, Error<&str>>("0x"), hex_digit1),
            Digits::Hex,
        ),
        map(digit1, Digits::Decimal),
    )));

    let (digits, radix) = match parser.parse(trimmed) {
        Ok((_, Digits::Hex(d))) => (d, 16),
        Ok((_, Digits::Decimal(d))) => (d, 10),
        Err(_) => return Err(LiteralError::InvalidLiteral(text.to_string())),
    };

    u32::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => LiteralError::OutOfRange(text.to_string()),
        _ => LiteralError::InvalidLiteral(text.to_string()),
    })
}

/// Map a single-letter reference code to the RDO layout it selects.
///
/// F and V request Fixed or Variable supplies, B a Battery supply, P a PPS
/// APDO; A, E and S all request an AVS APDO, whose RDO layout is shared by
/// the SPR and EPR ranges.
pub fn parse_reference(code: &str) -> Result<RdoReference> {
    let mut chars = code.trim().chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(LiteralError::UnknownReference(code.to_string()));
    };
    match c.to_ascii_uppercase() {
        'F' | 'V' => Ok(RdoReference::FixedOrVariable),
        'B' => Ok(RdoReference::Battery),
        'P' => Ok(RdoReference::Pps),
        'A' | 'E' | 'S' => Ok(RdoReference::Avs),
        _ => Err(LiteralError::UnknownReference(code.to_string())),
    }
}
