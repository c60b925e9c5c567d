use nom::{number::complete::u8 as parse_u8, IResult};
use std::fmt::Debug;
use thiserror::Error;

/// Gets thrown when there is an error while parsing the payload of a reply
#[derive(Error, Debug)]
pub enum ParseError<I: Debug> {
    /// Gets thrown when a byte doesn't have a matching enum variant, for
    /// example an unknown tag byte
    #[error("Invalid Value while Parsing")]
    InvalidValue,
    /// Gets thrown when a payload had more bytes than its parser consumed
    #[error("payload had trailing bytes")]
    NonEmptyRemainder,
    /// Wrapper around [`nom::error::Error`]
    #[error("nom error: {0:?}")]
    NomError(nom::error::Error<I>),
}

impl<I: Debug> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(input: I, kind: nom::error::ErrorKind) -> Self {
        Self::NomError(nom::error::Error::from_error_kind(input, kind))
    }

    /// basically copied from nom::error::Error::append
    fn append(_: I, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I: Debug> From<nom::error::Error<I>> for ParseError<I> {
    fn from(e: nom::error::Error<I>) -> Self {
        Self::NomError(e)
    }
}

impl From<ParseError<&[u8]>> for ParseError<Vec<u8>> {
    fn from(e: ParseError<&[u8]>) -> Self {
        match e {
            ParseError::InvalidValue => ParseError::InvalidValue,
            ParseError::NonEmptyRemainder => ParseError::NonEmptyRemainder,
            ParseError::NomError(e) => ParseError::NomError(nom::error::Error {
                input: e.input.to_vec(),
                code: e.code,
            }),
        }
    }
}

/// Parses a single tag byte and maps it with `constructor`, failing with
/// [`ParseError::InvalidValue`] if there is no matching value
#[inline]
pub(super) fn parse_tag<'a, C, O>(
    s: &'a [u8],
    constructor: C,
) -> IResult<&'a [u8], O, ParseError<&'a [u8]>>
where
    C: Fn(u8) -> Option<O>,
{
    let (rem, res) = parse_u8::<_, ParseError<&'a [u8]>>(s)?;
    Ok((
        rem,
        constructor(res).ok_or(nom::Err::Error(ParseError::InvalidValue))?,
    ))
}
