
use super::{
    super::{map, parse::ParseError, DriverError},
    Command, ReplyKind,
};
use nom::{
    bytes::complete::{tag, take_until},
    combinator::rest,
    sequence::{delimited, tuple},
    Finish, IResult, Parser,
};

const START: &[u8] = &[map::START_MARKER];
const END: &[u8] = &[map::END_MARKER];

// payload bytes are written verbatim, nothing is escaped. the protocol
// assumes a payload never contains one of the markers
/// Wraps a command and its argument bytes into a frame
///
/// # Examples
/// ```
/// # use vmstep_driver::{frame, Command};
/// assert_eq!(frame::encode(Command::Query, b"X"), b"[QX]".to_vec());
/// ```
pub fn encode(command: Command, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 3);
    frame.push(map::START_MARKER);
    frame.push(command.tag());
    frame.extend_from_slice(payload);
    frame.push(map::END_MARKER);
    frame
}

fn parse(s: &[u8]) -> IResult<&[u8], &[u8], ParseError<&[u8]>> {
    delimited(tag(START), take_until(END), tag(END))(s)
}

/// Strips the markers from a frame and returns what's between them, i.e. the
/// tag byte followed by the payload
///
/// # Errors
/// [`DriverError::Framing`] if `raw` doesn't start with the start marker or
/// doesn't end with the (first) end marker.
pub fn decode(raw: &[u8]) -> Result<&[u8], DriverError> {
    match parse(raw).finish() {
        Ok((rem, interior)) if rem.is_empty() => Ok(interior),
        _ => Err(DriverError::Framing(raw.to_vec())),
    }
}

//

/// The inside of a reply frame, split into its kind and the rest
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Reply {
    pub kind: ReplyKind,
    pub payload: Vec<u8>,
}

impl Reply {
    pub(crate) fn parse(s: &[u8]) -> IResult<&[u8], Self, ParseError<&[u8]>> {
        tuple((ReplyKind::parse, rest))
            .map(|(kind, payload)| Self {
                kind,
                payload: payload.to_vec(),
            })
            .parse(s)
    }
}
