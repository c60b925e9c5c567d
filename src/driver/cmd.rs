//! Provides bindings for the raw commands, queries and replies of the
//! controller board.
//!
//! Every enum in here is a closed set with an explicit mapping to its tag byte
//! in both directions. Unknown tags are rejected by `from_tag` instead of
//! being mapped to some default.


pub mod frame;
pub mod payload;

use super::{
    map,
    parse::{parse_tag, ParseError},
};
use nom::IResult;
use num_derive::FromPrimitive;
use std::fmt::{Debug, Display};

// builds a fieldless enum together with its tag table
macro_rules! tagged {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $tag:path),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// The byte identifying this value on the wire
            pub fn tag(self) -> u8 {
                match self {
                    $($name::$variant => $tag),*
                }
            }

            /// Looks up the value for a tag byte, [`None`] if the tag is unknown
            pub fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $($tag => Some($name::$variant),)*
                    _ => None,
                }
            }

            #[allow(dead_code)]
            pub(crate) fn parse(s: &[u8]) -> IResult<&[u8], Self, ParseError<&[u8]>> {
                parse_tag(s, Self::from_tag)
            }
        }
    };
}

tagged!(
    /// Commands understood by the controller, the first byte of every request
    Command {
        /// Relative move, argument is the distance in steps
        Goto = map::GOTO,
        Stop = map::STOP,
        /// Reference run, argument is the direction
        Home = map::HOME,
        /// Resets the controller, also clears a fault state
        Reset = map::RESET,
        /// Read a value, argument is a [`Query`]
        Query = map::QUERY,
        /// Replace the [`Settings`][payload::Settings] of the controller
        UpdateParameters = map::UPDATE_PARAMETERS,
        Echo = map::ECHO,
        Enable = map::ENABLE,
        Disable = map::DISABLE,
        /// Sets the current position to zero
        ResetPosition = map::RESET_POSITION,
    }
);

impl Command {
    /// Commands the controller still accepts while it is in
    /// [`DeviceMode::Fault`]
    pub fn allowed_in_fault(self) -> bool {
        matches!(self, Command::Reset | Command::Query | Command::Echo)
    }
}

tagged!(
    /// Selectors for [`Command::Query`]
    Query {
        ModelNo = map::QUERY_MODEL_NO,
        SerialNo = map::QUERY_SERIAL_NO,
        Firmware = map::QUERY_FIRMWARE,
        Parameters = map::QUERY_PARAMETERS,
        Faults = map::QUERY_FAULTS,
        Position = map::QUERY_POSITION,
        Mode = map::QUERY_MODE,
        FaultRegs = map::QUERY_FAULT_REGS,
    }
);

tagged!(
    /// First byte of every reply, decides how the rest is read
    ReplyKind {
        Ack = map::REPLY_ACK,
        /// Sent once a motion command finished
        Done = map::REPLY_DONE,
        Fault = map::REPLY_FAULT,
        Echo = map::REPLY_ECHO,
    }
);

tagged!(
    /// Second byte of a [`ReplyKind::Fault`] reply
    FaultKind {
        /// The controller didn't accept the command
        Nack = map::FAULT_NACK,
        /// The motor driver chip reported a fault, the reply carries its
        /// registers
        Driver = map::FAULT_DRIVER,
        InvalidParameters = map::FAULT_INVALID_PARAMETERS,
        /// The settings couldn't be written to the motor driver chip
        DriverSync = map::FAULT_DRIVER_SYNC,
        Limit1 = map::FAULT_LIMIT1,
        Limit2 = map::FAULT_LIMIT2,
        Home = map::FAULT_HOME,
    }
);

impl Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FaultKind::Nack => "command not acknowledged",
            FaultKind::Driver => "motor driver fault",
            FaultKind::InvalidParameters => "invalid parameters",
            FaultKind::DriverSync => "motor driver out of sync with settings",
            FaultKind::Limit1 => "limit switch 1 triggered",
            FaultKind::Limit2 => "limit switch 2 triggered",
            FaultKind::Home => "home switch fault",
        };
        write!(f, "{}", s)
    }
}

//

/// State of the controller as returned by [`Query::Mode`]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum DeviceMode {
    Idle,
    Sleep,
    Moving,
    Homing,
    Fault,
}

impl Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
