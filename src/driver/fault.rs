//! Decoding of the motor driver's fault and diagnostic registers

#[cfg(test)]
mod tests;

use super::parse::ParseError;
use nom::{number::complete::u8 as parse_u8, sequence::tuple, IResult, Parser};
use std::fmt::Display;

// (bit, message), highest bit first. bits missing from a table are reserved
// and never reported
const FAULT_MESSAGES: [(u8, &str); 8] = [
    (7, "FAULT pin active"),
    (6, "SPI protocol error"),
    (5, "Supply undervoltage lockout"),
    (4, "Charge pump undervoltage"),
    (3, "Overcurrent"),
    (2, "Motor stall"),
    (1, "Thermal flag"),
    (0, "Open load"),
];

const DIAG1_MESSAGES: [(u8, &str); 8] = [
    (7, "Overcurrent on BOUT low-side FET 2"),
    (6, "Overcurrent on BOUT high-side FET 2"),
    (5, "Overcurrent on BOUT low-side FET 1"),
    (4, "Overcurrent on BOUT high-side FET 1"),
    (3, "Overcurrent on AOUT low-side FET 2"),
    (2, "Overcurrent on AOUT high-side FET 2"),
    (1, "Overcurrent on AOUT low-side FET 1"),
    (0, "Overcurrent on AOUT high-side FET 1"),
];

const DIAG2_MESSAGES: [(u8, &str); 6] = [
    (6, "Overtemperature warning"),
    (5, "Overtemperature shutdown"),
    (4, "Stall detection learning successful"),
    (3, "Motor stall detected"),
    (1, "Open load on BOUT"),
    (0, "Open load on AOUT"),
];

fn scan(reg: u8, table: &[(u8, &'static str)], out: &mut Vec<&'static str>) {
    out.extend(
        table
            .iter()
            .filter(|(bit, _)| reg & (1u8 << *bit) != 0)
            .map(|(_, msg)| *msg),
    );
}

/// Decodes the three registers into the conditions they report, in the order
/// fault register, diagnostic register 1, diagnostic register 2, each from
/// the highest bit down
///
/// # Examples
/// ```
/// # use vmstep_driver::fault::{decode, FaultReport};
/// assert_eq!(decode(0b100, 0, 0), FaultReport::Conditions(vec!["Motor stall"]));
/// assert_eq!(decode(0, 0, 0b1000_0100), FaultReport::NoFaults);
/// ```
pub fn decode(fault_reg: u8, diag1_reg: u8, diag2_reg: u8) -> FaultReport {
    let mut conditions = Vec::new();
    scan(fault_reg, &FAULT_MESSAGES, &mut conditions);
    scan(diag1_reg, &DIAG1_MESSAGES, &mut conditions);
    scan(diag2_reg, &DIAG2_MESSAGES, &mut conditions);
    if conditions.is_empty() {
        FaultReport::NoFaults
    } else {
        FaultReport::Conditions(conditions)
    }
}

//

/// Result of [`decode`]
///
/// Never holds an empty list, no set bits is [`FaultReport::NoFaults`].
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum FaultReport {
    NoFaults,
    Conditions(Vec<&'static str>),
}

impl FaultReport {
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Conditions(_))
    }

    /// The reported conditions, empty for [`FaultReport::NoFaults`]
    pub fn conditions(&self) -> &[&'static str] {
        match self {
            Self::NoFaults => &[],
            Self::Conditions(c) => c,
        }
    }
}

impl Display for FaultReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFaults => write!(f, "No faults detected"),
            Self::Conditions(c) => write!(f, "{}", c.join("\n")),
        }
    }
}

//

/// Raw fault register, diagnostic register 1 and diagnostic register 2 of the
/// motor driver
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct FaultRegisters {
    pub fault: u8,
    pub diag1: u8,
    pub diag2: u8,
}

impl FaultRegisters {
    pub(crate) fn parse(s: &[u8]) -> IResult<&[u8], Self, ParseError<&[u8]>> {
        tuple((parse_u8, parse_u8, parse_u8))
            .map(|(fault, diag1, diag2)| Self {
                fault,
                diag1,
                diag2,
            })
            .parse(s)
    }

    pub fn report(&self) -> FaultReport {
        decode(self.fault, self.diag1, self.diag2)
    }
}

impl From<(u8, u8, u8)> for FaultRegisters {
    fn from((fault, diag1, diag2): (u8, u8, u8)) -> Self {
        Self {
            fault,
            diag1,
            diag2,
        }
    }
}

impl Display for FaultRegisters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fault 0x{:02x}, diag1 0x{:02x}, diag2 0x{:02x}",
            self.fault, self.diag1, self.diag2
        )
    }
}
