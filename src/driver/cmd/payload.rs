#[cfg(test)]
mod tests;

use super::super::{parse::ParseError, DriverError};
use nom::{
    combinator::all_consuming,
    number::complete::{le_i32, le_u32, u8 as parse_u8},
    sequence::tuple,
    Finish, IResult, Parser,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::{fmt::Display, time::Duration};

// unfortunately, due to rustfmt not having the blank_lines_upper_bound feature
// stable yet, we gotta put comments in between the different sections. otherwise
// its just too much

//

/// Microstep resolution codes understood by the motor driver
///
/// The numerical value of a variant is its code, **not** the number of
/// microsteps. Use [`microsteps`][MicrostepResolution::microsteps] for that.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum MicrostepResolution {
    /// Full step with 100% current
    Full100 = 0,
    /// Full step with 71% current
    Full71,
    /// Non-circular half step
    HalfNonCircular,
    /// Circular half step
    Half,
    S4,
    S8,
    S16,
    S32,
    S64,
    S128,
    S256,
}

impl MicrostepResolution {
    /// Microsteps per full step
    pub fn microsteps(&self) -> u16 {
        match self {
            Self::Full100 | Self::Full71 => 1,
            Self::HalfNonCircular | Self::Half => 2,
            Self::S4 => 4,
            Self::S8 => 8,
            Self::S16 => 16,
            Self::S32 => 32,
            Self::S64 => 64,
            Self::S128 => 128,
            Self::S256 => 256,
        }
    }
}

impl Display for MicrostepResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

//

/// Limit and home switch configuration, packed into a single byte on the wire
///
/// # Examples
/// ```
/// # use vmstep_driver::LimitFlags;
/// let flags = LimitFlags {
///     home_enable: true,
///     home_polarity: true,
///     ..Default::default()
/// };
/// assert_eq!(0b100100, u8::from(flags))
/// ```
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone)]
pub struct LimitFlags {
    /// Bit 0
    pub limit1_enable: bool,
    /// Bit 1
    pub limit2_enable: bool,
    /// Bit 2
    pub home_enable: bool,
    /// Bit 3
    pub limit1_polarity: bool,
    /// Bit 4
    pub limit2_polarity: bool,
    /// Bit 5
    pub home_polarity: bool,
}

impl From<u8> for LimitFlags {
    /// Bits 6 and 7 are reserved and ignored
    fn from(b: u8) -> Self {
        let bit = |n: u8| b & (1u8 << n) != 0;
        Self {
            limit1_enable: bit(0),
            limit2_enable: bit(1),
            home_enable: bit(2),
            limit1_polarity: bit(3),
            limit2_polarity: bit(4),
            home_polarity: bit(5),
        }
    }
}

impl From<LimitFlags> for u8 {
    fn from(l: LimitFlags) -> Self {
        (l.limit1_enable as u8)
            | (l.limit2_enable as u8) << 1
            | (l.home_enable as u8) << 2
            | (l.limit1_polarity as u8) << 3
            | (l.limit2_polarity as u8) << 4
            | (l.home_polarity as u8) << 5
    }
}

//

/// Configuration of the controller
///
/// On the wire this is a packed little-endian record of [`Settings::SIZE`]
/// bytes:
///
/// | byte  | content                                              |
/// |-------|------------------------------------------------------|
/// | 0     | bits 0-3 run current, bits 4-7 sleep current         |
/// | 1     | bits 0-3 microstep resolution code, bits 4-7 reserved |
/// | 2     | sleep timeout in 10 ms                               |
/// | 3-6   | top speed in steps/s                                 |
/// | 7-10  | acceleration in steps/s²                             |
/// | 11    | [`LimitFlags`], bits 6-7 reserved                    |
///
/// Packing doesn't validate anything, values too big for their 4 bit field
/// are truncated. Use [`validate`][Settings::validate] to check them.
///
/// # Examples
/// ```
/// # use vmstep_driver::Settings;
/// let settings = Settings {
///     run_current: 1,
///     microstep_res: 7,
///     top_speed: 40000,
///     acceleration: 200000,
///     ..Default::default()
/// };
/// let bytes = settings.pack();
/// assert_eq!(Settings::unpack(&bytes).unwrap(), settings)
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Settings {
    /// 4 bits
    pub run_current: u8,
    /// 4 bits
    pub sleep_current: u8,
    /// 4 bit code, see [`MicrostepResolution`]
    pub microstep_res: u8,
    /// In 10s of ms
    pub sleep_timeout: u8,
    pub top_speed: u32,
    pub acceleration: u32,
    pub flags: LimitFlags,
}

impl Default for Settings {
    /// The values the controller starts with
    fn default() -> Self {
        Self {
            run_current: 0,
            sleep_current: 0,
            microstep_res: MicrostepResolution::S16 as u8,
            sleep_timeout: 100,
            top_speed: 2000,
            acceleration: 4000,
            flags: LimitFlags::default(),
        }
    }
}

impl Settings {
    /// Size of the packed record in bytes
    pub const SIZE: usize = 12;
    /// Biggest value for the run and sleep current
    pub const MAX_CURRENT: u8 = 0xf;

    /// Packs the settings into their wire representation
    pub fn pack(&self) -> [u8; Self::SIZE] {
        let mut b = [0u8; Self::SIZE];
        b[0] = (self.run_current & 0xf) | (self.sleep_current & 0xf) << 4;
        b[1] = self.microstep_res & 0xf;
        b[2] = self.sleep_timeout;
        b[3..7].copy_from_slice(&self.top_speed.to_le_bytes());
        b[7..11].copy_from_slice(&self.acceleration.to_le_bytes());
        b[11] = self.flags.into();
        b
    }

    /// Unpacks settings from their wire representation. Reserved bits are
    /// ignored.
    ///
    /// # Errors
    /// [`DriverError::InvalidLength`] if `bytes` isn't exactly [`Settings::SIZE`]
    /// bytes long.
    pub fn unpack(bytes: &[u8]) -> Result<Self, DriverError> {
        if bytes.len() != Self::SIZE {
            return Err(DriverError::InvalidLength {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let (_, s) = all_consuming(Self::parse).parse(bytes).finish()?;
        Ok(s)
    }

    pub(crate) fn parse(s: &[u8]) -> IResult<&[u8], Self, ParseError<&[u8]>> {
        tuple((parse_u8, parse_u8, parse_u8, le_u32, le_u32, parse_u8))
            .map(
                |(currents, microstep, sleep_timeout, top_speed, acceleration, flags)| Self {
                    run_current: currents & 0xf,
                    sleep_current: currents >> 4,
                    microstep_res: microstep & 0xf,
                    sleep_timeout,
                    top_speed,
                    acceleration,
                    flags: flags.into(),
                },
            )
            .parse(s)
    }

    /// The microstep resolution, [`None`] if the code isn't a known one
    pub fn microstep_resolution(&self) -> Option<MicrostepResolution> {
        MicrostepResolution::from_u8(self.microstep_res)
    }

    pub fn set_microstep_resolution(&mut self, res: MicrostepResolution) {
        self.microstep_res = res as u8;
    }

    /// Time without motion after which the motor goes to sleep
    pub fn sleep_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.sleep_timeout as u64 * 10)
    }

    /// Same check the controller does before accepting new settings
    pub fn validate(&self) -> bool {
        self.run_current <= Self::MAX_CURRENT
            && self.sleep_current <= Self::MAX_CURRENT
            && self.microstep_resolution().is_some()
    }
}

//

/// Direction of a reference run
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum HomeDirection {
    Negative,
    Positive,
}

impl Display for HomeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

//

// position and distance are 4 byte little endian signed integers. a payload
// with anything else in it is malformed
pub(crate) fn parse_position(payload: &[u8]) -> Result<i32, DriverError> {
    all_consuming(le_i32::<_, ParseError<&[u8]>>)
        .parse(payload)
        .finish()
        .map(|(_, p)| p)
        .map_err(|_| DriverError::MalformedReply(payload.to_vec()))
}
