
pub mod cmd;
pub mod diag;
pub mod discovery;
pub mod fault;
mod map;
pub mod parse;
pub mod transport;
pub mod wait;

use self::{
    cmd::{
        frame::{self, Reply},
        payload::{self, HomeDirection, Settings},
        Command, DeviceMode, FaultKind, Query, ReplyKind,
    },
    diag::{DiagnosticSink, Event, TracingSink},
    fault::{FaultRegisters, FaultReport},
    parse::ParseError,
    transport::{Transport, TransportError},
    wait::WaitPolicy,
};
use crate::util::ensure;
use nom::Finish;
use num_traits::FromPrimitive;
use std::{
    fmt::{self, Debug},
    time::Duration,
};
use thiserror::Error;

// unfortunately, due to rustfmt not having the blank_lines_upper_bound feature
// stable yet, we gotta put comments in between the different sections. otherwise
// its just too much

//

/// Errors returned by any part of the driver
#[derive(Error, Debug)]
pub enum DriverError {
    /// Thrown if a received frame didn't start or end with the markers
    #[error("invalid frame {0:?}")]
    Framing(Vec<u8>),
    /// Thrown if the first byte of a reply isn't a known reply kind, or the
    /// kind doesn't fit the command that was sent
    #[error("unknown reply {0:?}")]
    UnknownReply(Vec<u8>),
    /// Thrown if a FAULT reply carried an unknown fault kind
    #[error("unknown fault kind {0:#04x}")]
    UnknownFault(u8),
    /// Thrown by [`Driver::get_mode`] if the mode isn't a known one
    #[error("unknown device mode {0}")]
    UnknownMode(u8),
    /// The controller reported a fault
    #[error("device fault: {0}")]
    DeviceFault(FaultKind),
    /// The motor driver chip reported a fault
    #[error("driver fault ({registers}):\n{report}")]
    DriverFault {
        registers: FaultRegisters,
        report: FaultReport,
    },
    /// Thrown if a payload didn't have the expected length
    #[error("malformed reply payload {0:?}")]
    MalformedReply(Vec<u8>),
    /// Thrown by [`Settings::unpack`] if the record has the wrong size
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Thrown by a function in [`Driver`] if the argument isn't something the
    /// controller would accept
    #[error("invalid value for command argument")]
    InvalidArgument,
    /// No DONE arrived in time. Whether the motion finished is unknown.
    #[error("no completion within {timeout:?}, {swallowed} errors ignored meanwhile")]
    Timeout { timeout: Duration, swallowed: u32 },
    /// Wrapper around [`TransportError`]
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Wrapper arund [`ParseError`]
    #[error("{0}")]
    ParsingError(ParseError<Vec<u8>>),
    /// Wrapper around [`serialport::Error`]
    #[error(transparent)]
    SerialPortError(#[from] serialport::Error),
    /// Thrown by [`discover`][discovery::discover] if no controller is connected
    #[error("no controller found")]
    NoDevice,
}

impl From<ParseError<&[u8]>> for DriverError {
    fn from(e: ParseError<&[u8]>) -> Self {
        Self::ParsingError(e.into())
    }
}

impl DriverError {
    /// Whether the connection is gone for good
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_fatal())
    }
}

//

// splits the inside of a reply frame and turns faults into errors
fn classify(interior: &[u8]) -> Result<Reply, DriverError> {
    let (_, reply) = Reply::parse(interior)
        .finish()
        .map_err(|_| DriverError::UnknownReply(interior.to_vec()))?;
    if reply.kind == ReplyKind::Fault {
        Err(fault_error(&reply.payload))
    } else {
        Ok(reply)
    }
}

fn fault_error(payload: &[u8]) -> DriverError {
    match FaultKind::parse(payload).finish() {
        Ok((regs, FaultKind::Driver)) => match FaultRegisters::parse(regs).finish() {
            Ok((_, registers)) => DriverError::DriverFault {
                report: registers.report(),
                registers,
            },
            Err(_) => DriverError::MalformedReply(payload.to_vec()),
        },
        Ok((_, kind)) => DriverError::DeviceFault(kind),
        Err(_) => match payload.first() {
            Some(b) => DriverError::UnknownFault(*b),
            None => DriverError::MalformedReply(Vec::new()),
        },
    }
}

//

/// An open connection to a controller board
///
/// The protocol is strictly request/reply: every command is answered by
/// exactly one frame before the next one is sent, which is why every function
/// takes `&mut self`. Motion commands ([`goto`][Driver::goto],
/// [`home`][Driver::home], [`stop`][Driver::stop]) are acknowledged right away
/// and then send a DONE frame once finished, which is waited for (see
/// [`wait_for_done`][Driver::wait_for_done]).
///
/// The driver owns its transport. [`close`][Driver::close] closes it, dropping
/// a driver that wasn't closed closes it as well, ignoring any error.
///
/// # Examples
/// ```no_run
/// # use vmstep_driver::{Driver, PortConfig, SerialTransport, Settings};
/// use std::time::Duration;
///
/// let t = SerialTransport::open("/dev/ttyACM0", &PortConfig::default()).unwrap();
/// let mut driver = Driver::open(t).unwrap();
///
/// driver.set_parameters(&Settings::default()).unwrap();
/// driver.enable().unwrap();
/// let position = driver.goto(-830, Duration::from_secs(10)).unwrap();
/// println!("now at {}", position);
/// driver.close().unwrap();
/// ```
pub struct Driver<T: Transport> {
    transport: T,
    sink: Box<dyn DiagnosticSink>,
    policy: WaitPolicy,
    closed: bool,
}

impl<T: Transport> Driver<T> {
    /// Opens a driver on `transport`, reporting to a [`TracingSink`] and
    /// waiting with the default [`WaitPolicy`]
    ///
    /// Anything already waiting on the transport is discarded, it can't be a
    /// reply to us.
    pub fn open(transport: T) -> Result<Self, DriverError> {
        Self::open_with(transport, Box::new(TracingSink), WaitPolicy::default())
    }

    /// Same as [`open`][Driver::open] with an explicit sink and wait policy
    pub fn open_with(
        transport: T,
        sink: Box<dyn DiagnosticSink>,
        policy: WaitPolicy,
    ) -> Result<Self, DriverError> {
        let mut driver = Driver {
            transport,
            sink,
            policy,
            closed: false,
        };
        driver.discard_pending_input()?;
        Ok(driver)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.policy
    }

    pub fn set_wait_policy(&mut self, policy: WaitPolicy) {
        self.policy = policy;
    }

    /// Closes the transport
    pub fn close(mut self) -> Result<(), DriverError> {
        self.closed = true;
        self.transport.close()?;
        self.sink.record(&Event::Closed);
        Ok(())
    }

    pub fn discard_pending_input(&mut self) -> Result<(), DriverError> {
        self.transport.discard_pending_input()?;
        self.sink.record(&Event::Discarded);
        Ok(())
    }

    //

    fn send(&mut self, command: Command, payload: &[u8]) -> Result<(), DriverError> {
        let frame = frame::encode(command, payload);
        self.sink.record(&Event::Sent {
            command,
            frame: &frame,
        });
        self.transport.write(&frame)?;
        Ok(())
    }

    // reads a single frame and classifies it. fails fast on anything that
    // isn't a well-formed reply
    fn receive(&mut self) -> Result<Reply, DriverError> {
        let raw = self.transport.read_until(map::END_MARKER)?;
        self.sink.record(&Event::Received { frame: &raw });
        classify(frame::decode(&raw)?)
    }

    /// Sends a command and returns the payload of its reply
    ///
    /// `payload` is sent verbatim after the tag of `command`. ACK and DONE
    /// replies are successes, an ECHO reply only for [`Command::Echo`].
    ///
    /// # Errors
    /// A FAULT reply is returned as [`DriverError::DeviceFault`], or
    /// [`DriverError::DriverFault`] if it was the motor driver chip. Any other
    /// reply is a [`DriverError::UnknownReply`].
    pub fn send_command(&mut self, command: Command, payload: &[u8]) -> Result<Vec<u8>, DriverError> {
        self.send(command, payload)?;
        let reply = self.receive()?;
        match reply.kind {
            ReplyKind::Ack | ReplyKind::Done => Ok(reply.payload),
            ReplyKind::Echo if command == Command::Echo => Ok(reply.payload),
            kind => {
                let mut r = vec![kind.tag()];
                r.extend_from_slice(&reply.payload);
                Err(DriverError::UnknownReply(r))
            }
        }
    }

    //

    /// Returns the raw payload of the answer to `query`
    pub fn query(&mut self, query: Query) -> Result<Vec<u8>, DriverError> {
        self.send_command(Command::Query, &[query.tag()])
    }

    fn query_string(&mut self, query: Query) -> Result<String, DriverError> {
        String::from_utf8(self.query(query)?)
            .map_err(|e| DriverError::MalformedReply(e.into_bytes()))
    }

    pub fn get_model_no(&mut self) -> Result<String, DriverError> {
        self.query_string(Query::ModelNo)
    }

    pub fn get_serial_no(&mut self) -> Result<String, DriverError> {
        self.query_string(Query::SerialNo)
    }

    pub fn get_firmware(&mut self) -> Result<String, DriverError> {
        self.query_string(Query::Firmware)
    }

    /// Raw answer to [`Query::Faults`]
    pub fn get_faults(&mut self) -> Result<Vec<u8>, DriverError> {
        self.query(Query::Faults)
    }

    pub fn get_parameters(&mut self) -> Result<Settings, DriverError> {
        Settings::unpack(&self.query(Query::Parameters)?)
    }

    /// Replaces the settings of the controller
    ///
    /// # Errors
    /// [`DriverError::InvalidArgument`] without sending anything if
    /// [`Settings::validate`] fails.
    pub fn set_parameters(&mut self, settings: &Settings) -> Result<(), DriverError> {
        ensure!(settings.validate(), DriverError::InvalidArgument);
        self.send_command(Command::UpdateParameters, &settings.pack())?;
        Ok(())
    }

    /// Position in steps
    pub fn get_position(&mut self) -> Result<i32, DriverError> {
        payload::parse_position(&self.query(Query::Position)?)
    }

    pub fn get_mode(&mut self) -> Result<DeviceMode, DriverError> {
        let r = self.query(Query::Mode)?;
        let b = *r
            .first()
            .ok_or_else(|| DriverError::MalformedReply(r.clone()))?;
        DeviceMode::from_u8(b).ok_or(DriverError::UnknownMode(b))
    }

    pub fn get_fault_registers(&mut self) -> Result<FaultRegisters, DriverError> {
        let r = self.query(Query::FaultRegs)?;
        ensure!(r.len() == 3, DriverError::MalformedReply(r));
        let (_, regs) = FaultRegisters::parse(&r).finish()?;
        Ok(regs)
    }

    //

    /// Moves `distance` steps and returns the position afterwards
    ///
    /// # Errors
    /// [`DriverError::Timeout`] if the move didn't finish within `timeout`.
    pub fn goto(&mut self, distance: i32, timeout: Duration) -> Result<i32, DriverError> {
        let report = self.goto_report(distance, timeout)?;
        payload::parse_position(&report.payload)
    }

    /// Same as [`goto`][Driver::goto] but returns everything about the wait
    pub fn goto_report(
        &mut self,
        distance: i32,
        timeout: Duration,
    ) -> Result<wait::WaitReport, DriverError> {
        self.send_command(Command::Goto, &distance.to_le_bytes())?;
        self.wait_for_done(timeout)
    }

    /// Does a reference run in `direction`
    pub fn home(&mut self, direction: HomeDirection, timeout: Duration) -> Result<(), DriverError> {
        self.home_report(direction, timeout).map(|_| ())
    }

    pub fn home_report(
        &mut self,
        direction: HomeDirection,
        timeout: Duration,
    ) -> Result<wait::WaitReport, DriverError> {
        self.send_command(Command::Home, &[direction as u8])?;
        self.wait_for_done(timeout)
    }

    pub fn stop(&mut self, timeout: Duration) -> Result<(), DriverError> {
        self.stop_report(timeout).map(|_| ())
    }

    pub fn stop_report(&mut self, timeout: Duration) -> Result<wait::WaitReport, DriverError> {
        self.send_command(Command::Stop, &[])?;
        self.wait_for_done(timeout)
    }

    //

    /// Sets the current position to zero
    pub fn reset_position(&mut self) -> Result<(), DriverError> {
        self.send_command(Command::ResetPosition, &[]).map(|_| ())
    }

    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.send_command(Command::Reset, &[]).map(|_| ())
    }

    pub fn enable(&mut self) -> Result<(), DriverError> {
        self.send_command(Command::Enable, &[]).map(|_| ())
    }

    pub fn disable(&mut self) -> Result<(), DriverError> {
        self.send_command(Command::Disable, &[]).map(|_| ())
    }

    /// Returns whatever the controller answers
    pub fn echo(&mut self) -> Result<Vec<u8>, DriverError> {
        self.send_command(Command::Echo, &[])
    }
}

impl<T: Transport> Drop for Driver<T> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            // nothing sensible to do with an error here
            let _ = self.transport.close();
        }
    }
}

impl<T: Transport + Debug> Debug for Driver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Driver {{ transport: {:?}, sink: _, policy: {:?}, closed: {:?} }}",
            self.transport, self.policy, self.closed
        )
    }
}
