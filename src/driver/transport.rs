//! Byte stream the driver talks over
//!
//! The driver only needs four things from a connection: writing a frame,
//! reading up to a delimiter, dropping whatever is still waiting to be read and
//! closing it. [`Transport`] is that contract. [`IoTransport`] implements it
//! for anything that is [`Read`] + [`Write`], [`SerialTransport`] for a
//! serialport.


use serialport::{ClearBuffer, DataBits, Parity, SerialPort, SerialPortBuilder, StopBits};
use std::{
    fmt::Debug,
    io::{self, BufRead, BufReader, ErrorKind, Read, Write},
    time::Duration,
};
use thiserror::Error;

/// Errors returned by a [`Transport`]
#[derive(Error, Debug)]
pub enum TransportError {
    /// Nothing (or no delimiter) arrived before the read timeout of the
    /// underlying connection elapsed
    #[error("read timed out")]
    TimedOut,
    /// The connection is gone, either closed by us or by the other side
    #[error("connection closed")]
    Disconnected,
    /// Wrapper around [`io::Error`]
    #[error(transparent)]
    Io(io::Error),
    /// Wrapper around [`serialport::Error`]
    #[error(transparent)]
    SerialPort(#[from] serialport::Error),
}

impl TransportError {
    /// Whether retrying can't possibly help
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Self::TimedOut,
            ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => Self::Disconnected,
            _ => Self::Io(e),
        }
    }
}

//

/// A connection to a controller
pub trait Transport {
    /// Writes all of `bytes` and flushes them
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Reads until and including `delimiter`
    ///
    /// Fails with [`TransportError::TimedOut`] if the delimiter didn't arrive
    /// in time.
    fn read_until(&mut self, delimiter: u8) -> Result<Vec<u8>, TransportError>;

    /// Drops everything received but not read yet
    fn discard_pending_input(&mut self) -> Result<(), TransportError>;

    /// Closes the connection, every call afterwards fails with
    /// [`TransportError::Disconnected`]
    fn close(&mut self) -> Result<(), TransportError>;
}

//

/// [`Transport`] over any byte stream
///
/// A read that yields nothing (end of stream) or ends the stream in the middle
/// of a frame is treated as a disconnect. Timeouts are whatever the stream
/// reports as [`ErrorKind::TimedOut`].
pub struct IoTransport<I: Read + Write> {
    // None once closed
    interface: Option<BufReader<I>>,
}

impl<I: Read + Write> IoTransport<I> {
    pub fn new(interface: I) -> Self {
        Self {
            // wrap into bufreader so receiving until the end marker is easier
            interface: Some(BufReader::new(interface)),
        }
    }

    fn interface(&mut self) -> Result<&mut BufReader<I>, TransportError> {
        self.interface.as_mut().ok_or(TransportError::Disconnected)
    }

    pub fn is_closed(&self) -> bool {
        self.interface.is_none()
    }
}

impl<I: Read + Write> Transport for IoTransport<I> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let w = self.interface()?.get_mut();
        w.write_all(bytes)?;
        w.flush()?;
        Ok(())
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Vec<u8>, TransportError> {
        // size chosen more or less randomly, the controller never sends more
        // than its 32 byte buffer
        let mut buf = Vec::with_capacity(32);
        self.interface()?.read_until(delimiter, &mut buf)?;
        // read_until only stops early at the end of the stream
        if buf.last() != Some(&delimiter) {
            return Err(TransportError::Disconnected);
        }
        Ok(buf)
    }

    fn discard_pending_input(&mut self) -> Result<(), TransportError> {
        let r = self.interface()?;
        let n = r.buffer().len();
        r.consume(n);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut r) = self.interface.take() {
            r.get_mut().flush()?;
        }
        Ok(())
    }
}

impl<I: Read + Write> Debug for IoTransport<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IoTransport {{ interface: _, closed: {:?} }}", self.is_closed())
    }
}

//

/// Settings of the serial connection to the controller
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PortConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// How long a single read may block. Motion commands wait longer than
    /// this, see [`WaitPolicy`][super::wait::WaitPolicy].
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            baud_rate: 19200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: Duration::from_millis(500),
        }
    }
}

impl PortConfig {
    pub fn builder(&self, path: &str) -> SerialPortBuilder {
        serialport::new(path, self.baud_rate)
            .data_bits(self.data_bits)
            .parity(self.parity)
            .stop_bits(self.stop_bits)
            .timeout(self.timeout)
    }
}

//

/// [`Transport`] over a serialport
///
/// Same as [`IoTransport`], except that discarding pending input also clears
/// the input buffer of the port itself.
#[derive(Debug)]
pub struct SerialTransport {
    inner: IoTransport<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// # Examples
    /// ```no_run
    /// # use vmstep_driver::{Driver, PortConfig, SerialTransport};
    /// let t = SerialTransport::open("/dev/ttyACM0", &PortConfig::default()).unwrap();
    /// let mut driver = Driver::open(t).unwrap();
    /// ```
    pub fn open(path: &str, config: &PortConfig) -> Result<Self, TransportError> {
        Ok(Self::new(config.builder(path).open()?))
    }

    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            inner: IoTransport::new(port),
        }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.inner.write(bytes)
    }

    fn read_until(&mut self, delimiter: u8) -> Result<Vec<u8>, TransportError> {
        self.inner.read_until(delimiter)
    }

    fn discard_pending_input(&mut self) -> Result<(), TransportError> {
        self.inner.discard_pending_input()?;
        self.inner
            .interface()?
            .get_mut()
            .clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close()
    }
}
