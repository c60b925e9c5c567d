//! Rust driver for the VMSTEP stepper motor controller board.
//!
//! The board is connected over USB and shows up as a serial port. Every
//! exchange is a single `[`...`]` frame in each direction, see
//! [`frame`] for the details.
//!
//! # Usage
//! A [`Driver`] owns the connection to one board. It's either opened on a
//! [`Transport`] directly, usually a [`SerialTransport`], or found by
//! [`discover`]. Every function of a driver sends one command and waits for
//! its reply. Motion commands additionally wait until the motion finished,
//! ignoring noise on the line while doing so (see [`Driver::wait_for_done`]).
//!
//! What a driver does is reported to a [`DiagnosticSink`]. By default that's a
//! [`TracingSink`], so installing any [`tracing`] subscriber shows the traffic.
//!
//! # Examples
//! ```no_run
//! # use vmstep_driver::{discover, HomeDirection, PortConfig, Settings};
//! use std::time::Duration;
//!
//! let mut driver = discover(None, &PortConfig::default()).unwrap();
//!
//! let mut settings = driver.get_parameters().unwrap();
//! settings.run_current = 8;
//! settings.top_speed = 4000;
//! driver.set_parameters(&settings).unwrap();
//!
//! driver.enable().unwrap();
//! driver.home(HomeDirection::Negative, Duration::from_secs(30)).unwrap();
//! let pos = driver.goto(1600, Duration::from_secs(10)).unwrap();
//! println!("at {} in mode {:?}", pos, driver.get_mode().unwrap());
//! driver.close().unwrap();
//! ```
//!

mod driver;
pub(crate) mod util;

pub use driver::{
    cmd::{
        frame,
        payload::{HomeDirection, LimitFlags, MicrostepResolution, Settings},
        Command, DeviceMode, FaultKind, Query, ReplyKind,
    },
    diag::{DiagnosticSink, Event, TracingSink},
    discovery::{discover, find_port, MANUFACTURER, PRODUCT},
    fault::{self, FaultRegisters, FaultReport},
    parse::ParseError,
    transport::{IoTransport, PortConfig, SerialTransport, Transport, TransportError},
    wait::{WaitPolicy, WaitReport},
    Driver, DriverError,
};
