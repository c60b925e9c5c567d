//! Diagnostics of a [`Driver`][super::Driver]
//!
//! Instead of logging to some global logger, a driver reports what it does to
//! the [`DiagnosticSink`] it was given. [`TracingSink`], the default, forwards
//! everything to [`tracing`]. Any `Fn(&Event)` is a sink as well.

use super::{cmd::Command, cmd::ReplyKind, DriverError};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Something a driver did
#[derive(Debug)]
pub enum Event<'a> {
    /// A frame was written
    Sent { command: Command, frame: &'a [u8] },
    /// A frame was read, before it was checked in any way
    Received { frame: &'a [u8] },
    /// Input waiting on the transport was dropped
    Discarded,
    /// A well-formed reply that wasn't DONE arrived while waiting for
    /// completion and was ignored
    Skipped { kind: ReplyKind },
    /// An error was ignored while waiting for completion. `count` is the
    /// number of errors ignored so far during this wait, this one included.
    Swallowed { error: &'a DriverError, count: u32 },
    /// Waiting for completion succeeded
    Completed { elapsed: Duration, swallowed: u32 },
    /// The transport was closed
    Closed,
}

/// Receiver of [`Event`]s
pub trait DiagnosticSink {
    fn record(&self, event: &Event<'_>);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Event<'_>),
{
    fn record(&self, event: &Event<'_>) {
        self(event)
    }
}

/// Forwards [`Event`]s to [`tracing`]
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &Event<'_>) {
        match event {
            Event::Sent { command, frame } => {
                debug!(command = ?command, frame = ?frame, "sent frame")
            }
            Event::Received { frame } => debug!(frame = ?frame, "received frame"),
            Event::Discarded => trace!("discarded pending input"),
            Event::Skipped { kind } => debug!(kind = ?kind, "skipped reply while waiting"),
            Event::Swallowed { error, count } => {
                warn!(error = %error, count, "ignored error while waiting for completion")
            }
            Event::Completed { elapsed, swallowed } => {
                debug!(elapsed = ?elapsed, swallowed, "operation completed")
            }
            Event::Closed => debug!("closed transport"),
        }
    }
}
