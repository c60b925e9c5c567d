//! Waiting for motion commands to complete
//!
//! After acknowledging a motion command the controller sends a DONE frame once
//! the motion finished. Until then the line may carry noise, so while waiting
//! every error that leaves the connection usable is ignored and reading is
//! retried after [`WaitPolicy::backoff`]. Only a lost connection ends the wait
//! early. The downside is that a line that is corrupted for good is only
//! noticed once the wait times out; [`WaitReport::swallowed`] and the
//! [`Event::Swallowed`] events are there to notice it earlier.

use super::{
    cmd::ReplyKind,
    diag::Event,
    transport::Transport,
    Driver, DriverError,
};
use chrono::{DateTime, Local};
use std::{
    thread,
    time::{Duration, Instant},
};

/// How [`Driver::wait_for_done`] retries
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct WaitPolicy {
    /// Pause after an ignored error before reading again
    pub backoff: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_millis(100),
        }
    }
}

/// Outcome of a successful [`Driver::wait_for_done`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    /// Payload of the DONE frame
    pub payload: Vec<u8>,
    /// Number of errors ignored while waiting
    pub swallowed: u32,
    /// Number of well-formed frames that weren't DONE
    pub skipped: u32,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

impl<T: Transport> Driver<T> {
    /// Reads frames until a DONE frame arrives and returns its payload
    ///
    /// Errors that leave the connection usable are ignored, followed by a
    /// pause of [`WaitPolicy::backoff`]. Replies other than DONE are skipped.
    /// `timeout` is checked after every attempt that didn't yield DONE, so a
    /// DONE frame is never thrown away for arriving late.
    ///
    /// # Errors
    /// [`DriverError::Timeout`] if no DONE arrived within `timeout`. Fatal
    /// transport errors (see [`DriverError::is_fatal`]) are returned right
    /// away.
    pub fn wait_for_done(&mut self, timeout: Duration) -> Result<WaitReport, DriverError> {
        let start = Instant::now();
        let mut swallowed = 0;
        let mut skipped = 0;

        loop {
            match self.receive() {
                Ok(reply) if reply.kind == ReplyKind::Done => {
                    let elapsed = start.elapsed();
                    self.sink.record(&Event::Completed { elapsed, swallowed });
                    return Ok(WaitReport {
                        payload: reply.payload,
                        swallowed,
                        skipped,
                        elapsed,
                        finished_at: Local::now(),
                    });
                }
                Ok(reply) => {
                    skipped += 1;
                    self.sink.record(&Event::Skipped { kind: reply.kind });
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    swallowed += 1;
                    self.sink.record(&Event::Swallowed {
                        error: &e,
                        count: swallowed,
                    });
                    let remaining = timeout.saturating_sub(start.elapsed());
                    thread::sleep(self.policy.backoff.min(remaining));
                }
            }

            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout { timeout, swallowed });
            }
        }
    }
}
