//! Per-caller library state: the clock, the clock-skew policy, and the
//! local address list used to validate receiver addresses.
//!
//! A [`Context`] is cheap to create and carries no key material. One
//! context must not be driven from two threads at once; callers that want
//! concurrency give each thread its own.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::types::{HostAddress, KerberosTime};

/// Default maximum tolerated difference between peer clocks, in seconds.
pub const DEFAULT_CLOCK_SKEW: i64 = 300;

/// A source of wall-clock time with microsecond resolution.
pub trait Clock: Send + Sync {
    /// Returns the current time as (seconds since the epoch, microseconds).
    fn us_timeofday(&self) -> (i64, u32);
}

/// The system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn us_timeofday(&self) -> (i64, u32) {
        let now: DateTime<Utc> = Utc::now();
        (now.timestamp(), now.timestamp_subsec_micros())
    }
}

/// Library context handed to every operation.
pub struct Context {
    clock: Box<dyn Clock>,
    clock_skew: i64,
    local_addresses: Option<Vec<HostAddress>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context on the system clock with the default clock skew.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// A context reading time from `clock`.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            clock_skew: DEFAULT_CLOCK_SKEW,
            local_addresses: None,
        }
    }

    /// Overrides the permitted clock skew, in seconds.
    pub fn set_clock_skew(&mut self, seconds: i64) {
        self.clock_skew = seconds;
    }

    /// The permitted clock skew, in seconds.
    pub fn clock_skew(&self) -> i64 {
        self.clock_skew
    }

    /// Installs the addresses this host answers to. Inbound messages that
    /// name a receiver address are checked against this list when the
    /// caller does not pass an expected receiver explicitly.
    pub fn set_local_addresses(&mut self, addresses: Vec<HostAddress>) {
        self.local_addresses = Some(addresses);
    }

    /// The addresses this host answers to. Falls back to the loopback
    /// addresses when the application has not installed a list.
    pub fn local_addresses(&self) -> Vec<HostAddress> {
        match &self.local_addresses {
            Some(addresses) => addresses.clone(),
            None => crate::address::loopback_addresses(),
        }
    }

    pub(crate) fn us_timeofday(&self) -> (i64, u32) {
        self.clock.us_timeofday()
    }

    /// Whether `date` is within the permitted skew of `now`. The boundary
    /// itself is out of tolerance.
    pub(crate) fn in_clock_skew(&self, date: i64, now: i64) -> bool {
        (date - now).abs() < self.clock_skew
    }
}

/// Converts epoch seconds into the wire timestamp form.
pub(crate) fn to_kerberos_time(seconds: i64) -> Result<KerberosTime> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|t| KerberosTime(t.fixed_offset()))
        .ok_or(Error::BadTime)
}

/// Extracts epoch seconds from a wire timestamp.
pub(crate) fn from_kerberos_time(time: &KerberosTime) -> i64 {
    time.0.timestamp()
}
