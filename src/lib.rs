#![doc = include_str!("../README.md")]

pub mod address;
pub mod codec;
pub mod context;
pub mod crypto;
pub mod error;
mod policy;
mod priv_msg;
pub mod rcache;
mod safe;
pub mod types;

pub use context::{Clock, Context, SystemClock, DEFAULT_CLOCK_SKEW};
pub use error::{Error, Result};
pub use priv_msg::{mk_priv, rd_priv};
pub use rcache::{MemoryReplayCache, ReplayCache, ReplayEntry};
pub use safe::{mk_safe, rd_safe};

/// Flags modifying how a message is built or read.
///
/// Flags travel as a plain bit mask for compatibility with existing
/// Kerberos applications; bits not defined here are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MsgFlags(pub u32);

impl MsgFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Omit the timestamp, and with it the replay-cache write.
    pub const NOTIME: Self = Self(0x1);
    /// Carry (on build) or require (on read) a sequence number.
    pub const DOSEQUENCE: Self = Self(0x2);

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for MsgFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for MsgFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
