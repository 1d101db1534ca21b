//! Replay detection.
//!
//! Both senders and receivers record an entry per timestamped message; the
//! cache rejects a second occurrence of the same tuple, which is what turns
//! a replayed wire message into an error at the receiver. SAFE and PRIV
//! entries live in disjoint namespaces through the suffix baked into the
//! client string, so identical bytes on the two paths never collide.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{RepeatSnafu, Result};
use crate::types::HostAddress;

/// One recorded authenticator tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReplayEntry {
    /// Stringified sender plus a per-operation suffix.
    pub client: String,
    /// Reserved; always empty today.
    pub server: String,
    /// Message timestamp, epoch seconds.
    pub ctime: i64,
    /// Microsecond part of `ctime`.
    pub cusec: u32,
}

/// A store of recently seen authenticator tuples.
///
/// `store` is an atomic boundary: a tuple is either recorded or rejected,
/// and concurrent callers never both succeed with the same tuple.
pub trait ReplayCache: Send + Sync {
    /// Records `entry`, failing with [`crate::Error::Repeat`] when the same
    /// tuple is already present, or with [`crate::Error::Io`] when the
    /// backend cannot be updated.
    fn store(&self, entry: &ReplayEntry) -> Result<()>;
}

/// An in-process replay cache.
///
/// Entries older than the configured lifespan (relative to the newest entry
/// being inserted) are expired on insert, so the set stays bounded by
/// traffic volume within the window.
#[derive(Debug)]
pub struct MemoryReplayCache {
    lifespan: i64,
    seen: Mutex<HashSet<ReplayEntry>>,
}

impl MemoryReplayCache {
    /// A cache that remembers entries for `lifespan` seconds.
    pub fn new(lifespan: i64) -> Self {
        Self {
            lifespan,
            seen: Mutex::new(HashSet::new()),
        }
    }
}

impl ReplayCache for MemoryReplayCache {
    fn store(&self, entry: &ReplayEntry) -> Result<()> {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            // The set is always left consistent, so a poisoned lock is
            // still usable.
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.retain(|old| entry.ctime - old.ctime <= self.lifespan);
        if seen.contains(entry) {
            return RepeatSnafu.fail();
        }
        seen.insert(entry.clone());
        Ok(())
    }
}

/// Builds the replay-entry client string for `addr`: the address family,
/// the address octets in hex, and a per-operation suffix.
pub fn replay_name(addr: &HostAddress, suffix: &str) -> String {
    format!("{}:{}{}", addr.addr_type, hex::encode(&addr.address), suffix)
}

/// Records the replay entry for a timestamped message from `sender`.
pub(crate) fn store_replay(
    rcache: &dyn ReplayCache,
    sender: &HostAddress,
    suffix: &str,
    ctime: i64,
    cusec: u32,
) -> Result<()> {
    let entry = ReplayEntry {
        client: replay_name(sender, suffix),
        server: String::new(),
        ctime,
        cusec,
    };
    rcache.store(&entry)
}
