#![allow(dead_code)]

use std::net::Ipv4Addr;

use rasn::types::OctetString;

use krb5_msg::types::{EncryptionKey, HostAddress};
use krb5_msg::{Clock, Context, MemoryReplayCache};

/// An arbitrary but fixed "now" for deterministic scenarios.
pub const NOW: i64 = 1_700_000_000;
/// Microseconds reported alongside [`NOW`].
pub const NOW_USEC: u32 = 123;

/// A clock pinned to one instant.
pub struct FixedClock(pub i64, pub u32);

impl Clock for FixedClock {
    fn us_timeofday(&self) -> (i64, u32) {
        (self.0, self.1)
    }
}

/// A context whose clock reads `seconds`.
pub fn context_at(seconds: i64) -> Context {
    Context::with_clock(Box::new(FixedClock(seconds, NOW_USEC)))
}

pub fn des_key(etype: i32, octets: [u8; 8]) -> EncryptionKey {
    EncryptionKey {
        r#type: etype,
        value: OctetString::from_slice(&octets),
    }
}

pub fn sender_addr() -> HostAddress {
    HostAddress::ipv4(Ipv4Addr::new(192, 0, 2, 1))
}

pub fn receiver_addr() -> HostAddress {
    HostAddress::ipv4(Ipv4Addr::new(192, 0, 2, 2))
}

pub fn rcache() -> MemoryReplayCache {
    MemoryReplayCache::new(300)
}
