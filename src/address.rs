//! Network address helpers: construction from socket types, equality, and
//! list search.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use rasn::types::OctetString;

use crate::types::HostAddress;

impl HostAddress {
    /// An IPv4 host address.
    pub fn ipv4(addr: Ipv4Addr) -> Self {
        Self {
            addr_type: Self::IPV4,
            address: OctetString::from_slice(&addr.octets()),
        }
    }

    /// An IPv6 host address.
    pub fn ipv6(addr: Ipv6Addr) -> Self {
        Self {
            addr_type: Self::IPV6,
            address: OctetString::from_slice(&addr.octets()),
        }
    }

    /// The host address of `addr`, ignoring its port.
    pub fn from_ip(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Self::ipv4(v4),
            IpAddr::V6(v6) => Self::ipv6(v6),
        }
    }
}

impl From<SocketAddr> for HostAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::from_ip(addr.ip())
    }
}

/// Whether two addresses are equal. Both the family and the octets have
/// to match.
pub fn address_compare(a: &HostAddress, b: &HostAddress) -> bool {
    a.addr_type == b.addr_type && a.address == b.address
}

/// Whether `target` appears in `list`.
pub fn address_search(target: &HostAddress, list: &[HostAddress]) -> bool {
    list.iter().any(|candidate| address_compare(target, candidate))
}

/// The loopback addresses, used when no local address list is configured.
pub(crate) fn loopback_addresses() -> Vec<HostAddress> {
    vec![
        HostAddress::ipv4(Ipv4Addr::LOCALHOST),
        HostAddress::ipv6(Ipv6Addr::LOCALHOST),
    ]
}
