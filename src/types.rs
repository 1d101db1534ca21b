//! ASN.1 structures exchanged by the application message layer.
//!
//! The wire shapes are fixed by the Kerberos V5 protocol (RFC 1510, carried
//! forward unchanged by RFC 4120 section 5.7) and are encoded with DER.
//! Everything here derives its codec from [`rasn`].

use rasn::prelude::*;

/// The protocol version number carried in every application message.
pub const PVNO: i32 = 5;
/// `msg-type` value of a KRB-SAFE message.
pub const MSG_TYPE_SAFE: i32 = 20;
/// `msg-type` value of a KRB-PRIV message.
pub const MSG_TYPE_PRIV: i32 = 21;

/// Microsecond part of a timestamp, `0..=999999`.
pub type Microseconds = u32;

/// A timestamp with one-second resolution, encoded as a `GeneralizedTime`
/// in the UTC `YYYYMMDDHHMMSSZ` form.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rasn(delegate)]
pub struct KerberosTime(pub GeneralizedTime);

/// A tagged network address: an address family and the raw address octets.
///
/// Two addresses are equal only when both fields match. Port numbers are
/// never part of a `HostAddress`; only the host portion of a peer's
/// endpoint is carried in a message.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostAddress {
    /// The address family of `address`.
    #[rasn(tag(0))]
    pub addr_type: i32,
    /// The raw address octets, e.g. four octets for IPv4.
    #[rasn(tag(1))]
    pub address: OctetString,
}

impl HostAddress {
    pub const IPV4: i32 = 2;
    pub const DIRECTIONAL: i32 = 3;
    pub const CHAOS_NET: i32 = 5;
    pub const XNS: i32 = 6;
    pub const ISO: i32 = 7;
    pub const DECNET_PHASE_IV: i32 = 12;
    pub const APPLE_TALK_DDP: i32 = 16;
    pub const NET_BIOS: i32 = 20;
    pub const IPV6: i32 = 24;
}

/// A checksum, tagged with the algorithm that produced it.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum {
    /// The checksum algorithm id.
    #[rasn(tag(0))]
    pub r#type: i32,
    /// The checksum octets.
    #[rasn(tag(1))]
    pub checksum: OctetString,
}

impl Checksum {
    /// The zero-type, zero-length checksum that stands in for the real one
    /// during the first encoding pass of a KRB-SAFE message. Sender and
    /// receiver must both encode this exact shape for the signed bytes
    /// to agree.
    pub fn zeroed() -> Self {
        Self {
            r#type: 0,
            checksum: OctetString::from_static(&[]),
        }
    }
}

/// A session key: the encryption type it is meant for and the key octets.
///
/// The caller owns the key. The message layer borrows it for the duration
/// of one operation and never stores it.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncryptionKey {
    /// The encryption type id of `value`.
    #[rasn(tag(0))]
    pub r#type: i32,
    /// The key octets.
    #[rasn(tag(1))]
    pub value: OctetString,
}

/// Ciphertext, tagged with the encryption type that produced it.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncryptedData {
    /// The encryption type id of `cipher`.
    #[rasn(tag(0))]
    pub etype: i32,
    /// Version number of the key in use, when a long-lived key encrypted
    /// the data. Session-key encryptions omit it.
    #[rasn(tag(1))]
    pub kvno: Option<u32>,
    /// The ciphertext octets.
    #[rasn(tag(2))]
    pub cipher: OctetString,
}

/// An integrity-protected application message.
///
/// The user data travels in clear but is covered, together with the rest of
/// the body, by a keyed collision-proof checksum under the session key.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rasn(tag(application, 20))]
pub struct KrbSafe {
    /// Protocol version number, always [`PVNO`].
    #[rasn(tag(0))]
    pub pvno: Integer,
    /// Message type, always [`MSG_TYPE_SAFE`].
    #[rasn(tag(1))]
    pub msg_type: Integer,
    /// The protected body.
    #[rasn(tag(2))]
    pub body: KrbSafeBody,
    /// Keyed checksum over the encoding of this message with a
    /// [`Checksum::zeroed`] placeholder in this field.
    #[rasn(tag(3))]
    pub cksum: Checksum,
}

/// The body of a [`KrbSafe`] message.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KrbSafeBody {
    /// Application data being carried to the peer.
    #[rasn(tag(0))]
    pub user_data: OctetString,
    /// Sender's clock at the time the message was built. Present unless the
    /// caller opted out of timestamps.
    #[rasn(tag(1))]
    pub timestamp: Option<KerberosTime>,
    /// Microsecond part of `timestamp`.
    #[rasn(tag(2))]
    pub usec: Option<Microseconds>,
    /// Sequence number, present when the connection numbers its messages
    /// instead of (or in addition to) timestamping them.
    #[rasn(tag(3))]
    pub seq_number: Option<u32>,
    /// The sender's address.
    #[rasn(tag(4))]
    pub s_address: HostAddress,
    /// The intended recipient's address, when the sender knows it.
    #[rasn(tag(5))]
    pub r_address: Option<HostAddress>,
}

/// A confidentiality-protected application message.
///
/// The user data and the policy fields travel inside `enc_part`, encrypted
/// under the session key as an [`EncKrbPrivPart`].
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rasn(tag(application, 21))]
pub struct KrbPriv {
    /// Protocol version number, always [`PVNO`].
    #[rasn(tag(0))]
    pub pvno: Integer,
    /// Message type, always [`MSG_TYPE_PRIV`].
    #[rasn(tag(1))]
    pub msg_type: Integer,
    // NOTE: tag 2 is intentionally absent on the wire.
    /// The encrypted [`EncKrbPrivPart`].
    #[rasn(tag(3))]
    pub enc_part: EncryptedData,
}

/// The plaintext carried inside a [`KrbPriv`] message.
#[derive(AsnType, Clone, Debug, Decode, Encode, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rasn(tag(application, 28))]
pub struct EncKrbPrivPart {
    /// Application data being carried to the peer.
    #[rasn(tag(0))]
    pub user_data: OctetString,
    /// Sender's clock at the time the message was built.
    #[rasn(tag(1))]
    pub timestamp: Option<KerberosTime>,
    /// Microsecond part of `timestamp`.
    #[rasn(tag(2))]
    pub usec: Option<Microseconds>,
    /// Sequence number, when the connection numbers its messages.
    #[rasn(tag(3))]
    pub seq_number: Option<u32>,
    /// The sender's address.
    #[rasn(tag(4))]
    pub s_address: HostAddress,
    /// The intended recipient's address, when the sender knows it.
    #[rasn(tag(5))]
    pub r_address: Option<HostAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_address_der() {
        let addr = HostAddress {
            addr_type: HostAddress::IPV4,
            address: OctetString::from_slice(&[192, 0, 2, 1]),
        };
        let enc = rasn::der::encode(&addr).unwrap();
        assert_eq!(
            enc,
            hex!("30 0d a0 03 02 01 02 a1 06 04 04 c0 00 02 01")
        );
        assert_eq!(addr, rasn::der::decode(&enc).unwrap());
    }

    #[test]
    fn zeroed_checksum_der() {
        // The placeholder's encoding is part of the signed bytes and must
        // never change shape.
        let enc = rasn::der::encode(&Checksum::zeroed()).unwrap();
        assert_eq!(enc, hex!("30 09 a0 03 02 01 00 a1 02 04 00"));
    }

    #[test]
    fn safe_round_trip() {
        let msg = KrbSafe {
            pvno: PVNO.into(),
            msg_type: MSG_TYPE_SAFE.into(),
            body: KrbSafeBody {
                user_data: OctetString::from_slice(b"hello"),
                timestamp: None,
                usec: None,
                seq_number: Some(42),
                s_address: HostAddress {
                    addr_type: HostAddress::IPV4,
                    address: OctetString::from_slice(&[192, 0, 2, 1]),
                },
                r_address: None,
            },
            cksum: Checksum::zeroed(),
        };
        let enc = rasn::der::encode(&msg).unwrap();
        assert_eq!(enc[0], 0x74);
        assert_eq!(msg, rasn::der::decode(&enc).unwrap());
    }

    #[test]
    fn priv_round_trip() {
        let msg = KrbPriv {
            pvno: PVNO.into(),
            msg_type: MSG_TYPE_PRIV.into(),
            enc_part: EncryptedData {
                etype: 3,
                kvno: None,
                cipher: OctetString::from_slice(&[0u8; 16]),
            },
        };
        let enc = rasn::der::encode(&msg).unwrap();
        assert_eq!(enc[0], 0x75);
        assert_eq!(msg, rasn::der::decode(&enc).unwrap());
    }
}
