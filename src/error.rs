//! Error types for the authenticated-message operations.
//!
//! Nothing is recovered locally. Every operation unwinds on first failure,
//! releasing and zeroizing its intermediates on the way out, and hands the
//! caller one of the kinds below.

use snafu::Snafu;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures surfaced by the KRB-SAFE and KRB-PRIV operations.
///
/// The display strings match the traditional Kerberos error table wording
/// so logs line up with other implementations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// The checksum algorithm id is not present in the registry.
    #[snafu(display("checksum type {cksumtype} is not supported"))]
    SumtypeNosupp {
        /// The offending checksum type id.
        cksumtype: i32,
    },

    /// The checksum algorithm is not both keyed and collision-proof, so it
    /// cannot authenticate a message.
    #[snafu(display("inappropriate type of checksum in message ({cksumtype})"))]
    InappCksum {
        /// The offending checksum type id.
        cksumtype: i32,
    },

    /// The encryption algorithm id is not present in the registry.
    #[snafu(display("encryption type {etype} is not supported"))]
    EtypeNosupp {
        /// The offending encryption type id.
        etype: i32,
    },

    /// The inbound buffer does not carry the expected application tag,
    /// protocol version, or message type.
    #[snafu(display("invalid message type"))]
    MsgType,

    /// Sender or receiver address mismatch.
    #[snafu(display("incorrect net address"))]
    BadAddr,

    /// The message timestamp falls outside the permitted clock skew.
    #[snafu(display("clock skew too great"))]
    Skew,

    /// Sequence number mismatch.
    #[snafu(display("message out of order"))]
    BadOrder,

    /// The replay cache has already seen this message.
    #[snafu(display("request is a replay"))]
    Repeat,

    /// Checksum verification failed.
    #[snafu(display("message stream modified"))]
    Modified,

    /// The timestamp path requires a replay cache and none was supplied.
    #[snafu(display("message lacks a replay cache"))]
    RcRequired,

    /// Key length is incompatible with the encryption type.
    #[snafu(display("key size {length} is incompatible with the encryption type"))]
    BadKeysize {
        /// The rejected key length in octets.
        length: usize,
    },

    /// The supplied key is one of the known DES weak or semi-weak keys.
    #[snafu(display("supplied key is weak"))]
    WeakKey,

    /// Buffer length is incompatible with the encryption type's block size.
    #[snafu(display("message size {length} is incompatible with the encryption type"))]
    BadMsize {
        /// The rejected buffer length in octets.
        length: usize,
    },

    /// A timestamp fell outside the representable range.
    #[snafu(display("timestamp is not representable"))]
    BadTime,

    /// ASN.1 encoding failed.
    #[snafu(display("ASN.1 encoding failed: {source}"))]
    Encoding {
        /// The codec's error.
        source: rasn::error::EncodeError,
    },

    /// ASN.1 decoding failed.
    #[snafu(display("ASN.1 decoding failed: {source}"))]
    Decoding {
        /// The codec's error.
        source: rasn::error::DecodeError,
    },

    /// A scratch buffer could not be allocated.
    #[snafu(display("cannot allocate memory"))]
    Enomem,

    /// The replay cache backend failed.
    #[snafu(display("replay cache I/O failure: {source}"))]
    Io {
        /// The backend's error.
        source: std::io::Error,
    },
}
