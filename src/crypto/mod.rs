//! The algorithm registry.
//!
//! Encryption and checksum algorithms are capability tables keyed by their
//! protocol-assigned numeric ids. The message layer talks only to the
//! [`EtypeProfile`] and [`CksumProfile`] traits; installing a new algorithm
//! means adding a registry entry, nothing more.

mod cksum;
mod des;

pub use cksum::{CKSUMTYPE_CRC32, CKSUMTYPE_RSA_MD5, CKSUMTYPE_RSA_MD5_DES};
pub use des::{ETYPE_DES_CBC_CRC, ETYPE_DES_CBC_MD5};

use zeroize::Zeroizing;

use crate::error::Result;
use crate::types::EncryptionKey;

/// One encryption algorithm.
pub trait EtypeProfile: Send + Sync {
    /// The protocol id of this algorithm.
    fn etype(&self) -> i32;
    /// Cipher block length in octets.
    fn block_len(&self) -> usize;
    /// Expected key length in octets.
    fn key_len(&self) -> usize;
    /// Validates `key` and builds the key schedule for one operation.
    /// Key state is released and zeroized when the schedule drops.
    fn prepare_key(&self, key: &EncryptionKey) -> Result<Box<dyn KeySchedule>>;
}

/// Key schedule state scoped to a single operation.
///
/// `ivec`, when given, seeds the cipher-block chain; it is read, never
/// written. Callers that chain messages copy the last ciphertext block out
/// themselves.
pub trait KeySchedule {
    /// Cipher block length in octets.
    fn block_len(&self) -> usize;
    /// Encrypts `plain`, zero-padding it up to a whole number of blocks.
    fn encrypt(&self, plain: &[u8], ivec: Option<&[u8]>) -> Result<Vec<u8>>;
    /// Decrypts `cipher`, which must be a whole number of blocks. The
    /// output buffer zeroizes itself on release.
    fn decrypt(&self, cipher: &[u8], ivec: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>>;
}

/// One checksum algorithm.
pub trait CksumProfile: Send + Sync {
    /// The protocol id of this algorithm.
    fn cksumtype(&self) -> i32;
    /// Checksum length in octets.
    fn size(&self) -> usize;
    /// Whether the checksum depends on a secret key. Only keyed checksums
    /// authenticate a message.
    fn is_keyed(&self) -> bool;
    /// Whether the checksum resists second preimages.
    fn is_collision_proof(&self) -> bool;
    /// Computes the checksum of `data` seeded with `key`. Unkeyed
    /// algorithms ignore `key`.
    fn calculate(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>>;
}

static ETYPES: &[&dyn EtypeProfile] = &[&des::DesCbcCrc, &des::DesCbcMd5];

static CKSUMTYPES: &[&dyn CksumProfile] = &[&cksum::Crc32, &cksum::RsaMd5, &cksum::RsaMd5Des];

/// Looks up an encryption algorithm by id.
pub fn find_etype(etype: i32) -> Option<&'static dyn EtypeProfile> {
    ETYPES.iter().find(|profile| profile.etype() == etype).copied()
}

/// Looks up a checksum algorithm by id.
pub fn find_cksumtype(cksumtype: i32) -> Option<&'static dyn CksumProfile> {
    CKSUMTYPES
        .iter()
        .find(|profile| profile.cksumtype() == cksumtype)
        .copied()
}

/// Whether `etype` names a registered encryption algorithm.
pub fn valid_etype(etype: i32) -> bool {
    find_etype(etype).is_some()
}

/// Whether `cksumtype` names a registered checksum algorithm.
pub fn valid_cksumtype(cksumtype: i32) -> bool {
    find_cksumtype(cksumtype).is_some()
}
