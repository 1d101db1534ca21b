//! Checksum profiles.

use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

use super::des::DesCbc;
use super::CksumProfile;
use crate::error::Result;

/// `crc32` (not the ISO 3309 variant: zero initial value, no final
/// complement).
pub const CKSUMTYPE_CRC32: i32 = 1;
/// `rsa-md5`.
pub const CKSUMTYPE_RSA_MD5: i32 = 7;
/// `rsa-md5-des`.
pub const CKSUMTYPE_RSA_MD5_DES: i32 = 8;

const CRC32_LEN: usize = 4;
const MD5_LEN: usize = 16;
const CONFOUNDER_LEN: usize = 8;

static CRC_TABLE: Lazy<[u32; 256]> = Lazy::new(|| {
    let mut table = [0u32; 256];
    for (index, slot) in table.iter_mut().enumerate() {
        let mut crc = index as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
        *slot = crc;
    }
    table
});

fn crc32(data: &[u8]) -> u32 {
    data.iter().fold(0, |crc, octet| {
        CRC_TABLE[((crc ^ u32::from(*octet)) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// `crc32` profile. Unkeyed and trivially forgeable; registered so that
/// policy can name it, never usable for authentication.
pub(crate) struct Crc32;

impl CksumProfile for Crc32 {
    fn cksumtype(&self) -> i32 {
        CKSUMTYPE_CRC32
    }

    fn size(&self) -> usize {
        CRC32_LEN
    }

    fn is_keyed(&self) -> bool {
        false
    }

    fn is_collision_proof(&self) -> bool {
        false
    }

    fn calculate(&self, data: &[u8], _key: &[u8]) -> Result<Vec<u8>> {
        Ok(crc32(data).to_le_bytes().to_vec())
    }
}

/// `rsa-md5` profile.
pub(crate) struct RsaMd5;

impl CksumProfile for RsaMd5 {
    fn cksumtype(&self) -> i32 {
        CKSUMTYPE_RSA_MD5
    }

    fn size(&self) -> usize {
        MD5_LEN
    }

    fn is_keyed(&self) -> bool {
        false
    }

    fn is_collision_proof(&self) -> bool {
        true
    }

    fn calculate(&self, data: &[u8], _key: &[u8]) -> Result<Vec<u8>> {
        Ok(Md5::digest(data).as_slice().to_vec())
    }
}

/// `rsa-md5-des` profile: the MD5 digest of the data, carried in a
/// confounder-prefixed block, DES-CBC encrypted under the variant key
/// (each key octet XORed with `0xF0`).
///
/// The confounder block is fixed at zero so the checksum is a pure
/// function of (data, key) and receivers verify by recomputation.
pub(crate) struct RsaMd5Des;

impl CksumProfile for RsaMd5Des {
    fn cksumtype(&self) -> i32 {
        CKSUMTYPE_RSA_MD5_DES
    }

    fn size(&self) -> usize {
        CONFOUNDER_LEN + MD5_LEN
    }

    fn is_keyed(&self) -> bool {
        true
    }

    fn is_collision_proof(&self) -> bool {
        true
    }

    fn calculate(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let variant: Zeroizing<Vec<u8>> =
            Zeroizing::new(key.iter().map(|octet| octet ^ 0xF0).collect());
        let cbc = DesCbc::new(&variant)?;
        let mut plain = Zeroizing::new([0u8; CONFOUNDER_LEN + MD5_LEN]);
        plain[CONFOUNDER_LEN..].copy_from_slice(Md5::digest(data).as_slice());
        cbc.cbc_encrypt(&plain[..], None)
    }
}
