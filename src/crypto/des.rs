//! DES in cipher-block-chaining mode, and the two DES encryption profiles.
//!
//! The chaining loop lives here rather than behind a block-mode crate
//! because the chain state is part of this layer's contract: successive
//! messages on a stream are chained by feeding the previous message's last
//! ciphertext block back in as the next initialization vector.

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::Des;
use snafu::ensure;
use zeroize::Zeroizing;

use super::{EtypeProfile, KeySchedule};
use crate::error::{BadKeysizeSnafu, BadMsizeSnafu, EnomemSnafu, Result, WeakKeySnafu};
use crate::types::EncryptionKey;

/// `des-cbc-crc`.
pub const ETYPE_DES_CBC_CRC: i32 = 1;
/// `des-cbc-md5`.
pub const ETYPE_DES_CBC_MD5: i32 = 3;

pub(crate) const DES_BLOCK_LEN: usize = 8;
pub(crate) const DES_KEY_LEN: usize = 8;

/// The DES weak and semi-weak keys (FIPS 74), parity bits included.
const WEAK_KEYS: [[u8; DES_KEY_LEN]; 16] = [
    [0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01],
    [0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE],
    [0x1F, 0x1F, 0x1F, 0x1F, 0x0E, 0x0E, 0x0E, 0x0E],
    [0xE0, 0xE0, 0xE0, 0xE0, 0xF1, 0xF1, 0xF1, 0xF1],
    [0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE],
    [0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01],
    [0x1F, 0xE0, 0x1F, 0xE0, 0x0E, 0xF1, 0x0E, 0xF1],
    [0xE0, 0x1F, 0xE0, 0x1F, 0xF1, 0x0E, 0xF1, 0x0E],
    [0x01, 0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1],
    [0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1, 0x01],
    [0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E, 0xFE],
    [0xFE, 0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E],
    [0x01, 0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E],
    [0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E, 0x01],
    [0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1, 0xFE],
    [0xFE, 0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1],
];

/// A scheduled DES key driving CBC in both directions.
///
/// The round keys zeroize when this drops.
pub(crate) struct DesCbc {
    cipher: Des,
}

impl DesCbc {
    pub(crate) fn new(key: &[u8]) -> Result<Self> {
        ensure!(
            key.len() == DES_KEY_LEN,
            BadKeysizeSnafu { length: key.len() }
        );
        ensure!(!WEAK_KEYS.iter().any(|weak| weak[..] == *key), WeakKeySnafu);
        Ok(Self {
            cipher: Des::new(GenericArray::from_slice(key)),
        })
    }

    pub(crate) fn cbc_encrypt(&self, plain: &[u8], ivec: Option<&[u8]>) -> Result<Vec<u8>> {
        let padded = plain.len().div_ceil(DES_BLOCK_LEN).max(1) * DES_BLOCK_LEN;
        let mut out = Vec::new();
        ensure!(out.try_reserve_exact(padded).is_ok(), EnomemSnafu);
        out.extend_from_slice(plain);
        out.resize(padded, 0);

        let mut chain = chain_block(ivec)?;
        for block in out.chunks_exact_mut(DES_BLOCK_LEN) {
            for (octet, prev) in block.iter_mut().zip(chain.iter()) {
                *octet ^= prev;
            }
            self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
            chain.copy_from_slice(block);
        }
        Ok(out)
    }

    pub(crate) fn cbc_decrypt(
        &self,
        cipher_text: &[u8],
        ivec: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        ensure!(
            !cipher_text.is_empty() && cipher_text.len() % DES_BLOCK_LEN == 0,
            BadMsizeSnafu {
                length: cipher_text.len()
            }
        );
        let mut out = Zeroizing::new(Vec::new());
        ensure!(out.try_reserve_exact(cipher_text.len()).is_ok(), EnomemSnafu);
        out.extend_from_slice(cipher_text);

        let mut chain = chain_block(ivec)?;
        let mut saved = [0u8; DES_BLOCK_LEN];
        for block in out.chunks_exact_mut(DES_BLOCK_LEN) {
            saved.copy_from_slice(block);
            self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
            for (octet, prev) in block.iter_mut().zip(chain.iter()) {
                *octet ^= prev;
            }
            chain = saved;
        }
        Ok(out)
    }
}

impl KeySchedule for DesCbc {
    fn block_len(&self) -> usize {
        DES_BLOCK_LEN
    }

    fn encrypt(&self, plain: &[u8], ivec: Option<&[u8]>) -> Result<Vec<u8>> {
        self.cbc_encrypt(plain, ivec)
    }

    fn decrypt(&self, cipher: &[u8], ivec: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>> {
        self.cbc_decrypt(cipher, ivec)
    }
}

fn chain_block(ivec: Option<&[u8]>) -> Result<[u8; DES_BLOCK_LEN]> {
    let mut chain = [0u8; DES_BLOCK_LEN];
    if let Some(iv) = ivec {
        ensure!(iv.len() == DES_BLOCK_LEN, BadMsizeSnafu { length: iv.len() });
        chain.copy_from_slice(iv);
    }
    Ok(chain)
}

/// `des-cbc-crc` profile.
pub(crate) struct DesCbcCrc;

impl EtypeProfile for DesCbcCrc {
    fn etype(&self) -> i32 {
        ETYPE_DES_CBC_CRC
    }

    fn block_len(&self) -> usize {
        DES_BLOCK_LEN
    }

    fn key_len(&self) -> usize {
        DES_KEY_LEN
    }

    fn prepare_key(&self, key: &EncryptionKey) -> Result<Box<dyn KeySchedule>> {
        Ok(Box::new(DesCbc::new(key.value.as_ref())?))
    }
}

/// `des-cbc-md5` profile.
pub(crate) struct DesCbcMd5;

impl EtypeProfile for DesCbcMd5 {
    fn etype(&self) -> i32 {
        ETYPE_DES_CBC_MD5
    }

    fn block_len(&self) -> usize {
        DES_BLOCK_LEN
    }

    fn key_len(&self) -> usize {
        DES_KEY_LEN
    }

    fn prepare_key(&self, key: &EncryptionKey) -> Result<Box<dyn KeySchedule>> {
        Ok(Box::new(DesCbc::new(key.value.as_ref())?))
    }
}
