//! DER entry points for the message structures.
//!
//! Thin wrappers over [`rasn::der`] that map codec failures into this
//! crate's error kinds, plus tag peeks that classify a wire buffer without
//! decoding it. Decoding tolerates trailing octets, which is what lets an
//! [`EncKrbPrivPart`] be pulled out of a block-padded plaintext buffer.

use rasn::types::{Class, Tag};
use rasn::AsnType;
use snafu::ResultExt;

use crate::error::{DecodingSnafu, EncodingSnafu, Result};
use crate::types::{EncKrbPrivPart, KrbPriv, KrbSafe};

const _: () = assert!(KrbSafe::TAG.const_eq(&Tag::new(Class::Application, 20)));
const _: () = assert!(KrbPriv::TAG.const_eq(&Tag::new(Class::Application, 21)));
const _: () = assert!(EncKrbPrivPart::TAG.const_eq(&Tag::new(Class::Application, 28)));

/// First identifier octet of a constructed APPLICATION 20 value.
const SAFE_IDENT: u8 = 0x74;
/// First identifier octet of a constructed APPLICATION 21 value.
const PRIV_IDENT: u8 = 0x75;

/// Returns whether `input` starts with the KRB-SAFE application tag.
pub fn is_krb_safe(input: &[u8]) -> bool {
    input.first() == Some(&SAFE_IDENT)
}

/// Returns whether `input` starts with the KRB-PRIV application tag.
pub fn is_krb_priv(input: &[u8]) -> bool {
    input.first() == Some(&PRIV_IDENT)
}

/// Encodes a KRB-SAFE message to DER.
pub fn encode_safe(msg: &KrbSafe) -> Result<Vec<u8>> {
    rasn::der::encode(msg).context(EncodingSnafu)
}

/// Decodes a KRB-SAFE message from DER.
pub fn decode_safe(input: &[u8]) -> Result<KrbSafe> {
    rasn::der::decode(input).context(DecodingSnafu)
}

/// Encodes a KRB-PRIV message to DER.
pub fn encode_priv(msg: &KrbPriv) -> Result<Vec<u8>> {
    rasn::der::encode(msg).context(EncodingSnafu)
}

/// Decodes a KRB-PRIV message from DER.
pub fn decode_priv(input: &[u8]) -> Result<KrbPriv> {
    rasn::der::decode(input).context(DecodingSnafu)
}

/// Encodes the plaintext part of a KRB-PRIV message to DER.
pub fn encode_enc_priv_part(msg: &EncKrbPrivPart) -> Result<Vec<u8>> {
    rasn::der::encode(msg).context(EncodingSnafu)
}

/// Decodes the plaintext part of a KRB-PRIV message from DER, ignoring any
/// cipher padding after the value.
pub fn decode_enc_priv_part(input: &[u8]) -> Result<EncKrbPrivPart> {
    rasn::der::decode(input).context(DecodingSnafu)
}
