//! Building and reading KRB-PRIV messages.

use rasn::types::{Integer, OctetString};
use snafu::ensure;
use zeroize::Zeroizing;

use crate::codec;
use crate::context::{to_kerberos_time, Context};
use crate::crypto;
use crate::error::{BadMsizeSnafu, Error, MsgTypeSnafu, Result};
use crate::policy::{check_inbound, outbound_stamp, InboundBody};
use crate::rcache::{store_replay, ReplayCache};
use crate::types::{EncKrbPrivPart, EncryptedData, EncryptionKey, HostAddress, KrbPriv};
use crate::types::{MSG_TYPE_PRIV, PVNO};
use crate::MsgFlags;

/// Builds a KRB-PRIV message around `user_data`.
///
/// The user data and the policy fields are encrypted under `key` with the
/// algorithm the key names. Timestamp and sequence policy are as in
/// [`crate::mk_safe`], with the replay entry recorded in the PRIV
/// namespace.
///
/// When `ivec` is given it seeds the cipher-block chain and is replaced on
/// success with the last ciphertext block of this message, ready to chain
/// the next one. Its length must equal the algorithm's block length.
#[allow(clippy::too_many_arguments)]
pub fn mk_priv(
    ctx: &Context,
    user_data: &[u8],
    key: &EncryptionKey,
    sender: &HostAddress,
    receiver: Option<&HostAddress>,
    seq_number: u32,
    flags: MsgFlags,
    ivec: Option<&mut [u8]>,
    rcache: Option<&dyn ReplayCache>,
) -> Result<Vec<u8>> {
    let etype = key.r#type;
    let profile = crypto::find_etype(etype).ok_or(Error::EtypeNosupp { etype })?;

    let stamp = outbound_stamp(ctx, flags, rcache)?;
    let part = EncKrbPrivPart {
        user_data: OctetString::from_slice(user_data),
        timestamp: stamp.map(|(ctime, _)| to_kerberos_time(ctime)).transpose()?,
        usec: stamp.map(|(_, cusec)| cusec),
        seq_number: flags.contains(MsgFlags::DOSEQUENCE).then_some(seq_number),
        s_address: sender.clone(),
        r_address: receiver.cloned(),
    };

    let plain = Zeroizing::new(codec::encode_enc_priv_part(&part)?);
    let schedule = profile.prepare_key(key)?;
    let cipher_text = schedule.encrypt(&plain, ivec.as_deref())?;
    drop(schedule);
    drop(plain);

    if let Some(iv) = ivec {
        ensure!(
            iv.len() == profile.block_len(),
            BadMsizeSnafu { length: iv.len() }
        );
        iv.copy_from_slice(&cipher_text[cipher_text.len() - profile.block_len()..]);
    }

    let msg = KrbPriv {
        pvno: PVNO.into(),
        msg_type: MSG_TYPE_PRIV.into(),
        enc_part: EncryptedData {
            etype,
            kvno: None,
            cipher: cipher_text.into(),
        },
    };

    let mut out = Zeroizing::new(codec::encode_priv(&msg)?);
    if let Some((ctime, cusec)) = stamp {
        let rcache = rcache.ok_or(Error::RcRequired)?;
        store_replay(rcache, sender, "_priv", ctime, cusec)?;
    }
    Ok(std::mem::take(&mut *out))
}

/// Reads a KRB-PRIV message and returns the confidential user data.
///
/// The outer message is decoded, its ciphertext decrypted under `key`
/// (the key schedule is released and zeroized on every path), and the
/// recovered plaintext decoded and put through the same policy gauntlet
/// as [`crate::rd_safe`], with the replay entry recorded in the PRIV
/// namespace.
///
/// When `ivec` is given it seeds the cipher-block chain and, once
/// decryption succeeds, is replaced with the last block of the inbound
/// ciphertext so the next message on the stream chains correctly.
#[allow(clippy::too_many_arguments)]
pub fn rd_priv(
    ctx: &Context,
    input: &[u8],
    key: &EncryptionKey,
    sender: &HostAddress,
    receiver: Option<&HostAddress>,
    seq_number: u32,
    flags: MsgFlags,
    ivec: Option<&mut [u8]>,
    rcache: Option<&dyn ReplayCache>,
) -> Result<Vec<u8>> {
    ensure!(codec::is_krb_priv(input), MsgTypeSnafu);
    let msg = codec::decode_priv(input)?;
    ensure!(
        msg.pvno == Integer::from(PVNO) && msg.msg_type == Integer::from(MSG_TYPE_PRIV),
        MsgTypeSnafu
    );

    let etype = msg.enc_part.etype;
    let profile = crypto::find_etype(etype).ok_or(Error::EtypeNosupp { etype })?;

    let schedule = profile.prepare_key(key)?;
    let cipher_text = &msg.enc_part.cipher;
    let plain = schedule.decrypt(cipher_text, ivec.as_deref())?;
    drop(schedule);

    if let Some(iv) = ivec {
        // The chain continues from the tail of the ciphertext, not of the
        // recovered plaintext.
        ensure!(
            iv.len() == profile.block_len(),
            BadMsizeSnafu { length: iv.len() }
        );
        iv.copy_from_slice(&cipher_text[cipher_text.len() - profile.block_len()..]);
    }

    let part = codec::decode_enc_priv_part(&plain)?;
    drop(plain);

    check_inbound(
        ctx,
        &InboundBody::from(&part),
        sender,
        receiver,
        seq_number,
        flags,
        rcache,
        "_priv",
    )?;

    Ok(part.user_data.to_vec())
}
