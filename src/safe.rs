//! Building and verifying KRB-SAFE messages.

use rasn::types::{Integer, OctetString};
use snafu::ensure;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::codec;
use crate::context::{to_kerberos_time, Context};
use crate::crypto;
use crate::error::{Error, InappCksumSnafu, ModifiedSnafu, MsgTypeSnafu, Result};
use crate::policy::{check_inbound, outbound_stamp, InboundBody};
use crate::rcache::{store_replay, ReplayCache};
use crate::types::{Checksum, EncryptionKey, HostAddress, KrbSafe, KrbSafeBody};
use crate::types::{MSG_TYPE_SAFE, PVNO};
use crate::MsgFlags;

/// Builds a KRB-SAFE message around `user_data`.
///
/// The message body is covered by a checksum of type `cksumtype`, seeded
/// with the octets of `key`; only keyed, collision-proof checksum types
/// are accepted. Unless [`MsgFlags::NOTIME`] is given, the message is
/// timestamped from the context's clock and a replay entry is recorded in
/// `rcache`, which must then be present. With [`MsgFlags::DOSEQUENCE`] the
/// message carries `seq_number`.
///
/// The checksum is computed over the DER encoding of the message with a
/// zeroed placeholder checksum, then the message is re-encoded around the
/// real value; the two passes are what a verifier reproduces.
///
/// A failure to record the replay entry fails the whole operation; no
/// bytes are returned that the cache has not seen.
#[allow(clippy::too_many_arguments)]
pub fn mk_safe(
    ctx: &Context,
    user_data: &[u8],
    cksumtype: i32,
    key: &EncryptionKey,
    sender: &HostAddress,
    receiver: Option<&HostAddress>,
    seq_number: u32,
    flags: MsgFlags,
    rcache: Option<&dyn ReplayCache>,
) -> Result<Vec<u8>> {
    let profile =
        crypto::find_cksumtype(cksumtype).ok_or(Error::SumtypeNosupp { cksumtype })?;
    ensure!(
        profile.is_collision_proof() && profile.is_keyed(),
        InappCksumSnafu { cksumtype }
    );

    let stamp = outbound_stamp(ctx, flags, rcache)?;
    let mut msg = KrbSafe {
        pvno: PVNO.into(),
        msg_type: MSG_TYPE_SAFE.into(),
        body: KrbSafeBody {
            user_data: OctetString::from_slice(user_data),
            timestamp: stamp.map(|(ctime, _)| to_kerberos_time(ctime)).transpose()?,
            usec: stamp.map(|(_, cusec)| cusec),
            seq_number: flags.contains(MsgFlags::DOSEQUENCE).then_some(seq_number),
            s_address: sender.clone(),
            r_address: receiver.cloned(),
        },
        cksum: Checksum::zeroed(),
    };

    let scratch = Zeroizing::new(codec::encode_safe(&msg)?);
    let cksum = Zeroizing::new(profile.calculate(&scratch, key.value.as_ref())?);
    drop(scratch);
    msg.cksum = Checksum {
        r#type: cksumtype,
        checksum: OctetString::from_slice(&cksum),
    };
    drop(cksum);

    let mut out = Zeroizing::new(codec::encode_safe(&msg)?);
    if let Some((ctime, cusec)) = stamp {
        let rcache = rcache.ok_or(Error::RcRequired)?;
        store_replay(rcache, sender, "_safe", ctime, cusec)?;
    }
    Ok(std::mem::take(&mut *out))
}

/// Verifies a KRB-SAFE message and returns its user data.
///
/// Verification re-encodes the received message around a zeroed
/// placeholder checksum, recomputes the keyed checksum under `key`, and
/// compares in constant time. Policy follows: timestamp within the
/// context's clock skew and a replay entry recorded in `rcache` (unless
/// [`MsgFlags::NOTIME`]), sequence number equal to `seq_number` (with
/// [`MsgFlags::DOSEQUENCE`]), sender address equal to `sender`, and any
/// claimed receiver address equal to `receiver` or, when no receiver is
/// given, present in the context's local address list.
#[allow(clippy::too_many_arguments)]
pub fn rd_safe(
    ctx: &Context,
    input: &[u8],
    key: &EncryptionKey,
    sender: &HostAddress,
    receiver: Option<&HostAddress>,
    seq_number: u32,
    flags: MsgFlags,
    rcache: Option<&dyn ReplayCache>,
) -> Result<Vec<u8>> {
    ensure!(codec::is_krb_safe(input), MsgTypeSnafu);
    let mut msg = codec::decode_safe(input)?;
    ensure!(
        msg.pvno == Integer::from(PVNO) && msg.msg_type == Integer::from(MSG_TYPE_SAFE),
        MsgTypeSnafu
    );

    let cksumtype = msg.cksum.r#type;
    let profile =
        crypto::find_cksumtype(cksumtype).ok_or(Error::SumtypeNosupp { cksumtype })?;
    ensure!(
        profile.is_collision_proof() && profile.is_keyed(),
        InappCksumSnafu { cksumtype }
    );

    let received = std::mem::replace(&mut msg.cksum, Checksum::zeroed());
    let scratch = Zeroizing::new(codec::encode_safe(&msg)?);
    let expected = Zeroizing::new(profile.calculate(&scratch, key.value.as_ref())?);
    drop(scratch);
    ensure!(
        bool::from(received.checksum.as_ref().ct_eq(&expected[..])),
        ModifiedSnafu
    );
    drop(expected);

    check_inbound(
        ctx,
        &InboundBody::from(&msg.body),
        sender,
        receiver,
        seq_number,
        flags,
        rcache,
        "_safe",
    )?;

    Ok(msg.body.user_data.to_vec())
}
