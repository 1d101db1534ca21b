//! Policy checks shared by the two inbound operations.
//!
//! An inbound SAFE body and a decrypted PRIV part carry the same policy
//! fields; once integrity (checksum or decryption) has been established,
//! both run the identical gauntlet, in the same order: timestamp window,
//! replay cache, sequence number, sender address, receiver address.

use snafu::ensure;

use crate::address::{address_compare, address_search};
use crate::context::{from_kerberos_time, Context};
use crate::error::{BadAddrSnafu, BadOrderSnafu, Error, RcRequiredSnafu, Result, SkewSnafu};
use crate::rcache::{store_replay, ReplayCache};
use crate::types::{EncKrbPrivPart, HostAddress, KrbSafeBody};
use crate::MsgFlags;

/// Resolves the outbound timestamp policy: `None` when the caller opted
/// out of timestamps, otherwise the current time, with the replay cache's
/// presence checked up front so no work happens before the refusal.
pub(crate) fn outbound_stamp(
    ctx: &Context,
    flags: MsgFlags,
    rcache: Option<&dyn ReplayCache>,
) -> Result<Option<(i64, u32)>> {
    if flags.contains(MsgFlags::NOTIME) {
        return Ok(None);
    }
    ensure!(rcache.is_some(), RcRequiredSnafu);
    Ok(Some(ctx.us_timeofday()))
}

/// The policy fields of a verified inbound message body.
pub(crate) struct InboundBody<'a> {
    pub(crate) timestamp: Option<i64>,
    pub(crate) usec: Option<u32>,
    pub(crate) seq_number: Option<u32>,
    pub(crate) s_address: &'a HostAddress,
    pub(crate) r_address: Option<&'a HostAddress>,
}

impl<'a> From<&'a KrbSafeBody> for InboundBody<'a> {
    fn from(body: &'a KrbSafeBody) -> Self {
        Self {
            timestamp: body.timestamp.as_ref().map(from_kerberos_time),
            usec: body.usec,
            seq_number: body.seq_number,
            s_address: &body.s_address,
            r_address: body.r_address.as_ref(),
        }
    }
}

impl<'a> From<&'a EncKrbPrivPart> for InboundBody<'a> {
    fn from(part: &'a EncKrbPrivPart) -> Self {
        Self {
            timestamp: part.timestamp.as_ref().map(from_kerberos_time),
            usec: part.usec,
            seq_number: part.seq_number,
            s_address: &part.s_address,
            r_address: part.r_address.as_ref(),
        }
    }
}

/// Runs the inbound policy gauntlet over `body`.
///
/// `replay_suffix` keeps the SAFE and PRIV replay namespaces apart. A
/// missing timestamp counts as time zero, which the skew window rejects.
#[allow(clippy::too_many_arguments)]
pub(crate) fn check_inbound(
    ctx: &Context,
    body: &InboundBody<'_>,
    sender: &HostAddress,
    receiver: Option<&HostAddress>,
    seq_number: u32,
    flags: MsgFlags,
    rcache: Option<&dyn ReplayCache>,
    replay_suffix: &str,
) -> Result<()> {
    if !flags.contains(MsgFlags::NOTIME) {
        let (now, _) = ctx.us_timeofday();
        let ctime = body.timestamp.unwrap_or(0);
        ensure!(ctx.in_clock_skew(ctime, now), SkewSnafu);
        let rcache = rcache.ok_or(Error::RcRequired)?;
        store_replay(rcache, sender, replay_suffix, ctime, body.usec.unwrap_or(0))?;
    }

    if flags.contains(MsgFlags::DOSEQUENCE) {
        ensure!(body.seq_number.unwrap_or(0) == seq_number, BadOrderSnafu);
    }

    ensure!(address_compare(sender, body.s_address), BadAddrSnafu);

    if let Some(claimed) = body.r_address {
        match receiver {
            Some(receiver) => {
                ensure!(address_compare(receiver, claimed), BadAddrSnafu);
            }
            None => {
                let ours = ctx.local_addresses();
                ensure!(address_search(claimed, &ours), BadAddrSnafu);
            }
        }
    }

    Ok(())
}
