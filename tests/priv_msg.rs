//! KRB-PRIV scenarios: round trips, chaining, replay, and policy.

mod common;

use common::{context_at, des_key, rcache, receiver_addr, sender_addr, NOW};
use hex_literal::hex;
use pretty_assertions::assert_eq;

use krb5_msg::crypto::{ETYPE_DES_CBC_CRC, ETYPE_DES_CBC_MD5};
use krb5_msg::types::{EncryptedData, KrbPriv, MSG_TYPE_PRIV, PVNO};
use krb5_msg::{mk_priv, rd_priv, Error, MsgFlags};

const KEY: [u8; 8] = hex!("0123456789ABCDEF");
const OTHER_KEY: [u8; 8] = hex!("FEDCBA9876543210");

#[test]
fn round_trip() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        Some(&receiver_addr()),
        0,
        MsgFlags::NONE,
        None,
        Some(&rcache()),
    )
    .unwrap();

    // The confidential payload is not visible on the wire.
    assert!(!wire.windows(6).any(|window| window == b"secret"));

    let data = rd_priv(
        &ctx,
        &wire,
        &key,
        &sender_addr(),
        Some(&receiver_addr()),
        0,
        MsgFlags::NONE,
        None,
        Some(&rcache()),
    )
    .unwrap();
    assert_eq!(data, b"secret");
}

#[test]
fn round_trip_with_both_etypes() {
    let ctx = context_at(NOW);
    for etype in [ETYPE_DES_CBC_CRC, ETYPE_DES_CBC_MD5] {
        let key = des_key(etype, KEY);
        let wire = mk_priv(
            &ctx,
            b"secret",
            &key,
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        )
        .unwrap();
        let data = rd_priv(
            &ctx,
            &wire,
            &key,
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        )
        .unwrap();
        assert_eq!(data, b"secret");
    }
}

#[test]
fn ciphertext_is_block_aligned() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .unwrap();
    let msg = krb5_msg::codec::decode_priv(&wire).unwrap();
    assert_eq!(msg.enc_part.etype, ETYPE_DES_CBC_MD5);
    assert_eq!(msg.enc_part.kvno, None);
    assert_eq!(msg.enc_part.cipher.len() % 8, 0);
}

#[test]
fn ivec_tracks_the_last_ciphertext_block() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);

    let mut sender_iv = [0u8; 8];
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut sender_iv),
        None,
    )
    .unwrap();

    let cipher = krb5_msg::codec::decode_priv(&wire).unwrap().enc_part.cipher;
    assert_eq!(sender_iv[..], cipher[cipher.len() - 8..]);

    let mut receiver_iv = [0u8; 8];
    let data = rd_priv(
        &ctx,
        &wire,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut receiver_iv),
        None,
    )
    .unwrap();
    assert_eq!(data, b"secret");
    assert_eq!(receiver_iv, sender_iv);
}

#[test]
fn messages_chain_through_the_ivec() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);

    let mut sender_iv = [0u8; 8];
    let first = mk_priv(
        &ctx,
        b"first message",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut sender_iv),
        None,
    )
    .unwrap();
    let second = mk_priv(
        &ctx,
        b"second message",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut sender_iv),
        None,
    )
    .unwrap();

    // A receiver chaining its own ivec tracks the sender block for block.
    let mut receiver_iv = [0u8; 8];
    let data = rd_priv(
        &ctx,
        &first,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut receiver_iv),
        None,
    )
    .unwrap();
    assert_eq!(data, b"first message");
    let data = rd_priv(
        &ctx,
        &second,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        Some(&mut receiver_iv),
        None,
    )
    .unwrap();
    assert_eq!(data, b"second message");
    assert_eq!(receiver_iv, sender_iv);

    // Reading the second message without the chain state fails.
    assert!(rd_priv(
        &ctx,
        &second,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .is_err());
}

#[test]
fn replayed_message_rejected() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        None,
        Some(&rcache()),
    )
    .unwrap();

    let receiver_rc = rcache();
    rd_priv(
        &ctx,
        &wire,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        None,
        Some(&receiver_rc),
    )
    .unwrap();
    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &key,
            &sender_addr(),
            None,
            0,
            MsgFlags::NONE,
            None,
            Some(&receiver_rc),
        ),
        Err(Error::Repeat)
    ));
}

#[test]
fn safe_and_priv_replay_domains_are_disjoint() {
    // The same sender at the same instant may send one SAFE and one PRIV
    // message; the per-operation suffix keeps the cache entries apart.
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let receiver_rc = rcache();

    let safe_wire = krb5_msg::mk_safe(
        &ctx,
        b"hello",
        krb5_msg::crypto::CKSUMTYPE_RSA_MD5_DES,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        Some(&rcache()),
    )
    .unwrap();
    let priv_wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        None,
        Some(&rcache()),
    )
    .unwrap();

    krb5_msg::rd_safe(
        &ctx,
        &safe_wire,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        Some(&receiver_rc),
    )
    .unwrap();
    rd_priv(
        &ctx,
        &priv_wire,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NONE,
        None,
        Some(&receiver_rc),
    )
    .unwrap();
}

#[test]
fn wrong_key_garbles_the_plaintext() {
    let ctx = context_at(NOW);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &des_key(ETYPE_DES_CBC_MD5, KEY),
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .unwrap();

    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &des_key(ETYPE_DES_CBC_MD5, OTHER_KEY),
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::Decoding { .. })
    ));
}

#[test]
fn tampered_ciphertext_fails() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .unwrap();

    let mut msg = krb5_msg::codec::decode_priv(&wire).unwrap();
    let mut cipher = msg.enc_part.cipher.to_vec();
    cipher[0] ^= 0x01;
    msg.enc_part.cipher = cipher.into();
    let tampered = rasn::der::encode(&msg).unwrap();

    assert!(rd_priv(
        &ctx,
        &tampered,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .is_err());
}

#[test]
fn unknown_etype_rejected() {
    let ctx = context_at(NOW);

    // Building with an unregistered key type.
    assert!(matches!(
        mk_priv(
            &ctx,
            b"secret",
            &des_key(999, KEY),
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::EtypeNosupp { etype: 999 })
    ));

    // Reading a message that names one.
    let msg = KrbPriv {
        pvno: PVNO.into(),
        msg_type: MSG_TYPE_PRIV.into(),
        enc_part: EncryptedData {
            etype: 99,
            kvno: None,
            cipher: rasn::types::OctetString::from_slice(&[0u8; 16]),
        },
    };
    let wire = rasn::der::encode(&msg).unwrap();
    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &des_key(ETYPE_DES_CBC_MD5, KEY),
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::EtypeNosupp { etype: 99 })
    ));
}

#[test]
fn safe_message_is_not_a_priv_message() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = krb5_msg::mk_safe(
        &ctx,
        b"hello",
        krb5_msg::crypto::CKSUMTYPE_RSA_MD5_DES,
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
    )
    .unwrap();

    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &key,
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::MsgType)
    ));
}

#[test]
fn bad_keys_rejected() {
    let ctx = context_at(NOW);
    assert!(matches!(
        mk_priv(
            &ctx,
            b"secret",
            &krb5_msg::types::EncryptionKey {
                r#type: ETYPE_DES_CBC_MD5,
                value: rasn::types::OctetString::from_slice(&hex!("012345")),
            },
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::BadKeysize { length: 3 })
    ));

    assert!(matches!(
        mk_priv(
            &ctx,
            b"secret",
            &des_key(ETYPE_DES_CBC_MD5, [0x01; 8]),
            &sender_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::WeakKey)
    ));
}

#[test]
fn sequence_number_is_enforced() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        7,
        MsgFlags::NOTIME | MsgFlags::DOSEQUENCE,
        None,
        None,
    )
    .unwrap();

    rd_priv(
        &ctx,
        &wire,
        &key,
        &sender_addr(),
        None,
        7,
        MsgFlags::NOTIME | MsgFlags::DOSEQUENCE,
        None,
        None,
    )
    .unwrap();
    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &key,
            &sender_addr(),
            None,
            8,
            MsgFlags::NOTIME | MsgFlags::DOSEQUENCE,
            None,
            None,
        ),
        Err(Error::BadOrder)
    ));
}

#[test]
fn sender_address_is_enforced() {
    let ctx = context_at(NOW);
    let key = des_key(ETYPE_DES_CBC_MD5, KEY);
    let wire = mk_priv(
        &ctx,
        b"secret",
        &key,
        &sender_addr(),
        None,
        0,
        MsgFlags::NOTIME,
        None,
        None,
    )
    .unwrap();

    assert!(matches!(
        rd_priv(
            &ctx,
            &wire,
            &key,
            &receiver_addr(),
            None,
            0,
            MsgFlags::NOTIME,
            None,
            None,
        ),
        Err(Error::BadAddr)
    ));
}
