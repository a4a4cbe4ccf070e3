//! Shared fixtures for the integration tests: test certificates and a
//! decryption helper built on the OpenPGP library.

#![allow(dead_code)]

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use sequoia_openpgp as openpgp;
use openpgp::cert::{CertBuilder, CipherSuite};
use openpgp::crypto::SessionKey;
use openpgp::packet::{Literal, Tag, PKESK, SKESK};
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageStructure, VerificationHelper,
};
use openpgp::parse::{PacketParser, PacketParserResult, Parse};
use openpgp::policy::StandardPolicy;
use openpgp::serialize::{Marshal, SerializeInto};
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Cert, Fingerprint, KeyHandle, Packet, PacketPile};
use std::io::Read;
use std::sync::{Once, OnceLock};

static TRACING: Once = Once::new();

/// Routes library logs to the test harness output (`RUST_LOG=pgpseal=debug`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// 2048-bit RSA certificate with a transport encryption subkey, generated once
pub fn rsa_cert() -> &'static Cert {
    static CERT: OnceLock<Cert> = OnceLock::new();
    CERT.get_or_init(|| {
        CertBuilder::new()
            .set_cipher_suite(CipherSuite::RSA2k)
            .add_userid("RSA Recipient <rsa@example.org>")
            .add_transport_encryption_subkey()
            .generate()
            .expect("Failed to generate RSA-2048 certificate")
            .0
    })
}

/// Curve25519 certificate with a transport encryption subkey, generated once
pub fn cv25519_cert() -> &'static Cert {
    static CERT: OnceLock<Cert> = OnceLock::new();
    CERT.get_or_init(|| generate_cv25519("Curve Recipient <cv25519@example.org>"))
}

/// Fresh Curve25519 certificate with a transport encryption subkey
pub fn generate_cv25519(userid: &str) -> Cert {
    CertBuilder::new()
        .set_cipher_suite(CipherSuite::Cv25519)
        .add_userid(userid)
        .add_transport_encryption_subkey()
        .generate()
        .expect("Failed to generate Curve25519 certificate")
        .0
}

/// Certificate whose keys can only certify and sign
pub fn signing_only_cert() -> Cert {
    CertBuilder::new()
        .set_cipher_suite(CipherSuite::Cv25519)
        .add_userid("Signer <signer@example.org>")
        .add_signing_subkey()
        .generate()
        .expect("Failed to generate signing certificate")
        .0
}

/// Curve25519 certificate with two transport encryption subkeys
pub fn two_subkey_cert() -> Cert {
    CertBuilder::new()
        .set_cipher_suite(CipherSuite::Cv25519)
        .add_userid("Two Subkeys <two@example.org>")
        .add_transport_encryption_subkey()
        .add_transport_encryption_subkey()
        .generate()
        .expect("Failed to generate certificate")
        .0
}

/// Binary public key ring for `cert` with its subkeys, each followed by its
/// binding signature, stored in reverse of the library's order
pub fn binary_public_key_reversed(cert: &Cert) -> Vec<u8> {
    let mut groups: Vec<Vec<Packet>> = vec![Vec::new()];
    let ring = PacketPile::from_bytes(&binary_public_key(cert)).expect("Failed to parse key ring");
    for packet in ring.into_children() {
        if matches!(packet, Packet::PublicSubkey(_)) {
            groups.push(Vec::new());
        }
        groups.last_mut().unwrap().push(packet);
    }
    groups[1..].reverse();

    let mut bytes = Vec::new();
    for packet in groups.iter().flatten() {
        packet.serialize(&mut bytes).expect("Failed to serialize packet");
    }
    bytes
}

/// Fingerprint of the first subkey packet stored in `ring`
pub fn first_stored_subkey(ring: &[u8]) -> Fingerprint {
    PacketPile::from_bytes(ring)
        .expect("Failed to parse key ring")
        .children()
        .find_map(|packet| match packet {
            Packet::PublicSubkey(key) => Some(key.fingerprint()),
            _ => None,
        })
        .expect("Key ring has no subkey")
}

/// ASCII-armored public key block for `cert`
pub fn armored_public_key(cert: &Cert) -> Vec<u8> {
    cert.armored().to_vec().expect("Failed to armor certificate")
}

/// Binary public key ring for `cert`
pub fn binary_public_key(cert: &Cert) -> Vec<u8> {
    cert.to_vec().expect("Failed to serialize certificate")
}

struct Helper<'a> {
    cert: &'a Cert,
}

impl VerificationHelper for Helper<'_> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(Vec::new())
    }

    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        Ok(())
    }
}

impl DecryptionHelper for Helper<'_> {
    fn decrypt<D>(
        &mut self,
        pkesks: &[PKESK],
        _skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        for ka in self.cert.keys().unencrypted_secret() {
            let mut pair = ka.key().clone().into_keypair()?;
            for pkesk in pkesks {
                if let Some((algo, session_key)) = pkesk.decrypt(&mut pair, sym_algo) {
                    if decrypt(algo, &session_key) {
                        return Ok(Some(self.cert.fingerprint()));
                    }
                }
            }
        }
        Err(anyhow::anyhow!("No secret key decrypts the session key"))
    }
}

/// Decrypts an integrity-protected message (binary or armored) with the
/// secret keys of `cert`.
pub fn decrypt(cert: &Cert, message: &[u8]) -> openpgp::Result<Vec<u8>> {
    let policy = StandardPolicy::new();
    let mut decryptor =
        DecryptorBuilder::from_bytes(message)?.with_policy(&policy, None, Helper { cert })?;
    let mut plaintext = Vec::new();
    decryptor.read_to_end(&mut plaintext)?;
    Ok(plaintext)
}

/// Top-level packet tags of a binary message
pub fn top_level_tags(message: &[u8]) -> Vec<openpgp::packet::Tag> {
    PacketPile::from_bytes(message)
        .expect("Failed to parse message")
        .children()
        .map(|packet| packet.tag())
        .collect()
}

fn cfb_decrypt(algo: SymmetricAlgorithm, key: &[u8], iv: &[u8], data: &mut [u8]) {
    let encrypt_block = |block: &mut Block| match algo {
        SymmetricAlgorithm::AES128 => Aes128::new_from_slice(key).unwrap().encrypt_block(block),
        SymmetricAlgorithm::AES192 => Aes192::new_from_slice(key).unwrap().encrypt_block(block),
        SymmetricAlgorithm::AES256 => Aes256::new_from_slice(key).unwrap().encrypt_block(block),
        other => panic!("unexpected cipher {other}"),
    };
    let mut feedback = [0u8; 16];
    feedback.copy_from_slice(iv);
    for chunk in data.chunks_mut(16) {
        let mut keystream = Block::clone_from_slice(&feedback);
        encrypt_block(&mut keystream);
        feedback[..chunk.len()].copy_from_slice(chunk);
        for (byte, key) in chunk.iter_mut().zip(keystream.iter()) {
            *byte ^= key;
        }
    }
}

/// Decrypts a binary message made of a PKESK packet and a legacy
/// Symmetrically Encrypted Data packet, returning its literal packet.
pub fn decrypt_legacy(cert: &Cert, message: &[u8]) -> Literal {
    let mut pkesk = None;
    let mut body = None;
    let mut ppr = PacketParser::from_bytes(message).expect("Failed to parse message");
    while let PacketParserResult::Some(mut pp) = ppr {
        if pp.packet.tag() == Tag::SED {
            body = Some(pp.buffer_unread_content().unwrap().to_vec());
        }
        let (packet, next) = pp.next().unwrap();
        if let Packet::PKESK(packet) = packet {
            pkesk = Some(packet);
        }
        ppr = next;
    }
    let pkesk = pkesk.expect("Message has no PKESK packet");
    let body = body.expect("Message has no encrypted data packet");

    let (algo, session_key) = cert
        .keys()
        .unencrypted_secret()
        .find_map(|ka| {
            let mut pair = ka.key().clone().into_keypair().ok()?;
            pkesk.decrypt(&mut pair, None)
        })
        .expect("No secret key decrypts the session key");

    let mut prefix = body[..18].to_vec();
    cfb_decrypt(algo, &session_key, &[0u8; 16], &mut prefix);
    assert_eq!(prefix[14..16], prefix[16..18], "quick check bytes mismatch");

    let mut inner = body[18..].to_vec();
    cfb_decrypt(algo, &session_key, &body[2..18], &mut inner);

    openpgp::Message::from_bytes(&inner)
        .expect("Decrypted data is not an OpenPGP message")
        .body()
        .expect("Message carries no literal data")
        .clone()
}
