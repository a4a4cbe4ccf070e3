//! Recipient key selection from OpenPGP key rings.
//!
//! A key source holds one or more key rings, binary or ASCII-armored. The
//! recipient is the first key packet, in the order it appears in the source,
//! whose public-key algorithm can encrypt. Key packets are visited as they
//! are stored: a ring's primary key first, then its subkeys in source order.
//! Later candidates are never weighed against earlier ones, and rings are
//! not canonicalized before the search.

use crate::error::{PgpError, Result, INVALID_PUBLIC_KEY};
use sequoia_openpgp::packet::key::{PublicParts, UnspecifiedRole};
use sequoia_openpgp::packet::{Key, Tag};
use sequoia_openpgp::parse::{PacketParser, PacketParserResult, Parse};
use sequoia_openpgp::Packet;
use std::io::Read;
use tracing::{debug, warn};

/// Public key selected as the message recipient
pub type RecipientKey = Key<PublicParts, UnspecifiedRole>;

/// Reads key rings from `source` and returns the first encryption-capable key.
///
/// The source is read only as far as the selected key and never closed;
/// pass `&mut reader` to keep using it.
///
/// # Errors
/// Key material that fails to parse, or a source without any
/// encryption-capable key, yields the "Invalid public key" error. I/O
/// failures on the source are returned as [`PgpError::Io`].
pub fn select_encryption_key<R>(source: R) -> Result<RecipientKey>
where
    R: Read + Send + Sync,
{
    let mut ppr = PacketParser::from_reader(source).map_err(invalid_key_material)?;
    let mut ring = 0usize;

    while let PacketParserResult::Some(pp) = ppr {
        let (packet, next) = pp.next().map_err(invalid_key_material)?;
        ppr = next;

        let key = match packet {
            Packet::PublicKey(key) => {
                ring += 1;
                key.role_into_unspecified()
            }
            Packet::SecretKey(key) => {
                ring += 1;
                key.take_secret().0.role_into_unspecified()
            }
            Packet::PublicSubkey(key) => key.role_into_unspecified(),
            Packet::SecretSubkey(key) => key.take_secret().0.role_into_unspecified(),
            Packet::Unknown(unknown) if is_key_tag(unknown.tag()) => {
                warn!(ring, tag = %unknown.tag(), error = %unknown.error(), "Unparsable key packet");
                return Err(PgpError::Crypto(format!(
                    "{}: {}",
                    INVALID_PUBLIC_KEY,
                    unknown.error()
                )));
            }
            _ => continue,
        };

        if key.pk_algo().for_encryption() {
            debug!(
                ring,
                key_id = %key.keyid(),
                algorithm = %key.pk_algo(),
                "Selected recipient key"
            );
            return Ok(key);
        }
        debug!(ring, key_id = %key.keyid(), algorithm = %key.pk_algo(), "Skipping key");
    }

    debug!(rings = ring, "No encryption-capable key in source");
    Err(PgpError::invalid_public_key())
}

fn is_key_tag(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey | Tag::SecretSubkey
    )
}

fn invalid_key_material(err: anyhow::Error) -> PgpError {
    match PgpError::from(err) {
        PgpError::Crypto(detail) => {
            warn!(%detail, "Failed to parse public key material");
            PgpError::Crypto(format!("{}: {}", INVALID_PUBLIC_KEY, detail))
        }
        io => io,
    }
}
