//! Symmetrically Encrypted Data packets (tag 9) without an integrity packet.
//!
//! The OpenPGP library only produces integrity-protected data packets. When a
//! caller turns the integrity check off, the session key is still wrapped by
//! the library (PKESK v3), and the body is encrypted here in OpenPGP CFB mode
//! with resynchronisation (RFC 4880, section 13.9).

use crate::error::{PgpError, Result};
use crate::keyring::RecipientKey;
use crate::BUFFER_SIZE;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use rand::rngs::OsRng;
use rand::RngCore;
use sequoia_openpgp::crypto::SessionKey;
use sequoia_openpgp::packet::header::{BodyLength, CTB};
use sequoia_openpgp::packet::pkesk::PKESK3;
use sequoia_openpgp::packet::{Header, Tag};
use sequoia_openpgp::serialize::stream::Message;
use sequoia_openpgp::serialize::Marshal;
use sequoia_openpgp::types::SymmetricAlgorithm;
use sequoia_openpgp::Packet;
use std::io::{self, Write};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Cipher block size of every algorithm supported on this path
pub const BLOCK_SIZE: usize = 16;

/// Length of the random prefix: one block plus the two repeated check bytes
pub const PREFIX_SIZE: usize = BLOCK_SIZE + 2;

/// Size of each partial body chunk; a power of two of at least 512 bytes
const CHUNK_SIZE: usize = BUFFER_SIZE;

/// Block ciphers usable for legacy encrypted data
enum LegacyCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl LegacyCipher {
    fn new(algo: SymmetricAlgorithm, key: &[u8]) -> Result<Self> {
        let invalid = |_| PgpError::crypto(format!("Invalid session key length for {}", algo));
        match algo {
            SymmetricAlgorithm::AES128 => Aes128::new_from_slice(key)
                .map(Self::Aes128)
                .map_err(invalid),
            SymmetricAlgorithm::AES192 => Aes192::new_from_slice(key)
                .map(Self::Aes192)
                .map_err(invalid),
            SymmetricAlgorithm::AES256 => Aes256::new_from_slice(key)
                .map(Self::Aes256)
                .map_err(invalid),
            other => Err(PgpError::crypto(format!(
                "{} is not supported without an integrity packet",
                other
            ))),
        }
    }

    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(cipher) => cipher.encrypt_block(block),
            Self::Aes192(cipher) => cipher.encrypt_block(block),
            Self::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }
}

/// CFB keystream state carried across writes.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Cfb {
    #[zeroize(skip)]
    cipher: LegacyCipher,
    feedback: [u8; BLOCK_SIZE],
    keystream: [u8; BLOCK_SIZE],
    pos: usize,
}

impl Cfb {
    fn new(cipher: LegacyCipher, iv: [u8; BLOCK_SIZE]) -> Self {
        Self {
            cipher,
            feedback: iv,
            keystream: [0u8; BLOCK_SIZE],
            pos: 0,
        }
    }

    /// Restarts the keystream from `iv` at a block boundary.
    fn resync(&mut self, iv: &[u8]) {
        self.feedback.copy_from_slice(iv);
        self.pos = 0;
    }

    /// Encrypts `data` in place, continuing where the previous call stopped.
    fn encrypt(&mut self, data: &mut [u8]) {
        for byte in data {
            if self.pos == 0 {
                let mut block = Block::clone_from_slice(&self.feedback);
                self.cipher.encrypt_block(&mut block);
                self.keystream.copy_from_slice(&block);
                block.as_mut_slice().zeroize();
            }
            *byte ^= self.keystream[self.pos];
            self.feedback[self.pos] = *byte;
            self.pos = (self.pos + 1) % BLOCK_SIZE;
        }
    }
}

/// Streaming writer for a PKESK v3 packet followed by a Symmetrically
/// Encrypted Data packet.
///
/// Plaintext written to it is encrypted in OpenPGP CFB mode with
/// resynchronisation and framed with partial body lengths, so the message
/// is never held in memory. [`LegacyEncryptor::finish`] writes the final
/// chunk and returns the underlying writer.
pub struct LegacyEncryptor<'a> {
    sink: Message<'a>,
    cfb: Cfb,
    buffer: Vec<u8>,
    header_written: bool,
}

impl<'a> LegacyEncryptor<'a> {
    /// Wraps a fresh session key for `recipient`, writes the PKESK packet to
    /// `sink`, and prepares the encrypted data packet.
    pub fn new(
        mut sink: Message<'a>,
        recipient: &RecipientKey,
        algo: SymmetricAlgorithm,
    ) -> Result<Self> {
        warn!(
            algorithm = %algo,
            "Writing encrypted data without an integrity packet"
        );

        let session_key = SessionKey::new(algo.key_size()?);
        let cipher = LegacyCipher::new(algo, &session_key)?;

        let pkesk = PKESK3::for_recipient(algo, &session_key, recipient)?;
        Packet::PKESK(pkesk.into()).serialize(&mut sink)?;

        let mut cfb = Cfb::new(cipher, [0u8; BLOCK_SIZE]);
        let mut buffer = Vec::with_capacity(CHUNK_SIZE);
        buffer.resize(PREFIX_SIZE, 0);
        OsRng.fill_bytes(&mut buffer[..BLOCK_SIZE]);
        buffer[BLOCK_SIZE] = buffer[BLOCK_SIZE - 2];
        buffer[BLOCK_SIZE + 1] = buffer[BLOCK_SIZE - 1];
        cfb.encrypt(&mut buffer);
        let mut resync = [0u8; BLOCK_SIZE];
        resync.copy_from_slice(&buffer[2..PREFIX_SIZE]);
        cfb.resync(&resync);

        Ok(Self {
            sink,
            cfb,
            buffer,
            header_written: false,
        })
    }

    /// Writes the last chunk with a definite length and returns the writer
    /// the packets were written to.
    pub fn finish(mut self) -> Result<Message<'a>> {
        let length = BodyLength::Full(self.buffer.len() as u32);
        self.write_framing(length)?;
        self.sink.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(self.sink)
    }

    /// Emits the packet header on the first chunk, the length alone after.
    fn write_framing(&mut self, length: BodyLength) -> Result<()> {
        let mut framing = Vec::with_capacity(6);
        if self.header_written {
            length.serialize(&mut framing)?;
        } else {
            Header::new(CTB::new(Tag::SED), length).serialize(&mut framing)?;
            self.header_written = true;
        }
        self.sink.write_all(&framing)?;
        Ok(())
    }

    fn flush_chunk(&mut self) -> io::Result<()> {
        self.write_framing(BodyLength::Partial(CHUNK_SIZE as u32))
            .map_err(io_error)?;
        self.sink.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }
}

impl Write for LegacyEncryptor<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let amount = buf.len().min(CHUNK_SIZE - self.buffer.len());
        let start = self.buffer.len();
        self.buffer.extend_from_slice(&buf[..amount]);
        self.cfb.encrypt(&mut self.buffer[start..]);

        if self.buffer.len() == CHUNK_SIZE {
            self.flush_chunk()?;
        }
        Ok(amount)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn io_error(err: PgpError) -> io::Error {
    match err {
        PgpError::Io(err) => err,
        PgpError::Crypto(detail) => io::Error::new(io::ErrorKind::Other, detail),
    }
}
