//! AES-128-CBC segment encryption (HLS `METHOD=AES-128`)

use std::io::{self, Write};

use aes::Aes128;
use bytes::BytesMut;
use cipher::{BlockEncryptMut, KeyIvInit};

use crate::constants::AES_BLOCK_SIZE;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// Method name written into `#EXT-X-KEY`
pub const AES_128_METHOD: &str = "AES-128";

/// IV for a segment: its sequence number, big-endian, right-aligned
pub fn iv_for_sequence(seq: u64) -> [u8; AES_BLOCK_SIZE] {
    let mut iv = [0u8; AES_BLOCK_SIZE];
    iv[AES_BLOCK_SIZE - 8..].copy_from_slice(&seq.to_be_bytes());
    iv
}

/// Encrypts everything written through it, block by block.
///
/// Whole blocks go out as soon as they are complete; the trailing partial
/// block is padded (PKCS#7) only by [`EncryptingWriter::finish`], so one
/// writer covers exactly one segment.
pub struct EncryptingWriter<W: Write> {
    inner: W,
    cipher: Aes128CbcEnc,
    pending: BytesMut,
}

impl<W: Write> EncryptingWriter<W> {
    pub fn new(inner: W, key: &[u8; AES_BLOCK_SIZE], iv: &[u8; AES_BLOCK_SIZE]) -> Self {
        Self {
            inner,
            cipher: Aes128CbcEnc::new(key.into(), iv.into()),
            pending: BytesMut::with_capacity(AES_BLOCK_SIZE * 64),
        }
    }

    fn encrypt_full_blocks(&mut self) -> io::Result<()> {
        let full = self.pending.len() / AES_BLOCK_SIZE * AES_BLOCK_SIZE;
        if full == 0 {
            return Ok(());
        }
        let mut chunk = self.pending.split_to(full);
        for block in chunk.chunks_exact_mut(AES_BLOCK_SIZE) {
            self.cipher.encrypt_block_mut(aes::Block::from_mut_slice(block));
        }
        self.inner.write_all(&chunk)
    }

    /// Pads and encrypts the last block, flushes, and hands back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        let pad = AES_BLOCK_SIZE - self.pending.len() % AES_BLOCK_SIZE;
        self.pending.extend(std::iter::repeat_n(pad as u8, pad));
        self.encrypt_full_blocks()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for EncryptingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.encrypt_full_blocks()?;
        Ok(buf.len())
    }

    /// Flushes the encrypted blocks only; the partial block waits for `finish`.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
