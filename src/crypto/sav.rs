//! `.sav` container decryption.
//!
//! Layout, outermost first: AES-256-ECB blocks → PKCS#7 padding →
//! zlib (occasionally raw deflate) stream → plaintext YAML. The last
//! 8 bytes of the compressed body are a footer: big-endian adler32 of
//! the plaintext followed by its little-endian length. The AES key is
//! the shipped base key with its first 8 bytes XORed against the
//! little-endian numeric account id.

use std::io::Read;

use adler::adler32_slice;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, KeyInit};
use aes::Aes256;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use thiserror::Error;

const BLOCK: usize = 16;

const BASE_KEY: [u8; 32] = [
    0x35, 0xEC, 0x33, 0x77, 0xF3, 0x5D, 0xB0, 0xEA, 0xBE, 0x6B, 0x83, 0x11, 0x54, 0x03, 0xEB,
    0xFB, 0x27, 0x25, 0x64, 0x2E, 0xD5, 0x49, 0x06, 0x29, 0x05, 0x78, 0xBD, 0x60, 0xBA, 0x4A,
    0xA7, 0x87,
];

#[derive(Debug, Error)]
pub enum SavError {
    #[error("account id must contain digits")]
    EmptyAccountId,

    #[error("account id is not a valid number: {0}")]
    BadAccountId(#[from] std::num::ParseIntError),

    #[error("input size {0} is not a multiple of 16")]
    BadLength(usize),

    #[error("corrupt compressed stream (zlib: {zlib}; deflate: {deflate})")]
    CorruptStream { zlib: String, deflate: String },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },
}

/// Derive the AES-256 key for one account.
///
/// Non-digit characters in the id are ignored so pasted ids with
/// stray whitespace still work.
pub fn derive_key(account_id: &str) -> Result<[u8; 32], SavError> {
    let digits: String = account_id
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(SavError::EmptyAccountId);
    }

    let id = digits.parse::<u64>()?;
    let id_le = id.to_le_bytes();

    let mut key = BASE_KEY;
    for (idx, byte) in key.iter_mut().take(8).enumerate() {
        *byte ^= id_le[idx];
    }

    Ok(key)
}

/// Decrypt an encrypted save to its plaintext YAML bytes.
pub fn decrypt_sav(encrypted: &[u8], account_id: &str) -> Result<Vec<u8>, SavError> {
    if encrypted.is_empty() || encrypted.len() % BLOCK != 0 {
        return Err(SavError::BadLength(encrypted.len()));
    }

    let key = derive_key(account_id)?;
    let mut buffer = encrypted.to_vec();
    aes_ecb_decrypt(&mut buffer, &key);

    // Some writers emit unpadded bodies; fall back to the raw buffer.
    let body = pkcs7_unpad(BLOCK, &buffer).unwrap_or(buffer);

    let mut plaintext = Vec::new();
    let mut zlib = ZlibDecoder::new(&body[..]);
    if let Err(zlib_err) = zlib.read_to_end(&mut plaintext) {
        plaintext.clear();
        let mut deflate = DeflateDecoder::new(&body[..]);
        if let Err(deflate_err) = deflate.read_to_end(&mut plaintext) {
            return Err(SavError::CorruptStream {
                zlib: zlib_err.to_string(),
                deflate: deflate_err.to_string(),
            });
        }
    }

    if body.len() >= 8 {
        let footer = &body[body.len() - 8..];
        let expected_adler = u32::from_be_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let expected_len = u32::from_le_bytes([footer[4], footer[5], footer[6], footer[7]]);
        let actual_adler = adler32_slice(&plaintext);
        if actual_adler != expected_adler {
            return Err(SavError::ChecksumMismatch {
                expected: expected_adler,
                actual: actual_adler,
            });
        }
        if plaintext.len() as u32 != expected_len {
            return Err(SavError::LengthMismatch {
                expected: expected_len,
                actual: plaintext.len(),
            });
        }
    }

    Ok(plaintext)
}

fn aes_ecb_decrypt(data: &mut [u8], key: &[u8; 32]) {
    let mut cipher = Aes256::new(GenericArray::from_slice(key));
    for chunk in data.chunks_exact_mut(BLOCK) {
        cipher.decrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
}

fn pkcs7_unpad(block_size: usize, data: &[u8]) -> Result<Vec<u8>, ()> {
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(());
    }
    let pad_len = *data.last().ok_or(())? as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
        return Err(());
    }
    if !data[data.len() - pad_len..]
        .iter()
        .all(|&byte| byte as usize == pad_len)
    {
        return Err(());
    }
    Ok(data[..data.len() - pad_len].to_vec())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use aes::cipher::BlockEncryptMut;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;

    const ACCOUNT_ID: &str = "76561197960521364";

    /// Inverse of `decrypt_sav`, used to build fixtures.
    fn encrypt_sav(plaintext: &[u8], account_id: &str) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(9));
        encoder.write_all(plaintext).unwrap();
        let mut compressed = encoder.finish().unwrap();

        compressed.extend_from_slice(&adler32_slice(plaintext).to_be_bytes());
        compressed.extend_from_slice(&(plaintext.len() as u32).to_le_bytes());

        let pad_len = BLOCK - (compressed.len() % BLOCK);
        compressed.extend(std::iter::repeat(pad_len as u8).take(pad_len));

        let key = derive_key(account_id).unwrap();
        let mut cipher = Aes256::new(GenericArray::from_slice(&key));
        for chunk in compressed.chunks_exact_mut(BLOCK) {
            cipher.encrypt_block_mut(GenericArray::from_mut_slice(chunk));
        }
        compressed
    }

    #[test]
    fn derive_key_mixes_only_first_eight_bytes() {
        let key = derive_key(ACCOUNT_ID).unwrap();
        assert_eq!(&key[8..], &BASE_KEY[8..]);
        let id_le = 76561197960521364u64.to_le_bytes();
        assert_eq!(key[0], BASE_KEY[0] ^ id_le[0]);
    }

    #[test]
    fn derive_key_ignores_non_digits() {
        let spaced = derive_key(" 76561197960521364 ").unwrap();
        assert_eq!(spaced, derive_key(ACCOUNT_ID).unwrap());
    }

    #[test]
    fn derive_key_rejects_digitless_input() {
        assert!(matches!(derive_key("steam"), Err(SavError::EmptyAccountId)));
    }

    #[test]
    fn round_trip() {
        let yaml = b"state:\n  inventory:\n    items: {}\n";
        let encrypted = encrypt_sav(yaml, ACCOUNT_ID);
        assert_eq!(encrypted.len() % BLOCK, 0);
        let decrypted = decrypt_sav(&encrypted, ACCOUNT_ID).unwrap();
        assert_eq!(decrypted, yaml);
    }

    #[test]
    fn wrong_key_fails() {
        let encrypted = encrypt_sav(b"state: {}\n", ACCOUNT_ID);
        // Wrong key garbles the stream; exactly where it trips depends
        // on the bytes, but it must never decrypt cleanly.
        assert!(decrypt_sav(&encrypted, "76561197960000000").is_err());
    }

    #[test]
    fn rejects_unaligned_input() {
        assert!(matches!(
            decrypt_sav(&[0u8; 17], ACCOUNT_ID),
            Err(SavError::BadLength(17))
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            decrypt_sav(&[], ACCOUNT_ID),
            Err(SavError::BadLength(0))
        ));
    }

    #[test]
    fn pkcs7_unpad_rejects_bad_padding() {
        assert!(pkcs7_unpad(BLOCK, &[0u8; 16]).is_err());
        let mut block = [4u8; 16];
        block[15] = 17; // pad length above block size
        assert!(pkcs7_unpad(BLOCK, &block).is_err());
    }
}
