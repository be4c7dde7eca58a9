//! Save-file decryption.
//!
//! The `.sav` container is AES-256-ECB over a zlib stream with an
//! adler32 + length footer; the key is derived from the owner's
//! numeric account id. `sav` implements the full unwrap chain.

pub mod sav;

pub use sav::{decrypt_sav, derive_key, SavError};
