//! Trait definitions for the pipeline's external capabilities.
//!
//! Three seams keep the controller free of I/O:
//! - DecryptorProvider / SaveDecryptor: obtaining and using the save
//!   decryption capability (modelled as a separate load step because
//!   the capability may live in a lazily-loaded module)
//! - DocumentParser: decrypted bytes → document tree
//! - SerialSink: the bulk submission endpoint

use thiserror::Error;

use crate::client::{BulkCounts, ClientError};
use crate::crypto::{self, SavError};
use crate::pipeline::types::SerialBatch;

/// Failure to obtain the decryption capability.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

/// Decrypts raw save bytes with account-derived key material.
pub trait SaveDecryptor: Send + Sync {
    fn decrypt(&self, encrypted: &[u8], account_id: &str) -> Result<Vec<u8>, SavError>;
}

/// Yields a ready `SaveDecryptor`, or fails if the capability cannot
/// be loaded.
pub trait DecryptorProvider: Send + Sync {
    fn load(&self) -> Result<Box<dyn SaveDecryptor>, CapabilityError>;
}

/// Parses decrypted bytes into the untyped save-document tree.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<serde_yaml::Value, serde_yaml::Error>;
}

/// Accepts one batch of serials and reports the remote accounting.
pub trait SerialSink: Send + Sync {
    fn submit_batch(&self, batch: &SerialBatch) -> Result<BulkCounts, ClientError>;
}

/// The in-process decryptor backed by `crypto::sav`.
pub struct BuiltinDecryptor;

impl SaveDecryptor for BuiltinDecryptor {
    fn decrypt(&self, encrypted: &[u8], account_id: &str) -> Result<Vec<u8>, SavError> {
        crypto::decrypt_sav(encrypted, account_id)
    }
}

/// Provider for the built-in decryptor. Loading cannot fail here, but
/// the seam stays so alternative providers (or tests) can.
pub struct BuiltinDecryptorProvider;

impl DecryptorProvider for BuiltinDecryptorProvider {
    fn load(&self) -> Result<Box<dyn SaveDecryptor>, CapabilityError> {
        Ok(Box::new(BuiltinDecryptor))
    }
}

/// YAML parser for decrypted save documents.
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn parse(&self, bytes: &[u8]) -> Result<serde_yaml::Value, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }
}
