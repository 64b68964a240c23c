//! Model Storage
//!
//! Persists trained classifiers together with the encoding tables they were
//! trained against, as versioned postcard blobs.

mod bundle;
mod store;

pub use bundle::{decode, encode, ModelBundle, FORMAT_VERSION, MAGIC};
pub use store::{FileModelStore, MemoryModelStore, ModelHandle, ModelStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Model not found: {0}")]
    NotFound(ModelHandle),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Not a model bundle (bad magic)")]
    BadMagic,
    #[error("Unsupported bundle format version {0}")]
    UnsupportedVersion(u8),
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),
    #[error("Lock error: {0}")]
    Lock(String),
}
