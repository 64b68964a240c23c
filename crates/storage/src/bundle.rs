//! Model Bundle and Blob Format
//!
//! A blob is the 4-byte magic `HRMB`, a 1-byte format version, then the
//! postcard-encoded [`ModelBundle`].

use crate::StorageError;
use chrono::{DateTime, Utc};
use feature_engine::EncodingTables;
use inference_engine::ForestClassifier;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Blob magic bytes
pub const MAGIC: [u8; 4] = *b"HRMB";

/// Current blob format version
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Trained classifier with the encoding tables it expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub classifier: ForestClassifier,
    pub encoders: EncodingTables,
}

impl ModelBundle {
    /// Bundle a classifier, stamped with the current time
    pub fn new(name: &str, classifier: ForestClassifier, encoders: EncodingTables) -> Self {
        Self {
            name: name.to_string(),
            created_at: Utc::now(),
            classifier,
            encoders,
        }
    }

    /// Validate the forest and encoding tables
    pub fn check(&self) -> Result<(), StorageError> {
        if self.classifier.is_empty() {
            return Err(StorageError::InvalidBundle(format!(
                "bundle '{}' has no trees",
                self.name
            )));
        }
        self.classifier
            .check()
            .map_err(|e| StorageError::InvalidBundle(e.to_string()))?;
        self.encoders
            .check()
            .map_err(|e| StorageError::InvalidBundle(e.to_string()))?;
        Ok(())
    }
}

/// Serialize a bundle into a blob
pub fn encode(bundle: &ModelBundle) -> Result<Vec<u8>, StorageError> {
    bundle.check()?;
    let payload =
        postcard::to_allocvec(bundle).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
    blob.extend_from_slice(&MAGIC);
    blob.push(FORMAT_VERSION);
    blob.extend_from_slice(&payload);
    debug!("Encoded bundle '{}' ({} bytes)", bundle.name, blob.len());
    Ok(blob)
}

/// Parse and re-validate a blob
pub fn decode(blob: &[u8]) -> Result<ModelBundle, StorageError> {
    if blob.len() < HEADER_LEN || blob[..MAGIC.len()] != MAGIC {
        return Err(StorageError::BadMagic);
    }
    let version = blob[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(version));
    }

    let bundle: ModelBundle = postcard::from_bytes(&blob[HEADER_LEN..])
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    bundle.check()?;
    Ok(bundle)
}
