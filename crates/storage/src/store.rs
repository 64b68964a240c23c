//! Model Stores

use crate::bundle::{decode, encode, ModelBundle};
use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// File extension of stored bundles
const EXTENSION: &str = "model";

/// Identifier of a stored bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelHandle(Uuid);

impl ModelHandle {
    /// Fresh random handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Save and load model bundles
pub trait ModelStore: Send + Sync {
    /// Persist a bundle under a new handle
    fn save(&self, bundle: &ModelBundle) -> Result<ModelHandle, StorageError>;

    /// Load and re-validate a bundle
    fn load(&self, handle: &ModelHandle) -> Result<ModelBundle, StorageError>;

    /// Handles of every stored bundle
    fn list(&self) -> Result<Vec<ModelHandle>, StorageError>;
}

/// In-memory store holding encoded blobs
#[derive(Default)]
pub struct MemoryModelStore {
    blobs: Mutex<HashMap<ModelHandle, Vec<u8>>>,
}

impl MemoryModelStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory model store");
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ModelHandle, Vec<u8>>>, StorageError> {
        self.blobs
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, bundle: &ModelBundle) -> Result<ModelHandle, StorageError> {
        let blob = encode(bundle)?;
        let handle = ModelHandle::new();
        self.lock()?.insert(handle, blob);
        debug!("Stored bundle '{}' as {}", bundle.name, handle);
        Ok(handle)
    }

    fn load(&self, handle: &ModelHandle) -> Result<ModelBundle, StorageError> {
        let blobs = self.lock()?;
        let blob = blobs.get(handle).ok_or(StorageError::NotFound(*handle))?;
        decode(blob)
    }

    fn list(&self) -> Result<Vec<ModelHandle>, StorageError> {
        Ok(self.lock()?.keys().copied().collect())
    }
}

/// Directory of `<handle>.model` files
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    /// Open a store rooted at `dir`, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Opened model store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a bundle file
    pub fn path(&self, handle: &ModelHandle) -> PathBuf {
        self.dir.join(format!("{}.{}", handle, EXTENSION))
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, bundle: &ModelBundle) -> Result<ModelHandle, StorageError> {
        let blob = encode(bundle)?;
        let handle = ModelHandle::new();
        let path = self.path(&handle);

        // Readers never see a partial file
        let staging = path.with_extension("tmp");
        fs::write(&staging, &blob)?;
        fs::rename(&staging, &path)?;

        info!(
            "Saved bundle '{}' to {} ({} bytes)",
            bundle.name,
            path.display(),
            blob.len()
        );
        Ok(handle)
    }

    fn load(&self, handle: &ModelHandle) -> Result<ModelBundle, StorageError> {
        let path = self.path(handle);
        let blob = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(*handle),
            _ => StorageError::Io(e),
        })?;
        let bundle = decode(&blob)?;
        debug!("Loaded bundle '{}' from {}", bundle.name, path.display());
        Ok(bundle)
    }

    fn list(&self) -> Result<Vec<ModelHandle>, StorageError> {
        let mut handles = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(handle) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
            {
                handles.push(handle);
            }
        }
        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{FORMAT_VERSION, MAGIC};
    use feature_engine::{EncodingTables, Feature};
    use inference_engine::{DecisionTree, ForestClassifier, TreeNode};

    fn bundle(name: &str) -> ModelBundle {
        let tree = DecisionTree::new(vec![
            TreeNode::Split {
                feature: Feature::Stroke.index(),
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf {
                distribution: [80.0, 20.0],
            },
            TreeNode::Leaf {
                distribution: [30.0, 70.0],
            },
        ])
        .unwrap();
        let forest = ForestClassifier::new(name, vec![tree]).unwrap();
        ModelBundle::new(name, forest, EncodingTables::default())
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("heart-risk-store-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_save_load() {
        let store = MemoryModelStore::new();
        let original = bundle("memory");
        let handle = store.save(&original).unwrap();
        assert_eq!(store.load(&handle).unwrap(), original);
        assert_eq!(store.list().unwrap(), vec![handle]);
    }

    #[test]
    fn test_memory_store_not_found() {
        let store = MemoryModelStore::new();
        let missing = ModelHandle::new();
        assert!(matches!(
            store.load(&missing),
            Err(StorageError::NotFound(h)) if h == missing
        ));
    }

    #[test]
    fn test_file_store_save_load_list() {
        let dir = scratch_dir();
        let store = FileModelStore::open(&dir).unwrap();

        let first = store.save(&bundle("first")).unwrap();
        let second = store.save(&bundle("second")).unwrap();
        assert!(store.path(&first).exists());

        assert_eq!(store.load(&first).unwrap().name, "first");
        assert_eq!(store.load(&second).unwrap().name, "second");

        let mut listed = store.list().unwrap();
        listed.sort_by_key(|h| h.to_string());
        let mut expected = vec![first, second];
        expected.sort_by_key(|h| h.to_string());
        assert_eq!(listed, expected);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_missing_and_corrupt() {
        let dir = scratch_dir();
        let store = FileModelStore::open(&dir).unwrap();

        let missing = ModelHandle::new();
        assert!(matches!(store.load(&missing), Err(StorageError::NotFound(_))));

        let corrupt = ModelHandle::new();
        fs::write(store.path(&corrupt), b"not a model").unwrap();
        assert!(matches!(store.load(&corrupt), Err(StorageError::BadMagic)));

        let future = ModelHandle::new();
        let mut blob = MAGIC.to_vec();
        blob.push(FORMAT_VERSION + 1);
        fs::write(store.path(&future), blob).unwrap();
        assert!(matches!(
            store.load(&future),
            Err(StorageError::UnsupportedVersion(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_handle_parse() {
        let handle = ModelHandle::new();
        let parsed: ModelHandle = handle.to_string().parse().unwrap();
        assert_eq!(parsed, handle);
        assert!("not-a-uuid".parse::<ModelHandle>().is_err());
    }
}
