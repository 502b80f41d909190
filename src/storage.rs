//! Named-slot key-value storage backing the task store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

/// Whole-value slots addressed by key. Every write replaces the slot.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// One file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create storage directory '{}'", root.display()))?;
        Ok(Self { root })
    }

    pub fn default_root() -> Result<PathBuf> {
        let data_dir =
            dirs::data_local_dir().ok_or_else(|| anyhow!("unable to determine data directory"))?;
        Ok(data_dir.join("tasklist").join("storage"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read storage slot '{}'", path.display()))?;
        Ok(Some(contents))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = self.root.join(format!(".{key}.json.tmp"));

        fs::write(&tmp_path, value).with_context(|| {
            format!("failed to write temporary slot '{}'", tmp_path.display())
        })?;
        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "failed to atomically rename '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove storage slot '{}'", path.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.items.insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("storage key cannot be empty");
    }
    if key.starts_with('.')
        || !key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
    {
        bail!("invalid storage key '{key}'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_slot_reads_as_none() {
        let temp = TempDir::new().expect("temp dir");
        let storage = FileStorage::open(temp.path()).expect("open storage");
        assert_eq!(storage.get_item("todos").expect("read"), None);
    }

    #[test]
    fn test_set_item_replaces_whole_slot() {
        let temp = TempDir::new().expect("temp dir");
        let mut storage = FileStorage::open(temp.path().join("nested")).expect("open storage");

        storage.set_item("todos", "[1,2,3]").expect("first write");
        storage.set_item("todos", "[]").expect("second write");

        assert_eq!(
            storage.get_item("todos").expect("read"),
            Some("[]".to_string())
        );
        assert!(temp.path().join("nested").join("todos.json").exists());
        assert!(!temp.path().join("nested").join(".todos.json.tmp").exists());
    }

    #[test]
    fn test_remove_item_is_idempotent() {
        let temp = TempDir::new().expect("temp dir");
        let mut storage = FileStorage::open(temp.path()).expect("open storage");
        storage.set_item("todos", "[]").expect("write");

        storage.remove_item("todos").expect("remove");
        storage.remove_item("todos").expect("second remove");

        assert_eq!(storage.get_item("todos").expect("read"), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().expect("temp dir");
        let mut storage = FileStorage::open(temp.path()).expect("open storage");
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.set_item(".hidden", "x").is_err());
        assert!(storage.get_item("").is_err());
        assert!(storage.set_item("todos.corrupt", "x").is_ok());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::with_item("todos", "[]");
        assert_eq!(
            storage.get_item("todos").expect("read"),
            Some("[]".to_string())
        );
        storage.remove_item("todos").expect("remove");
        assert_eq!(storage.get_item("todos").expect("read"), None);
    }
}
