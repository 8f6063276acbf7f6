use super::PersistenceError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::marker::PhantomData;
use std::path::PathBuf;

/// Trait for types that can be persisted in a JsonStore.
pub trait Storable: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

/// Append-only JSON-file-per-record store.
pub struct JsonStore<T> {
    dir: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T: Storable> JsonStore<T> {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            _phantom: PhantomData,
        }
    }

    pub fn ensure_dir(&self) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn file_path(&self, id: &str) -> PathBuf {
        let name: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    /// Write a new record. Existing records are never overwritten.
    pub fn create(&self, data: &T) -> Result<String, PersistenceError> {
        self.ensure_dir()?;
        let path = self.file_path(data.id());
        let json = serde_json::to_string_pretty(data)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PersistenceError::Duplicate(data.id().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(json.as_bytes())?;
        Ok(data.id().to_string())
    }

    /// Load all records, skipping files that fail to read or parse.
    pub fn load_all(&self) -> Result<Vec<T>, PersistenceError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut items = Vec::new();
        let entries = std::fs::read_dir(&self.dir)?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match serde_json::from_str::<T>(&contents) {
                        Ok(data) => items.push(data),
                        Err(e) => tracing::warn!("Skipping unreadable record {:?}: {}", path, e),
                    },
                    Err(e) => {
                        tracing::warn!("Failed to read file {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(items)
    }

    /// Delete every record. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, PersistenceError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Storable for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str) -> Note {
        Note {
            id: id.into(),
            body: "x".into(),
        }
    }

    #[test]
    fn test_create_is_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Note> = JsonStore::new(dir.path().join("notes"));
        store.create(&note("a")).unwrap();
        assert!(matches!(
            store.create(&note("a")),
            Err(PersistenceError::Duplicate(_))
        ));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_load_all_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Note> = JsonStore::new(dir.path().to_path_buf());
        store.create(&note("a")).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();
        assert_eq!(store.load_all().unwrap(), vec![note("a")]);
    }

    #[test]
    fn test_ids_are_sanitized() {
        let store: JsonStore<Note> = JsonStore::new(PathBuf::from("/tmp/x"));
        assert_eq!(
            store.file_path("../etc/passwd"),
            PathBuf::from("/tmp/x/___etc_passwd.json")
        );
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Note> = JsonStore::new(dir.path().join("notes"));
        assert_eq!(store.clear().unwrap(), 0);
        store.create(&note("a")).unwrap();
        store.create(&note("b")).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.load_all().unwrap().is_empty());
    }
}
