//! Key/value storage for the auth session and sign-in hints.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AuthError, AuthResult};

/// Email the magic link was last requested for.
pub const PENDING_EMAIL_KEY: &str = "pendingEmail";
/// Serialized [`docsmith_models::AuthSession`].
pub const SESSION_KEY: &str = "session";
/// PKCE verifier matching the challenge sent with the last link request.
pub const CODE_VERIFIER_KEY: &str = "codeVerifier";

pub trait AuthStorage: Send + Sync {
    fn get(&self, key: &str) -> AuthResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AuthResult<()>;

    fn remove(&self, key: &str) -> AuthResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuthStorage for MemoryStorage {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AuthResult<Map<String, Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => return Err(error.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(AuthError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, values: &Map<String, Value>) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuthStorage for FileStorage {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let _guard = self.guard();
        Ok(self
            .read_all()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        let _guard = self.guard();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        let _guard = self.guard();
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(PENDING_EMAIL_KEY).unwrap(), None);

        storage.set(PENDING_EMAIL_KEY, "reader@example.com").unwrap();
        assert_eq!(
            storage.get(PENDING_EMAIL_KEY).unwrap().as_deref(),
            Some("reader@example.com")
        );

        storage.remove(PENDING_EMAIL_KEY).unwrap();
        assert_eq!(storage.get(PENDING_EMAIL_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth.json");

        let storage = FileStorage::new(&path);
        storage.set(CODE_VERIFIER_KEY, "verifier").unwrap();
        storage.set(PENDING_EMAIL_KEY, "reader@example.com").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(CODE_VERIFIER_KEY).unwrap().as_deref(), Some("verifier"));

        reopened.remove(CODE_VERIFIER_KEY).unwrap();
        assert_eq!(storage.get(CODE_VERIFIER_KEY).unwrap(), None);
        assert_eq!(
            storage.get(PENDING_EMAIL_KEY).unwrap().as_deref(),
            Some("reader@example.com")
        );
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));

        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
        storage.remove(SESSION_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_non_object_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get(SESSION_KEY), Err(AuthError::Storage(_))));
    }
}
