use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DashboardError;

/// Where the session token lives between runs.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<(), DashboardError>;
    fn remove(&self) -> Result<(), DashboardError>;
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// Plain JSON file, owner read/write only.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let file: SessionFile = serde_json::from_str(&content).ok()?;
        file.access_token.filter(|t| !t.trim().is_empty())
    }

    fn set(&self, token: &str) -> Result<(), DashboardError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DashboardError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&SessionFile {
            access_token: Some(token.trim().to_string()),
        })?;
        fs::write(&self.path, json).map_err(|e| DashboardError::Storage(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)
                .map_err(|e| DashboardError::Storage(e.to_string()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .map_err(|e| DashboardError::Storage(e.to_string()))?;
        }

        debug!(path = ?self.path, "session token stored");
        Ok(())
    }

    fn remove(&self) -> Result<(), DashboardError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| DashboardError::Storage(e.to_string()))?;
            debug!(path = ?self.path, "session token removed");
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_has_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        assert_eq!(store.get(), None);
        assert!(store.remove().is_ok());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));
        store.set("  abc.def.ghi \n").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc.def.ghi"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("accessToken"));

        store.remove().unwrap();
        assert_eq!(store.get(), None);
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        store.set("tok").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_blank_or_corrupt_file_has_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"accessToken":"   "}"#).unwrap();
        assert_eq!(FileTokenStore::new(path.clone()).get(), None);
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileTokenStore::new(path).get(), None);
    }
}
