//! services/client/src/adapters/storage.rs
//!
//! A file-backed key-value store standing in for browser local storage.
//! It implements the `CredentialStore` port from the `core` crate.

use day_trip_core::{
    domain::Credential,
    ports::{CredentialStore, PortError, PortResult},
};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// The key the credential lives under.
const TOKEN_KEY: &str = "token";

/// Persists the session credential as one entry of a JSON object on disk.
/// Other keys in the file are preserved.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_entries(&self) -> PortResult<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PortError::Unexpected(format!("corrupt storage file {:?}: {}", self.path, e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|e| PortError::Unexpected(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> PortResult<Option<Credential>> {
        Ok(self
            .read_entries()?
            .remove(TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(Credential::new))
    }

    fn save(&self, credential: &Credential) -> PortResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), credential.as_str().to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> PortResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
