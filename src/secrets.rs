//! Directory-backed secret store.
//!
//! Container runtimes mount secrets as one file per secret under a fixed
//! directory. [`SecretFileSystem`] reads them with case-insensitive,
//! prefix-filtered lookup: a store with prefix `CONNECTION_CREDENTIALS`
//! serves `get("pg")` from `connection_credentials_pg` or
//! `CONNECTION_CREDENTIALS_PG`. All I/O is blocking `std::fs`, performed
//! once during manager initialization.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConnectionError;

/// Default secret directory of container runtimes.
pub const DEFAULT_SECRETS_ROOT: &str = "/run/secrets";

/// A directory of secret files with prefix-scoped, case-insensitive names.
#[derive(Debug, Clone)]
pub struct SecretFileSystem {
    root: PathBuf,
    prefix: String,
}

impl Default for SecretFileSystem {
    fn default() -> Self {
        SecretFileSystem::new(DEFAULT_SECRETS_ROOT, "")
    }
}

impl SecretFileSystem {
    /// Creates a store over `root`. A non-blank `prefix` scopes every
    /// lookup and listing to names carrying it.
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> SecretFileSystem {
        SecretFileSystem {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// The directory this store reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the secret named `code`.
    ///
    /// The code is lower-cased and prefixed (unless it already carries the
    /// prefix); the lower-case file name is tried first, then the upper-case
    /// one. A missing file is `None`.
    ///
    /// # Errors
    ///
    /// I/O failures other than the file being absent.
    pub fn get(&self, code: &str) -> Result<Option<String>, ConnectionError> {
        let name = self.qualified_name(code);
        for candidate in [name.clone(), name.to_uppercase()] {
            match fs::read_to_string(self.root.join(&candidate)) {
                Ok(content) => return Ok(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Lists the names of the secret files passing the prefix filter.
    /// A missing root directory is an empty list.
    ///
    /// # Errors
    ///
    /// I/O failures other than the root being absent.
    pub fn list(&self) -> Result<Vec<String>, ConnectionError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if self.name_in_scope(&name) && entry.file_type()?.is_file() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn qualified_name(&self, code: &str) -> String {
        let code = code.to_lowercase();
        let prefix = self.prefix.to_lowercase();
        if prefix.trim().is_empty()
            || code == prefix
            || code.starts_with(&format!("{prefix}_"))
        {
            code
        } else {
            format!("{prefix}_{code}")
        }
    }

    fn name_in_scope(&self, name: &str) -> bool {
        let prefix = self.prefix.to_lowercase();
        if prefix.trim().is_empty() {
            return true;
        }
        let name = name.to_lowercase();
        name == prefix || name.starts_with(&format!("{prefix}_"))
    }
}
