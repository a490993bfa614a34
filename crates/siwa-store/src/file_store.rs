//! File-backed state store under an app-private directory

use crate::store_trait::StateStore;
use siwa_types::{AuthError, AuthResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed `StateStore`: one file per key inside a directory readable
/// only by the application user (0700 directory, 0600 files on unix).
///
/// Writes go through a temporary file and an atomic rename so a crash never
/// leaves a half-written blob behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> AuthResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AuthError::Storage(format!("Failed to create store dir: {}", e)))?;
        restrict_permissions(&dir, 0o700);
        Ok(Self { dir })
    }

    /// Open a store under the platform data directory, namespaced by
    /// `app_name` (e.g. `~/.local/share/<app_name>/auth` on Linux).
    pub fn for_app(app_name: &str) -> AuthResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| AuthError::Storage("No platform data directory".to_string()))?;
        Self::new(base.join(app_name).join("auth"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are caller-controlled identifiers, not user input, but keep
        // them filesystem-safe anyway.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            })
            .collect();
        self.dir.join(format!("{}.blob", name))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    fn put(&self, key: &str, value: &str) -> AuthResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("blob.tmp");

        fs::write(&temp_path, value)
            .map_err(|e| AuthError::Storage(format!("Failed to write {:?}: {}", temp_path, e)))?;
        restrict_permissions(&temp_path, 0o600);

        fs::rename(&temp_path, &path)
            .map_err(|e| AuthError::Storage(format!("Failed to rename {:?}: {}", temp_path, e)))?;

        debug!("Stored blob under key {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed blob under key {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(format!(
                "Failed to remove {:?}: {}",
                path, e
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        warn!("Failed to restrict permissions on {:?}: {}", path, e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) {
    // Windows data directories are per-user already.
}
