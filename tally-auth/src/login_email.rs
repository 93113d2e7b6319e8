use std::fs;
use std::path::PathBuf;

use crate::error::AuthError;

/// "Remember me" storage for the login email.
///
/// This is the only thing Tally keeps on disk; the bearer token never is.
pub struct LoginEmailStore {
    email_path: PathBuf,
}

impl LoginEmailStore {
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("tally");

        Ok(Self::in_dir(cache_dir))
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            email_path: dir.into().join("login_email"),
        }
    }

    pub fn load(&self) -> Result<Option<String>, AuthError> {
        if !self.email_path.exists() {
            return Ok(None);
        }

        let email = fs::read_to_string(&self.email_path)?.trim().to_string();
        Ok((!email.is_empty()).then_some(email))
    }

    pub fn remember(&self, email: &str) -> Result<(), AuthError> {
        if let Some(dir) = self.email_path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                AuthError::Storage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        fs::write(&self.email_path, email)
            .map_err(|e| AuthError::Storage(format!("Failed to save login email: {}", e)))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.email_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.email_path, perms)?;
        }

        Ok(())
    }

    pub fn forget(&self) -> Result<(), AuthError> {
        if self.email_path.exists() {
            fs::remove_file(&self.email_path)
                .map_err(|e| AuthError::Storage(format!("Failed to delete login email: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_load_forget() {
        let dir = tempfile::tempdir().unwrap();
        let store = LoginEmailStore::in_dir(dir.path().join("tally"));

        assert_eq!(store.load().unwrap(), None);

        store.remember("owner@tally.kr").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("owner@tally.kr"));

        store.forget().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Forgetting twice is fine
        store.forget().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = LoginEmailStore::in_dir(dir.path());
        store.remember("owner@tally.kr").unwrap();

        let mode = fs::metadata(dir.path().join("login_email"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
