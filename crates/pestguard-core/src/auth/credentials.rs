use super::accounts::{AccountFile, Accounts};
use crate::error::PestGuardError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Account auto-provisioned into the store on login attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAccount {
    username: String,
    password: String,
}

impl DefaultAccount {
    /// `None` when either field is empty, which disables provisioning.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Login and registration against the JSON account file.
///
/// Every call re-reads the file, so edits made by other processes between
/// calls are picked up. Each call's read-modify-write runs under one lock.
pub struct CredentialStore {
    file: AccountFile,
    default_account: Option<DefaultAccount>,
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AccountFile::new(path),
            default_account: None,
            lock: Mutex::new(()),
        }
    }

    pub fn with_default_account(mut self, account: Option<DefaultAccount>) -> Self {
        self.default_account = account;
        self
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk, so a poisoned lock carries no torn data.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check a login. Provisions the default account if it is missing and
    /// writes the mapping back whatever the outcome; write failures are only
    /// logged.
    pub fn validate(&self, username: &str, password: &str) -> bool {
        let _guard = self.guard();

        let mut accounts = self.file.read_or_empty();

        if let Some(ref default) = self.default_account {
            if accounts.insert_if_absent(&default.username, &default.password) {
                tracing::info!(username = %default.username, "provisioned default account");
            }
        }

        let ok = accounts.matches(username, password);

        if let Err(e) = self.file.write(&accounts) {
            tracing::warn!("{e}; login result unaffected");
        }

        tracing::debug!(username, ok, "login attempt");
        ok
    }

    /// Create a new account.
    pub fn register(&self, username: &str, password: &str) -> Result<(), PestGuardError> {
        if username.is_empty() {
            return Err(PestGuardError::InvalidInput("username is empty".into()));
        }
        if password.is_empty() {
            return Err(PestGuardError::InvalidInput("password is empty".into()));
        }

        let _guard = self.guard();

        let mut accounts = self.file.read_or_empty();
        if !accounts.insert_if_absent(username, password) {
            return Err(PestGuardError::AlreadyExists(username.to_string()));
        }

        self.file.write(&accounts)?;
        tracing::info!(username, "registered account");
        Ok(())
    }

    /// Registration form flow: trims the username and requires the password
    /// to be typed twice.
    pub fn register_with_confirmation(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), PestGuardError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(PestGuardError::InvalidInput(
                "username and password are required".into(),
            ));
        }
        if password != confirmation {
            return Err(PestGuardError::PasswordMismatch);
        }
        self.register(username, password)
    }

    pub fn contains(&self, username: &str) -> bool {
        let _guard = self.guard();
        self.file.read_or_empty().contains(username)
    }

    pub fn usernames(&self) -> Vec<String> {
        let _guard = self.guard();
        self.file
            .read_or_empty()
            .usernames()
            .map(str::to_string)
            .collect()
    }

    /// Current persisted mapping (empty if unreadable).
    pub fn accounts(&self) -> Accounts {
        let _guard = self.guard();
        self.file.read_or_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("users.json"))
            .with_default_account(DefaultAccount::new("123456", "123456"))
    }

    #[test]
    fn test_default_account_requires_both_fields() {
        assert!(DefaultAccount::new("", "pw").is_none());
        assert!(DefaultAccount::new("admin", "").is_none());
        assert_eq!(
            DefaultAccount::new("admin", "pw").unwrap().username(),
            "admin"
        );
    }

    #[test]
    fn test_failed_login_still_persists_default() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(!store.validate("nobody", "wrong"));
        assert!(store.path().exists());
        assert!(store.contains("123456"));
    }

    #[test]
    fn test_default_never_overwrites_existing_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"123456": "changed"}"#).unwrap();

        let store = store(&dir);
        assert!(!store.validate("123456", "123456"));
        assert!(store.validate("123456", "changed"));
    }

    #[test]
    fn test_without_default_account_nothing_is_provisioned() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));

        assert!(!store.validate("123456", "123456"));
        assert!(store.usernames().is_empty());
    }

    #[test]
    fn test_confirmation_mismatch_leaves_storage_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store
            .register_with_confirmation("farmer", "abc", "abd")
            .unwrap_err();
        assert!(matches!(err, PestGuardError::PasswordMismatch));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_confirmation_trims_username() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .register_with_confirmation("  farmer  ", "abc", "abc")
            .unwrap();
        assert!(store.validate("farmer", "abc"));
    }

    #[test]
    fn test_blank_username_is_invalid_on_form() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store
            .register_with_confirmation("   ", "abc", "abc")
            .unwrap_err();
        assert!(matches!(err, PestGuardError::InvalidInput(_)));
    }
}
