use crate::error::PestGuardError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted `username → password` mapping.
///
/// Kept as a JSON object so entries keep their file order and values that are
/// not strings survive a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accounts(Map<String, Value>);

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.0.contains_key(username)
    }

    /// Stored password, if the entry exists and is a string.
    pub fn password(&self, username: &str) -> Option<&str> {
        self.0.get(username).and_then(Value::as_str)
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.password(username) == Some(password)
    }

    /// Insert only when `username` is absent. Returns whether an entry was added.
    pub fn insert_if_absent(&mut self, username: &str, password: &str) -> bool {
        if self.contains(username) {
            return false;
        }
        self.0
            .insert(username.to_string(), Value::String(password.to_string()));
        true
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Accounts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// The account file on disk: a flat, pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct AccountFile {
    path: PathBuf,
}

impl AccountFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temporary file: the full file name with `.tmp` appended.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the mapping. A missing or empty file is an empty mapping; anything
    /// else that cannot be read or parsed is `StorageUnreadable`.
    pub fn read(&self) -> Result<Accounts, PestGuardError> {
        if !self.path.exists() {
            return Ok(Accounts::new());
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| PestGuardError::unreadable(&self.path, e))?;

        if contents.trim().is_empty() {
            return Ok(Accounts::new());
        }

        match serde_json::from_str::<Value>(&contents)
            .map_err(|e| PestGuardError::unreadable(&self.path, e))?
        {
            Value::Object(map) => Ok(Accounts(map)),
            // A JSON `null` reads as no accounts.
            Value::Null => Ok(Accounts::new()),
            other => Err(PestGuardError::unreadable(
                &self.path,
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
        }
    }

    /// Read the mapping, treating any failure as an empty store.
    pub fn read_or_empty(&self) -> Accounts {
        self.read().unwrap_or_else(|e| {
            tracing::warn!("{e}; treating account store as empty");
            Accounts::new()
        })
    }

    /// Rewrite the whole file atomically (temporary file + rename).
    pub fn write(&self, accounts: &Accounts) -> Result<(), PestGuardError> {
        let contents = serde_json::to_string_pretty(accounts)
            .map_err(|e| PestGuardError::write_failed(&self.path, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PestGuardError::write_failed(&self.path, e))?;
            }
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, contents)
            .map_err(|e| PestGuardError::write_failed(&self.path, e))?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PestGuardError::write_failed(&self.path, e)
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let file = AccountFile::new(dir.path().join("users.json"));
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "{not json").unwrap();

        let file = AccountFile::new(&path);
        assert!(matches!(
            file.read(),
            Err(PestGuardError::StorageUnreadable { .. })
        ));
        assert!(file.read_or_empty().is_empty());
    }

    #[test]
    fn test_array_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = AccountFile::new(&path).read().unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_pretty_two_space_format_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let file = AccountFile::new(&path);

        let accounts: Accounts = [("zoe", "pw1"), ("adam", "密码")].into_iter().collect();
        file.write(&accounts).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"zoe\": \"pw1\",\n  \"adam\": \"密码\"\n}");
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[test]
    fn test_non_string_password_never_matches_and_survives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, r#"{"legacy": 1234}"#).unwrap();

        let file = AccountFile::new(&path);
        let mut accounts = file.read().unwrap();
        assert!(!accounts.matches("legacy", "1234"));
        assert!(!accounts.insert_if_absent("legacy", "new"));

        file.write(&accounts).unwrap();
        let reread = file.read().unwrap();
        assert_eq!(reread, accounts);
    }

    #[test]
    fn test_temp_file_keeps_full_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.db");
        let file = AccountFile::new(&path);
        assert_eq!(file.tmp_path(), dir.path().join("accounts.db.tmp"));

        file.write(&[("farmer", "litchi")].into_iter().collect()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("accounts.db")]);
        assert_eq!(file.read().unwrap().password("farmer"), Some("litchi"));
    }
}
