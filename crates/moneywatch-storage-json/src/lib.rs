use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use moneywatch_core::{CoreError, KeyValueStore};
use moneywatch_domain::Ledger;

const FILE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed key-value store: one JSON file per key under `root`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), FILE_EXTENSION))
    }

    /// Keys currently present on disk, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "wrote key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Writes a whole ledger as a single pretty-printed JSON document, e.g. for an export.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_ledger(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "key".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_ledger(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keys_map_to_json_files() {
        let temp = tempdir().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();
        assert_eq!(
            store.path_for("moneywatch-accounts"),
            temp.path().join("moneywatch-accounts.json")
        );
        assert_eq!(
            store.path_for("../Escape Me"),
            temp.path().join("___escape_me.json")
        );
    }

    #[test]
    fn save_load_remove() {
        let temp = tempdir().unwrap();
        let store = JsonFileStore::new(temp.path().join("nested")).unwrap();
        assert_eq!(store.load("moneywatch-budgets").unwrap(), None);

        store.save("moneywatch-budgets", "[]").unwrap();
        assert_eq!(store.load("moneywatch-budgets").unwrap().as_deref(), Some("[]"));
        assert!(!tmp_path(&store.path_for("moneywatch-budgets")).exists());
        assert_eq!(store.keys().unwrap(), vec!["moneywatch-budgets".to_string()]);

        store.remove("moneywatch-budgets").unwrap();
        store.remove("moneywatch-budgets").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let temp = tempdir().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();
        fs::create_dir_all(store.path_for("moneywatch-categories")).unwrap();
        assert!(matches!(
            store.load("moneywatch-categories"),
            Err(CoreError::Io(_))
        ));
    }

    #[test]
    fn whole_ledger_export_round_trips() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("export.json");
        let mut ledger = Ledger::new();
        ledger.categories.insert("Pets");
        save_ledger_to_path(&ledger, &path).unwrap();
        assert_eq!(load_ledger_from_path(&path).unwrap(), ledger);
    }
}
