use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs::home_dir;

use super::KeyValueBackend;
use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".tracker_core";
const BLOB_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Returns the application data directory, defaulting to `~/.tracker_core`.
///
/// `TRACKER_CORE_HOME` overrides the location.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("TRACKER_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Stores each key as a standalone `<key>.json` file inside a base directory.
///
/// Writes are staged to a temporary sibling and renamed into place so a
/// crashed write never leaves a half-written blob behind.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    base: PathBuf,
}

impl JsonFileBackend {
    pub fn new(base: Option<PathBuf>) -> Result<Self> {
        let base = base.unwrap_or_else(app_data_dir);
        ensure_dir(&base)?;
        Ok(Self { base })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{}.{}", key, BLOB_EXTENSION))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.blob_path(key);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let tmp = tmp_path(&path);
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_with_temp_dir() -> (JsonFileBackend, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let backend = JsonFileBackend::new(Some(temp.path().to_path_buf())).expect("backend");
        (backend, temp)
    }

    #[test]
    fn write_then_read_roundtrips() {
        let (backend, _guard) = backend_with_temp_dir();
        backend.write("sample", "{\"a\":1}").expect("write");
        let value = backend.read("sample").expect("read");
        assert_eq!(value.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn read_missing_key_is_none() {
        let (backend, _guard) = backend_with_temp_dir();
        assert!(backend.read("absent").expect("read").is_none());
    }

    #[test]
    fn remove_is_silent_for_missing_keys() {
        let (backend, _guard) = backend_with_temp_dir();
        backend.remove("absent").expect("remove");
        backend.write("gone", "x").expect("write");
        backend.remove("gone").expect("remove");
        assert!(backend.read("gone").expect("read").is_none());
    }

    #[test]
    fn write_leaves_no_staging_file_behind() {
        let (backend, guard) = backend_with_temp_dir();
        backend.write("blob", "{}").expect("write");
        let leftovers: Vec<_> = fs::read_dir(guard.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext == TMP_SUFFIX)
                    .unwrap_or(false)
            })
            .collect();
        assert!(leftovers.is_empty());
    }
}
