//! Keyed on-disk store for processing results.
//!
//! One JSON document per key under a root directory. Saves write to a
//! temporary file in the same directory and rename it over the target, so a
//! reader never observes a partially-written document and concurrent writers
//! for the same key resolve to whichever rename lands last.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::debug;

use crate::error::StoreError;
use crate::ProcessingResult;

/// File-backed keyed store with load/save/clear semantics.
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Save `result` under `key`, replacing any previous entry atomically.
    pub fn save(&self, key: &str, result: &ProcessingResult) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        let target = self.entry_path(key);
        let tmp = target.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(result)?;

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &target)?;

        debug!("[ResultStore] saved {} ({} bytes)", key, body.len());
        Ok(())
    }

    /// Load the entry for `key`, or `None` when no entry exists.
    pub fn load(&self, key: &str) -> Result<Option<ProcessingResult>, StoreError> {
        let body = match fs::read(self.entry_path(key)) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Remove the entry for `key`. Returns whether an entry existed.
    pub fn clear(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys come from caller-controlled identifiers; keep them inside the
        // root by mapping everything else to '_'.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}
