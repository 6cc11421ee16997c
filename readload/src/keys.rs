//! The set of keys reads are issued against.
use crate::error::{LoadError, SetupError};
use rand::Rng;
use readload_core::ConfigError;
use std::path::Path;

/// Non-empty, read-only list of row keys.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: Vec<String>,
}

impl KeySet {
    pub fn new(keys: Vec<String>) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(ConfigError::EmptyKeySet);
        }
        Ok(Self { keys })
    }

    /// Load one key per line. Blank lines are skipped and a trailing `\r` is dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SetupError::KeyList {
            path: path.to_path_buf(),
            source,
        })?;

        let keys: Vec<String> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self::new(keys)?)
    }

    /// Uniformly random key.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.keys[rng.gen_range(0..self.keys.len())]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
