//! Interpreter configuration and per-run context.
//!
//! There is no global mutable interpreter state: the capability flags and
//! the loaded-source registry are owned by the embedder and passed to the
//! entry points explicitly.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Capability flags for one interpreter instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Evaluate `test` statements and report their results.
    pub test_mode: bool,
    /// Passed through to native functions that gate privileged bindings.
    pub unsafe_mode: bool,
}

/// Tracks which sources already ran, so feeding the same file to the
/// interpreter twice is a no-op. Hashing is content-based.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    hashes: Mutex<HashSet<String>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source`; returns `false` when it was already registered.
    pub fn register(&self, source: &str) -> bool {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        self.hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_off() {
        let config = RuntimeConfig::default();
        assert!(!config.test_mode);
        assert!(!config.unsafe_mode);
    }

    #[test]
    fn test_registry_dedups_identical_sources() {
        let registry = SourceRegistry::new();
        assert!(registry.register("render 1"));
        assert!(!registry.register("render 1"));
        assert!(registry.register("render 2"));
    }
}
