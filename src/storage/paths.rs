// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the file-backed store layout.

use std::path::{Path, PathBuf};

/// Default data directory when none is configured.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the file backend.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all stored data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory containing all bots.
    pub fn bots_dir(&self) -> PathBuf {
        self.root.join("bots")
    }

    /// Path to a specific bot document.
    pub fn bot(&self, bot_id: &str) -> PathBuf {
        self.bots_dir().join(format!("{bot_id}.json"))
    }
}
