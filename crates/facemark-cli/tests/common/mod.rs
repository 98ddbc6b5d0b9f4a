//! Shared helpers for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used, deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use facemark_test_support::{write_blank_blazeface, SyntheticImageBuilder};
use tempfile::TempDir;

/// Isolated working directory with its own XDG config and data homes.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("xdg-config")).unwrap();
        std::fs::create_dir_all(dir.path().join("xdg-data")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `facemark` running inside the workspace.
    pub fn facemark(&self) -> Command {
        let mut cmd = Command::cargo_bin("facemark").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg-config"))
            .env("XDG_DATA_HOME", self.path().join("xdg-data"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// Writes a 64x48 mid-gray PNG and returns its path.
    pub fn photo(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        SyntheticImageBuilder::uniform_rgb(64, 48, [128, 128, 128])
            .save(&path)
            .unwrap();
        path
    }

    /// Creates a models directory holding blank `BlazeFace` weights.
    pub fn models(&self, name: &str) -> PathBuf {
        let dir = self.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        write_blank_blazeface(&dir.join("blazeface.safetensors")).unwrap();
        dir
    }

    /// Creates an empty models directory.
    pub fn empty_models(&self, name: &str) -> PathBuf {
        let dir = self.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}
