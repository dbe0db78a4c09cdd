use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{ContentIndex, IndexBuild, IndexConfig, RawNavGridDecoder};

/// A content root in a temporary directory
pub(crate) struct ContentTree {
    dir: TempDir,
    game_mode: String,
}

impl ContentTree {
    pub fn new(game_mode: &str) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            game_mode: game_mode.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn game_mode(&self) -> &str {
        &self.game_mode
    }

    /// Writes a file relative to the content root
    pub fn write(&self, path: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Writes a file relative to the game-mode directory
    pub fn write_mode(&self, path: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        self.write(&format!("{}/{}", self.game_mode, path), contents)
    }

    pub fn build(&self) -> IndexBuild {
        self.build_with(&IndexConfig::default())
    }

    pub fn build_with(&self, config: &IndexConfig) -> IndexBuild {
        ContentIndex::build(self.root(), &self.game_mode, config, &RawNavGridDecoder).unwrap()
    }
}
