use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How files are classified while a content tree is indexed.
///
/// Every field has a default, so a config file only needs the fields it changes:
///
/// ```json
/// { "script_extensions": ["lua"], "parallel": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Parsed as `[Section]` / `key=value` documents
    pub structured_text_extensions: Vec<String>,
    /// Recorded as script references for the script loader
    pub script_extensions: Vec<String>,
    /// Decoded eagerly into navigation grids
    pub nav_grid_extensions: Vec<String>,
    /// Scripts below a directory with one of these names are build output and skipped
    pub excluded_script_dirs: Vec<String>,
    /// Read and parse files on the rayon thread pool
    pub parallel: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            structured_text_extensions: vec!["ini".to_string()],
            script_extensions: vec!["cs".to_string(), "lua".to_string()],
            nav_grid_extensions: vec!["aimesh_ngrid".to_string()],
            excluded_script_dirs: vec!["bin".to_string(), "obj".to_string()],
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    StructuredText,
    Script,
    NavGrid,
    Other,
}

impl IndexConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse { source })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Classifies a file by extension, ignoring ASCII case.
    pub fn classify(&self, path: &Path) -> FileKind {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Other;
        };

        let matches = |list: &[String]| list.iter().any(|e| e.eq_ignore_ascii_case(extension));

        if matches(&self.structured_text_extensions) {
            FileKind::StructuredText
        } else if matches(&self.script_extensions) {
            FileKind::Script
        } else if matches(&self.nav_grid_extensions) {
            FileKind::NavGrid
        } else {
            FileKind::Other
        }
    }

    pub fn is_excluded_script_dir(&self, dir: &str) -> bool {
        self.excluded_script_dirs
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(dir))
    }
}
