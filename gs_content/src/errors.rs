use std::fmt;
use std::path::{Path, PathBuf};

use gs_parser::ParseError;
use thiserror::Error;

use crate::RelativePath;

/// Structural failures. Any of these aborts an index build.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("content root {} does not exist", .root.display())]
    MissingRoot { root: PathBuf },

    #[error("content root {} is not a directory", .root.display())]
    NotADirectory { root: PathBuf },

    #[error("content root {} is not readable: {source}", .root.display())]
    Unreadable {
        root: PathBuf,
        source: std::io::Error,
    },

    #[error("{} cannot be made relative to content root {}", .path.display(), .root.display())]
    NotRelative { path: PathBuf, root: PathBuf },

    #[error("{} is not valid UTF-8 and cannot be mapped to a content path", .path.display())]
    NonUtf8Path { path: PathBuf },
}

/// Per-file problems found while indexing. The file is left out and indexing carries on.
#[derive(Debug, Error)]
pub enum IndexWarning {
    #[error("could not walk {}: {source}", display_opt(.path))]
    Walk {
        path: Option<PathBuf>,
        source: walkdir::Error,
    },

    #[error("{} is not valid UTF-8 and was skipped", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("failed to decode navigation grid {}: {source}", .path.display())]
    Decode { path: PathBuf, source: DecodeError },

    #[error("{relative}: kept {}, discarded {}", .kept.display(), .discarded.display())]
    DuplicatePath {
        relative: RelativePath,
        kept: PathBuf,
        discarded: PathBuf,
    },
}

impl IndexWarning {
    /// The file the warning is about
    pub fn path(&self) -> Option<&Path> {
        match self {
            IndexWarning::Walk { path, .. } => path.as_deref(),
            IndexWarning::NonUtf8Path { path }
            | IndexWarning::Read { path, .. }
            | IndexWarning::Parse { path, .. }
            | IndexWarning::Decode { path, .. } => Some(path),
            IndexWarning::DuplicatePath { discarded, .. } => Some(discarded),
        }
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<unknown>".to_string(),
    }
}

/// Raised by a [`crate::NavGridDecoder`] when a grid file cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    UnitStats,
    Spell,
    MapConfig,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::UnitStats => write!(f, "Stat file"),
            ContentKind::Spell => write!(f, "Spell data"),
            ContentKind::MapConfig => write!(f, "Map configuration"),
        }
    }
}

/// Failures while resolving or materializing content after the index is built.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{kind} for {name} was not found")]
    NotFound { kind: ContentKind, name: String },

    #[error("navigation grid {path} was not loaded")]
    NotLoaded { path: RelativePath },

    #[error("{path} [{section}] {key} = {value:?} is not a valid {expected}")]
    InvalidValue {
        path: RelativePath,
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("failed to read map configuration {}: {source}", .path.display())]
    MapConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse map configuration {}: {source}", .path.display())]
    MapConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ContentError {
    pub fn not_found(kind: ContentKind, name: impl Into<String>) -> Self {
        ContentError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read index config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse index config: {source}")]
    Parse { source: serde_json::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_names_the_asset() {
        let err = ContentError::not_found(ContentKind::Spell, "Disintegrate");
        assert_eq!(err.to_string(), "Spell data for Disintegrate was not found");
        assert!(err.is_not_found());

        let err = ContentError::not_found(ContentKind::UnitStats, "Annie");
        assert_eq!(err.to_string(), "Stat file for Annie was not found");
    }

    #[test]
    fn not_loaded_is_distinct() {
        let err = ContentError::NotLoaded {
            path: RelativePath::new("LEVELS/Map1/AIPath"),
        };
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "navigation grid LEVELS/Map1/AIPath was not loaded"
        );
    }
}
