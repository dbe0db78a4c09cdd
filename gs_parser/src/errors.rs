use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to turn a structured-text document into a [`crate::ContentFile`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}line {line}, column {column}: {message}: `{text}`", file_prefix(.file))]
    Syntax {
        /// The file the document came from, if it came from a file at all
        file: Option<PathBuf>,
        /// 1-based line number of the offending line
        line: usize,
        /// 1-based column where the line stopped making sense
        column: usize,
        message: String,
        /// The offending line as it appeared in the document
        text: String,
    },
}

impl ParseError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>, text: &str) -> Self {
        ParseError::Syntax {
            file: None,
            line,
            column,
            message: message.into(),
            text: text.to_string(),
        }
    }

    /// Attaches the identity of the file being parsed. Errors that already carry a path keep it.
    pub fn with_file(self, path: &Path) -> Self {
        match self {
            ParseError::Syntax {
                file: None,
                line,
                column,
                message,
                text,
            } => ParseError::Syntax {
                file: Some(path.to_path_buf()),
                line,
                column,
                message,
                text,
            },
            other => other,
        }
    }

    pub fn file(&self) -> Option<&Path> {
        match self {
            ParseError::Io { path, .. } => Some(path),
            ParseError::Syntax { file, .. } => file.as_deref(),
        }
    }

    /// The 1-based line of a syntax error
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Io { .. } => None,
            ParseError::Syntax { line, .. } => Some(*line),
        }
    }
}

fn file_prefix(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!("{}: ", path.display()),
        None => String::new(),
    }
}
