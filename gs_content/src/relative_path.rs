use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

use path_slash::PathExt;

use crate::IndexError;

/// A logical content key, e.g. `DATA/Characters/Annie/Annie`.
///
/// Segments are separated by `/`, compared case-sensitively, and carry no file
/// extension, no content root and no game-mode segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalizes separators and strips leading/trailing slashes.
    pub fn new(path: impl AsRef<str>) -> Self {
        let normalized = path.as_ref().replace('\\', "/");
        Self(normalized.trim_matches('/').to_string())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// Everything but the last segment
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        let count = self.segments().count();
        self.segments().take(count.saturating_sub(1))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RelativePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Where a file sits relative to the content root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    pub relative: RelativePath,
    /// True if the file lives inside `<root>/<game mode>/`
    pub in_game_mode: bool,
}

/// Maps an absolute file path under `root` to its logical key.
///
/// `<root>/<game_mode>/DATA/Characters/Annie/Annie.ini` becomes `DATA/Characters/Annie/Annie`.
/// Files outside the game-mode directory keep their root-relative path.
pub fn map_content_path(
    root: &Path,
    game_mode: &str,
    file: &Path,
) -> Result<MappedPath, IndexError> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| IndexError::NotRelative {
            path: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let (scoped, in_game_mode) = match relative.strip_prefix(game_mode) {
        Ok(rest) if !game_mode.is_empty() && !rest.as_os_str().is_empty() => (rest, true),
        _ => (relative, false),
    };

    let without_extension = scoped.with_extension("");
    let slashed = without_extension
        .to_slash()
        .ok_or_else(|| IndexError::NonUtf8Path {
            path: file.to_path_buf(),
        })?;

    if slashed.is_empty() {
        return Err(IndexError::NotRelative {
            path: file.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    Ok(MappedPath {
        relative: RelativePath::new(slashed),
        in_game_mode,
    })
}
