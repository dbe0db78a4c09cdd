use std::path::Path;
use std::str::FromStr;

use winnow::Parser;
use winnow::error::ContextError;

use crate::{ContentFile, ParseError};

mod line;

use line::{LineItem, line_item};

/// Parses a `[Section]` / `key=value` document.
///
/// Pairs before the first header land in [`ContentFile::GLOBAL_SECTION`]. A header that
/// appears twice continues the earlier section, and a repeated key keeps its last value.
pub fn parse(input: &str) -> Result<ContentFile, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut file = ContentFile::new();
    let mut section = ContentFile::GLOBAL_SECTION.to_string();

    for (index, line) in input.lines().enumerate() {
        let item = line_item
            .parse(line)
            .map_err(|e| ParseError::syntax(index + 1, e.offset() + 1, describe(e.inner()), line))?;

        match item {
            LineItem::Blank | LineItem::Comment(_) => {}
            LineItem::Section(name) => {
                file.ensure_section(name);
                section = name.to_string();
            }
            LineItem::Property { key, value } => {
                file.insert(&section, key, value);
            }
        }
    }

    Ok(file)
}

/// Reads and parses a file, attaching the path to any error.
pub fn parse_file(path: &Path) -> Result<ContentFile, ParseError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse(&contents).map_err(|e| e.with_file(path))
}

impl FromStr for ContentFile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn describe(error: &ContextError) -> String {
    let message = error.to_string().replace('\n', ", ");
    if message.is_empty() {
        "malformed line".to_string()
    } else {
        message
    }
}
