use std::str::FromStr;

use gs_parser::ContentFile;

use crate::{ContentError, RelativePath};

/// Number of values a level array holds (level 0 plus six upgrades)
pub const MAX_LEVELS: usize = 7;

/// Reads typed values out of one section of a [`ContentFile`].
///
/// A key that is missing falls back to the given default. A key that is present but can't be
/// read as the requested type is an [`ContentError::InvalidValue`].
pub(crate) struct FieldReader<'a> {
    path: &'a RelativePath,
    file: &'a ContentFile,
    section: &'a str,
}

impl<'a> FieldReader<'a> {
    pub fn new(path: &'a RelativePath, file: &'a ContentFile, section: &'a str) -> Self {
        Self {
            path,
            file,
            section,
        }
    }

    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.file.get(self.section, key)
    }

    /// The first key present wins
    pub fn raw_any(&self, keys: &[&str]) -> Option<(&'a str, String)> {
        keys.iter()
            .find_map(|key| self.raw(key).map(|value| (value, key.to_string())))
    }

    pub fn string(&self, key: &str) -> String {
        self.raw(key).unwrap_or_default().to_string()
    }

    pub fn f32_or(&self, key: &str, default: f32) -> Result<f32, ContentError> {
        self.parsed(key, "number").map(|v| v.unwrap_or(default))
    }

    /// Like [`FieldReader::f32_or`], trying each key in turn
    pub fn f32_any_or(&self, keys: &[&str], default: f32) -> Result<f32, ContentError> {
        match self.raw_any(keys) {
            Some((value, key)) => self.interpret(&key, value, "number"),
            None => Ok(default),
        }
    }

    pub fn i32_or(&self, key: &str, default: i32) -> Result<i32, ContentError> {
        self.parsed(key, "integer").map(|v| v.unwrap_or(default))
    }

    pub fn u32_or(&self, key: &str, default: u32) -> Result<u32, ContentError> {
        self.parsed(key, "unsigned integer")
            .map(|v| v.unwrap_or(default))
    }

    /// Accepts `1`/`0`, `true`/`false` and `yes`/`no` in any case
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ContentError> {
        let Some(value) = self.raw(key) else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(self.invalid(key, value, "boolean")),
        }
    }

    /// Reads `key` as level 0 and `key1`..`key6` as the later levels.
    /// Missing levels repeat level 0.
    pub fn f32_levels(&self, key: &str, default: f32) -> Result<[f32; MAX_LEVELS], ContentError> {
        let base = self.f32_or(key, default)?;
        let mut levels = [base; MAX_LEVELS];

        for (level, value) in levels.iter_mut().enumerate().skip(1) {
            *value = self.f32_or(&format!("{key}{level}"), base)?;
        }

        Ok(levels)
    }

    pub fn invalid(&self, key: &str, value: &str, expected: &'static str) -> ContentError {
        ContentError::InvalidValue {
            path: self.path.clone(),
            section: self.section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    fn parsed<T: FromStr>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<T>, ContentError> {
        self.raw(key)
            .map(|value| self.interpret(key, value, expected))
            .transpose()
    }

    fn interpret<T: FromStr>(
        &self,
        key: &str,
        value: &str,
        expected: &'static str,
    ) -> Result<T, ContentError> {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| self.invalid(key, value, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reader_for(document: &str) -> (RelativePath, ContentFile) {
        (
            RelativePath::new("DATA/Spells/Test"),
            gs_parser::parse(document).unwrap(),
        )
    }

    #[test]
    fn test_numbers_and_defaults() {
        let (path, file) = reader_for("[Data]\nHP=500\nRange = 125.5\nFlags=-3\n");
        let reader = FieldReader::new(&path, &file, "Data");

        assert_eq!(reader.f32_or("HP", 0.0).unwrap(), 500.0);
        assert_eq!(reader.f32_or("Range", 0.0).unwrap(), 125.5);
        assert_eq!(reader.f32_or("MoveSpeed", 325.0).unwrap(), 325.0);
        assert_eq!(reader.i32_or("Flags", 0).unwrap(), -3);
        assert!(reader.u32_or("Flags", 0).is_err());
    }

    #[test]
    fn test_first_key_wins() {
        let (path, file) = reader_for("[Data]\nHP=500\nBaseHP=610\n");
        let reader = FieldReader::new(&path, &file, "Data");

        assert_eq!(reader.f32_any_or(&["BaseHP", "HP"], 0.0).unwrap(), 610.0);
        assert_eq!(reader.f32_any_or(&["Missing", "HP"], 0.0).unwrap(), 500.0);
        assert_eq!(reader.f32_any_or(&["Missing"], 7.0).unwrap(), 7.0);
    }

    #[test]
    fn test_invalid_number_names_the_field() {
        let (path, file) = reader_for("[Data]\nHP=lots\n");
        let reader = FieldReader::new(&path, &file, "Data");

        let err = reader.f32_or("HP", 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DATA/Spells/Test [Data] HP = \"lots\" is not a valid number"
        );
    }

    #[test]
    fn test_booleans() {
        let (path, file) = reader_for("[Data]\nA=Yes\nB=0\nC=maybe\n");
        let reader = FieldReader::new(&path, &file, "Data");

        assert!(reader.bool_or("A", false).unwrap());
        assert!(!reader.bool_or("B", true).unwrap());
        assert!(reader.bool_or("D", true).unwrap());
        assert!(reader.bool_or("C", false).is_err());
    }

    #[test]
    fn test_levels() {
        let (path, file) = reader_for("[SpellData]\nCooldown=10\nCooldown2=8\nCooldown3=6\n");
        let reader = FieldReader::new(&path, &file, "SpellData");

        assert_eq!(
            reader.f32_levels("Cooldown", 0.0).unwrap(),
            [10.0, 10.0, 8.0, 6.0, 10.0, 10.0, 10.0]
        );
        assert_eq!(
            reader.f32_levels("ManaCost", 0.0).unwrap(),
            [0.0; MAX_LEVELS]
        );
    }
}
