use indexmap::IndexMap;
use indexmap::map::Iter;

/// The key/value pairs of one `[Section]`, in the order they first appeared.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Section {
    entries: IndexMap<String, String>,
}

impl Section {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A parsed structured-text document: section name -> key -> raw string value.
///
/// Values are never interpreted here. Numbers and flags are read by whoever
/// consumes the document. Pairs that appear before the first section header
/// live in the section named `""`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContentFile {
    sections: IndexMap<String, Section>,
}

impl ContentFile {
    pub const GLOBAL_SECTION: &'static str = "";

    pub fn new() -> Self {
        Self {
            sections: IndexMap::new(),
        }
    }

    /// Makes sure a section exists, even if it ends up with no keys.
    pub fn ensure_section(&mut self, section: &str) -> &mut Section {
        self.sections.entry(section.to_string()).or_default()
    }

    /// Inserts a value. A key that already exists in the section is overwritten,
    /// so the last occurrence in a document wins and the earlier one is dropped.
    pub fn insert(
        &mut self,
        section: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.ensure_section(section)
            .entries
            .insert(key.into(), value.into())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn sections(&self) -> Iter<'_, String, Section> {
        self.sections.iter()
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
