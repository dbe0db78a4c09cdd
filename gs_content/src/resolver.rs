use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ContentError, ContentIndex, ContentKind, RelativePath};

/// Where a spell definition can come from, in the order they are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellSource {
    /// `DATA/Characters/<model>/Spells/<spell>`
    Character,
    /// `DATA/Shared/Spells/<spell>`
    Shared,
    /// `DATA/Spells/<spell>`
    Global,
}

/// Character spells shadow shared spells, which shadow global spells.
pub const SPELL_SEARCH_ORDER: [SpellSource; 3] = [
    SpellSource::Character,
    SpellSource::Shared,
    SpellSource::Global,
];

impl SpellSource {
    pub fn candidate(self, model: &str, spell: &str) -> RelativePath {
        match self {
            SpellSource::Character => {
                RelativePath::from_segments(["DATA", "Characters", model, "Spells", spell])
            }
            SpellSource::Shared => RelativePath::from_segments(["DATA", "Shared", "Spells", spell]),
            SpellSource::Global => RelativePath::from_segments(["DATA", "Spells", spell]),
        }
    }

    pub fn scope(self, model: &str) -> SpellScope {
        match self {
            SpellSource::Character => SpellScope::Character(model.to_string()),
            SpellSource::Shared => SpellScope::Shared,
            SpellSource::Global => SpellScope::Global,
        }
    }
}

/// The owner of a resolved spell definition. Shared and global spells have no owning unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpellScope {
    Character(String),
    Shared,
    Global,
}

impl fmt::Display for SpellScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellScope::Character(model) => write!(f, "{model}"),
            SpellScope::Shared => write!(f, "Shared"),
            SpellScope::Global => write!(f, "Global"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpell {
    pub scope: SpellScope,
    pub path: RelativePath,
}

/// Translates logical asset names into keys of a [`ContentIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ContentResolver<'a> {
    index: &'a ContentIndex,
}

impl<'a> ContentResolver<'a> {
    pub fn new(index: &'a ContentIndex) -> Self {
        Self { index }
    }

    pub fn unit_stats_candidate(model: &str) -> RelativePath {
        RelativePath::from_segments(["DATA", "Characters", model, model])
    }

    /// Every place a spell may live, highest priority first
    pub fn spell_candidates(model: &str, spell: &str) -> Vec<(SpellSource, RelativePath)> {
        SPELL_SEARCH_ORDER
            .iter()
            .map(|source| (*source, source.candidate(model, spell)))
            .collect()
    }

    /// An empty model name is never found.
    pub fn unit_stats_path(&self, model: &str) -> Result<RelativePath, ContentError> {
        if model.is_empty() {
            return Err(ContentError::not_found(ContentKind::UnitStats, model));
        }

        let path = Self::unit_stats_candidate(model);
        if self.index.contains(path.as_str()) {
            Ok(path)
        } else {
            Err(ContentError::not_found(ContentKind::UnitStats, model))
        }
    }

    /// An empty spell name is never found. An empty model skips the character folder.
    pub fn spell_data_path(&self, model: &str, spell: &str) -> Result<ResolvedSpell, ContentError> {
        if spell.is_empty() {
            return Err(ContentError::not_found(ContentKind::Spell, spell));
        }

        SPELL_SEARCH_ORDER
            .iter()
            .filter(|source| !model.is_empty() || **source != SpellSource::Character)
            .map(|source| (source, source.candidate(model, spell)))
            .find(|(_, path)| self.index.contains(path.as_str()))
            .map(|(source, path)| ResolvedSpell {
                scope: source.scope(model),
                path,
            })
            .ok_or_else(|| ContentError::not_found(ContentKind::Spell, spell))
    }
}

/// `<root>/<game mode>/LEVELS/Map<id>/Map<id>.json`, checked on disk.
/// Map configs are not part of the index.
pub fn map_config_path(root: &Path, game_mode: &str, map_id: u32) -> Result<PathBuf, ContentError> {
    let map_dir = format!("Map{map_id}");
    let path = root
        .join(game_mode)
        .join("LEVELS")
        .join(&map_dir)
        .join(format!("{map_dir}.json"));

    if path.is_file() {
        Ok(path)
    } else {
        Err(ContentError::not_found(ContentKind::MapConfig, format!("Map {map_id}")))
    }
}
