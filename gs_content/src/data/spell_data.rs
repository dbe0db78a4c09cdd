use crate::data::fields::{FieldReader, MAX_LEVELS};
use crate::{ContentError, ContentIndex, ContentKind, ResolvedSpell, SpellScope};

/// How a spell picks its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetingType {
    #[default]
    SelfCast,
    Target,
    Area,
    Cone,
    SelfAoe,
    TargetOrLocation,
    Location,
    Direction,
    DragDirection,
    LineTargetToCaster,
    AreaClamped,
    LocationClamped,
    TerrainLocation,
    TerrainType,
    Other(u32),
}

impl From<u32> for TargetingType {
    fn from(value: u32) -> Self {
        match value {
            0 => TargetingType::SelfCast,
            1 => TargetingType::Target,
            2 => TargetingType::Area,
            3 => TargetingType::Cone,
            4 => TargetingType::SelfAoe,
            5 => TargetingType::TargetOrLocation,
            6 => TargetingType::Location,
            7 => TargetingType::Direction,
            8 => TargetingType::DragDirection,
            9 => TargetingType::LineTargetToCaster,
            10 => TargetingType::AreaClamped,
            11 => TargetingType::LocationClamped,
            12 => TargetingType::TerrainLocation,
            13 => TargetingType::TerrainType,
            other => TargetingType::Other(other),
        }
    }
}

/// Key of a cached [`SpellData`]. A spell resolved from the shared or global folder has
/// one entry no matter which unit asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpellKey {
    pub scope: SpellScope,
    pub name: String,
}

impl SpellKey {
    pub fn new(scope: SpellScope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }
}

/// A spell definition, read from the `[SpellData]` section of the resolved spell file.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellData {
    pub name: String,
    pub resolved: ResolvedSpell,

    pub alternate_name: String,
    pub targeting_type: TargetingType,
    pub flags: i32,

    pub cast_range: [f32; MAX_LEVELS],
    pub cast_radius: [f32; MAX_LEVELS],
    pub cooldown: [f32; MAX_LEVELS],
    pub mana_cost: [f32; MAX_LEVELS],
    pub max_ammo: [f32; MAX_LEVELS],
    pub ammo_recharge_time: [f32; MAX_LEVELS],

    pub cast_time: f32,
    pub channel_duration: f32,
    pub missile_speed: f32,
    pub line_width: f32,
}

impl SpellData {
    pub const SECTION: &'static str = "SpellData";

    /// Resolves `spell` for `model` (character, then shared, then global) and reads it.
    pub fn load(index: &ContentIndex, model: &str, spell: &str) -> Result<Self, ContentError> {
        let resolved = index.resolver().spell_data_path(model, spell)?;
        Self::from_resolved(index, resolved, spell)
    }

    /// Reads a spell whose location has already been resolved.
    pub fn from_resolved(
        index: &ContentIndex,
        resolved: ResolvedSpell,
        spell: &str,
    ) -> Result<Self, ContentError> {
        let file = index
            .get(resolved.path.as_str())
            .ok_or_else(|| ContentError::not_found(ContentKind::Spell, spell))?;
        let data = FieldReader::new(&resolved.path, file, Self::SECTION);

        let spell_data = SpellData {
            name: spell.to_string(),
            alternate_name: data.string("AlternateName"),
            targeting_type: TargetingType::from(data.u32_or("TargettingType", 0)?),
            flags: data.i32_or("Flags", 0)?,

            cast_range: data.f32_levels("CastRange", 0.0)?,
            cast_radius: data.f32_levels("CastRadius", 0.0)?,
            cooldown: data.f32_levels("Cooldown", 10.0)?,
            mana_cost: data.f32_levels("ManaCost", 0.0)?,
            max_ammo: data.f32_levels("MaxAmmo", 0.0)?,
            ammo_recharge_time: data.f32_levels("AmmoRechargeTime", 0.0)?,

            cast_time: data.f32_or("CastTime", 0.0)?,
            channel_duration: data.f32_or("ChannelDuration", 0.0)?,
            missile_speed: data.f32_or("MissileSpeed", 0.0)?,
            line_width: data.f32_or("LineWidth", 0.0)?,

            resolved,
        };

        Ok(spell_data)
    }

    pub fn key(&self) -> SpellKey {
        SpellKey::new(self.resolved.scope.clone(), self.name.clone())
    }

    /// Cooldown at a level index: 0 is the bare `Cooldown` key, `n` is `Cooldown{n}`.
    /// Indices past the last level read the last level.
    pub fn cooldown_at(&self, level: usize) -> f32 {
        self.cooldown[level.min(MAX_LEVELS - 1)]
    }

    /// Same level indexing as [`SpellData::cooldown_at`]
    pub fn cast_range_at(&self, level: usize) -> f32 {
        self.cast_range[level.min(MAX_LEVELS - 1)]
    }
}
