use std::fmt;

use crate::data::fields::FieldReader;
use crate::{ContentError, ContentIndex, ContentKind, RelativePath};

/// The resource a unit spends on abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryAbilityResource {
    #[default]
    Mana,
    Energy,
    None,
    Shield,
    BattleFury,
    DragonFury,
    Rage,
    Heat,
    Ferocity,
    BloodWell,
    Wind,
    Other,
}

impl PrimaryAbilityResource {
    const BY_INDEX: [PrimaryAbilityResource; 12] = [
        Self::Mana,
        Self::Energy,
        Self::None,
        Self::Shield,
        Self::BattleFury,
        Self::DragonFury,
        Self::Rage,
        Self::Heat,
        Self::Ferocity,
        Self::BloodWell,
        Self::Wind,
        Self::Other,
    ];

    /// Accepts either the numeric id or the name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(index) = value.parse::<usize>() {
            return Self::BY_INDEX.get(index).copied();
        }

        Self::BY_INDEX
            .iter()
            .copied()
            .find(|resource| resource.to_string().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for PrimaryAbilityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A unit's stat block, read from `DATA/Characters/<model>/<model>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CharData {
    pub name: String,
    pub source: RelativePath,

    pub hp: f32,
    pub hp_per_level: f32,
    pub hp_regen: f32,
    pub hp_regen_per_level: f32,
    pub mp: f32,
    pub mp_per_level: f32,
    pub mp_regen: f32,
    pub mp_regen_per_level: f32,
    pub par_type: PrimaryAbilityResource,

    pub base_damage: f32,
    pub damage_per_level: f32,
    pub armor: f32,
    pub armor_per_level: f32,
    pub spell_block: f32,
    pub spell_block_per_level: f32,

    pub move_speed: f32,
    pub attack_range: f32,
    pub attack_delay_offset_percent: f32,
    pub gameplay_collision_radius: f32,
    pub pathfinding_collision_radius: f32,
    pub is_melee: bool,

    pub spells: [String; 4],
    pub extra_spells: [String; 8],
    pub passive_name: String,
}

impl CharData {
    pub const SECTION: &'static str = "Data";

    /// Resolves the unit's stat file and reads it.
    pub fn load(index: &ContentIndex, model: &str) -> Result<Self, ContentError> {
        let path = index.resolver().unit_stats_path(model)?;
        let file = index
            .get(path.as_str())
            .ok_or_else(|| ContentError::not_found(ContentKind::UnitStats, model))?;

        let data = FieldReader::new(&path, file, Self::SECTION);

        let par_type = match data.raw("PARType") {
            Some(value) => PrimaryAbilityResource::parse(value)
                .ok_or_else(|| data.invalid("PARType", value, "ability resource"))?,
            None => PrimaryAbilityResource::default(),
        };

        Ok(CharData {
            name: model.to_string(),
            hp: data.f32_any_or(&["BaseHP", "HP"], 100.0)?,
            hp_per_level: data.f32_or("HPPerLevel", 0.0)?,
            hp_regen: data.f32_or("BaseStaticHPRegen", 0.0)?,
            hp_regen_per_level: data.f32_or("HPRegenPerLevel", 0.0)?,
            mp: data.f32_any_or(&["BaseMP", "MP"], 100.0)?,
            mp_per_level: data.f32_or("MPPerLevel", 0.0)?,
            mp_regen: data.f32_or("BaseStaticMPRegen", 0.0)?,
            mp_regen_per_level: data.f32_or("MPRegenPerLevel", 0.0)?,
            par_type,

            base_damage: data.f32_any_or(&["BaseDamage", "Damage"], 10.0)?,
            damage_per_level: data.f32_or("DamagePerLevel", 0.0)?,
            armor: data.f32_any_or(&["Armor", "ArmorBase"], 1.0)?,
            armor_per_level: data.f32_or("ArmorPerLevel", 0.0)?,
            spell_block: data.f32_any_or(&["SpellBlock", "SpellBlockBase"], 0.0)?,
            spell_block_per_level: data.f32_or("SpellBlockPerLevel", 0.0)?,

            move_speed: data.f32_or("MoveSpeed", 100.0)?,
            attack_range: data.f32_or("AttackRange", 100.0)?,
            attack_delay_offset_percent: data.f32_or("AttackDelayOffsetPercent", 0.0)?,
            gameplay_collision_radius: data.f32_or("GameplayCollisionRadius", 65.0)?,
            pathfinding_collision_radius: data.f32_or("PathfindingCollisionRadius", -1.0)?,
            is_melee: data.bool_or("IsMelee", false)?,

            spells: std::array::from_fn(|i| data.string(&format!("Spell{}", i + 1))),
            extra_spells: std::array::from_fn(|i| data.string(&format!("ExtraSpell{}", i + 1))),
            passive_name: data.string("Passive1Name"),

            source: path,
        })
    }

    /// Names of the four ability slots that are filled
    pub fn spell_names(&self) -> impl Iterator<Item = &str> {
        self.spells
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}
