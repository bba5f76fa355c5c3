//! Core identifiers and data types shared across the engine.

use serde::{Deserialize, Serialize};

/// Unique identifier for unit instances
pub type UnitId = u32;

/// Unique identifier for shop offers
pub type ShopItemId = u32;

/// Which army a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// A board cell. Row 0 is the enemy back rank, the highest row is the
/// player back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        let dr = (self.row as i32 - other.row as i32).unsigned_abs();
        let dc = (self.col as i32 - other.col as i32).unsigned_abs();
        dr + dc
    }
}

/// Unit class tags. Fielding enough units sharing a tag unlocks
/// tiered army-wide bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trait {
    Vanguard,
    Ranger,
    Caster,
    Support,
    Skirmisher,
    Lancer,
}

impl Trait {
    pub const ALL: [Trait; 6] = [
        Trait::Vanguard,
        Trait::Ranger,
        Trait::Caster,
        Trait::Support,
        Trait::Skirmisher,
        Trait::Lancer,
    ];
}

/// Innate unit ability, resolved during combat ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Ability {
    /// Splash a fraction of attack damage onto cells adjacent to the target
    Cleave { ratio: f32 },
    /// Hit additional nearby enemies for a fraction of attack damage
    Multishot { extra_targets: u8, ratio: f32 },
    /// Chance to stun the target on hit
    StunOnHit { chance: f32, duration_ms: u64 },
    /// Chance to slow the target's movement on hit
    SlowOnHit {
        chance: f32,
        factor: f32,
        duration_ms: u64,
    },
    /// Periodically heal nearby allies
    HealPulse { cooldown_ms: u64, amount: i32 },
    /// Damage the first enemy in a line behind the target
    Pierce { ratio: f32 },
}

/// Base combat statistics of a template at one star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    pub hp: i32,
    pub atk: i32,
    pub range: u32,
    pub atk_interval_ms: u64,
    pub move_interval_ms: u64,
}

/// Immutable definition of a purchasable unit kind.
#[derive(Debug)]
pub struct UnitTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub cost: i32,
    pub stats: UnitStats,
    pub traits: &'static [Trait],
    /// Ability per star level, indexed by star - 1
    pub abilities: [Option<Ability>; 3],
}

impl UnitTemplate {
    pub fn ability_for_star(&self, star: u8) -> Option<Ability> {
        let idx = (star.clamp(1, 3) - 1) as usize;
        self.abilities[idx].or(self.abilities[0])
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }
}

/// Equippable relics, at most two per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKey {
    BerserkerAxe,
    SwiftGloves,
    VampiricFang,
    FrostRune,
    ShieldAmulet,
    BarbedBlade,
}

impl ItemKey {
    pub const ALL: [ItemKey; 6] = [
        ItemKey::BerserkerAxe,
        ItemKey::SwiftGloves,
        ItemKey::VampiricFang,
        ItemKey::FrostRune,
        ItemKey::ShieldAmulet,
        ItemKey::BarbedBlade,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemKey::BerserkerAxe => "berserker axe",
            ItemKey::SwiftGloves => "swift gloves",
            ItemKey::VampiricFang => "vampiric fang",
            ItemKey::FrostRune => "frost rune",
            ItemKey::ShieldAmulet => "shield amulet",
            ItemKey::BarbedBlade => "barbed blade",
        }
    }
}

/// Transient combat conditions on a unit. Cleared between rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusBag {
    pub stunned_until: u64,
    pub slow_until: u64,
    pub slow_factor: f32,
    pub bleed_until: u64,
    pub bleed_dps: f32,
    /// Fractional bleed damage accumulated between ticks
    pub bleed_carry: f32,
}

/// A live unit owned by one side, on the board or benched.
#[derive(Debug, Clone)]
pub struct UnitInstance {
    pub id: UnitId,
    pub template: &'static UnitTemplate,
    pub side: Side,
    pub star: u8,
    pub hp: i32,
    pub last_attack_ms: u64,
    pub last_move_ms: u64,
    pub last_special_ms: u64,
    pub status: StatusBag,
    pub items: Vec<ItemKey>,
    pub shield_hp: f32,
    pub cover_atk_bonus: i32,
    pub damage_reduction: f32,
}

impl UnitInstance {
    pub fn key(&self) -> &'static str {
        self.template.key
    }

    pub fn max_hp(&self) -> i32 {
        self.template.stats.hp * self.star as i32
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn ability(&self) -> Option<Ability> {
        self.template.ability_for_star(self.star)
    }

    pub fn has_item(&self, item: ItemKey) -> bool {
        self.items.contains(&item)
    }
}

/// A unit offered for sale in a shop.
#[derive(Debug, Clone, Copy)]
pub struct ShopItem {
    pub id: ShopItemId,
    pub template: &'static UnitTemplate,
    pub cost: i32,
}

/// Result of the most recent combat round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Win,
    Loss,
}

/// One entry in a finished run's final composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompEntry {
    pub template: String,
    pub star: u8,
}

/// Summary of a completed run, produced when the player is eliminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    pub rounds: u32,
    pub duration_ms: u64,
    pub level: u8,
    pub hp: i32,
    pub comp: Vec<CompEntry>,
}
