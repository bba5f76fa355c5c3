//! The unit catalog.
//!
//! Every purchasable unit kind lives here as a static template. Shop
//! pools are sliced out of the catalog by cost: 1-2 gold common, 3 gold
//! rare, 4 gold epic, 5+ gold legendary.

use crate::types::{Ability, Trait, UnitStats, UnitTemplate};

const fn stats(hp: i32, atk: i32, range: u32, atk_interval_ms: u64, move_interval_ms: u64) -> UnitStats {
    UnitStats {
        hp,
        atk,
        range,
        atk_interval_ms,
        move_interval_ms,
    }
}

const fn cleave(r1: f32, r2: f32, r3: f32) -> [Option<Ability>; 3] {
    [
        Some(Ability::Cleave { ratio: r1 }),
        Some(Ability::Cleave { ratio: r2 }),
        Some(Ability::Cleave { ratio: r3 }),
    ]
}

const fn pierce(r1: f32, r2: f32, r3: f32) -> [Option<Ability>; 3] {
    [
        Some(Ability::Pierce { ratio: r1 }),
        Some(Ability::Pierce { ratio: r2 }),
        Some(Ability::Pierce { ratio: r3 }),
    ]
}

const fn multishot(t1: u8, r1: f32, t2: u8, r2: f32, t3: u8, r3: f32) -> [Option<Ability>; 3] {
    [
        Some(Ability::Multishot { extra_targets: t1, ratio: r1 }),
        Some(Ability::Multishot { extra_targets: t2, ratio: r2 }),
        Some(Ability::Multishot { extra_targets: t3, ratio: r3 }),
    ]
}

const fn stun(c1: f32, d1: u64, c2: f32, d2: u64, c3: f32, d3: u64) -> [Option<Ability>; 3] {
    [
        Some(Ability::StunOnHit { chance: c1, duration_ms: d1 }),
        Some(Ability::StunOnHit { chance: c2, duration_ms: d2 }),
        Some(Ability::StunOnHit { chance: c3, duration_ms: d3 }),
    ]
}

const fn slow(
    c1: f32, f1: f32, d1: u64,
    c2: f32, f2: f32, d2: u64,
    c3: f32, f3: f32, d3: u64,
) -> [Option<Ability>; 3] {
    [
        Some(Ability::SlowOnHit { chance: c1, factor: f1, duration_ms: d1 }),
        Some(Ability::SlowOnHit { chance: c2, factor: f2, duration_ms: d2 }),
        Some(Ability::SlowOnHit { chance: c3, factor: f3, duration_ms: d3 }),
    ]
}

const fn heal(cd1: u64, a1: i32, cd2: u64, a2: i32, cd3: u64, a3: i32) -> [Option<Ability>; 3] {
    [
        Some(Ability::HealPulse { cooldown_ms: cd1, amount: a1 }),
        Some(Ability::HealPulse { cooldown_ms: cd2, amount: a2 }),
        Some(Ability::HealPulse { cooldown_ms: cd3, amount: a3 }),
    ]
}

use Trait::{Caster, Lancer, Ranger, Skirmisher, Support, Vanguard};

pub static CATALOG: &[UnitTemplate] = &[
    UnitTemplate {
        key: "recruit",
        name: "Recruit",
        cost: 1,
        stats: stats(90, 14, 1, 900, 420),
        traits: &[Vanguard],
        abilities: cleave(0.15, 0.25, 0.35),
    },
    UnitTemplate {
        key: "slinger",
        name: "Slinger",
        cost: 1,
        stats: stats(70, 14, 3, 720, 440),
        traits: &[Ranger],
        abilities: multishot(1, 0.5, 2, 0.55, 2, 0.6),
    },
    UnitTemplate {
        key: "medic",
        name: "Medic",
        cost: 1,
        stats: stats(80, 10, 3, 980, 500),
        traits: &[Support],
        abilities: heal(2700, 12, 2400, 16, 2100, 20),
    },
    UnitTemplate {
        key: "shieldman",
        name: "Shieldman",
        cost: 1,
        stats: stats(120, 12, 1, 980, 420),
        traits: &[Vanguard],
        abilities: cleave(0.12, 0.22, 0.32),
    },
    UnitTemplate {
        key: "warrior",
        name: "Warrior",
        cost: 2,
        stats: stats(120, 18, 1, 900, 400),
        traits: &[Vanguard, Skirmisher],
        abilities: cleave(0.4, 0.55, 0.75),
    },
    UnitTemplate {
        key: "spear",
        name: "Spearman",
        cost: 2,
        stats: stats(100, 18, 2, 820, 420),
        traits: &[Lancer],
        abilities: pierce(0.35, 0.5, 0.7),
    },
    UnitTemplate {
        key: "cleric",
        name: "Cleric",
        cost: 2,
        stats: stats(85, 14, 3, 900, 460),
        traits: &[Support, Caster],
        abilities: heal(2600, 16, 2300, 22, 2000, 28),
    },
    UnitTemplate {
        key: "monk",
        name: "Monk",
        cost: 2,
        stats: stats(90, 14, 2, 880, 420),
        traits: &[Support],
        abilities: heal(2500, 14, 2200, 20, 1900, 26),
    },
    UnitTemplate {
        key: "crossbow",
        name: "Crossbowman",
        cost: 2,
        stats: stats(75, 18, 4, 780, 440),
        traits: &[Ranger],
        abilities: multishot(1, 0.55, 2, 0.6, 3, 0.65),
    },
    UnitTemplate {
        key: "pikeman",
        name: "Pikeman",
        cost: 2,
        stats: stats(105, 17, 2, 830, 420),
        traits: &[Lancer, Vanguard],
        abilities: pierce(0.4, 0.55, 0.7),
    },
    UnitTemplate {
        key: "javelin",
        name: "Javelin Thrower",
        cost: 2,
        stats: stats(85, 18, 3, 820, 440),
        traits: &[Lancer],
        abilities: pierce(0.4, 0.55, 0.7),
    },
    UnitTemplate {
        key: "mystic",
        name: "Mystic",
        cost: 2,
        stats: stats(75, 16, 4, 1000, 500),
        traits: &[Caster],
        abilities: stun(0.14, 700, 0.2, 850, 0.26, 1000),
    },
    UnitTemplate {
        key: "sentry",
        name: "Sentry",
        cost: 2,
        stats: stats(85, 17, 4, 820, 460),
        traits: &[Ranger, Vanguard],
        abilities: pierce(0.35, 0.5, 0.65),
    },
    UnitTemplate {
        key: "shieldbearer",
        name: "Shieldbearer",
        cost: 2,
        stats: stats(150, 14, 1, 980, 420),
        traits: &[Vanguard],
        abilities: cleave(0.2, 0.32, 0.45),
    },
    UnitTemplate {
        key: "archer",
        name: "Archer",
        cost: 3,
        stats: stats(80, 20, 5, 800, 450),
        traits: &[Ranger],
        abilities: multishot(1, 0.6, 2, 0.65, 3, 0.7),
    },
    UnitTemplate {
        key: "mage",
        name: "Mage",
        cost: 3,
        stats: stats(70, 26, 4, 1100, 500),
        traits: &[Caster],
        abilities: stun(0.14, 800, 0.2, 900, 0.28, 1100),
    },
    UnitTemplate {
        key: "knight",
        name: "Knight",
        cost: 3,
        stats: stats(160, 16, 1, 950, 420),
        traits: &[Vanguard],
        abilities: [
            Some(Ability::Cleave { ratio: 0.35 }),
            None,
            None,
        ],
    },
    UnitTemplate {
        key: "rogue",
        name: "Rogue",
        cost: 3,
        stats: stats(70, 28, 1, 700, 350),
        traits: &[Skirmisher],
        abilities: slow(0.22, 0.7, 900, 0.28, 0.6, 1100, 0.35, 0.55, 1300),
    },
    UnitTemplate {
        key: "berserker",
        name: "Berserker",
        cost: 3,
        stats: stats(110, 16, 1, 500, 360),
        traits: &[Skirmisher],
        abilities: cleave(0.22, 0.35, 0.5),
    },
    UnitTemplate {
        key: "frost",
        name: "Frost Mage",
        cost: 3,
        stats: stats(75, 22, 4, 950, 500),
        traits: &[Caster],
        abilities: slow(0.3, 0.6, 1100, 0.38, 0.55, 1300, 0.48, 0.5, 1500),
    },
    UnitTemplate {
        key: "hunter",
        name: "Hunter",
        cost: 3,
        stats: stats(90, 22, 4, 850, 440),
        traits: &[Ranger],
        abilities: multishot(1, 0.55, 2, 0.6, 3, 0.65),
    },
    UnitTemplate {
        key: "druid",
        name: "Druid",
        cost: 3,
        stats: stats(100, 12, 3, 920, 460),
        traits: &[Support, Caster],
        abilities: heal(2400, 18, 2100, 24, 1800, 30),
    },
    UnitTemplate {
        key: "icearcher",
        name: "Ice Archer",
        cost: 3,
        stats: stats(80, 18, 5, 820, 450),
        traits: &[Ranger, Caster],
        abilities: slow(0.26, 0.65, 1000, 0.34, 0.6, 1200, 0.42, 0.55, 1400),
    },
    UnitTemplate {
        key: "gladiator",
        name: "Gladiator",
        cost: 3,
        stats: stats(150, 18, 1, 900, 380),
        traits: &[Vanguard],
        abilities: cleave(0.3, 0.45, 0.6),
    },
    UnitTemplate {
        key: "alchemist",
        name: "Alchemist",
        cost: 3,
        stats: stats(90, 12, 3, 980, 480),
        traits: &[Support, Caster],
        abilities: heal(2400, 18, 2100, 24, 1800, 30),
    },
    UnitTemplate {
        key: "duelist",
        name: "Duelist",
        cost: 3,
        stats: stats(95, 26, 1, 640, 340),
        traits: &[Skirmisher],
        abilities: stun(0.18, 600, 0.24, 750, 0.3, 900),
    },
    UnitTemplate {
        key: "phalanx",
        name: "Phalanx",
        cost: 3,
        stats: stats(130, 18, 2, 880, 420),
        traits: &[Lancer, Vanguard],
        abilities: pierce(0.42, 0.58, 0.72),
    },
    UnitTemplate {
        key: "witch",
        name: "Witch",
        cost: 3,
        stats: stats(78, 20, 4, 980, 500),
        traits: &[Caster],
        abilities: slow(0.28, 0.65, 1100, 0.36, 0.6, 1300, 0.44, 0.55, 1500),
    },
    UnitTemplate {
        key: "sniper",
        name: "Sniper",
        cost: 4,
        stats: stats(70, 34, 6, 1200, 480),
        traits: &[Ranger],
        abilities: pierce(0.5, 0.65, 0.8),
    },
    UnitTemplate {
        key: "guardian",
        name: "Guardian",
        cost: 4,
        stats: stats(220, 14, 1, 1000, 420),
        traits: &[Vanguard],
        abilities: cleave(0.28, 0.45, 0.6),
    },
    UnitTemplate {
        key: "paladin",
        name: "Paladin",
        cost: 4,
        stats: stats(180, 20, 1, 900, 400),
        traits: &[Vanguard, Support],
        abilities: heal(2300, 20, 2000, 26, 1800, 34),
    },
    UnitTemplate {
        key: "assassin",
        name: "Assassin",
        cost: 4,
        stats: stats(85, 30, 1, 600, 340),
        traits: &[Skirmisher],
        abilities: stun(0.16, 600, 0.22, 750, 0.3, 950),
    },
    UnitTemplate {
        key: "valkyrie",
        name: "Valkyrie",
        cost: 4,
        stats: stats(170, 22, 1, 850, 380),
        traits: &[Vanguard, Ranger],
        abilities: cleave(0.45, 0.65, 0.8),
    },
    UnitTemplate {
        key: "warlock",
        name: "Warlock",
        cost: 4,
        stats: stats(80, 28, 5, 1000, 500),
        traits: &[Caster],
        abilities: stun(0.22, 850, 0.3, 950, 0.36, 1150),
    },
    UnitTemplate {
        key: "marksman",
        name: "Marksman",
        cost: 4,
        stats: stats(75, 30, 6, 980, 480),
        traits: &[Ranger],
        abilities: pierce(0.6, 0.75, 0.9),
    },
    UnitTemplate {
        key: "stormcaller",
        name: "Stormcaller",
        cost: 4,
        stats: stats(80, 28, 5, 980, 500),
        traits: &[Caster],
        abilities: stun(0.22, 800, 0.28, 950, 0.34, 1100),
    },
    UnitTemplate {
        key: "beastmaster",
        name: "Beastmaster",
        cost: 4,
        stats: stats(110, 22, 4, 900, 440),
        traits: &[Ranger, Support],
        abilities: multishot(1, 0.6, 2, 0.65, 3, 0.7),
    },
    UnitTemplate {
        key: "ballista",
        name: "Ballista",
        cost: 5,
        stats: stats(90, 34, 7, 1150, 520),
        traits: &[Ranger],
        abilities: multishot(2, 0.65, 3, 0.7, 4, 0.75),
    },
    UnitTemplate {
        key: "sorcerer",
        name: "Sorcerer",
        cost: 5,
        stats: stats(85, 32, 5, 1000, 500),
        traits: &[Caster],
        abilities: stun(0.2, 750, 0.28, 900, 0.36, 1100),
    },
    UnitTemplate {
        key: "champion",
        name: "Champion",
        cost: 5,
        stats: stats(240, 22, 1, 850, 400),
        traits: &[Vanguard],
        abilities: cleave(0.5, 0.7, 0.85),
    },
    UnitTemplate {
        key: "templar",
        name: "Templar",
        cost: 5,
        stats: stats(200, 18, 2, 900, 420),
        traits: &[Vanguard, Support],
        abilities: heal(2100, 24, 1900, 30, 1700, 38),
    },
];

/// Look up a template by its catalog key.
pub fn find_template(key: &str) -> Option<&'static UnitTemplate> {
    CATALOG.iter().find(|t| t.key == key)
}

/// Rarity bands used by shop rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

pub fn rarity_of(template: &UnitTemplate) -> Rarity {
    match template.cost {
        c if c <= 2 => Rarity::Common,
        3 => Rarity::Rare,
        4 => Rarity::Epic,
        _ => Rarity::Legendary,
    }
}

/// All templates in one rarity band.
pub fn pool(rarity: Rarity) -> impl Iterator<Item = &'static UnitTemplate> {
    CATALOG.iter().filter(move |t| rarity_of(t) == rarity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keys_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_every_rarity_has_a_pool() {
        assert!(pool(Rarity::Common).count() >= 4);
        assert!(pool(Rarity::Rare).count() >= 4);
        assert!(pool(Rarity::Epic).count() >= 4);
        assert!(pool(Rarity::Legendary).count() >= 4);
    }

    #[test]
    fn test_ability_for_star_falls_back_to_base() {
        let knight = find_template("knight").unwrap();
        // knight only defines a base ability
        assert_eq!(
            knight.ability_for_star(3),
            Some(Ability::Cleave { ratio: 0.35 })
        );

        let warrior = find_template("warrior").unwrap();
        assert_eq!(
            warrior.ability_for_star(2),
            Some(Ability::Cleave { ratio: 0.55 })
        );
    }

    #[test]
    fn test_ranges_define_melee_and_ranged() {
        let guardian = find_template("guardian").unwrap();
        assert!(guardian.stats.range <= 1);
        let ballista = find_template("ballista").unwrap();
        assert!(ballista.stats.range >= 3);
    }
}
