//! Trait tiers and template-pair synergies.
//!
//! Two layers stack here. Trait tiers count how many fielded units of
//! a side share a trait (2/4/6 thresholds) and scale army-wide
//! numbers. On top of that, named duo/trio synergies activate when
//! specific templates are rostered together, firing extra effects on
//! hits or heal casts.

use std::collections::BTreeMap;

use crate::battle::apply_damage;
use crate::board::{count_adjacent_allies, neighbors};
use crate::rng::BattleRng;
use crate::state::GameState;
use crate::types::{Pos, Side, Trait, UnitId};

pub const RANGER_ATK_RATE: [f32; 4] = [0.0, 0.08, 0.14, 0.2];
pub const SKIRMISHER_MOVE_RATE: [f32; 4] = [0.0, 0.08, 0.14, 0.2];
pub const VANGUARD_ATK: [i32; 4] = [0, 1, 3, 5];
pub const VANGUARD_SHIELD: [i32; 4] = [0, 14, 26, 40];
pub const SUPPORT_HEAL_MULT: [f32; 4] = [1.0, 1.15, 1.25, 1.4];
pub const CASTER_HEAL_MULT: [f32; 4] = [1.0, 1.05, 1.1, 1.15];
pub const CASTER_SLOW_BONUS: [f32; 4] = [0.0, 0.05, 0.08, 0.12];

/// Radius of heal pulses and their linked synergies, in Manhattan cells
pub const HEAL_RADIUS: u32 = 2;

/// Active trait tiers for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tiers {
    tiers: BTreeMap<Trait, u8>,
}

impl Tiers {
    pub fn tier(&self, t: Trait) -> usize {
        self.tiers.get(&t).copied().unwrap_or(0) as usize
    }
}

pub fn tier_for_count(n: usize) -> u8 {
    match n {
        0..=1 => 0,
        2..=3 => 1,
        4..=5 => 2,
        _ => 3,
    }
}

/// Count fielded living units per trait and derive tiers.
pub fn compute_tiers(state: &GameState, side: Side) -> Tiers {
    let mut counts: BTreeMap<Trait, usize> = BTreeMap::new();
    for (_, unit) in state.living_on_board(side) {
        for t in unit.template.traits {
            *counts.entry(*t).or_insert(0) += 1;
        }
    }
    Tiers {
        tiers: counts
            .into_iter()
            .map(|(t, n)| (t, tier_for_count(n)))
            .collect(),
    }
}

/// Combat-start buffs derived from tiers. Currently just the Vanguard
/// shield, which never stacks with an existing larger shield.
pub fn apply_pre_buffs(state: &mut GameState, side: Side) {
    let tiers = compute_tiers(state, side);
    let shield = VANGUARD_SHIELD[tiers.tier(Trait::Vanguard)];
    if shield == 0 {
        return;
    }
    let ids: Vec<UnitId> = state.board.values().copied().collect();
    for id in ids {
        if let Some(u) = state.units.get_mut(&id) {
            if u.side == side {
                u.shield_hp = u.shield_hp.max((shield * u.star as i32) as f32);
            }
        }
    }
}

/// Does this side currently field every listed template? Benched
/// members do not count, and a member dying mid-combat deactivates
/// the synergy.
pub fn team_has_all(state: &GameState, side: Side, keys: &[&str]) -> bool {
    keys.iter().all(|k| {
        state
            .living_on_board(side)
            .any(|(_, u)| u.key() == *k)
    })
}

/// Who may fire a synergy's on-hit effect.
#[derive(Debug, Clone, Copy)]
pub enum ActorRule {
    /// Any attacker on the side
    Any,
    /// Only the listed member templates
    Members,
    /// Only these specific templates
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub enum AttackKind {
    Any,
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy)]
pub enum Condition {
    None,
    TargetSlowed,
    /// Target has no adjacent living allies
    TargetIsolated,
    TargetHpAtMost(f32),
    TargetDied,
    /// A rostered unit of this template stands in the attacker's
    /// column, one row away
    AllyInColumn(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum OnHitEffect {
    /// Extra damage to the main target, `times` separate packets
    BonusDamage { ratio: f32, times: u8 },
    /// Damage every enemy orthogonally adjacent to the target
    SplashAdjacent { ratio: f32 },
    /// Damage only the first adjacent enemy found
    SplashFirstAdjacent { ratio: f32 },
    /// Damage enemies in cells behind the target along the attack line
    SplashBehind { ratio: f32, cells: u8 },
    /// Damage the three cells fanning out behind the target
    ConeBehind { ratio: f32 },
    /// Damage random enemies within the attacker's range
    RandomInRange {
        ratio: f32,
        count: u8,
        include_target: bool,
    },
    /// Damage the first enemies in range by scan order
    FirstInRange { ratio: f32, count: u8 },
    /// Shield allies adjacent to the attacker
    ShieldAdjacentAllies { per_star: i32 },
    /// Grant damage reduction to allies adjacent to the attacker
    ReduceAdjacentAllies { add: f32 },
    /// Stun the target, optionally with a burst of bonus damage
    StunTarget {
        base_ms: u64,
        per_star_ms: u64,
        bonus_ratio: f32,
    },
    SlowTarget { duration_ms: u64, factor: f32 },
    Bleed { duration_ms: u64, dps: f32 },
    /// Splash a ring around the first enemy adjacent to the target
    /// (or the target cell itself)
    SplashRing { ratio: f32 },
    /// On a killing blow, damage enemies around the target's cell
    DeathBurst { atk_ratio: f32 },
    HealFirstAdjacentAlly { per_star: i32 },
    HealSelf { amount: i32 },
    ShieldSelf { per_star: i32 },
}

/// One duo or trio synergy fired from a landed attack.
#[derive(Debug, Clone, Copy)]
pub struct OnHitSynergy {
    pub name: &'static str,
    pub members: &'static [&'static str],
    pub actors: ActorRule,
    pub attack: AttackKind,
    pub chance: f32,
    pub condition: Condition,
    pub effect: OnHitEffect,
}

pub static ON_HIT_SYNERGIES: &[OnHitSynergy] = &[
    // trios
    OnHitSynergy {
        name: "Sacred Bulwark",
        members: &["knight", "paladin", "templar"],
        actors: ActorRule::Any,
        attack: AttackKind::Any,
        chance: 0.2,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.5, times: 1 },
    },
    OnHitSynergy {
        name: "Arrow Storm",
        members: &["archer", "marksman", "sniper"],
        actors: ActorRule::Any,
        attack: AttackKind::Ranged,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::RandomInRange { ratio: 0.4, count: 2, include_target: false },
    },
    OnHitSynergy {
        name: "Colossus Wall",
        members: &["guardian", "champion", "gladiator"],
        actors: ActorRule::Any,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::ReduceAdjacentAllies { add: 0.08 },
    },
    OnHitSynergy {
        name: "Dark Coven",
        members: &["sorcerer", "warlock", "witch"],
        actors: ActorRule::Any,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashAdjacent { ratio: 0.25 },
    },
    OnHitSynergy {
        name: "Lance Wall",
        members: &["pikeman", "phalanx", "spear"],
        actors: ActorRule::Any,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashBehind { ratio: 0.25, cells: 2 },
    },
    OnHitSynergy {
        name: "Storm Conclave",
        members: &["mage", "sorcerer", "stormcaller"],
        actors: ActorRule::Any,
        attack: AttackKind::Ranged,
        chance: 0.2,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.45, times: 1 },
    },
    OnHitSynergy {
        name: "Blade Dance",
        members: &["rogue", "assassin", "duelist"],
        actors: ActorRule::Any,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashAdjacent { ratio: 0.2 },
    },
    OnHitSynergy {
        name: "Shield Phalanx",
        members: &["guardian", "shieldbearer", "shieldman"],
        actors: ActorRule::Any,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::ShieldAdjacentAllies { per_star: 10 },
    },
    OnHitSynergy {
        name: "Deep Freeze",
        members: &["frost", "icearcher", "mystic"],
        actors: ActorRule::Any,
        attack: AttackKind::Any,
        chance: 0.35,
        condition: Condition::TargetSlowed,
        effect: OnHitEffect::StunTarget { base_ms: 650, per_star_ms: 50, bonus_ratio: 0.3 },
    },
    OnHitSynergy {
        name: "Siege Volley",
        members: &["ballista", "sentry", "slinger"],
        actors: ActorRule::Any,
        attack: AttackKind::Ranged,
        chance: 0.2,
        condition: Condition::None,
        effect: OnHitEffect::SplashRing { ratio: 0.25 },
    },
    OnHitSynergy {
        name: "Pack Instinct",
        members: &["hunter", "archer", "beastmaster"],
        actors: ActorRule::Any,
        attack: AttackKind::Ranged,
        chance: 0.25,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.2, times: 2 },
    },
    // duos
    OnHitSynergy {
        name: "Frostbite Mark",
        members: &["frost", "marksman"],
        actors: ActorRule::Any,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::TargetSlowed,
        effect: OnHitEffect::BonusDamage { ratio: 0.35, times: 1 },
    },
    OnHitSynergy {
        name: "Twin Fangs",
        members: &["assassin", "rogue"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::TargetIsolated,
        effect: OnHitEffect::Bleed { duration_ms: 2500, dps: 12.0 },
    },
    OnHitSynergy {
        name: "Hunting Pair",
        members: &["hunter", "beastmaster"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::RandomInRange { ratio: 0.4, count: 1, include_target: false },
    },
    OnHitSynergy {
        name: "Lance Drill",
        members: &["spear", "phalanx"],
        actors: ActorRule::Only(&["spear", "phalanx", "pikeman", "javelin"]),
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashBehind { ratio: 0.3, cells: 1 },
    },
    OnHitSynergy {
        name: "Arcane Echo",
        members: &["mage", "warlock"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashAdjacent { ratio: 0.2 },
    },
    OnHitSynergy {
        name: "Deadeye Pact",
        members: &["sniper", "marksman"],
        actors: ActorRule::Members,
        attack: AttackKind::Ranged,
        chance: 0.18,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.8, times: 1 },
    },
    OnHitSynergy {
        name: "Suppressing Fire",
        members: &["ballista", "sentry"],
        actors: ActorRule::Members,
        attack: AttackKind::Ranged,
        chance: 0.2,
        condition: Condition::None,
        effect: OnHitEffect::RandomInRange { ratio: 0.35, count: 1, include_target: true },
    },
    OnHitSynergy {
        name: "Permafrost",
        members: &["icearcher", "frost"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 0.2,
        condition: Condition::TargetSlowed,
        effect: OnHitEffect::StunTarget { base_ms: 400, per_star_ms: 0, bonus_ratio: 0.0 },
    },
    OnHitSynergy {
        name: "Crusader Sweep",
        members: &["knight", "templar"],
        actors: ActorRule::Members,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::ConeBehind { ratio: 0.25 },
    },
    OnHitSynergy {
        name: "Final Rite",
        members: &["valkyrie", "paladin"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::TargetDied,
        effect: OnHitEffect::DeathBurst { atk_ratio: 0.5 },
    },
    OnHitSynergy {
        name: "Volley Pair",
        members: &["archer", "crossbow"],
        actors: ActorRule::Members,
        attack: AttackKind::Ranged,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::FirstInRange { ratio: 0.3, count: 2 },
    },
    OnHitSynergy {
        name: "Chain Surge",
        members: &["sorcerer", "stormcaller"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashFirstAdjacent { ratio: 0.35 },
    },
    OnHitSynergy {
        name: "War Frenzy",
        members: &["warrior", "berserker"],
        actors: ActorRule::Members,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.25, times: 1 },
    },
    OnHitSynergy {
        name: "Execution Brand",
        members: &["assassin", "duelist"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::TargetHpAtMost(0.5),
        effect: OnHitEffect::SlowTarget { duration_ms: 600, factor: 0.7 },
    },
    OnHitSynergy {
        name: "Skewer",
        members: &["pikeman", "javelin"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.25, times: 1 },
    },
    OnHitSynergy {
        name: "Winter's Bite",
        members: &["mage", "frost"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::TargetSlowed,
        effect: OnHitEffect::BonusDamage { ratio: 0.2, times: 1 },
    },
    OnHitSynergy {
        name: "Creeping Hex",
        members: &["warlock", "witch"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SlowTarget { duration_ms: 500, factor: 0.8 },
    },
    OnHitSynergy {
        name: "Piercing Shot",
        members: &["sniper", "crossbow"],
        actors: ActorRule::Members,
        attack: AttackKind::Ranged,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::SplashBehind { ratio: 0.35, cells: 1 },
    },
    OnHitSynergy {
        name: "Wild Bond",
        members: &["druid", "beastmaster"],
        actors: ActorRule::Only(&["beastmaster"]),
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::HealFirstAdjacentAlly { per_star: 6 },
    },
    OnHitSynergy {
        name: "Mind Break",
        members: &["rogue", "mystic"],
        actors: ActorRule::Members,
        attack: AttackKind::Any,
        chance: 0.15,
        condition: Condition::TargetHpAtMost(0.35),
        effect: OnHitEffect::StunTarget { base_ms: 450, per_star_ms: 0, bonus_ratio: 0.0 },
    },
    OnHitSynergy {
        name: "Bastion Pact",
        members: &["guardian", "champion"],
        actors: ActorRule::Members,
        attack: AttackKind::Melee,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::ShieldAdjacentAllies { per_star: 10 },
    },
    OnHitSynergy {
        name: "Overwatch",
        members: &["sentry", "marksman"],
        actors: ActorRule::Members,
        attack: AttackKind::Ranged,
        chance: 0.18,
        condition: Condition::None,
        effect: OnHitEffect::BonusDamage { ratio: 0.35, times: 1 },
    },
    OnHitSynergy {
        name: "Winged Guard",
        members: &["guardian", "valkyrie"],
        actors: ActorRule::Only(&["valkyrie"]),
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::AllyInColumn("guardian"),
        effect: OnHitEffect::ShieldSelf { per_star: 12 },
    },
    OnHitSynergy {
        name: "Inner Light",
        members: &["monk", "paladin"],
        actors: ActorRule::Only(&["monk"]),
        attack: AttackKind::Any,
        chance: 1.0,
        condition: Condition::None,
        effect: OnHitEffect::HealSelf { amount: 3 },
    },
];

/// Effects fired when a heal pulse is cast.
#[derive(Debug, Clone, Copy)]
pub enum HealEffect {
    /// Shield allies within the pulse radius
    ShieldAllies { per_star: i32 },
    /// Clear slow/stun and top up hp within the radius
    Cleanse { heal_per_star: i32 },
    /// Grant damage reduction within the radius
    ReduceAllies { add: f32 },
    /// Extra flat heal within the radius
    HealAllies { per_star: i32 },
    /// Damage enemies within the radius
    NovaEnemies { per_star: i32 },
}

#[derive(Debug, Clone, Copy)]
pub struct HealSynergy {
    pub name: &'static str,
    pub members: &'static [&'static str],
    pub actors: &'static [&'static str],
    pub effect: HealEffect,
}

pub static HEAL_SYNERGIES: &[HealSynergy] = &[
    HealSynergy {
        name: "Bulwark Blessing",
        members: &["guardian", "cleric"],
        actors: &["cleric"],
        effect: HealEffect::ShieldAllies { per_star: 16 },
    },
    HealSynergy {
        name: "Purifying Grove",
        members: &["druid", "monk"],
        actors: &["druid", "monk"],
        effect: HealEffect::Cleanse { heal_per_star: 6 },
    },
    HealSynergy {
        name: "Aegis",
        members: &["guardian", "paladin"],
        actors: &["paladin", "guardian"],
        effect: HealEffect::ReduceAllies { add: 0.1 },
    },
    HealSynergy {
        name: "Elixir",
        members: &["alchemist", "cleric"],
        actors: &["alchemist"],
        effect: HealEffect::ShieldAllies { per_star: 10 },
    },
    HealSynergy {
        name: "Blessed Grove",
        members: &["druid", "paladin"],
        actors: &["paladin"],
        effect: HealEffect::HealAllies { per_star: 5 },
    },
    HealSynergy {
        name: "Sanctuary",
        members: &["druid", "monk", "paladin"],
        actors: &["paladin"],
        effect: HealEffect::HealAllies { per_star: 8 },
    },
    HealSynergy {
        name: "Hymn of Life",
        members: &["cleric", "monk", "medic"],
        actors: &["cleric"],
        effect: HealEffect::HealAllies { per_star: 4 },
    },
    HealSynergy {
        name: "Radiant Nova",
        members: &["paladin", "sorcerer"],
        actors: &["paladin"],
        effect: HealEffect::NovaEnemies { per_star: 10 },
    },
];

/// Context of one landed main attack, passed to the on-hit resolver.
#[derive(Debug, Clone, Copy)]
pub struct HitCtx {
    pub attacker: UnitId,
    pub target: UnitId,
    pub attacker_pos: Pos,
    pub target_pos: Pos,
    /// Main-hit damage after all modifiers
    pub damage: i32,
    pub now: u64,
    pub target_died: bool,
}

struct AttackerInfo {
    side: Side,
    key: &'static str,
    star: u8,
    atk: i32,
    range: u32,
}

fn attacker_info(state: &GameState, id: UnitId) -> Option<AttackerInfo> {
    let u = state.units.get(&id)?;
    Some(AttackerInfo {
        side: u.side,
        key: u.key(),
        star: u.star,
        atk: u.template.stats.atk,
        range: u.template.stats.range,
    })
}

fn damage_unit(state: &mut GameState, id: UnitId, amount: i32) {
    if amount <= 0 {
        return;
    }
    if let Some(u) = state.units.get_mut(&id) {
        apply_damage(u, amount as f32);
    }
}

fn enemies_at(state: &GameState, cells: &[Pos], attacker_side: Side) -> Vec<UnitId> {
    cells
        .iter()
        .filter_map(|pos| {
            let id = state.board.get(pos)?;
            let u = state.units.get(id)?;
            (u.side != attacker_side && u.is_alive()).then_some(*id)
        })
        .collect()
}

/// Living enemies within the attacker's range, by board scan order.
fn enemies_in_range(state: &GameState, info: &AttackerInfo, from: Pos, exclude: Option<UnitId>) -> Vec<UnitId> {
    state
        .board
        .iter()
        .filter_map(|(pos, id)| {
            if Some(*id) == exclude {
                return None;
            }
            let u = state.units.get(id)?;
            (u.side != info.side && u.is_alive() && pos.manhattan(from) <= info.range)
                .then_some(*id)
        })
        .collect()
}

fn step(pos: Pos, dr: i32, dc: i32) -> Option<Pos> {
    let (r, c) = (pos.row as i32 + dr, pos.col as i32 + dc);
    crate::board::in_bounds(r, c).then(|| Pos::new(r as u8, c as u8))
}

/// Unit direction of the attack, as sign components.
fn attack_dir(from: Pos, to: Pos) -> (i32, i32) {
    let dr = (to.row as i32 - from.row as i32).signum();
    let dc = (to.col as i32 - from.col as i32).signum();
    (dr, dc)
}

fn condition_met(state: &GameState, cond: Condition, ctx: &HitCtx, info: &AttackerInfo) -> bool {
    match cond {
        Condition::None => true,
        Condition::TargetSlowed => state
            .units
            .get(&ctx.target)
            .is_some_and(|t| t.status.slow_until > ctx.now),
        Condition::TargetIsolated => {
            let target_side = info.side.opposite();
            count_adjacent_allies(state, ctx.target_pos, target_side) == 0
        }
        Condition::TargetHpAtMost(frac) => state
            .units
            .get(&ctx.target)
            .is_some_and(|t| t.hp <= (t.max_hp() as f32 * frac).floor() as i32),
        Condition::TargetDied => ctx.target_died,
        Condition::AllyInColumn(key) => state.board.iter().any(|(pos, id)| {
            pos.col == ctx.attacker_pos.col
                && pos.row.abs_diff(ctx.attacker_pos.row) == 1
                && state
                    .units
                    .get(id)
                    .is_some_and(|u| u.side == info.side && u.key() == key && u.is_alive())
        }),
    }
}

fn actor_allowed(rule: ActorRule, members: &[&str], key: &str) -> bool {
    match rule {
        ActorRule::Any => true,
        ActorRule::Members => members.contains(&key),
        ActorRule::Only(keys) => keys.contains(&key),
    }
}

fn attack_kind_matches(kind: AttackKind, range: u32) -> bool {
    match kind {
        AttackKind::Any => true,
        AttackKind::Melee => range <= 1,
        AttackKind::Ranged => range > 1,
    }
}

/// Resolve every duo/trio synergy triggered by a landed attack.
pub fn resolve_on_hit(state: &mut GameState, ctx: &HitCtx) {
    let Some(info) = attacker_info(state, ctx.attacker) else {
        return;
    };

    for def in ON_HIT_SYNERGIES {
        if !attack_kind_matches(def.attack, info.range) {
            continue;
        }
        if !actor_allowed(def.actors, def.members, info.key) {
            continue;
        }
        if !team_has_all(state, info.side, def.members) {
            continue;
        }
        if !condition_met(state, def.condition, ctx, &info) {
            continue;
        }
        if def.chance < 1.0 && !state.rng.gen_chance(def.chance) {
            continue;
        }
        apply_on_hit_effect(state, def.effect, ctx, &info);
    }
}

fn apply_on_hit_effect(state: &mut GameState, effect: OnHitEffect, ctx: &HitCtx, info: &AttackerInfo) {
    let dmg = |ratio: f32| (ctx.damage as f32 * ratio).floor() as i32;
    match effect {
        OnHitEffect::BonusDamage { ratio, times } => {
            for _ in 0..times {
                damage_unit(state, ctx.target, dmg(ratio));
            }
        }
        OnHitEffect::SplashAdjacent { ratio } => {
            for id in enemies_at(state, &neighbors(ctx.target_pos), info.side) {
                damage_unit(state, id, dmg(ratio));
            }
        }
        OnHitEffect::SplashFirstAdjacent { ratio } => {
            if let Some(id) = enemies_at(state, &neighbors(ctx.target_pos), info.side).first() {
                damage_unit(state, *id, dmg(ratio));
            }
        }
        OnHitEffect::SplashBehind { ratio, cells } => {
            let (dr, dc) = attack_dir(ctx.attacker_pos, ctx.target_pos);
            let mut pos = ctx.target_pos;
            for _ in 0..cells {
                let Some(next) = step(pos, dr, dc) else { break };
                pos = next;
                for id in enemies_at(state, &[pos], info.side) {
                    damage_unit(state, id, dmg(ratio));
                }
            }
        }
        OnHitEffect::ConeBehind { ratio } => {
            let (dr, dc) = attack_dir(ctx.attacker_pos, ctx.target_pos);
            if let Some(behind) = step(ctx.target_pos, dr, dc) {
                // fan sideways, perpendicular to the attack line
                let side_cells = if dr != 0 {
                    [step(behind, 0, 1), step(behind, 0, -1)]
                } else {
                    [step(behind, 1, 0), step(behind, -1, 0)]
                };
                let cone: Vec<Pos> = std::iter::once(Some(behind))
                    .chain(side_cells)
                    .flatten()
                    .collect();
                for id in enemies_at(state, &cone, info.side) {
                    damage_unit(state, id, dmg(ratio));
                }
            }
        }
        OnHitEffect::RandomInRange { ratio, count, include_target } => {
            let exclude = (!include_target).then_some(ctx.target);
            let mut pool = enemies_in_range(state, info, ctx.attacker_pos, exclude);
            state.rng.shuffle(&mut pool);
            for id in pool.into_iter().take(count as usize) {
                damage_unit(state, id, dmg(ratio));
            }
        }
        OnHitEffect::FirstInRange { ratio, count } => {
            let pool = enemies_in_range(state, info, ctx.attacker_pos, Some(ctx.target));
            for id in pool.into_iter().take(count as usize) {
                damage_unit(state, id, dmg(ratio));
            }
        }
        OnHitEffect::ShieldAdjacentAllies { per_star } => {
            let allies: Vec<UnitId> = neighbors(ctx.attacker_pos)
                .into_iter()
                .filter_map(|pos| {
                    let id = state.board.get(&pos)?;
                    let u = state.units.get(id)?;
                    (u.side == info.side && u.is_alive()).then_some(*id)
                })
                .collect();
            for id in allies {
                if let Some(u) = state.units.get_mut(&id) {
                    u.shield_hp += (per_star * info.star as i32) as f32;
                }
            }
        }
        OnHitEffect::ReduceAdjacentAllies { add } => {
            let allies: Vec<UnitId> = neighbors(ctx.attacker_pos)
                .into_iter()
                .filter_map(|pos| {
                    let id = state.board.get(&pos)?;
                    let u = state.units.get(id)?;
                    (u.side == info.side && u.is_alive()).then_some(*id)
                })
                .collect();
            for id in allies {
                if let Some(u) = state.units.get_mut(&id) {
                    u.damage_reduction = (u.damage_reduction + add).min(0.2);
                }
            }
        }
        OnHitEffect::StunTarget { base_ms, per_star_ms, bonus_ratio } => {
            let until = ctx.now + base_ms + per_star_ms * info.star as u64;
            if let Some(t) = state.units.get_mut(&ctx.target) {
                t.status.stunned_until = t.status.stunned_until.max(until);
            }
            if bonus_ratio > 0.0 {
                damage_unit(state, ctx.target, dmg(bonus_ratio));
            }
        }
        OnHitEffect::SlowTarget { duration_ms, factor } => {
            if let Some(t) = state.units.get_mut(&ctx.target) {
                t.status.slow_until = t.status.slow_until.max(ctx.now + duration_ms);
                t.status.slow_factor = if t.status.slow_factor > 0.0 {
                    t.status.slow_factor.min(factor)
                } else {
                    factor
                };
            }
        }
        OnHitEffect::Bleed { duration_ms, dps } => {
            if let Some(t) = state.units.get_mut(&ctx.target) {
                t.status.bleed_until = t.status.bleed_until.max(ctx.now + duration_ms);
                t.status.bleed_dps = t.status.bleed_dps.max(dps);
            }
        }
        OnHitEffect::SplashRing { ratio } => {
            let center = enemies_at(state, &neighbors(ctx.target_pos), info.side)
                .first()
                .and_then(|id| state.position_of(*id))
                .unwrap_or(ctx.target_pos);
            let mut cells = neighbors(center);
            cells.push(center);
            for id in enemies_at(state, &cells, info.side) {
                damage_unit(state, id, dmg(ratio));
            }
        }
        OnHitEffect::DeathBurst { atk_ratio } => {
            let burst = (info.atk as f32 * info.star as f32 * atk_ratio).floor() as i32;
            for id in enemies_at(state, &neighbors(ctx.target_pos), info.side) {
                damage_unit(state, id, burst);
            }
        }
        OnHitEffect::HealFirstAdjacentAlly { per_star } => {
            let ally = neighbors(ctx.attacker_pos).into_iter().find_map(|pos| {
                let id = state.board.get(&pos)?;
                let u = state.units.get(id)?;
                (u.side == info.side && u.is_alive()).then_some(*id)
            });
            if let Some(id) = ally {
                if let Some(u) = state.units.get_mut(&id) {
                    u.hp = (u.hp + per_star * info.star as i32).min(u.max_hp());
                }
            }
        }
        OnHitEffect::HealSelf { amount } => {
            if let Some(u) = state.units.get_mut(&ctx.attacker) {
                u.hp = (u.hp + amount).min(u.max_hp());
            }
        }
        OnHitEffect::ShieldSelf { per_star } => {
            if let Some(u) = state.units.get_mut(&ctx.attacker) {
                u.shield_hp += (per_star * info.star as i32) as f32;
            }
        }
    }
}

/// Resolve heal-pulse-linked synergies when `caster` casts.
pub fn resolve_heal_cast(state: &mut GameState, caster: UnitId, caster_pos: Pos, now: u64) {
    let Some(info) = attacker_info(state, caster) else {
        return;
    };

    for def in HEAL_SYNERGIES {
        if !def.actors.contains(&info.key) {
            continue;
        }
        if !team_has_all(state, info.side, def.members) {
            continue;
        }
        apply_heal_effect(state, def, caster_pos, now, &info);
        if matches!(def.effect, HealEffect::ShieldAllies { .. } | HealEffect::Cleanse { .. }) {
            state.log.push(format!("{}: allies bolstered", def.name));
        }
    }
}

fn units_in_radius(state: &GameState, center: Pos, side: Side, same_side: bool) -> Vec<UnitId> {
    state
        .board
        .iter()
        .filter_map(|(pos, id)| {
            let u = state.units.get(id)?;
            let side_ok = (u.side == side) == same_side;
            (side_ok && u.is_alive() && pos.manhattan(center) <= HEAL_RADIUS).then_some(*id)
        })
        .collect()
}

fn apply_heal_effect(state: &mut GameState, def: &HealSynergy, center: Pos, _now: u64, info: &AttackerInfo) {
    match def.effect {
        HealEffect::ShieldAllies { per_star } => {
            for id in units_in_radius(state, center, info.side, true) {
                if let Some(u) = state.units.get_mut(&id) {
                    u.shield_hp += (per_star * info.star as i32) as f32;
                }
            }
        }
        HealEffect::Cleanse { heal_per_star } => {
            for id in units_in_radius(state, center, info.side, true) {
                if let Some(u) = state.units.get_mut(&id) {
                    u.status.slow_until = 0;
                    u.status.stunned_until = 0;
                    u.hp = (u.hp + heal_per_star * info.star as i32).min(u.max_hp());
                }
            }
        }
        HealEffect::ReduceAllies { add } => {
            for id in units_in_radius(state, center, info.side, true) {
                if let Some(u) = state.units.get_mut(&id) {
                    u.damage_reduction = (u.damage_reduction + add).min(0.2);
                }
            }
        }
        HealEffect::HealAllies { per_star } => {
            for id in units_in_radius(state, center, info.side, true) {
                if let Some(u) = state.units.get_mut(&id) {
                    u.hp = (u.hp + per_star * info.star as i32).min(u.max_hp());
                }
            }
        }
        HealEffect::NovaEnemies { per_star } => {
            let burst = per_star * info.star as i32;
            for id in units_in_radius(state, center, info.side, false) {
                damage_unit(state, id, burst);
            }
        }
    }
}

/// Log which named synergies are live for each side at combat start.
pub fn announce_active(state: &mut GameState) {
    let mut lines = Vec::new();
    let all = ON_HIT_SYNERGIES
        .iter()
        .map(|d| (d.name, d.members))
        .chain(HEAL_SYNERGIES.iter().map(|d| (d.name, d.members)));
    for (name, members) in all {
        if team_has_all(state, Side::Player, members) {
            lines.push(format!("Special synergy activated: {name}"));
        }
        if team_has_all(state, Side::Enemy, members) {
            lines.push(format!("Enemy synergy active: {name}"));
        }
    }
    state.log.extend(lines);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(tier_for_count(0), 0);
        assert_eq!(tier_for_count(1), 0);
        assert_eq!(tier_for_count(2), 1);
        assert_eq!(tier_for_count(3), 1);
        assert_eq!(tier_for_count(4), 2);
        assert_eq!(tier_for_count(5), 2);
        assert_eq!(tier_for_count(6), 3);
        assert_eq!(tier_for_count(9), 3);
    }

    #[test]
    fn test_every_on_hit_synergy_names_real_templates() {
        for def in ON_HIT_SYNERGIES {
            for key in def.members {
                assert!(
                    crate::units::find_template(key).is_some(),
                    "unknown member {key} in {}",
                    def.name
                );
            }
            if let ActorRule::Only(keys) = def.actors {
                for key in keys {
                    assert!(crate::units::find_template(key).is_some());
                }
            }
        }
        for def in HEAL_SYNERGIES {
            for key in def.members.iter().chain(def.actors) {
                assert!(crate::units::find_template(key).is_some());
            }
        }
    }
}
