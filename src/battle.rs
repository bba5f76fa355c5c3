//! Tick-driven combat simulation.
//!
//! Combat advances in fixed logical ticks. Each tick, every fielded
//! unit (in shuffled order) bleeds, targets the nearest enemy, casts
//! its heal pulse if ready, then attacks or steps closer. All damage
//! funnels through one pipeline: damage reduction, then shield, then
//! floor-rounded hp loss.

use serde::{Deserialize, Serialize};

use crate::board::{count_adjacent_allies, is_line_blocked, neighbors};
use crate::rng::BattleRng;
use crate::state::{
    GameState, MAX_COMBAT_SPEED, MIN_ATTACK_CD_MS, MIN_COMBAT_SPEED, MIN_MOVE_CD_MS,
};
use crate::synergy::{
    self, compute_tiers, HitCtx, Tiers, CASTER_HEAL_MULT, CASTER_SLOW_BONUS, HEAL_RADIUS,
    RANGER_ATK_RATE, SKIRMISHER_MOVE_RATE, SUPPORT_HEAL_MULT, VANGUARD_ATK,
};
use crate::types::{Ability, ItemKey, Outcome, Pos, Side, Trait, UnitId, UnitInstance};

/// Status kinds reported through the events channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    Stunned,
    Slowed,
    Bleeding,
}

/// Observable combat happenings, drained by the host each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CombatEvent {
    Hit {
        attacker: UnitId,
        target: UnitId,
        damage: i32,
    },
    StatusApplied {
        target: UnitId,
        status: StatusKind,
        until_ms: u64,
    },
    HealPulse {
        caster: UnitId,
        healed: Vec<UnitId>,
    },
    UnitDied {
        unit: UnitId,
    },
    CombatEnded {
        outcome: Outcome,
    },
}

/// The damage pipeline: reduction first, then shield absorption, then
/// the floor-rounded remainder off hp. Order is load-bearing.
pub fn apply_damage(u: &mut UnitInstance, amount: f32) {
    let mut remaining = amount;
    if u.damage_reduction > 0.0 {
        remaining *= 1.0 - u.damage_reduction.clamp(0.0, 0.9);
    }
    if u.shield_hp > 0.0 {
        let absorb = u.shield_hp.min(remaining);
        u.shield_hp -= absorb;
        remaining -= absorb;
    }
    if remaining > 0.0 {
        u.hp -= remaining.floor() as i32;
    }
}

/// Remove freshly dead units from the board.
fn sweep_deaths(state: &mut GameState, events: &mut Vec<CombatEvent>) {
    let dead: Vec<(Pos, UnitId)> = state
        .board
        .iter()
        .filter(|(_, id)| state.units.get(id).is_some_and(|u| !u.is_alive()))
        .map(|(pos, id)| (*pos, *id))
        .collect();
    for (pos, id) in dead {
        state.board.remove(&pos);
        if let Some(u) = state.units.get(&id) {
            state.log.push(format!("{} falls", u.key()));
        }
        events.push(CombatEvent::UnitDied { unit: id });
    }
}

fn nearest_enemy(state: &GameState, from: Pos, side: Side) -> Option<(u32, UnitId, Pos)> {
    let mut best: Option<(u32, UnitId, Pos)> = None;
    for (pos, id) in &state.board {
        let Some(u) = state.units.get(id) else {
            continue;
        };
        if u.side == side || !u.is_alive() {
            continue;
        }
        let dist = pos.manhattan(from);
        if best.is_none_or(|(d, _, _)| dist < d) {
            best = Some((dist, *id, *pos));
        }
    }
    best
}

/// Advance combat by one tick of `tick_ms` logical milliseconds.
pub fn simulate_tick(state: &mut GameState, events: &mut Vec<CombatEvent>, now: u64, tick_ms: u64) {
    let mut order: Vec<UnitId> = state.board.values().copied().collect();
    state.rng.shuffle(&mut order);

    let player_tiers = compute_tiers(state, Side::Player);
    let enemy_tiers = compute_tiers(state, Side::Enemy);

    for id in order {
        let Some(unit) = state.units.get(&id) else {
            continue;
        };
        if !unit.is_alive() {
            continue;
        }
        let Some(pos) = state.position_of(id) else {
            continue;
        };
        let side = unit.side;
        let star = unit.star;
        let stats = unit.template.stats;
        let ability = unit.ability();
        let status = unit.status;
        let tiers = match side {
            Side::Player => &player_tiers,
            Side::Enemy => &enemy_tiers,
        };

        // damage over time, carrying sub-point fractions across ticks
        if status.bleed_until > now && status.bleed_dps > 0.0 {
            let mut carry = status.bleed_carry + status.bleed_dps * tick_ms as f32 / 1000.0;
            let whole = carry.floor();
            carry -= whole;
            if let Some(u) = state.units.get_mut(&id) {
                u.status.bleed_carry = carry;
                if whole >= 1.0 {
                    apply_damage(u, whole);
                }
            }
            sweep_deaths(state, events);
            if state.units.get(&id).is_none_or(|u| !u.is_alive()) {
                continue;
            }
        }

        if !state.units.values().any(|u| u.side != side && u.is_alive()) {
            return;
        }
        let Some((best_dist, target_id, target_pos)) = nearest_enemy(state, pos, side) else {
            continue;
        };

        let speed = state.speed.clamp(MIN_COMBAT_SPEED, MAX_COMBAT_SPEED);
        let atk_cd = {
            let base = (stats.atk_interval_ms as f32 / star as f32 / speed).floor() as u64;
            let clamped = base.max(MIN_ATTACK_CD_MS);
            (clamped as f32 * (1.0 - RANGER_ATK_RATE[tiers.tier(Trait::Ranger)])).floor() as u64
        };
        let move_cd = {
            let base = (stats.move_interval_ms as f32 / star as f32 / speed).floor() as u64;
            let clamped = base.max(MIN_MOVE_CD_MS);
            (clamped as f32 * (1.0 - SKIRMISHER_MOVE_RATE[tiers.tier(Trait::Skirmisher)])).floor()
                as u64
        };

        // the cast check precedes the stun check: healers keep pulsing
        // while stunned, they only lose attacks and movement
        if let Some(Ability::HealPulse { cooldown_ms, amount }) = ability {
            let last = state.units.get(&id).map(|u| u.last_special_ms).unwrap_or(0);
            if now.saturating_sub(last) >= cooldown_ms {
                cast_heal_pulse(state, events, id, pos, amount, star, tiers, now);
                sweep_deaths(state, events);
            }
        }

        if status.stunned_until > now {
            continue;
        }

        let Some(u) = state.units.get(&id) else {
            continue;
        };
        let last_attack = u.last_attack_ms;
        let last_move = u.last_move_ms;
        let cover = u.cover_atk_bonus;
        let swift = u.has_item(ItemKey::SwiftGloves);

        if best_dist <= stats.range && now.saturating_sub(last_attack) >= atk_cd {
            if let Some(u) = state.units.get_mut(&id) {
                u.last_attack_ms = now;
            }
            let atk_bonus = VANGUARD_ATK[tiers.tier(Trait::Vanguard)] + cover;
            resolve_attack(state, events, id, pos, target_id, target_pos, atk_bonus, tiers, now);
            sweep_deaths(state, events);
            continue;
        }

        // step toward the target
        let mut effective_move = move_cd;
        if swift {
            effective_move = (effective_move as f32 * 0.95).floor() as u64;
        }
        if status.slow_until > now && status.slow_factor > 0.0 {
            effective_move = (effective_move as f32 / status.slow_factor).floor() as u64;
        }
        if best_dist > stats.range && now.saturating_sub(last_move) >= effective_move {
            let mut open: Vec<Pos> = neighbors(pos)
                .into_iter()
                .filter(|n| !state.board.contains_key(n))
                .collect();
            state.rng.shuffle(&mut open);
            open.sort_by_key(|n| n.manhattan(target_pos));
            if let Some(dest) = open.first().copied() {
                state.board.remove(&pos);
                state.board.insert(dest, id);
                if let Some(u) = state.units.get_mut(&id) {
                    u.last_move_ms = now;
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cast_heal_pulse(
    state: &mut GameState,
    events: &mut Vec<CombatEvent>,
    caster: UnitId,
    pos: Pos,
    amount: i32,
    star: u8,
    tiers: &Tiers,
    now: u64,
) {
    let Some(side) = state.units.get(&caster).map(|u| u.side) else {
        return;
    };
    if let Some(u) = state.units.get_mut(&caster) {
        u.last_special_ms = now;
    }

    let mult =
        SUPPORT_HEAL_MULT[tiers.tier(Trait::Support)] * CASTER_HEAL_MULT[tiers.tier(Trait::Caster)];
    let heal = (amount as f32 * star as f32 * mult).floor() as i32;

    let allies: Vec<UnitId> = state
        .board
        .iter()
        .filter_map(|(p, id)| {
            let u = state.units.get(id)?;
            (u.side == side && u.is_alive() && p.manhattan(pos) <= HEAL_RADIUS).then_some(*id)
        })
        .collect();
    for id in &allies {
        if let Some(u) = state.units.get_mut(id) {
            u.hp = (u.hp + heal).min(u.max_hp());
        }
    }
    if let Some(u) = state.units.get(&caster) {
        state.log.push(format!("{} casts heal", u.key()));
    }
    events.push(CombatEvent::HealPulse {
        caster,
        healed: allies,
    });

    synergy::resolve_heal_cast(state, caster, pos, now);
}

#[allow(clippy::too_many_arguments)]
fn resolve_attack(
    state: &mut GameState,
    events: &mut Vec<CombatEvent>,
    attacker_id: UnitId,
    attacker_pos: Pos,
    target_id: UnitId,
    target_pos: Pos,
    atk_bonus: i32,
    tiers: &Tiers,
    now: u64,
) {
    let Some(attacker) = state.units.get(&attacker_id) else {
        return;
    };
    let key = attacker.key();
    let star = attacker.star;
    let side = attacker.side;
    let stats = attacker.template.stats;
    let ability = attacker.ability();
    let items = attacker.items.clone();

    let mut damage = ((stats.atk + atk_bonus) as f32 * star as f32).floor() as i32;
    if items.contains(&ItemKey::BerserkerAxe) {
        damage += 10;
    }

    // innate on-hit statuses
    match ability {
        Some(Ability::StunOnHit { chance, duration_ms }) => {
            if state.rng.gen_chance(chance) {
                let until = now + duration_ms;
                if let Some(t) = state.units.get_mut(&target_id) {
                    t.status.stunned_until = until;
                }
                if let Some(t) = state.units.get(&target_id) {
                    let tkey = t.key();
                    state.log.push(format!("{key} stuns {tkey}"));
                }
                events.push(CombatEvent::StatusApplied {
                    target: target_id,
                    status: StatusKind::Stunned,
                    until_ms: until,
                });
            }
        }
        Some(Ability::SlowOnHit { chance, factor, duration_ms }) => {
            let chance = chance + CASTER_SLOW_BONUS[tiers.tier(Trait::Caster)];
            if state.rng.gen_chance(chance) {
                let until = now + duration_ms;
                if let Some(t) = state.units.get_mut(&target_id) {
                    t.status.slow_until = until;
                    t.status.slow_factor = factor;
                }
                events.push(CombatEvent::StatusApplied {
                    target: target_id,
                    status: StatusKind::Slowed,
                    until_ms: until,
                });
            }
        }
        _ => {}
    }
    if items.contains(&ItemKey::FrostRune) && state.rng.gen_chance(0.2) {
        let until = now + 900;
        if let Some(t) = state.units.get_mut(&target_id) {
            t.status.slow_until = t.status.slow_until.max(until);
            t.status.slow_factor = 0.7;
        }
        events.push(CombatEvent::StatusApplied {
            target: target_id,
            status: StatusKind::Slowed,
            until_ms: until,
        });
    }
    if items.contains(&ItemKey::BarbedBlade) && state.rng.gen_chance(0.2) {
        let until = now + 3000;
        if let Some(t) = state.units.get_mut(&target_id) {
            t.status.bleed_until = t.status.bleed_until.max(until);
            t.status.bleed_dps = t.status.bleed_dps.max(8.0);
        }
        events.push(CombatEvent::StatusApplied {
            target: target_id,
            status: StatusKind::Bleeding,
            until_ms: until,
        });
    }

    // positional modifiers
    let target_side = side.opposite();
    if stats.range > 1 {
        let sees_through = key == "sniper" || key == "marksman";
        if !sees_through && is_line_blocked(state, attacker_pos, target_pos) {
            damage = (damage as f32 * 0.8).floor() as i32;
        }
    } else {
        let flanking =
            attacker_pos.row == target_pos.row && attacker_pos.col.abs_diff(target_pos.col) == 1;
        if flanking {
            damage = (damage as f32 * 1.1).floor() as i32;
        }
        if count_adjacent_allies(state, target_pos, target_side) == 0 {
            damage = (damage as f32 * 1.08).floor() as i32;
        }
    }

    if let Some(t) = state.units.get_mut(&target_id) {
        apply_damage(t, damage as f32);
    }
    if items.contains(&ItemKey::VampiricFang) {
        let heal = (damage as f32 * 0.15).floor() as i32;
        if let Some(a) = state.units.get_mut(&attacker_id) {
            a.hp = (a.hp + heal).min(a.max_hp());
        }
    }
    if let Some(t) = state.units.get(&target_id) {
        let tkey = t.key();
        state
            .log
            .push(format!("{key}({star}\u{2605}) hits {tkey} for {damage}"));
    }
    events.push(CombatEvent::Hit {
        attacker: attacker_id,
        target: target_id,
        damage,
    });

    let target_died = state.units.get(&target_id).is_none_or(|t| !t.is_alive());
    synergy::resolve_on_hit(
        state,
        &HitCtx {
            attacker: attacker_id,
            target: target_id,
            attacker_pos,
            target_pos,
            damage,
            now,
            target_died,
        },
    );

    // splash abilities ride on the main hit
    match ability {
        Some(Ability::Cleave { ratio }) => {
            let splash = (damage as f32 * ratio).floor() as i32;
            let victims: Vec<UnitId> = neighbors(target_pos)
                .into_iter()
                .filter_map(|p| {
                    let id = state.board.get(&p)?;
                    let u = state.units.get(id)?;
                    (u.side == target_side && u.is_alive()).then_some(*id)
                })
                .collect();
            for id in victims {
                if let Some(u) = state.units.get_mut(&id) {
                    apply_damage(u, splash as f32);
                }
            }
        }
        Some(Ability::Pierce { ratio }) => {
            let dr = (target_pos.row as i32 - attacker_pos.row as i32).signum();
            let dc = (target_pos.col as i32 - attacker_pos.col as i32).signum();
            let mut r = target_pos.row as i32;
            let mut c = target_pos.col as i32;
            for _ in 0..stats.range {
                r += dr;
                c += dc;
                if !crate::board::in_bounds(r, c) {
                    break;
                }
                let p = Pos::new(r as u8, c as u8);
                let victim = state.board.get(&p).copied().filter(|id| {
                    state
                        .units
                        .get(id)
                        .is_some_and(|u| u.side == target_side && u.is_alive())
                });
                if let Some(id) = victim {
                    let punch = (damage as f32 * ratio).floor() as i32;
                    if let Some(u) = state.units.get_mut(&id) {
                        apply_damage(u, punch as f32);
                    }
                    break;
                }
            }
        }
        Some(Ability::Multishot { extra_targets, ratio }) => {
            let mut others: Vec<(u32, UnitId)> = state
                .board
                .iter()
                .filter_map(|(p, id)| {
                    if *id == target_id {
                        return None;
                    }
                    let u = state.units.get(id)?;
                    let dist = p.manhattan(attacker_pos);
                    (u.side == target_side && u.is_alive() && dist <= stats.range)
                        .then_some((dist, *id))
                })
                .collect();
            others.sort();
            let splash = (damage as f32 * ratio).floor() as i32;
            for (_, id) in others.into_iter().take(extra_targets as usize) {
                if let Some(u) = state.units.get_mut(&id) {
                    apply_damage(u, splash as f32);
                }
            }
        }
        _ => {}
    }
}

/// End-of-tick outcome check. A wiped player board loses the round,
/// with player health reduced by 2 plus surviving enemy stars; a
/// double wipe is a draw and costs no health.
pub fn check_outcome(state: &mut GameState) -> Option<Outcome> {
    let alive = |side: Side| {
        state
            .board
            .values()
            .any(|id| state.units.get(id).is_some_and(|u| u.side == side && u.is_alive()))
    };
    let players_alive = alive(Side::Player);
    let enemies_alive = alive(Side::Enemy);

    if players_alive && enemies_alive {
        return None;
    }

    if players_alive {
        state.log.push("You win!".to_string());
        return Some(Outcome::Win);
    }

    if enemies_alive {
        let hp_loss: i32 = state
            .board
            .values()
            .filter_map(|id| state.units.get(id))
            .filter(|u| u.side == Side::Enemy && u.is_alive())
            .fold(2, |total, u| total + u.star as i32);
        state.health = (state.health - hp_loss).max(0);
        state
            .log
            .push(format!("You lose the round, taking {hp_loss} damage."));
        return Some(Outcome::Loss);
    }

    state.log.push("Draw.".to_string());
    Some(Outcome::Loss)
}
