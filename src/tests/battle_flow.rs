use super::add_unit;
use crate::battle::{apply_damage, check_outcome, simulate_tick, CombatEvent};
use crate::state::{GamePhase, GameState};
use crate::types::{Outcome, Pos, Side};

fn combat_state(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.phase = GamePhase::Combat;
    state
}

#[test]
fn test_damage_pipeline_reduction_then_shield_then_hp() {
    let mut state = GameState::new(1);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);
    let unit = state.units.get_mut(&id).unwrap();
    unit.damage_reduction = 0.5;
    unit.shield_hp = 10.0;

    // 30 in, halved to 15, shield eats 10, hp loses 5
    apply_damage(unit, 30.0);
    assert_eq!(unit.hp, 115);
    assert_eq!(unit.shield_hp, 0.0);
}

#[test]
fn test_shield_absorbs_before_hp() {
    let mut state = GameState::new(1);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);
    let unit = state.units.get_mut(&id).unwrap();
    unit.shield_hp = 50.0;

    apply_damage(unit, 20.0);
    assert_eq!(unit.hp, 120);
    assert_eq!(unit.shield_hp, 30.0);
}

#[test]
fn test_fractional_damage_floors() {
    let mut state = GameState::new(1);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);
    let unit = state.units.get_mut(&id).unwrap();
    apply_damage(unit, 7.9);
    assert_eq!(unit.hp, 113);
}

#[test]
fn test_damage_reduction_is_clamped() {
    let mut state = GameState::new(1);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);
    let unit = state.units.get_mut(&id).unwrap();
    unit.damage_reduction = 5.0;

    // even an absurd reduction leaves 10% through
    apply_damage(unit, 30.0);
    assert_eq!(unit.hp, 117);
}

#[test]
fn test_melee_closer_takes_ranged_fire_on_approach() {
    let mut state = combat_state(9);
    let melee = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    let shooter = add_unit(&mut state, "archer", Side::Enemy, 1, Some(Pos::new(0, 0)));

    let mut events = Vec::new();
    let max_hp = state.unit(melee).unwrap().max_hp();
    let mut now = 0;
    for _ in 0..400 {
        now += 100;
        simulate_tick(&mut state, &mut events, now, 100);
        let Some(melee_pos) = state.position_of(melee) else {
            break; // shot down before closing, which proves the point
        };
        let Some(shooter_pos) = state.position_of(shooter) else {
            break;
        };
        if melee_pos.manhattan(shooter_pos) <= 1 {
            break;
        }
    }

    let hp = state.units.get(&melee).map(|u| u.hp).unwrap_or(0);
    assert!(hp < max_hp, "melee unit closed the gap without being shot");
}

#[test]
fn test_stunned_unit_neither_attacks_nor_moves() {
    let mut state = combat_state(9);
    let stunned = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(4, 0)));
    let foe = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(3, 0)));
    state.units.get_mut(&stunned).unwrap().status.stunned_until = 60_000;

    let mut events = Vec::new();
    simulate_tick(&mut state, &mut events, 1000, 100);

    let foe_unit = state.unit(foe).unwrap();
    assert_eq!(foe_unit.hp, foe_unit.max_hp());
    // the enemy is not stunned and lands its opener
    let warrior = state.unit(stunned).unwrap();
    assert!(warrior.hp < warrior.max_hp());
    assert_eq!(warrior.last_attack_ms, 0);
}

#[test]
fn test_heal_pulse_heals_allies_in_radius() {
    let mut state = combat_state(9);
    let medic = add_unit(&mut state, "medic", Side::Player, 1, Some(Pos::new(6, 0)));
    let hurt = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(6, 1)));
    let far = add_unit(&mut state, "spear", Side::Player, 1, Some(Pos::new(6, 6)));
    add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(0, 7)));
    state.units.get_mut(&hurt).unwrap().hp = 50;
    state.units.get_mut(&far).unwrap().hp = 50;

    let mut events = Vec::new();
    // past the medic's 2700ms cooldown
    simulate_tick(&mut state, &mut events, 3000, 100);

    assert_eq!(state.unit(hurt).unwrap().hp, 62);
    assert_eq!(state.unit(far).unwrap().hp, 50);
    assert_eq!(state.unit(medic).unwrap().last_special_ms, 3000);
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::HealPulse { caster, .. } if *caster == medic)));
}

#[test]
fn test_bleed_ticks_whole_points_and_carries_fractions() {
    let mut state = combat_state(9);
    let bleeding = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(0, 7)));
    {
        let u = state.units.get_mut(&bleeding).unwrap();
        u.status.bleed_until = 60_000;
        u.status.bleed_dps = 8.0;
        // stand still and let the dot run
        u.status.stunned_until = 60_000;
    }

    let mut events = Vec::new();
    let mut now = 0;
    for _ in 0..10 {
        now += 100;
        simulate_tick(&mut state, &mut events, now, 100);
    }

    // 8 dps over a full second
    assert_eq!(state.unit(bleeding).unwrap().hp, 112);
}

#[test]
fn test_win_when_enemy_board_is_wiped() {
    let mut state = combat_state(9);
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    assert_eq!(check_outcome(&mut state), Some(Outcome::Win));
    assert_eq!(state.health, 100);
}

#[test]
fn test_loss_costs_health_per_surviving_enemy_stars() {
    let mut state = combat_state(9);
    add_unit(&mut state, "warrior", Side::Enemy, 2, Some(Pos::new(0, 0)));
    add_unit(&mut state, "spear", Side::Enemy, 1, Some(Pos::new(0, 1)));
    assert_eq!(check_outcome(&mut state), Some(Outcome::Loss));
    // 2 base + 2 + 1 surviving stars
    assert_eq!(state.health, 95);
}

#[test]
fn test_double_wipe_is_a_bloodless_loss() {
    let mut state = combat_state(9);
    assert_eq!(check_outcome(&mut state), Some(Outcome::Loss));
    assert_eq!(state.health, 100);
}

#[test]
fn test_combat_continues_while_both_sides_stand() {
    let mut state = combat_state(9);
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "warrior", Side::Enemy, 1, Some(Pos::new(0, 0)));
    assert_eq!(check_outcome(&mut state), None);
}
