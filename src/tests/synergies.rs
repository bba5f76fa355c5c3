use super::add_unit;
use crate::state::GameState;
use crate::synergy::{self, compute_tiers, HitCtx};
use crate::types::{Pos, Side, Trait};
use crate::view::GameView;

#[test]
fn test_tiers_count_only_fielded_living_units() {
    let mut state = GameState::new(41);
    add_unit(&mut state, "archer", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "archer", Side::Player, 1, Some(Pos::new(7, 1)));
    let dead = add_unit(&mut state, "archer", Side::Player, 1, Some(Pos::new(7, 2)));
    add_unit(&mut state, "archer", Side::Player, 1, None); // benched
    state.units.get_mut(&dead).unwrap().hp = 0;

    let tiers = compute_tiers(&state, Side::Player);
    assert_eq!(tiers.tier(Trait::Ranger), 1);
}

#[test]
fn test_vanguard_tier_shields_the_fielded_side() {
    let mut state = GameState::new(41);
    let a = add_unit(&mut state, "shieldman", Side::Player, 1, Some(Pos::new(7, 0)));
    let b = add_unit(&mut state, "warrior", Side::Player, 2, Some(Pos::new(7, 1)));
    let foe = add_unit(&mut state, "warrior", Side::Enemy, 1, Some(Pos::new(0, 0)));

    synergy::apply_pre_buffs(&mut state, Side::Player);

    assert_eq!(state.unit(a).unwrap().shield_hp, 14.0);
    // star-scaled
    assert_eq!(state.unit(b).unwrap().shield_hp, 28.0);
    assert_eq!(state.unit(foe).unwrap().shield_hp, 0.0);
}

#[test]
fn test_vanguard_shield_never_shrinks_an_existing_one() {
    let mut state = GameState::new(41);
    let a = add_unit(&mut state, "shieldman", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 1)));
    state.units.get_mut(&a).unwrap().shield_hp = 40.0;

    synergy::apply_pre_buffs(&mut state, Side::Player);
    assert_eq!(state.unit(a).unwrap().shield_hp, 40.0);
}

#[test]
fn test_duo_bonus_damage_on_hit() {
    // War Frenzy: warrior + berserker, melee hits strike again
    let mut state = GameState::new(41);
    let warrior = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(5, 3)));
    add_unit(&mut state, "berserker", Side::Player, 1, Some(Pos::new(7, 7)));
    let target = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(4, 3)));

    synergy::resolve_on_hit(
        &mut state,
        &HitCtx {
            attacker: warrior,
            target,
            attacker_pos: Pos::new(5, 3),
            target_pos: Pos::new(4, 3),
            damage: 40,
            now: 500,
            target_died: false,
        },
    );

    // floor(40 * 0.25) extra
    assert_eq!(state.unit(target).unwrap().hp, 110);
}

#[test]
fn test_duo_needs_both_members_rostered() {
    let mut state = GameState::new(41);
    let warrior = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(5, 3)));
    let target = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(4, 3)));

    synergy::resolve_on_hit(
        &mut state,
        &HitCtx {
            attacker: warrior,
            target,
            attacker_pos: Pos::new(5, 3),
            target_pos: Pos::new(4, 3),
            damage: 40,
            now: 500,
            target_died: false,
        },
    );

    assert_eq!(state.unit(target).unwrap().hp, 120);
}

#[test]
fn test_benched_member_does_not_activate_duo() {
    let mut state = GameState::new(41);
    let warrior = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(5, 3)));
    // the partner is owned but sits on the bench
    add_unit(&mut state, "berserker", Side::Player, 1, None);
    let target = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(4, 3)));

    synergy::resolve_on_hit(
        &mut state,
        &HitCtx {
            attacker: warrior,
            target,
            attacker_pos: Pos::new(5, 3),
            target_pos: Pos::new(4, 3),
            damage: 40,
            now: 500,
            target_died: false,
        },
    );

    assert_eq!(state.unit(target).unwrap().hp, 120);
}

#[test]
fn test_dead_member_deactivates_duo() {
    let mut state = GameState::new(41);
    let warrior = add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(5, 3)));
    let partner = add_unit(&mut state, "berserker", Side::Player, 1, Some(Pos::new(7, 7)));
    let target = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(4, 3)));
    state.units.get_mut(&partner).unwrap().hp = 0;

    synergy::resolve_on_hit(
        &mut state,
        &HitCtx {
            attacker: warrior,
            target,
            attacker_pos: Pos::new(5, 3),
            target_pos: Pos::new(4, 3),
            damage: 40,
            now: 500,
            target_died: false,
        },
    );

    assert_eq!(state.unit(target).unwrap().hp, 120);
}

#[test]
fn test_lance_synergies_pierce_the_ranks_behind() {
    // Lance Wall (trio) splashes two cells behind; Lance Drill (duo)
    // adds a heavier hit to the first of them
    let mut state = GameState::new(41);
    let spear = add_unit(&mut state, "spear", Side::Player, 1, Some(Pos::new(5, 3)));
    add_unit(&mut state, "pikeman", Side::Player, 1, Some(Pos::new(6, 0)));
    add_unit(&mut state, "phalanx", Side::Player, 1, Some(Pos::new(6, 1)));
    let target = add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(4, 3)));
    let first_behind = add_unit(&mut state, "warrior", Side::Enemy, 1, Some(Pos::new(3, 3)));
    let second_behind = add_unit(&mut state, "warrior", Side::Enemy, 1, Some(Pos::new(2, 3)));

    synergy::resolve_on_hit(
        &mut state,
        &HitCtx {
            attacker: spear,
            target,
            attacker_pos: Pos::new(5, 3),
            target_pos: Pos::new(4, 3),
            damage: 40,
            now: 500,
            target_died: false,
        },
    );

    assert_eq!(state.unit(target).unwrap().hp, 120); // splash skips the main target
    assert_eq!(state.unit(first_behind).unwrap().hp, 120 - 10 - 12);
    assert_eq!(state.unit(second_behind).unwrap().hp, 110);
}

#[test]
fn test_heal_linked_synergy_shields_on_cast() {
    let mut state = GameState::new(41);
    let cleric = add_unit(&mut state, "cleric", Side::Player, 1, Some(Pos::new(6, 3)));
    let guardian = add_unit(&mut state, "guardian", Side::Player, 1, Some(Pos::new(6, 2)));

    synergy::resolve_heal_cast(&mut state, cleric, Pos::new(6, 3), 1000);

    assert_eq!(state.unit(cleric).unwrap().shield_hp, 16.0);
    assert_eq!(state.unit(guardian).unwrap().shield_hp, 16.0);
    assert!(state
        .log
        .iter()
        .any(|line| line.contains("Bulwark Blessing")));
}

#[test]
fn test_active_synergies_are_announced() {
    let mut state = GameState::new(41);
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "berserker", Side::Player, 1, Some(Pos::new(7, 1)));
    add_unit(&mut state, "rogue", Side::Enemy, 1, Some(Pos::new(0, 0)));
    add_unit(&mut state, "assassin", Side::Enemy, 1, Some(Pos::new(0, 1)));

    synergy::announce_active(&mut state);

    assert!(state
        .log
        .iter()
        .any(|l| l == "Special synergy activated: War Frenzy"));
    assert!(state
        .log
        .iter()
        .any(|l| l == "Enemy synergy active: Twin Fangs"));
}

#[test]
fn test_heal_linked_synergies_are_announced_too() {
    let mut state = GameState::new(41);
    add_unit(&mut state, "cleric", Side::Player, 1, Some(Pos::new(6, 3)));
    add_unit(&mut state, "guardian", Side::Player, 1, Some(Pos::new(6, 2)));

    synergy::announce_active(&mut state);

    assert!(state
        .log
        .iter()
        .any(|l| l == "Special synergy activated: Bulwark Blessing"));
}

#[test]
fn test_view_reports_synergies_for_both_sides() {
    let mut state = GameState::new(41);
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(7, 0)));
    add_unit(&mut state, "archer", Side::Enemy, 1, Some(Pos::new(0, 0)));
    add_unit(&mut state, "archer", Side::Enemy, 1, Some(Pos::new(0, 1)));

    let view = GameView::from_state(&state);

    let enemy_rangers = view
        .enemy_synergies
        .iter()
        .find(|s| s.synergy_trait == Trait::Ranger)
        .expect("enemy tier map must be exposed");
    assert_eq!(enemy_rangers.count, 2);
    assert_eq!(enemy_rangers.tier, 1);
    // the player map stays player-only
    assert!(view
        .synergies
        .iter()
        .all(|s| s.synergy_trait != Trait::Ranger));
}
