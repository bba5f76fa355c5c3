use super::add_unit;
use crate::board;
use crate::engine::GameEngine;
use crate::state::GameState;
use crate::types::{Pos, Side};

#[test]
fn test_placement_rejected_across_midline() {
    let mut state = GameState::new(21);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);
    assert!(!board::place_unit(&mut state, id, Pos::new(3, 0)));
    assert!(state.bench.contains(&id));
    assert!(board::place_unit(&mut state, id, Pos::new(4, 0)));
    assert_eq!(state.position_of(id), Some(Pos::new(4, 0)));
}

#[test]
fn test_placement_rejected_on_occupied_cell() {
    let mut state = GameState::new(21);
    add_unit(&mut state, "warrior", Side::Player, 1, Some(Pos::new(5, 5)));
    let id = add_unit(&mut state, "spear", Side::Player, 1, None);
    assert!(!board::place_unit(&mut state, id, Pos::new(5, 5)));
    assert!(board::place_unit(&mut state, id, Pos::new(5, 6)));
}

#[test]
fn test_level_caps_fielded_units() {
    let mut state = GameState::new(21);
    state.level = 3;
    // distinct templates so nothing combines away
    let a = add_unit(&mut state, "recruit", Side::Player, 1, None);
    let b = add_unit(&mut state, "slinger", Side::Player, 1, None);
    let c = add_unit(&mut state, "medic", Side::Player, 1, None);
    let d = add_unit(&mut state, "shieldman", Side::Player, 1, None);

    assert!(board::place_unit(&mut state, a, Pos::new(7, 0)));
    assert!(board::place_unit(&mut state, b, Pos::new(7, 1)));
    assert!(board::place_unit(&mut state, c, Pos::new(7, 2)));
    assert!(!board::place_unit(&mut state, d, Pos::new(7, 3)));
    assert!(state.bench.contains(&d));
    assert_eq!(state.fielded_count(Side::Player), 3);
}

#[test]
fn test_place_move_remove_round_trip() {
    let mut state = GameState::new(21);
    let id = add_unit(&mut state, "warrior", Side::Player, 1, None);

    assert!(board::place_unit(&mut state, id, Pos::new(6, 2)));
    assert!(board::move_unit(&mut state, id, Pos::new(4, 7)));
    assert_eq!(state.position_of(id), Some(Pos::new(4, 7)));
    assert!(!state.board.contains_key(&Pos::new(6, 2)));

    assert!(board::remove_unit(&mut state, id));
    assert_eq!(state.position_of(id), None);
    assert!(state.bench.contains(&id));
}

#[test]
fn test_remove_by_cell_benches_the_occupant() {
    let mut engine = GameEngine::new(21);
    let id = add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(6, 2)));

    assert!(engine.remove_unit_at(Pos::new(6, 2)));
    assert_eq!(engine.state().position_of(id), None);
    assert!(engine.state().bench.contains(&id));

    // nothing left on that cell
    assert!(!engine.remove_unit_at(Pos::new(6, 2)));
}

#[test]
fn test_enemy_units_cannot_be_commanded() {
    let mut state = GameState::new(21);
    let id = add_unit(&mut state, "warrior", Side::Enemy, 1, Some(Pos::new(2, 2)));
    assert!(!board::move_unit(&mut state, id, Pos::new(5, 5)));
    assert!(!board::remove_unit(&mut state, id));
}

#[test]
fn test_line_blocked_only_by_units_between() {
    let mut state = GameState::new(21);
    add_unit(&mut state, "shieldman", Side::Player, 1, Some(Pos::new(5, 3)));

    // blocker strictly between the endpoints
    assert!(board::is_line_blocked(
        &state,
        Pos::new(7, 3),
        Pos::new(3, 3)
    ));
    // a shorter shot stops before the blocker
    assert!(!board::is_line_blocked(
        &state,
        Pos::new(7, 3),
        Pos::new(6, 3)
    ));
    // diagonals are assumed clear
    assert!(!board::is_line_blocked(
        &state,
        Pos::new(7, 1),
        Pos::new(3, 5)
    ));
}

#[test]
fn test_cover_buffs_the_protected_ranged_unit() {
    let mut state = GameState::new(21);
    let front = add_unit(&mut state, "shieldman", Side::Player, 1, Some(Pos::new(5, 2)));
    let back = add_unit(&mut state, "archer", Side::Player, 1, Some(Pos::new(6, 2)));

    board::apply_cover(&mut state);

    let archer = state.unit(back).unwrap();
    assert_eq!(archer.cover_atk_bonus, 3);
    assert!((archer.damage_reduction - 0.12).abs() < 1e-6);
    let shieldman = state.unit(front).unwrap();
    assert_eq!(shieldman.cover_atk_bonus, 0);
    assert_eq!(shieldman.damage_reduction, 0.0);
}

#[test]
fn test_cover_is_mirrored_for_the_enemy() {
    let mut state = GameState::new(21);
    add_unit(&mut state, "shieldman", Side::Enemy, 1, Some(Pos::new(2, 4)));
    let back = add_unit(&mut state, "archer", Side::Enemy, 1, Some(Pos::new(1, 4)));

    board::apply_cover(&mut state);
    assert_eq!(state.unit(back).unwrap().cover_atk_bonus, 3);
}

#[test]
fn test_cover_ignores_short_range_back_units() {
    let mut state = GameState::new(21);
    add_unit(&mut state, "shieldman", Side::Player, 1, Some(Pos::new(5, 2)));
    // spear is range 2, not a long-range carry
    let back = add_unit(&mut state, "spear", Side::Player, 1, Some(Pos::new(6, 2)));

    board::apply_cover(&mut state);
    assert_eq!(state.unit(back).unwrap().cover_atk_bonus, 0);
}
