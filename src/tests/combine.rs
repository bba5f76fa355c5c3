use super::{add_unit, benched, offer};
use crate::engine::GameEngine;
use crate::state::GameState;
use crate::types::{Pos, Side};

#[test]
fn test_three_bench_copies_merge_into_two_star() {
    let mut state = GameState::new(7);
    for _ in 0..3 {
        add_unit(&mut state, "spear", Side::Player, 1, None);
    }
    state.try_combine("spear", Side::Player);

    let roster = state.roster(Side::Player);
    assert_eq!(roster.len(), 1);
    let unit = state.unit(roster[0]).unwrap();
    assert_eq!(unit.star, 2);
    assert_eq!(unit.hp, 200); // spear base 100, doubled at 2-star
    assert_eq!(state.bench, roster);
}

#[test]
fn test_combine_cascades_to_three_star() {
    let mut state = GameState::new(7);
    add_unit(&mut state, "warrior", Side::Player, 2, None);
    add_unit(&mut state, "warrior", Side::Player, 2, None);
    for _ in 0..3 {
        add_unit(&mut state, "warrior", Side::Player, 1, None);
    }
    // the 1-star triple merges first, completing the 2-star triple
    state.try_combine("warrior", Side::Player);

    let roster = state.roster(Side::Player);
    assert_eq!(roster.len(), 1);
    let unit = state.unit(roster[0]).unwrap();
    assert_eq!(unit.star, 3);
    assert_eq!(unit.hp, 360);
}

#[test]
fn test_combine_keeps_board_position() {
    let mut state = GameState::new(7);
    let fielded = add_unit(&mut state, "spear", Side::Player, 1, Some(Pos::new(5, 2)));
    add_unit(&mut state, "spear", Side::Player, 1, None);
    add_unit(&mut state, "spear", Side::Player, 1, None);
    state.try_combine("spear", Side::Player);

    let upgraded = state.board.get(&Pos::new(5, 2)).copied().unwrap();
    assert_ne!(upgraded, fielded);
    assert_eq!(state.unit(upgraded).unwrap().star, 2);
    assert!(state.bench.is_empty());
}

#[test]
fn test_two_copies_never_combine() {
    let mut state = GameState::new(7);
    add_unit(&mut state, "spear", Side::Player, 1, None);
    add_unit(&mut state, "spear", Side::Player, 1, None);
    state.try_combine("spear", Side::Player);
    assert_eq!(state.roster(Side::Player).len(), 2);
    assert!(state.units.values().all(|u| u.star == 1));
}

#[test]
fn test_four_copies_leave_one_behind() {
    let mut state = GameState::new(7);
    for _ in 0..4 {
        add_unit(&mut state, "spear", Side::Player, 1, None);
    }
    state.try_combine("spear", Side::Player);

    let mut stars: Vec<u8> = state.units.values().map(|u| u.star).collect();
    stars.sort();
    assert_eq!(stars, vec![1, 2]);
}

#[test]
fn test_buying_three_identical_units_combines_on_bench() {
    // level 3, gold 10, three 2-cost purchases of the same template
    let mut engine = GameEngine::new(3);
    let state = engine.state_mut();
    assert_eq!(state.level, 3);
    assert_eq!(state.gold, 10);
    state.shop.clear();
    state.frozen.clear();
    let ids = [
        offer(state, "spear"),
        offer(state, "spear"),
        offer(state, "spear"),
    ];

    for id in ids {
        assert!(engine.buy_unit(id));
    }

    assert_eq!(engine.state().gold, 4);
    let bench = benched(engine.state());
    assert_eq!(bench.len(), 1);
    assert_eq!(bench[0].key(), "spear");
    assert_eq!(bench[0].star, 2);
}
