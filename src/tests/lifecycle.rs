use super::add_unit;
use crate::battle::CombatEvent;
use crate::engine::GameEngine;
use crate::state::GamePhase;
use crate::types::{ItemKey, Pos, Side};

#[test]
fn test_round_runs_prep_combat_result_prep() {
    let mut engine = GameEngine::new(5);
    add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    add_unit(engine.state_mut(), "archer", Side::Player, 1, Some(Pos::new(6, 3)));

    assert!(engine.start_combat());
    assert_eq!(engine.state().phase, GamePhase::Combat);
    assert!(!engine.start_combat()); // already fighting

    let outcome = engine.run_combat();
    assert!(outcome.is_some());
    assert_eq!(engine.state().phase, GamePhase::Result);
    assert!(engine
        .take_events()
        .iter()
        .any(|e| matches!(e, CombatEvent::CombatEnded { .. })));

    assert!(engine.next_round());
    assert_eq!(engine.state().phase, GamePhase::Prep);
    assert_eq!(engine.state().round, 2);
}

#[test]
fn test_player_placement_restored_next_round() {
    let mut engine = GameEngine::new(5);
    let front = add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    let back = add_unit(engine.state_mut(), "archer", Side::Player, 1, Some(Pos::new(6, 3)));

    assert!(engine.start_combat());
    engine.run_combat();
    assert!(engine.next_round());

    let state = engine.state();
    assert_eq!(state.position_of(front), Some(Pos::new(7, 3)));
    assert_eq!(state.position_of(back), Some(Pos::new(6, 3)));
    // everyone comes back to full for the new prep
    assert_eq!(state.unit(front).unwrap().hp, state.unit(front).unwrap().max_hp());
    assert!(state.unit(front).unwrap().status == Default::default());
}

#[test]
fn test_stale_generation_tokens_are_ignored() {
    let mut engine = GameEngine::new(5);
    add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    assert!(engine.start_combat());
    let generation = engine.combat_generation();
    assert!(!engine.combat_tick(generation - 1));
    assert!(engine.combat_tick(generation) || engine.state().phase != GamePhase::Combat);
}

#[test]
fn test_pause_freezes_the_clock() {
    let mut engine = GameEngine::new(5);
    add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    assert!(engine.start_combat());
    assert!(engine.toggle_pause());
    let generation = engine.combat_generation();
    let clock = engine.state().clock_ms;
    assert!(engine.combat_tick(generation));
    assert_eq!(engine.state().clock_ms, clock);
    assert!(engine.toggle_pause());
}

#[test]
fn test_combat_speed_scales_the_tick_interval() {
    let mut engine = GameEngine::new(5);
    assert_eq!(engine.tick_interval_ms(), 100);
    assert_eq!(engine.set_combat_speed(2.0), 2.0);
    assert_eq!(engine.tick_interval_ms(), 50);
    // clamped at both ends
    assert_eq!(engine.set_combat_speed(9.0), 4.0);
    assert_eq!(engine.set_combat_speed(0.0), 0.1);
}

#[test]
fn test_game_over_emits_a_run_record() {
    let mut engine = GameEngine::new(5);
    engine.state_mut().health = 1;
    // nothing fielded on the player side, a guaranteed rout
    add_unit(engine.state_mut(), "warrior", Side::Enemy, 1, None);

    assert!(engine.start_combat());
    let outcome = engine.run_combat();
    assert_eq!(outcome, Some(crate::types::Outcome::Loss));
    assert_eq!(engine.state().phase, GamePhase::GameOver);
    assert_eq!(engine.state().health, 0);

    let record = engine.run_record().expect("game over must emit a record");
    assert_eq!(record.rounds, 1);
    assert_eq!(record.hp, 0);
    assert!(record.id.starts_with("run-"));

    assert!(!engine.next_round());
}

#[test]
fn test_fixed_seed_runs_are_identical() {
    fn play(seed: u64) -> GameEngine {
        let mut engine = GameEngine::new(seed);
        let affordable = engine
            .state()
            .shop
            .iter()
            .find(|i| i.cost <= engine.state().gold)
            .map(|i| i.id);
        if let Some(id) = affordable {
            assert!(engine.buy_unit(id));
        }
        if let Some(&unit) = engine.state().bench.first() {
            assert!(engine.place_unit(unit, Pos::new(7, 0)));
        }
        assert!(engine.start_combat());
        engine.run_combat();
        if engine.state().phase == GamePhase::Result {
            assert!(engine.next_round());
        }
        engine
    }

    let a = play(0xDEAD_BEEF);
    let b = play(0xDEAD_BEEF);

    assert_eq!(a.state().health, b.state().health);
    assert_eq!(a.state().gold, b.state().gold);
    assert_eq!(a.state().round, b.state().round);
    assert_eq!(a.state().log, b.state().log);
    let va = serde_json::to_value(a.view()).unwrap();
    let vb = serde_json::to_value(b.view()).unwrap();
    assert_eq!(va, vb);
}

#[test]
fn test_item_drops_skip_units_with_full_slots() {
    let mut engine = GameEngine::new(5);
    let full = add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    let open = add_unit(engine.state_mut(), "archer", Side::Player, 1, Some(Pos::new(6, 3)));
    engine
        .state_mut()
        .units
        .get_mut(&full)
        .unwrap()
        .items
        .extend([ItemKey::BerserkerAxe, ItemKey::FrostRune]);

    assert!(engine.grant_random_item(Side::Player));

    assert_eq!(engine.state().unit(full).unwrap().items.len(), 2);
    assert_eq!(engine.state().unit(open).unwrap().items.len(), 1);
}

#[test]
fn test_item_drops_fizzle_when_every_slot_is_taken() {
    let mut engine = GameEngine::new(5);
    let only = add_unit(engine.state_mut(), "warrior", Side::Player, 1, Some(Pos::new(7, 3)));
    engine
        .state_mut()
        .units
        .get_mut(&only)
        .unwrap()
        .items
        .extend([ItemKey::BerserkerAxe, ItemKey::FrostRune]);

    assert!(!engine.grant_random_item(Side::Player));
    assert_eq!(engine.state().unit(only).unwrap().items.len(), 2);
}
