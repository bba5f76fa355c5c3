//! The game engine: command surface and round lifecycle.
//!
//! Hosts construct a [`GameEngine`], issue prep-phase commands, call
//! [`GameEngine::start_combat`], then drive [`GameEngine::combat_tick`]
//! on a timer of [`GameEngine::tick_interval_ms`] until it reports the
//! round is over. Commands return `true` on success and `false` for
//! illegal-but-harmless requests (wrong phase, not enough gold, an
//! occupied cell); those are soft no-ops by design.

use log::{debug, info};

use crate::battle::{check_outcome, simulate_tick, CombatEvent};
use crate::board;
use crate::opponent;
use crate::rng::BattleRng;
use crate::shop;
use crate::state::{
    GamePhase, GameState, BASE_TICK_MS, MAX_COMBAT_SPEED, MAX_ITEMS_PER_UNIT, MIN_COMBAT_SPEED,
    MIN_TICK_MS, PASSIVE_XP, XP_PURCHASE_AMOUNT, XP_PURCHASE_COST,
};
use crate::types::{CompEntry, ItemKey, Outcome, Pos, RunRecord, Side, UnitId};
use crate::view::GameView;

/// Safety valve for headless combat: no round should take this long.
const MAX_COMBAT_TICKS: u32 = 20_000;

/// The main game engine.
pub struct GameEngine {
    state: GameState,
    events: Vec<CombatEvent>,
}

impl GameEngine {
    pub fn new(seed: u64) -> Self {
        info!("new run, seed={seed}");
        let mut engine = Self {
            state: GameState::new(seed),
            events: Vec::new(),
        };
        shop::refresh_shop(&mut engine.state);
        shop::refresh_enemy_shop(&mut engine.state);
        engine.state.log.push("Prep phase".to_string());
        engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Snapshot for rendering or inspection.
    pub fn view(&self) -> GameView {
        GameView::from_state(&self.state)
    }

    /// Drain combat events accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record of the finished run, present once the game is over.
    pub fn run_record(&self) -> Option<&RunRecord> {
        self.state.run_record.as_ref()
    }

    // --- prep commands ---

    pub fn buy_unit(&mut self, shop_item_id: u32) -> bool {
        debug!("buy_unit item={shop_item_id}");
        shop::buy_unit(&mut self.state, shop_item_id)
    }

    pub fn sell_unit(&mut self, unit_id: UnitId) -> bool {
        debug!("sell_unit unit={unit_id}");
        shop::sell_unit(&mut self.state, unit_id)
    }

    pub fn reroll(&mut self) -> bool {
        debug!("reroll");
        shop::reroll(&mut self.state)
    }

    pub fn toggle_freeze(&mut self, shop_item_id: u32) -> bool {
        shop::toggle_freeze(&mut self.state, shop_item_id)
    }

    pub fn toggle_shop_lock(&mut self) -> bool {
        if self.state.phase != GamePhase::Prep {
            return false;
        }
        self.state.shop_locked = !self.state.shop_locked;
        true
    }

    pub fn buy_xp(&mut self) -> bool {
        if self.state.phase != GamePhase::Prep || self.state.gold < XP_PURCHASE_COST {
            return false;
        }
        self.state.gold -= XP_PURCHASE_COST;
        let levels = self.state.gain_xp(Side::Player, XP_PURCHASE_AMOUNT);
        if levels > 0 && !self.state.shop_locked {
            shop::refresh_shop(&mut self.state);
        }
        true
    }

    pub fn place_unit(&mut self, unit_id: UnitId, pos: Pos) -> bool {
        board::place_unit(&mut self.state, unit_id, pos)
    }

    pub fn move_unit(&mut self, unit_id: UnitId, pos: Pos) -> bool {
        board::move_unit(&mut self.state, unit_id, pos)
    }

    pub fn remove_unit(&mut self, unit_id: UnitId) -> bool {
        board::remove_unit(&mut self.state, unit_id)
    }

    /// Bench whatever stands on a cell.
    pub fn remove_unit_at(&mut self, pos: Pos) -> bool {
        match self.state.board.get(&pos).copied() {
            Some(id) => board::remove_unit(&mut self.state, id),
            None => false,
        }
    }

    // --- combat controls ---

    pub fn set_combat_speed(&mut self, speed: f32) -> f32 {
        let clamped = speed.clamp(MIN_COMBAT_SPEED, MAX_COMBAT_SPEED);
        self.state.speed = (clamped * 100.0).round() / 100.0;
        self.state.speed
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Combat {
            return false;
        }
        self.state.paused = !self.state.paused;
        true
    }

    /// How long the host should wait between [`Self::combat_tick`] calls.
    pub fn tick_interval_ms(&self) -> u64 {
        let speed = self.state.speed.clamp(MIN_COMBAT_SPEED, MAX_COMBAT_SPEED);
        ((BASE_TICK_MS as f32 / speed).floor() as u64).max(MIN_TICK_MS)
    }

    /// Generation token for the current combat. A host timer started
    /// for an earlier combat passes a stale token and gets ignored.
    pub fn combat_generation(&self) -> u64 {
        self.state.combat_generation
    }

    /// Begin the combat phase for the current round.
    pub fn start_combat(&mut self) -> bool {
        if self.state.phase != GamePhase::Prep {
            return false;
        }
        let s = &mut self.state;
        s.phase = GamePhase::Combat;
        s.paused = false;
        s.combat_generation += 1;
        let round = s.round;
        s.log.push(format!("Round {round} begins"));
        info!("combat start, round {round}");

        // snapshot the player's placement for restoration and for the
        // opponent's scouting next round
        s.saved_placement = s
            .board
            .iter()
            .filter(|(_, id)| s.units.get(id).is_some_and(|u| u.side == Side::Player))
            .map(|(pos, id)| (*id, *pos))
            .collect();

        // the opponent reacts to the last *completed* placement, never
        // to this round's live edits
        let scouted = self
            .state
            .last_round_placement
            .clone()
            .unwrap_or_else(|| self.state.saved_placement.clone());
        let analysis = opponent::analyze_placement(&self.state, &scouted);
        opponent::buy_phase(&mut self.state, &analysis);
        opponent::deploy(&mut self.state);

        crate::synergy::apply_pre_buffs(&mut self.state, Side::Player);
        crate::synergy::apply_pre_buffs(&mut self.state, Side::Enemy);
        self.apply_variety_modifiers();
        board::apply_cover(&mut self.state);
        crate::synergy::announce_active(&mut self.state);
        true
    }

    /// Advance combat by one tick. Returns `true` while the host
    /// should keep scheduling ticks. A paused combat stays alive but
    /// does not simulate.
    pub fn combat_tick(&mut self, generation: u64) -> bool {
        if self.state.phase != GamePhase::Combat || generation != self.state.combat_generation {
            return false;
        }
        if self.state.paused {
            return true;
        }
        let tick = self.tick_interval_ms();
        self.state.clock_ms += tick;
        let now = self.state.clock_ms;
        simulate_tick(&mut self.state, &mut self.events, now, tick);
        match check_outcome(&mut self.state) {
            Some(outcome) => {
                self.finish_combat(outcome);
                false
            }
            None => true,
        }
    }

    /// Drive the current combat to completion without a host timer.
    /// Intended for headless simulation.
    pub fn run_combat(&mut self) -> Option<Outcome> {
        let generation = self.state.combat_generation;
        for _ in 0..MAX_COMBAT_TICKS {
            if !self.combat_tick(generation) {
                return self.state.last_outcome;
            }
        }
        // stalemate: call it a draw
        self.state.log.push("Combat timed out".to_string());
        self.finish_combat(Outcome::Loss);
        self.state.last_outcome
    }

    fn finish_combat(&mut self, outcome: Outcome) {
        let s = &mut self.state;
        s.last_outcome = Some(outcome);
        match outcome {
            Outcome::Win => {
                s.win_streak += 1;
                s.lose_streak = 0;
            }
            Outcome::Loss => {
                s.lose_streak += 1;
                s.win_streak = 0;
            }
        }
        self.events.push(CombatEvent::CombatEnded { outcome });
        if s.health <= 0 {
            s.phase = GamePhase::GameOver;
            s.log.push("Game over".to_string());
            info!("run over at round {}", s.round);
            self.emit_run_record();
        } else {
            s.phase = GamePhase::Result;
        }
    }

    /// Advance from a settled round into the next prep phase.
    pub fn next_round(&mut self) -> bool {
        if self.state.phase != GamePhase::Result {
            return false;
        }
        let s = &mut self.state;
        s.phase = GamePhase::Prep;
        s.round += 1;

        let streak = s.income_streak();
        s.gold += GameState::round_income(s.gold, streak);
        // the opponent's bonus tracks the *player's* streak, a mild
        // rubber-band that keeps close games close
        s.enemy_gold += GameState::round_income(s.enemy_gold, streak);

        s.gain_xp(Side::Player, PASSIVE_XP);
        s.gain_xp(Side::Enemy, PASSIVE_XP);

        if !self.state.shop_locked {
            shop::refresh_shop(&mut self.state);
        }
        shop::refresh_enemy_shop(&mut self.state);

        let scouted = self.state.last_round_placement.clone().unwrap_or_default();
        let analysis = opponent::analyze_placement(&self.state, &scouted);
        opponent::buy_phase(&mut self.state, &analysis);

        self.state.reset_units_for_prep();
        self.restore_player_placement();

        let saved = std::mem::take(&mut self.state.saved_placement);
        self.state.last_round_placement = Some(saved);
        self.state.log.push("Prep phase".to_string());

        self.try_grant_random_item(Side::Player, 0.15);
        self.try_grant_random_item(Side::Enemy, 0.12);
        true
    }

    /// Put the player's saved placement back on a cleared board, up to
    /// the unit cap; overflow and stragglers go to the bench.
    fn restore_player_placement(&mut self) {
        let s = &mut self.state;
        s.board.clear();
        let cap = GameState::max_board_units(s.level) as usize;
        let mut placed = 0usize;
        let mut fielded: Vec<UnitId> = Vec::new();
        let saved: Vec<(UnitId, Pos)> = s.saved_placement.iter().map(|(id, p)| (*id, *p)).collect();
        for (id, pos) in saved {
            if !s.units.contains_key(&id) {
                continue;
            }
            if placed >= cap {
                break;
            }
            s.board.insert(pos, id);
            fielded.push(id);
            placed += 1;
        }
        s.bench = s
            .units
            .values()
            .filter(|u| u.side == Side::Player && !fielded.contains(&u.id))
            .map(|u| u.id)
            .collect();
    }

    /// Every 5th round the enemy is fortified with shields; every 10th
    /// it gets a boss hp multiplier instead.
    fn apply_variety_modifiers(&mut self) {
        let s = &mut self.state;
        if s.round % 10 == 0 {
            for u in s.units.values_mut().filter(|u| u.side == Side::Enemy) {
                u.hp = (u.hp as f32 * 1.25).floor() as i32;
            }
            s.log
                .push("Boss modifiers active: enemy strength increased.".to_string());
        } else if s.round % 5 == 0 {
            for u in s.units.values_mut().filter(|u| u.side == Side::Enemy) {
                u.shield_hp += (26 * u.star as i32) as f32;
            }
            s.log
                .push("Elite modifiers active: enemy shields fortified.".to_string());
        }
    }

    fn try_grant_random_item(&mut self, side: Side, chance: f32) {
        if self.state.rng.gen_chance(chance) {
            self.grant_random_item(side);
        }
    }

    /// Equip a random item onto a random owned unit with a free slot.
    pub(crate) fn grant_random_item(&mut self, side: Side) -> bool {
        let candidates: Vec<UnitId> = self
            .state
            .units
            .values()
            .filter(|u| u.side == side && u.items.len() < MAX_ITEMS_PER_UNIT)
            .map(|u| u.id)
            .collect();
        if candidates.is_empty() {
            return false;
        }
        let item = ItemKey::ALL[self.state.rng.gen_range(ItemKey::ALL.len())];
        let unit_id = candidates[self.state.rng.gen_range(candidates.len())];
        let Some(unit) = self.state.units.get_mut(&unit_id) else {
            return false;
        };
        unit.items.push(item);
        if item == ItemKey::ShieldAmulet {
            unit.shield_hp += (24 * unit.star as i32) as f32;
        }
        let key = unit.key();
        if side == Side::Player {
            self.state
                .log
                .push(format!("Found item: {}, equipped to {key}.", item.label()));
        }
        true
    }

    fn emit_run_record(&mut self) {
        let s = &mut self.state;
        let mut comp: Vec<CompEntry> = Vec::new();
        for u in s.units.values().filter(|u| u.side == Side::Player) {
            let entry = CompEntry {
                template: u.key().to_string(),
                star: u.star,
            };
            if !comp.contains(&entry) {
                comp.push(entry);
            }
        }
        s.run_record = Some(RunRecord {
            id: format!("run-{:08x}-{}", s.seed, s.round),
            rounds: s.round,
            duration_ms: s.clock_ms,
            level: s.level,
            hp: s.health,
            comp,
        });
    }
}
