//! View types for host serialization.
//!
//! Snapshots are plain data: a renderer or test can serialize them
//! without reaching into engine internals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{GamePhase, GameState};
use crate::synergy::tier_for_count;
use crate::types::{ItemKey, Outcome, Pos, RunRecord, Side, Trait, UnitId, UnitInstance};

/// View of one unit instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: UnitId,
    pub key: String,
    pub name: String,
    pub side: Side,
    pub star: u8,
    pub hp: i32,
    pub max_hp: i32,
    pub shield_hp: f32,
    pub traits: Vec<Trait>,
    pub items: Vec<ItemKey>,
}

impl From<&UnitInstance> for UnitView {
    fn from(u: &UnitInstance) -> Self {
        Self {
            id: u.id,
            key: u.key().to_string(),
            name: u.template.name.to_string(),
            side: u.side,
            star: u.star,
            hp: u.hp,
            max_hp: u.max_hp(),
            shield_hp: u.shield_hp,
            traits: u.template.traits.to_vec(),
            items: u.items.clone(),
        }
    }
}

/// A unit standing on a board cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedUnitView {
    pub pos: Pos,
    pub unit: UnitView,
}

/// One shop offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItemView {
    pub id: u32,
    pub key: String,
    pub name: String,
    pub cost: i32,
    pub frozen: bool,
}

/// One active (or nearly active) trait synergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynergyView {
    pub synergy_trait: Trait,
    pub count: usize,
    pub tier: u8,
}

/// The complete game view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub phase: GamePhase,
    pub round: u32,
    pub gold: i32,
    pub health: i32,
    pub level: u8,
    pub xp: i32,
    pub xp_to_next: i32,
    pub enemy_level: u8,
    pub win_streak: u32,
    pub lose_streak: u32,
    pub last_outcome: Option<Outcome>,
    pub shop: Vec<ShopItemView>,
    pub shop_locked: bool,
    pub bench: Vec<UnitView>,
    pub board: Vec<PlacedUnitView>,
    pub synergies: Vec<SynergyView>,
    pub enemy_synergies: Vec<SynergyView>,
    pub speed: f32,
    pub paused: bool,
    /// Tail of the message log, newest last
    pub log: Vec<String>,
    pub run_record: Option<RunRecord>,
}

const LOG_TAIL: usize = 30;

/// Trait counts and tiers for one side's fielded living units.
fn side_synergies(state: &GameState, side: Side) -> Vec<SynergyView> {
    let mut counts: BTreeMap<Trait, usize> = BTreeMap::new();
    for (_, unit) in state.living_on_board(side) {
        for t in unit.template.traits {
            *counts.entry(*t).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(synergy_trait, count)| SynergyView {
            synergy_trait,
            count,
            tier: tier_for_count(count),
        })
        .collect()
}

impl GameView {
    pub fn from_state(state: &GameState) -> Self {
        let bench: Vec<UnitView> = state
            .bench
            .iter()
            .filter_map(|id| state.units.get(id))
            .map(UnitView::from)
            .collect();

        let board: Vec<PlacedUnitView> = state
            .board
            .iter()
            .filter_map(|(pos, id)| {
                let unit = state.units.get(id)?;
                Some(PlacedUnitView {
                    pos: *pos,
                    unit: UnitView::from(unit),
                })
            })
            .collect();

        let shop: Vec<ShopItemView> = state
            .shop
            .iter()
            .map(|item| ShopItemView {
                id: item.id,
                key: item.template.key.to_string(),
                name: item.template.name.to_string(),
                cost: item.cost,
                frozen: state.frozen.contains(&item.id),
            })
            .collect();

        let log_start = state.log.len().saturating_sub(LOG_TAIL);
        Self {
            phase: state.phase,
            round: state.round,
            gold: state.gold,
            health: state.health,
            level: state.level,
            xp: state.xp,
            xp_to_next: GameState::xp_to_next(state.level),
            enemy_level: state.enemy_level,
            win_streak: state.win_streak,
            lose_streak: state.lose_streak,
            last_outcome: state.last_outcome,
            shop,
            shop_locked: state.shop_locked,
            bench,
            board,
            synergies: side_synergies(state, Side::Player),
            enemy_synergies: side_synergies(state, Side::Enemy),
            speed: state.speed,
            paused: state.paused,
            log: state.log[log_start..].to_vec(),
            run_record: state.run_record.clone(),
        }
    }
}
