//! Deterministic autobattler simulation core.
//!
//! Everything a host needs to run a full game headlessly: a unit
//! catalog, gold/XP economy with a level-weighted shop, half-board
//! placement rules, a trait/duo/trio synergy engine, a tick-driven
//! combat simulator, and an adaptive AI opponent. All randomness
//! derives from the run seed, so equal seeds replay equal runs.

mod battle;
mod board;
mod engine;
mod error;
mod opponent;
mod rng;
mod shop;
mod state;
mod synergy;
mod types;
mod units;
mod view;

#[cfg(test)]
mod tests;

pub use battle::{apply_damage, CombatEvent, StatusKind};
pub use engine::GameEngine;
pub use error::{GameError, GameResult};
pub use opponent::{analyze_placement, BoardAnalysis};
pub use rng::{BattleRng, XorShiftRng};
pub use state::*;
pub use synergy::{compute_tiers, tier_for_count, Tiers};
pub use types::*;
pub use units::{find_template, pool, rarity_of, Rarity, CATALOG};
pub use view::{GameView, PlacedUnitView, ShopItemView, SynergyView, UnitView};
