//! Game state and core roster/economy rules.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GameError, GameResult};
use crate::rng::XorShiftRng;
use crate::types::*;
use crate::units::find_template;

/// Board rows (row 0 is the enemy back rank)
pub const BOARD_ROWS: u8 = 8;
/// Board columns
pub const BOARD_COLS: u8 = 8;
/// First row of the player half
pub const PLAYER_HALF_ROW: u8 = BOARD_ROWS / 2;
/// Slots offered per shop roll
pub const SHOP_SLOTS: usize = 5;
/// Gold cost of a shop reroll
pub const REROLL_COST: i32 = 2;
/// Gold cost of an XP purchase
pub const XP_PURCHASE_COST: i32 = 4;
/// XP granted per purchase
pub const XP_PURCHASE_AMOUNT: i32 = 4;
/// XP granted automatically each round
pub const PASSIVE_XP: i32 = 2;
/// Flat income per round
pub const BASE_INCOME: i32 = 5;
/// Interest income cap
pub const INTEREST_CAP: i32 = 3;
/// Streak income cap
pub const STREAK_BONUS_CAP: i32 = 2;
/// Hard ceiling on fielded units regardless of level
pub const MAX_BOARD_UNITS: u8 = 15;
/// Items a single unit can carry
pub const MAX_ITEMS_PER_UNIT: usize = 2;
/// Player starting gold
pub const STARTING_GOLD: i32 = 10;
/// Player starting health
pub const STARTING_HEALTH: i32 = 100;
/// Player starting level
pub const STARTING_LEVEL: u8 = 3;
/// Opponent starting gold
pub const ENEMY_STARTING_GOLD: i32 = 8;
/// Combat tick length at 1.0x speed
pub const BASE_TICK_MS: u64 = 100;
/// Fastest allowed tick
pub const MIN_TICK_MS: u64 = 10;
/// Floor on attack cooldowns after star/speed scaling
pub const MIN_ATTACK_CD_MS: u64 = 120;
/// Floor on move cooldowns after star/speed scaling
pub const MIN_MOVE_CD_MS: u64 = 80;
/// Combat speed bounds
pub const MIN_COMBAT_SPEED: f32 = 0.1;
pub const MAX_COMBAT_SPEED: f32 = 4.0;
/// Fraction of cost refunded when selling
pub const SELL_REFUND_RATIO: f32 = 0.7;

/// Current phase of the round loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Prep,
    Combat,
    Result,
    GameOver,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub round: u32,
    pub gold: i32,
    pub health: i32,
    pub level: u8,
    pub xp: i32,
    pub enemy_gold: i32,
    pub enemy_level: u8,
    pub enemy_xp: i32,
    pub win_streak: u32,
    pub lose_streak: u32,
    pub last_outcome: Option<Outcome>,
    /// All live units on both sides, keyed by id
    pub units: BTreeMap<UnitId, UnitInstance>,
    /// Player units not currently fielded
    pub bench: Vec<UnitId>,
    /// Occupied board cells
    pub board: BTreeMap<Pos, UnitId>,
    pub shop: Vec<ShopItem>,
    pub frozen: BTreeSet<ShopItemId>,
    pub shop_locked: bool,
    pub enemy_shop: Vec<ShopItem>,
    pub enemy_frozen: BTreeSet<ShopItemId>,
    /// Player placement captured when combat starts, restored next prep
    pub saved_placement: BTreeMap<UnitId, Pos>,
    /// Placement from the previous round, used by the opponent to scout
    pub last_round_placement: Option<BTreeMap<UnitId, Pos>>,
    pub log: Vec<String>,
    pub next_unit_id: UnitId,
    pub next_shop_item_id: ShopItemId,
    pub rng: XorShiftRng,
    /// Logical combat clock in milliseconds
    pub clock_ms: u64,
    pub speed: f32,
    pub paused: bool,
    /// Bumped every time combat starts, so stale host timers can be ignored
    pub combat_generation: u64,
    pub run_record: Option<RunRecord>,
    pub seed: u64,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Prep,
            round: 1,
            gold: STARTING_GOLD,
            health: STARTING_HEALTH,
            level: STARTING_LEVEL,
            xp: 0,
            enemy_gold: ENEMY_STARTING_GOLD,
            enemy_level: STARTING_LEVEL,
            enemy_xp: 0,
            win_streak: 0,
            lose_streak: 0,
            last_outcome: None,
            units: BTreeMap::new(),
            bench: Vec::new(),
            board: BTreeMap::new(),
            shop: Vec::new(),
            frozen: BTreeSet::new(),
            shop_locked: false,
            enemy_shop: Vec::new(),
            enemy_frozen: BTreeSet::new(),
            saved_placement: BTreeMap::new(),
            last_round_placement: None,
            log: Vec::new(),
            next_unit_id: 1,
            next_shop_item_id: 1,
            rng: XorShiftRng::seed_from_u64(seed),
            clock_ms: 0,
            speed: 1.0,
            paused: false,
            combat_generation: 0,
            run_record: None,
            seed,
        }
    }

    /// Fielded-unit cap for a level
    pub fn max_board_units(level: u8) -> u8 {
        level.clamp(1, MAX_BOARD_UNITS)
    }

    /// XP required to advance past a level
    pub fn xp_to_next(level: u8) -> i32 {
        4 + level as i32 * 2
    }

    pub fn generate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    pub fn generate_shop_item_id(&mut self) -> ShopItemId {
        let id = self.next_shop_item_id;
        self.next_shop_item_id += 1;
        id
    }

    /// Create a fresh 1-star instance of a template. The caller decides
    /// where it goes (bench, board, or enemy roster).
    pub fn create_unit(&mut self, key: &str, side: Side) -> GameResult<UnitId> {
        let template = find_template(key).ok_or_else(|| GameError::TemplateNotFound {
            key: key.to_string(),
        })?;
        let id = self.generate_unit_id();
        self.units.insert(
            id,
            UnitInstance {
                id,
                template,
                side,
                star: 1,
                hp: template.stats.hp,
                last_attack_ms: 0,
                last_move_ms: 0,
                last_special_ms: 0,
                status: StatusBag::default(),
                items: Vec::new(),
                shield_hp: 0.0,
                cover_atk_bonus: 0,
                damage_reduction: 0.0,
            },
        );
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> GameResult<&UnitInstance> {
        self.units.get(&id).ok_or(GameError::UnitMissing { id })
    }

    pub fn unit_mut(&mut self, id: UnitId) -> GameResult<&mut UnitInstance> {
        self.units.get_mut(&id).ok_or(GameError::UnitMissing { id })
    }

    /// Board cell currently holding a unit, if fielded
    pub fn position_of(&self, id: UnitId) -> Option<Pos> {
        self.board
            .iter()
            .find(|(_, uid)| **uid == id)
            .map(|(pos, _)| *pos)
    }

    /// Ids of every unit belonging to a side, board and bench alike
    pub fn roster(&self, side: Side) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.side == side)
            .map(|u| u.id)
            .collect()
    }

    /// Fielded units of a side that are still alive
    pub fn living_on_board(&self, side: Side) -> impl Iterator<Item = (Pos, &UnitInstance)> {
        self.board.iter().filter_map(move |(pos, id)| {
            let u = self.units.get(id)?;
            (u.side == side && u.is_alive()).then_some((*pos, u))
        })
    }

    pub fn fielded_count(&self, side: Side) -> usize {
        self.board
            .values()
            .filter(|id| self.units.get(id).is_some_and(|u| u.side == side))
            .count()
    }

    /// Remove a unit from the game entirely
    pub fn delete_unit(&mut self, id: UnitId) {
        self.units.remove(&id);
        self.bench.retain(|b| *b != id);
        self.board.retain(|_, uid| *uid != id);
    }

    /// Gold refunded when selling a unit
    pub fn sell_value(template: &UnitTemplate) -> i32 {
        (template.cost as f32 * SELL_REFUND_RATIO).ceil() as i32
    }

    /// Round income for one side given its banked gold and the
    /// applicable streak length.
    pub fn round_income(banked_gold: i32, streak: u32) -> i32 {
        let interest = (banked_gold / 10).min(INTEREST_CAP);
        let streak_bonus = if streak >= 3 {
            (streak as i32 / 3).min(STREAK_BONUS_CAP)
        } else {
            0
        };
        BASE_INCOME + interest + streak_bonus
    }

    /// Streak length feeding the income bonus: whichever streak the
    /// last outcome extended.
    pub fn income_streak(&self) -> u32 {
        match self.last_outcome {
            Some(Outcome::Win) => self.win_streak,
            Some(Outcome::Loss) => self.lose_streak,
            None => 0,
        }
    }

    /// Grant XP to one side, cascading level-ups. Returns how many
    /// levels were gained.
    pub fn gain_xp(&mut self, side: Side, amount: i32) -> u32 {
        let (level, xp) = match side {
            Side::Player => (&mut self.level, &mut self.xp),
            Side::Enemy => (&mut self.enemy_level, &mut self.enemy_xp),
        };
        *xp += amount;
        let mut gained = 0;
        loop {
            let needed = Self::xp_to_next(*level);
            if *xp < needed {
                break;
            }
            *xp -= needed;
            *level += 1;
            gained += 1;
        }
        if gained > 0 && side == Side::Player {
            self.log.push(format!("Level up! Now level {}", self.level));
        }
        gained
    }

    /// Merge triples of the same template and star into one unit of
    /// the next star, cascading 1★×3 → 2★ and 2★×3 → 3★.
    pub fn try_combine(&mut self, key: &str, side: Side) {
        for star in [1u8, 2u8] {
            let group: Vec<UnitId> = self
                .units
                .values()
                .filter(|u| u.side == side && u.key() == key && u.star == star)
                .map(|u| u.id)
                .take(3)
                .collect();
            if group.len() < 3 {
                continue;
            }

            // the upgraded unit inherits the first member's board cell
            let primary_pos = self.position_of(group[0]);
            for id in &group {
                self.delete_unit(*id);
            }

            let Ok(new_id) = self.create_unit(key, side) else {
                return;
            };
            let new_star = star + 1;
            if let Some(u) = self.units.get_mut(&new_id) {
                u.star = new_star;
                u.hp = u.max_hp();
            }
            match primary_pos {
                Some(pos) => {
                    self.board.insert(pos, new_id);
                }
                None if side == Side::Player => self.bench.push(new_id),
                None => {}
            }
            self.log.push(format!("{key} combined to {new_star}-star!"));
            self.try_combine(key, side);
            break;
        }
    }

    /// Reset all units for a new prep phase: full heal, cleared
    /// cooldowns, statuses, shields, and placement buffs.
    pub fn reset_units_for_prep(&mut self) {
        for u in self.units.values_mut() {
            u.hp = u.max_hp();
            u.last_attack_ms = 0;
            u.last_move_ms = 0;
            u.last_special_ms = 0;
            u.status = StatusBag::default();
            // shield amulets re-arm each round; combat shields do not
            u.shield_hp = if u.has_item(ItemKey::ShieldAmulet) {
                (24 * u.star as i32) as f32
            } else {
                0.0
            };
            u.cover_atk_bonus = 0;
            u.damage_reduction = 0.0;
        }
    }
}
