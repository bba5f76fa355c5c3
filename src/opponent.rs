//! The adaptive AI opponent.
//!
//! The opponent reacts to the player's most recently *completed*
//! placement, never to live mid-prep edits. It levels to keep pace,
//! scores shop offers as counters to that placement, buys and rerolls
//! down to its reserve, freezes offers it wants but cannot afford, and
//! plans a deployment that answers the player's column densities.

use std::collections::{BTreeMap, BTreeSet};

use crate::shop::refresh_enemy_shop;
use crate::state::{GameState, BOARD_COLS, PLAYER_HALF_ROW, REROLL_COST, XP_PURCHASE_AMOUNT, XP_PURCHASE_COST};
use crate::types::{Ability, Pos, ShopItemId, Side, Trait, UnitId, UnitTemplate};

/// Summary of one side's placement, as the AI sees it.
#[derive(Debug, Clone, Default)]
pub struct BoardAnalysis {
    pub melee_count: usize,
    pub ranged_count: usize,
    /// Columns holding cleave-capable units
    pub cleave_cols: BTreeSet<u8>,
    pub has_healer: bool,
    /// All columns, densest first
    pub hot_columns: Vec<u8>,
}

/// Analyze a placement snapshot (unit id -> cell).
pub fn analyze_placement(state: &GameState, placement: &BTreeMap<UnitId, Pos>) -> BoardAnalysis {
    let mut analysis = BoardAnalysis::default();
    let mut density = [0usize; BOARD_COLS as usize];

    for (id, pos) in placement {
        let Some(unit) = state.units.get(id) else {
            continue;
        };
        density[pos.col as usize] += 1;
        let stats = unit.template.stats;
        if stats.range >= 3 {
            analysis.ranged_count += 1;
        } else {
            analysis.melee_count += 1;
        }
        match unit.ability() {
            Some(Ability::Cleave { .. }) => {
                analysis.cleave_cols.insert(pos.col);
            }
            Some(Ability::HealPulse { .. }) => analysis.has_healer = true,
            _ => {}
        }
    }

    let mut cols: Vec<u8> = (0..BOARD_COLS).collect();
    cols.sort_by(|a, b| density[*b as usize].cmp(&density[*a as usize]).then(a.cmp(b)));
    analysis.hot_columns = cols;
    analysis
}

/// Analyze the live board for one side. Used at deployment time.
pub fn analyze_board(state: &GameState, side: Side) -> BoardAnalysis {
    let placement: BTreeMap<UnitId, Pos> = state
        .board
        .iter()
        .filter(|(_, id)| state.units.get(id).is_some_and(|u| u.side == side))
        .map(|(pos, id)| (*id, *pos))
        .collect();
    analyze_placement(state, &placement)
}

/// Score a template as a counter to the analyzed composition.
/// Lower is better.
pub fn counter_score(template: &UnitTemplate, analysis: &BoardAnalysis) -> f32 {
    let r = template.stats.range;
    let mut score = if analysis.melee_count >= analysis.ranged_count {
        // answer melee walls with reach
        if r >= 3 {
            -2.0
        } else if r == 2 {
            -1.0
        } else {
            1.0
        }
    } else {
        // answer ranged comps by diving in
        if r <= 1 {
            -2.0
        } else if r == 2 {
            -1.0
        } else {
            1.0
        }
    };

    let ability = template.ability_for_star(1);
    if analysis.melee_count > analysis.ranged_count
        && matches!(
            ability,
            Some(Ability::StunOnHit { .. }) | Some(Ability::SlowOnHit { .. })
        )
    {
        score -= 1.5;
    }
    if !analysis.cleave_cols.is_empty() && matches!(ability, Some(Ability::HealPulse { .. })) {
        score -= 1.5;
    }
    if matches!(
        ability,
        Some(Ability::Multishot { .. }) | Some(Ability::Pierce { .. })
    ) {
        score -= 0.8;
    }
    if analysis.ranged_count > analysis.melee_count && r <= 1 && template.stats.hp >= 140 {
        score -= 1.2;
    }
    score
}

fn enemy_counts(state: &GameState) -> (BTreeMap<&'static str, usize>, BTreeMap<Trait, usize>) {
    let mut by_template = BTreeMap::new();
    let mut by_trait = BTreeMap::new();
    for u in state.units.values().filter(|u| u.side == Side::Enemy) {
        *by_template.entry(u.key()).or_insert(0) += 1;
        for t in u.template.traits {
            *by_trait.entry(*t).or_insert(0) += 1;
        }
    }
    (by_template, by_trait)
}

/// Nudge toward hitting the 2/4/6 trait thresholds already in reach.
fn synergy_bias(template: &UnitTemplate, by_trait: &BTreeMap<Trait, usize>) -> f32 {
    let mut bias = 0.0;
    for t in template.traits {
        match by_trait.get(t).copied().unwrap_or(0) {
            0 => {}
            1 => bias -= 1.2,
            3 => bias -= 1.0,
            5 => bias -= 0.8,
            _ => bias -= 0.2,
        }
    }
    bias
}

/// Level the opponent until it matches the player or runs dry.
pub fn auto_level(state: &mut GameState) {
    while state.enemy_level < state.level && state.enemy_gold >= XP_PURCHASE_COST {
        state.enemy_gold -= XP_PURCHASE_COST;
        if state.gain_xp(Side::Enemy, XP_PURCHASE_AMOUNT) > 0 {
            refresh_enemy_shop(state);
        }
    }
}

fn score_offer(
    state: &GameState,
    template: &UnitTemplate,
    analysis: &BoardAnalysis,
    by_template: &BTreeMap<&'static str, usize>,
    by_trait: &BTreeMap<Trait, usize>,
) -> f32 {
    let mut score = counter_score(template, analysis);
    // chase pairs toward a 3-combine
    score += match by_template.get(template.key).copied().unwrap_or(0) {
        0 => 0.0,
        1 => -1.0,
        _ => -3.0,
    };
    for t in template.traits {
        score += match by_trait.get(t).copied().unwrap_or(0) {
            0 => 0.0,
            1 => -1.5,
            3 => -1.2,
            5 => -1.0,
            _ => -0.25,
        };
    }
    // cheap filler matters more when poor
    if state.enemy_gold < 6 {
        score -= (3 - template.cost).max(0) as f32 * 0.1;
    }
    score
}

/// One pass over the enemy shop: buy every affordable offer in score
/// order, best first. Returns the ids bought.
fn buy_pass(state: &mut GameState, analysis: &BoardAnalysis) -> Vec<ShopItemId> {
    let (by_template, by_trait) = enemy_counts(state);
    let mut scored: Vec<(f32, ShopItemId)> = state
        .enemy_shop
        .iter()
        .map(|item| {
            (
                score_offer(state, item.template, analysis, &by_template, &by_trait),
                item.id,
            )
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut bought = Vec::new();
    for (_, item_id) in scored {
        let Some(item) = state.enemy_shop.iter().find(|i| i.id == item_id).copied() else {
            continue;
        };
        if state.enemy_gold < item.cost {
            continue;
        }
        if state.create_unit(item.template.key, Side::Enemy).is_err() {
            continue;
        }
        state.enemy_gold -= item.cost;
        bought.push(item_id);
    }
    bought
}

fn remove_bought(state: &mut GameState, bought: &[ShopItemId]) {
    state.enemy_shop.retain(|i| !bought.contains(&i.id));
    for id in bought {
        state.enemy_frozen.remove(id);
    }
}

fn combine_all_enemy(state: &mut GameState) {
    let keys: BTreeSet<&'static str> = state
        .units
        .values()
        .filter(|u| u.side == Side::Enemy)
        .map(|u| u.key())
        .collect();
    for key in keys {
        state.try_combine(key, Side::Enemy);
    }
}

/// Freeze the two most wanted offers the opponent cannot afford yet.
fn freeze_wishlist(state: &mut GameState, analysis: &BoardAnalysis) {
    let (_, by_trait) = enemy_counts(state);
    let mut wanted: Vec<(f32, ShopItemId)> = state
        .enemy_shop
        .iter()
        .filter(|item| item.cost > state.enemy_gold)
        .map(|item| {
            let s = counter_score(item.template, analysis) + synergy_bias(item.template, &by_trait);
            (s, item.id)
        })
        .collect();
    wanted.sort_by(|a, b| a.0.total_cmp(&b.0));
    state.enemy_frozen = wanted.into_iter().take(2).map(|(_, id)| id).collect();
}

/// Full opponent buy phase: level up, then loop buy/reroll/freeze
/// until the budget or the reroll allowance runs out.
pub fn buy_phase(state: &mut GameState, analysis: &BoardAnalysis) {
    auto_level(state);

    let max_rerolls = (2 + state.round / 2).min(8);
    let mut rerolls = 0;
    while state.enemy_gold >= REROLL_COST && rerolls < max_rerolls {
        let bought = buy_pass(state, analysis);
        if bought.is_empty() {
            state.enemy_gold -= REROLL_COST;
            refresh_enemy_shop(state);
            rerolls += 1;
            continue;
        }
        remove_bought(state, &bought);
        combine_all_enemy(state);
        freeze_wishlist(state, analysis);
        if state.enemy_gold < REROLL_COST {
            break;
        }
    }

    let bought = buy_pass(state, analysis);
    remove_bought(state, &bought);
    combine_all_enemy(state);
    freeze_wishlist(state, analysis);
}

/// Role-based cell assignment for the enemy half (rows 0..4).
fn plan_placement(
    state: &GameState,
    roster: &[UnitId],
    analysis: &BoardAnalysis,
) -> Vec<Pos> {
    let hot = &analysis.hot_columns;
    let flanks: Vec<u8> = hot.iter().rev().copied().collect();
    let center_col = hot[hot.len() / 2];
    let n = hot.len() as u8;

    let mut tank_idx = 0usize;
    let mut cc_idx = 0usize;
    let mut mid_idx = 0u8;
    let mut ranged_idx = 0u8;

    let mut plan = Vec::with_capacity(roster.len());
    for id in roster {
        let Some(unit) = state.units.get(id) else {
            plan.push(Pos::new(2, 0));
            continue;
        };
        let stats = unit.template.stats;
        let ability = unit.ability();

        let pos = if matches!(ability, Some(Ability::HealPulse { .. })) {
            Pos::new(1, center_col)
        } else if stats.range <= 1 && stats.hp >= 140 {
            let c = hot[tank_idx % hot.len()];
            tank_idx += 1;
            Pos::new(2, c)
        } else if matches!(
            ability,
            Some(Ability::StunOnHit { .. }) | Some(Ability::SlowOnHit { .. })
        ) {
            let c = flanks[cc_idx % flanks.len()];
            cc_idx += 1;
            Pos::new(1, c)
        } else if stats.range == 2 {
            // stagger mid-rangers off the hot columns
            let offset = if mid_idx % 2 == 0 { 1 } else { n - 1 };
            let c = (hot[mid_idx as usize % hot.len()] + offset) % n;
            mid_idx += 1;
            Pos::new(2, c)
        } else if stats.range >= 3 {
            let offset = if ranged_idx % 2 == 0 { 1 } else { n - 2 };
            let c = (hot[ranged_idx as usize % hot.len()] + offset) % n;
            ranged_idx += 1;
            Pos::new(0, c)
        } else {
            let c = hot[tank_idx % hot.len()];
            tank_idx += 1;
            Pos::new(2, c)
        };
        plan.push(pos);
    }

    // de-duplicate collisions by probing along the row, then forward
    let mut taken: BTreeSet<Pos> = BTreeSet::new();
    for pos in plan.iter_mut() {
        let mut candidate = *pos;
        'scan: for dr in 0..PLAYER_HALF_ROW {
            let row = (candidate.row + dr) % PLAYER_HALF_ROW;
            for step in 0..BOARD_COLS {
                let col = (candidate.col + step) % BOARD_COLS;
                let cell = Pos::new(row, col);
                if !taken.contains(&cell) {
                    candidate = cell;
                    break 'scan;
                }
            }
        }
        taken.insert(candidate);
        *pos = candidate;
    }
    plan
}

/// Field the opponent roster: clear its half, pick the strongest units
/// up to the level cap, and place them per the plan.
pub fn deploy(state: &mut GameState) {
    let analysis = analyze_board(state, Side::Player);

    state.board.retain(|_, id| {
        state
            .units
            .get(id)
            .is_some_and(|u| u.side != Side::Enemy)
    });

    let mut roster = state.roster(Side::Enemy);
    roster.sort_by_key(|id| {
        use std::cmp::Reverse;
        state
            .units
            .get(id)
            .map_or((Reverse(0), Reverse(0), Reverse(0)), |u| {
                (
                    Reverse(u.star as i32),
                    Reverse(u.template.cost),
                    Reverse(u.template.stats.hp),
                )
            })
    });
    let cap = GameState::max_board_units(state.enemy_level) as usize;
    roster.truncate(cap);

    let plan = plan_placement(state, &roster, &analysis);
    for (id, pos) in roster.iter().zip(plan) {
        state.board.insert(pos, *id);
    }
    state
        .log
        .push(format!("Enemy deploys {} units", roster.len()));
}
