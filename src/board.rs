//! Board geometry and placement rules.
//!
//! The player may only field units on the bottom half of the board,
//! and never more than their level allows (hard-capped at 15).

use crate::state::{GamePhase, GameState, BOARD_COLS, BOARD_ROWS, PLAYER_HALF_ROW};
use crate::types::{Pos, Side, UnitId};

pub fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_ROWS as i32).contains(&row) && (0..BOARD_COLS as i32).contains(&col)
}

/// Orthogonal neighbors of a cell, clipped to the board.
pub fn neighbors(pos: Pos) -> Vec<Pos> {
    let (r, c) = (pos.row as i32, pos.col as i32);
    [(r + 1, c), (r - 1, c), (r, c + 1), (r, c - 1)]
        .into_iter()
        .filter(|&(nr, nc)| in_bounds(nr, nc))
        .map(|(nr, nc)| Pos::new(nr as u8, nc as u8))
        .collect()
}

/// Whether a cell is on the player half of the board.
pub fn is_player_half(pos: Pos) -> bool {
    pos.row >= PLAYER_HALF_ROW
}

/// Living allies of a side in the 4-neighborhood of a cell.
pub fn count_adjacent_allies(state: &GameState, pos: Pos, side: Side) -> usize {
    neighbors(pos)
        .into_iter()
        .filter(|n| {
            state
                .board
                .get(n)
                .and_then(|id| state.units.get(id))
                .is_some_and(|u| u.side == side && u.is_alive())
        })
        .count()
}

/// Whether an axis-aligned shot from `from` to `to` passes over a
/// living unit. Diagonal lines are assumed clear.
pub fn is_line_blocked(state: &GameState, from: Pos, to: Pos) -> bool {
    if from.row != to.row && from.col != to.col {
        return false;
    }
    let blocked = |pos: Pos| {
        state
            .board
            .get(&pos)
            .and_then(|id| state.units.get(id))
            .is_some_and(|u| u.is_alive())
    };
    if from.row == to.row {
        let (lo, hi) = (from.col.min(to.col), from.col.max(to.col));
        (lo + 1..hi).any(|c| blocked(Pos::new(from.row, c)))
    } else {
        let (lo, hi) = (from.row.min(to.row), from.row.max(to.row));
        (lo + 1..hi).any(|r| blocked(Pos::new(r, from.col)))
    }
}

fn placement_legal(state: &GameState, unit_id: UnitId, pos: Pos) -> bool {
    if state.phase != GamePhase::Prep {
        return false;
    }
    if !is_player_half(pos) {
        return false;
    }
    if state.board.contains_key(&pos) {
        return false;
    }
    state
        .units
        .get(&unit_id)
        .is_some_and(|u| u.side == Side::Player)
}

/// Field a benched unit. Fails against the midline, an occupied cell,
/// or when the level cap is already met.
pub fn place_unit(state: &mut GameState, unit_id: UnitId, pos: Pos) -> bool {
    if !placement_legal(state, unit_id, pos) {
        return false;
    }
    if !state.bench.contains(&unit_id) {
        return false;
    }
    let cap = GameState::max_board_units(state.level) as usize;
    if state.fielded_count(Side::Player) >= cap {
        return false;
    }
    state.bench.retain(|id| *id != unit_id);
    state.board.insert(pos, unit_id);
    true
}

/// Move an already-fielded unit to another legal cell.
pub fn move_unit(state: &mut GameState, unit_id: UnitId, pos: Pos) -> bool {
    if !placement_legal(state, unit_id, pos) {
        return false;
    }
    let Some(from) = state.position_of(unit_id) else {
        return false;
    };
    state.board.remove(&from);
    state.board.insert(pos, unit_id);
    true
}

/// Pull a fielded unit back to the bench.
pub fn remove_unit(state: &mut GameState, unit_id: UnitId) -> bool {
    if state.phase != GamePhase::Prep {
        return false;
    }
    let Some(from) = state.position_of(unit_id) else {
        return false;
    };
    let is_player = state
        .units
        .get(&unit_id)
        .is_some_and(|u| u.side == Side::Player);
    if !is_player {
        return false;
    }
    state.board.remove(&from);
    state.bench.push(unit_id);
    true
}

/// Award cover bonuses before combat: a melee unit directly shielding
/// a ranged ally in the same column grants that ally bonus attack and
/// damage reduction. Also clears stale placement buffs first.
pub fn apply_cover(state: &mut GameState) {
    let ids: Vec<UnitId> = state.units.keys().copied().collect();
    for id in ids {
        if let Some(u) = state.units.get_mut(&id) {
            u.cover_atk_bonus = 0;
            u.damage_reduction = 0.0;
        }
    }

    let mut covered: Vec<UnitId> = Vec::new();
    for c in 0..BOARD_COLS {
        // player faces up: the melee cover stands on the lower row,
        // the protected ranged unit one row behind it
        for r in PLAYER_HALF_ROW..BOARD_ROWS - 1 {
            let front = state.board.get(&Pos::new(r, c));
            let back = state.board.get(&Pos::new(r + 1, c));
            if let (Some(&f), Some(&b)) = (front, back) {
                if covers(state, f, b, Side::Player) {
                    covered.push(b);
                }
            }
        }
        // enemy faces down, mirrored
        for r in 1..PLAYER_HALF_ROW {
            let front = state.board.get(&Pos::new(r, c));
            let back = state.board.get(&Pos::new(r - 1, c));
            if let (Some(&f), Some(&b)) = (front, back) {
                if covers(state, f, b, Side::Enemy) {
                    covered.push(b);
                }
            }
        }
    }

    for id in covered {
        if let Some(u) = state.units.get_mut(&id) {
            u.cover_atk_bonus += 3;
            u.damage_reduction = (u.damage_reduction + 0.12).min(0.2);
        }
    }
}

fn covers(state: &GameState, front: UnitId, back: UnitId, side: Side) -> bool {
    let (Some(f), Some(b)) = (state.units.get(&front), state.units.get(&back)) else {
        return false;
    };
    f.side == side
        && b.side == side
        && f.template.stats.range <= 1
        && b.template.stats.range >= 3
}
