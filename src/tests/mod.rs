//! Integration-style tests exercising the engine end to end.

mod battle_flow;
mod combine;
mod lifecycle;
mod placement;
mod synergies;

use crate::state::GameState;
use crate::types::{Pos, ShopItem, Side, UnitId};
use crate::units::find_template;

/// Create a unit directly in the state, bypassing the shop.
pub fn add_unit(state: &mut GameState, key: &str, side: Side, star: u8, pos: Option<Pos>) -> UnitId {
    let id = state.create_unit(key, side).unwrap();
    if star > 1 {
        let u = state.units.get_mut(&id).unwrap();
        u.star = star;
        u.hp = u.max_hp();
    }
    match pos {
        Some(p) => {
            assert!(
                state.board.insert(p, id).is_none(),
                "test placed two units on {p:?}"
            );
        }
        None if side == Side::Player => state.bench.push(id),
        None => {}
    }
    id
}

/// Push a hand-picked offer into the player shop.
pub fn offer(state: &mut GameState, key: &str) -> u32 {
    let template = find_template(key).unwrap();
    let id = state.generate_shop_item_id();
    state.shop.push(ShopItem {
        id,
        template,
        cost: template.cost,
    });
    id
}

/// Push a hand-picked offer into the opponent shop.
pub fn enemy_offer(state: &mut GameState, key: &str) -> u32 {
    let template = find_template(key).unwrap();
    let id = state.generate_shop_item_id();
    state.enemy_shop.push(ShopItem {
        id,
        template,
        cost: template.cost,
    });
    id
}

/// Player units currently on the bench.
pub fn benched(state: &GameState) -> Vec<&crate::types::UnitInstance> {
    state
        .bench
        .iter()
        .filter_map(|id| state.units.get(id))
        .collect()
}
