//! Shop rolls and purchase flow.
//!
//! Both sides roll from the same catalog pools, weighted by the
//! roller's level. Frozen offers survive a refresh; a locked shop
//! skips the automatic refresh between rounds.

use crate::rng::BattleRng;
use crate::state::{GamePhase, GameState, REROLL_COST, SHOP_SLOTS};
use crate::types::{ShopItem, Side, UnitTemplate};
use crate::units::{pool, Rarity};

/// Roll odds per rarity band: (common, rare, epic, legendary)
fn odds_for_level(level: u8) -> [f32; 4] {
    match level {
        0..=3 => [0.78, 0.20, 0.02, 0.0],
        4..=5 => [0.60, 0.32, 0.07, 0.01],
        6..=7 => [0.45, 0.40, 0.12, 0.03],
        _ => [0.30, 0.45, 0.18, 0.07],
    }
}

/// Templates of a rarity band, falling back to commons if the band is
/// ever empty.
fn candidates_for(rarity: Rarity) -> Vec<&'static UnitTemplate> {
    let candidates: Vec<&'static UnitTemplate> = pool(rarity).collect();
    if candidates.is_empty() {
        pool(Rarity::Common).collect()
    } else {
        candidates
    }
}

fn roll_template(state: &mut GameState, level: u8) -> &'static UnitTemplate {
    let [common, rare, epic, _] = odds_for_level(level);
    let r = state.rng.gen_f32();
    let rarity = if r < common {
        Rarity::Common
    } else if r < common + rare {
        Rarity::Rare
    } else if r < common + rare + epic {
        Rarity::Epic
    } else {
        Rarity::Legendary
    };
    let candidates = candidates_for(rarity);
    let pick = state.rng.gen_range(candidates.len());
    candidates[pick]
}

fn roll_offers(state: &mut GameState, level: u8, count: usize) -> Vec<ShopItem> {
    (0..count)
        .map(|_| {
            let template = roll_template(state, level);
            ShopItem {
                id: state.generate_shop_item_id(),
                template,
                cost: template.cost,
            }
        })
        .collect()
}

/// Rebuild the player shop, carrying frozen offers over.
pub fn refresh_shop(state: &mut GameState) {
    let kept: Vec<ShopItem> = state
        .shop
        .iter()
        .filter(|item| state.frozen.contains(&item.id))
        .copied()
        .collect();
    let fresh = roll_offers(state, state.level, SHOP_SLOTS.saturating_sub(kept.len()));
    state.frozen = kept.iter().map(|i| i.id).collect();
    state.shop = kept;
    state.shop.extend(fresh);
}

/// Rebuild the opponent shop, carrying its frozen offers over.
pub fn refresh_enemy_shop(state: &mut GameState) {
    let kept: Vec<ShopItem> = state
        .enemy_shop
        .iter()
        .filter(|item| state.enemy_frozen.contains(&item.id))
        .copied()
        .collect();
    let fresh = roll_offers(
        state,
        state.enemy_level,
        SHOP_SLOTS.saturating_sub(kept.len()),
    );
    state.enemy_frozen = kept.iter().map(|i| i.id).collect();
    state.enemy_shop = kept;
    state.enemy_shop.extend(fresh);
}

/// Pay to reroll the player shop. No-op when locked, out of phase, or
/// short on gold.
pub fn reroll(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Prep || state.shop_locked || state.gold < REROLL_COST {
        return false;
    }
    state.gold -= REROLL_COST;
    refresh_shop(state);
    true
}

/// Buy a shop offer onto the bench, then resolve any 3-combine.
pub fn buy_unit(state: &mut GameState, shop_item_id: u32) -> bool {
    if state.phase != GamePhase::Prep {
        return false;
    }
    let Some(item) = state.shop.iter().find(|i| i.id == shop_item_id).copied() else {
        return false;
    };
    if state.gold < item.cost {
        return false;
    }
    let Ok(unit_id) = state.create_unit(item.template.key, Side::Player) else {
        return false;
    };
    state.gold -= item.cost;
    state.bench.push(unit_id);
    state.shop.retain(|i| i.id != shop_item_id);
    state.frozen.remove(&shop_item_id);
    state
        .log
        .push(format!("Bought {} for {} gold", item.template.name, item.cost));
    state.try_combine(item.template.key, Side::Player);
    true
}

/// Sell a player unit for a partial refund.
pub fn sell_unit(state: &mut GameState, unit_id: u32) -> bool {
    if state.phase != GamePhase::Prep {
        return false;
    }
    let Some(unit) = state.units.get(&unit_id) else {
        return false;
    };
    if unit.side != Side::Player {
        return false;
    }
    let template = unit.template;
    let refund = GameState::sell_value(template);
    state.delete_unit(unit_id);
    state.gold += refund;
    state
        .log
        .push(format!("Sold {} for {} gold", template.name, refund));
    true
}

/// Toggle freeze on one player shop offer.
pub fn toggle_freeze(state: &mut GameState, shop_item_id: u32) -> bool {
    if state.phase != GamePhase::Prep {
        return false;
    }
    if !state.shop.iter().any(|i| i.id == shop_item_id) {
        return false;
    }
    if !state.frozen.remove(&shop_item_id) {
        state.frozen.insert(shop_item_id);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odds_sum_to_one_per_band() {
        for level in [1, 4, 6, 9] {
            let total: f32 = odds_for_level(level).iter().sum();
            assert!((total - 1.0).abs() < 1e-6, "level {level}");
        }
    }

    #[test]
    fn test_roll_candidates_never_empty() {
        for rarity in [
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ] {
            assert!(!candidates_for(rarity).is_empty());
        }
    }
}
