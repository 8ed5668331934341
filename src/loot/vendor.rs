//! Vendor services (§4.8, §6 `INTERACT_VENDOR`/`PURCHASE_SERVICE`).

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::abilities::AbilityId;
use crate::catalog::items::ItemDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorKind {
    Trainer,
    Shop,
    Crypto,
}

#[derive(Component, Debug, Clone)]
pub struct Vendor {
    pub kind: VendorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    LevelUp,
    TrainAbility,
    SellItem,
    SellAll,
}

/// Training price scales with target rank (§4.8 "Prices scale per formula
/// in static catalog").
pub fn train_ability_price(target_rank: u8) -> u32 {
    50 * target_rank as u32 * target_rank as u32
}

pub fn level_up_price(current_level: u32) -> u32 {
    20 * current_level
}

pub fn sell_price(item: &ItemDefinition) -> u32 {
    (crate::catalog::items::item_power(&item.base_stats) * 2).max(1) as u32
}

#[derive(Debug, Clone)]
pub enum VendorServiceRequest {
    LevelUp,
    TrainAbility(AbilityId),
    SellItem(usize),
    SellAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseResult {
    Ok { gold_spent: u32 },
    InsufficientGold,
    NotOffered,
}

pub fn resolve_purchase(request: &VendorServiceRequest, gold: u32, price: u32) -> PurchaseResult {
    match request {
        VendorServiceRequest::SellItem(_) | VendorServiceRequest::SellAll => PurchaseResult::Ok { gold_spent: 0 },
        _ if gold < price => PurchaseResult::InsufficientGold,
        _ => PurchaseResult::Ok { gold_spent: price },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_price_scales_with_rank() {
        assert!(train_ability_price(3) > train_ability_price(1));
    }

    #[test]
    fn purchase_rejects_insufficient_gold() {
        let request = VendorServiceRequest::LevelUp;
        assert_eq!(resolve_purchase(&request, 5, 20), PurchaseResult::InsufficientGold);
        assert_eq!(resolve_purchase(&request, 25, 20), PurchaseResult::Ok { gold_spent: 20 });
    }
}
