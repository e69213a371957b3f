//! Loot candidates

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::LootError;

/// Anything a drop table can hand out
pub trait Lootable: Clone + 'static {
    /// Identifier used in diagnostics
    fn loot_id(&self) -> u32;

    /// Relative selection weight; must be finite and >= 0 for weighted entries
    fn weight(&self) -> f64;

    /// Quantities a single drop may yield
    fn amount_range(&self) -> RangeInclusive<u32> {
        1..=1
    }
}

/// Weight given to items built without an explicit weight
pub const DEFAULT_WEIGHT: f64 = 100.0;

/// An item id with a weight and a quantity range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootableItem {
    pub item_id: u32,
    pub weight: f64,
    pub min_amount: u32,
    pub max_amount: u32,
}

impl LootableItem {
    /// A fixed quantity of `item_id`
    pub fn new(item_id: u32, amount: u32, weight: f64) -> Self {
        Self {
            item_id,
            weight,
            min_amount: amount,
            max_amount: amount,
        }
    }

    /// Between `min_amount` and `max_amount` (inclusive) of `item_id`
    pub fn ranged(
        item_id: u32,
        min_amount: u32,
        max_amount: u32,
        weight: f64,
    ) -> Result<Self, LootError> {
        if min_amount > max_amount {
            return Err(LootError::InvalidAmountRange {
                item_id,
                min: min_amount,
                max: max_amount,
            });
        }
        Ok(Self {
            item_id,
            weight,
            min_amount,
            max_amount,
        })
    }

    /// A fixed quantity with the default weight
    pub fn guaranteed(item_id: u32, amount: u32) -> Self {
        Self::new(item_id, amount, DEFAULT_WEIGHT)
    }
}

impl Lootable for LootableItem {
    fn loot_id(&self) -> u32 {
        self.item_id
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn amount_range(&self) -> RangeInclusive<u32> {
        self.min_amount..=self.max_amount
    }
}

/// Reject weights that would corrupt a roulette total
pub(crate) fn check_weight<L: Lootable>(item: &L) -> Result<(), LootError> {
    let weight = item.weight();
    if weight.is_nan() || weight < 0.0 || weight.is_infinite() {
        return Err(LootError::NegativeWeight {
            item_id: item.loot_id(),
            weight,
        });
    }
    Ok(())
}
