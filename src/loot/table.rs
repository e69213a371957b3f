//! Drop tables
//!
//! A table mixes guaranteed entries with weighted ones. Every selection yields
//! all guaranteed entries plus `frequency` independent roulette draws over the
//! weighted entries. A drawn entry stays on the wheel for the following draws.

use rand::Rng;

use super::item::{Lootable, check_weight};
use super::roulette::RoulettePicker;
use crate::error::LootError;

#[derive(Debug, Clone)]
struct DropEntry<L> {
    item: L,
    always: bool,
}

#[derive(Debug, Clone)]
pub struct DropTable<L> {
    entries: Vec<DropEntry<L>>,
    /// Weighted draws per selection, on top of the guaranteed entries
    frequency: u32,
}

impl<L: Lootable> DropTable<L> {
    pub fn new(frequency: u32) -> Self {
        Self {
            entries: Vec::new(),
            frequency,
        }
    }

    /// Add an entry that every selection includes. Its weight is ignored.
    pub fn add_always(&mut self, item: L) -> &mut Self {
        self.entries.push(DropEntry { item, always: true });
        self
    }

    /// Add an entry competing in the weighted draws
    pub fn add(&mut self, item: L) -> Result<&mut Self, LootError> {
        check_weight(&item)?;
        self.entries.push(DropEntry {
            item,
            always: false,
        });
        Ok(self)
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn always(&self) -> impl Iterator<Item = &L> {
        self.entries.iter().filter(|e| e.always).map(|e| &e.item)
    }

    pub fn weighted(&self) -> impl Iterator<Item = &L> {
        self.entries.iter().filter(|e| !e.always).map(|e| &e.item)
    }

    /// Roll the table without publishing anything.
    ///
    /// Guaranteed entries come first, in insertion order, followed by the draws.
    pub fn select_items<R: Rng>(&self, rng: &mut R) -> Vec<L> {
        let mut selected: Vec<L> = self.always().cloned().collect();

        let wheel: RoulettePicker<'_, L> = self.weighted().collect();
        if wheel.is_empty() {
            return selected;
        }

        selected.reserve(self.frequency as usize);
        for _ in 0..self.frequency {
            if let Some(item) = wheel.pick(rng) {
                selected.push(item.clone());
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::LootableItem;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_always_only_ignores_frequency() {
        for frequency in [0, 1, 25] {
            let mut table = DropTable::new(frequency);
            table.add_always(LootableItem::new(1, 1, -5.0));
            let mut rng = Pcg32::seed_from_u64(frequency as u64);
            let drops = table.select_items(&mut rng);
            assert_eq!(drops.len(), 1);
            assert_eq!(drops[0].item_id, 1);
        }
    }

    #[test]
    fn test_negative_weight_rejected_at_insert() {
        let mut table = DropTable::new(1);
        let err = table.add(LootableItem::new(4, 1, -2.0)).unwrap_err();
        assert_eq!(
            err,
            LootError::NegativeWeight {
                item_id: 4,
                weight: -2.0
            }
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_frequency_controls_weighted_draw_count() {
        let mut table = DropTable::new(5);
        table
            .add(LootableItem::new(1, 1, 1.0))
            .unwrap()
            .add(LootableItem::new(2, 1, 1.0))
            .unwrap()
            .add_always(LootableItem::guaranteed(99, 3));
        let mut rng = Pcg32::seed_from_u64(11);

        let drops = table.select_items(&mut rng);
        assert_eq!(drops.len(), 6);
        assert_eq!(drops[0].item_id, 99);
        assert!(drops[1..].iter().all(|d| d.item_id == 1 || d.item_id == 2));
    }

    #[test]
    fn test_draws_keep_candidates_eligible() {
        let mut table = DropTable::new(10);
        table.add(LootableItem::new(8, 1, 1.0)).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        let drops = table.select_items(&mut rng);
        assert_eq!(drops.len(), 10);
        assert!(drops.iter().all(|d| d.item_id == 8));
    }

    #[test]
    fn test_equal_weights_split_evenly() {
        let mut table = DropTable::new(1000);
        table
            .add(LootableItem::new(1, 1, 5.0))
            .unwrap()
            .add(LootableItem::new(2, 1, 5.0))
            .unwrap();
        let mut rng = Pcg32::seed_from_u64(77);

        let drops = table.select_items(&mut rng);
        let ones = drops.iter().filter(|d| d.item_id == 1).count();
        assert_eq!(drops.len(), 1000);
        assert!((420..=580).contains(&ones), "ones {}", ones);
    }
}
