//! Roulette-wheel selection
//!
//! Each candidate owns a slice of the wheel proportional to its weight. A draw
//! spins a value in `[0, total)` and walks the candidates in insertion order,
//! subtracting weights until the value drops to zero or below.

use rand::Rng;

use super::item::{Lootable, check_weight};
use crate::error::LootError;

#[derive(Debug, Clone)]
pub struct RoulettePicker<'a, L> {
    loot: Vec<&'a L>,
    total_weight: f64,
}

impl<L> Default for RoulettePicker<'_, L> {
    fn default() -> Self {
        Self {
            loot: Vec::new(),
            total_weight: 0.0,
        }
    }
}

impl<'a, L: Lootable> RoulettePicker<'a, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &'a L) -> Result<(), LootError> {
        check_weight(item)?;
        self.total_weight += item.weight();
        self.loot.push(item);
        Ok(())
    }

    /// Draw a candidate, leaving it eligible for later draws.
    ///
    /// Returns `None` when the wheel is empty or rounding leaves the spin unmatched.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&'a L> {
        self.spin(rng).map(|index| self.loot[index])
    }

    /// Draw a candidate and take it off the wheel
    pub fn pick_and_remove<R: Rng>(&mut self, rng: &mut R) -> Option<&'a L> {
        let index = self.spin(rng)?;
        let item = self.loot.remove(index);
        self.total_weight -= item.weight();
        Some(item)
    }

    fn spin<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.loot.is_empty() {
            return None;
        }

        let mut value = rng.random::<f64>() * self.total_weight;
        for (index, item) in self.loot.iter().enumerate() {
            value -= item.weight();
            if value <= 0.0 {
                return Some(index);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.loot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loot.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

impl<'a, L: Lootable> FromIterator<&'a L> for RoulettePicker<'a, L> {
    fn from_iter<I: IntoIterator<Item = &'a L>>(iter: I) -> Self {
        let mut picker = Self::new();
        for item in iter {
            if let Err(err) = picker.add(item) {
                log::warn!("Skipping roulette candidate: {}", err);
            }
        }
        picker
    }
}
