//! Weighted loot selection
//!
//! - `item`: the `Lootable` contract and the stock `LootableItem`
//! - `roulette`: weight-proportional draws
//! - `table`: guaranteed + weighted entries rolled together
//!
//! [`LootSelector`] rolls a table and publishes a [`LootDropEvent`] before
//! handing the result back; a listener cancelling the event empties the drop.

pub mod item;
pub mod roulette;
pub mod table;

pub use item::{DEFAULT_WEIGHT, Lootable, LootableItem};
pub use roulette::RoulettePicker;
pub use table::DropTable;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::event::{Event, EventBus, EventFlags};

/// Published after a table is rolled and before the drop reaches its receiver
#[derive(Debug)]
pub struct LootDropEvent<L, R> {
    flags: EventFlags,
    items: Vec<L>,
    receiver: R,
}

impl<L, R> LootDropEvent<L, R> {
    pub fn new(items: Vec<L>, receiver: R) -> Self {
        Self {
            flags: EventFlags::default(),
            items,
            receiver,
        }
    }

    pub fn items(&self) -> &[L] {
        &self.items
    }

    /// Listeners may adjust the drop before it is delivered
    pub fn items_mut(&mut self) -> &mut Vec<L> {
        &mut self.items
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }
}

impl<L: 'static, R: 'static> Event for LootDropEvent<L, R> {
    fn flags(&self) -> &EventFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EventFlags {
        &mut self.flags
    }
}

/// Uniform quantity within the item's amount range.
///
/// An inverted range yields its start.
pub fn roll_amount<L: Lootable, R: Rng>(item: &L, rng: &mut R) -> u32 {
    let range = item.amount_range();
    if range.is_empty() {
        *range.start()
    } else {
        rng.random_range(range)
    }
}

/// Rolls drop tables with its own seeded RNG
#[derive(Debug, Clone)]
pub struct LootSelector {
    rng: Pcg32,
}

impl LootSelector {
    /// Deterministic selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Selector seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Roll `table` for `receiver` and let listeners veto the drop.
    ///
    /// Returns an empty list if any listener cancels the [`LootDropEvent`].
    pub fn select_from<L: Lootable, R: 'static>(
        &mut self,
        table: &DropTable<L>,
        receiver: R,
        bus: &EventBus,
    ) -> Vec<L> {
        let selected = table.select_items(&mut self.rng);
        let mut event = LootDropEvent::new(selected, receiver);
        bus.publish(&mut event);

        if event.is_cancelled() {
            log::debug!("Loot drop of {} item(s) cancelled", event.items.len());
            return Vec::new();
        }
        event.items
    }

    /// Like [`Self::select_from`], pairing each item with a rolled quantity
    pub fn roll_drops<L: Lootable, R: 'static>(
        &mut self,
        table: &DropTable<L>,
        receiver: R,
        bus: &EventBus,
    ) -> Vec<(L, u32)> {
        self.select_from(table, receiver, bus)
            .into_iter()
            .map(|item| {
                let amount = roll_amount(&item, &mut self.rng);
                (item, amount)
            })
            .collect()
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{HandlerResult, Listener, Subscriptions};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct PlayerId(u32);

    type PlayerDrop = LootDropEvent<LootableItem, PlayerId>;

    #[derive(Default)]
    struct Warden {
        vetoed: Vec<u32>,
    }

    impl Warden {
        fn on_drop(&mut self, event: &mut PlayerDrop) -> HandlerResult {
            self.vetoed.push(event.receiver().0);
            event.cancel();
            Ok(())
        }
    }

    impl Listener for Warden {
        fn subscriptions(subs: &mut Subscriptions<Self>) {
            subs.on(Self::on_drop);
        }
    }

    fn sample_table() -> DropTable<LootableItem> {
        let mut table = DropTable::new(2);
        table
            .add_always(LootableItem::guaranteed(10, 1))
            .add(LootableItem::new(20, 1, 1.0))
            .unwrap();
        table
    }

    #[test]
    fn test_select_from_returns_items_when_not_cancelled() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        bus.subscribe(move |event: &mut PlayerDrop| {
            log.borrow_mut().push(event.items().len());
            Ok(())
        });

        let mut selector = LootSelector::new(1);
        let drops = selector.select_from(&sample_table(), PlayerId(1), &bus);
        assert_eq!(drops.len(), 3);
        assert_eq!(drops[0].item_id, 10);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_cancelled_drop_is_empty() {
        let bus = EventBus::new();
        let warden = Rc::new(RefCell::new(Warden::default()));
        bus.register(&warden);

        let mut selector = LootSelector::new(2);
        let drops = selector.select_from(&sample_table(), PlayerId(7), &bus);
        assert!(drops.is_empty());
        assert_eq!(warden.borrow().vetoed, vec![7]);
    }

    #[test]
    fn test_other_receiver_types_are_not_vetoed() {
        let bus = EventBus::new();
        let warden = Rc::new(RefCell::new(Warden::default()));
        bus.register(&warden);

        let mut selector = LootSelector::new(3);
        let drops = selector.select_from(&sample_table(), "chest", &bus);
        assert_eq!(drops.len(), 3);
        assert!(warden.borrow().vetoed.is_empty());
    }

    #[test]
    fn test_listener_can_edit_drop() {
        let bus = EventBus::new();
        bus.subscribe(|event: &mut PlayerDrop| {
            event.items_mut().retain(|item| item.item_id != 20);
            Ok(())
        });

        let mut selector = LootSelector::new(4);
        let drops = selector.select_from(&sample_table(), PlayerId(1), &bus);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].item_id, 10);
    }

    #[test]
    fn test_roll_drops_respects_amount_range() {
        let bus = EventBus::new();
        let mut table = DropTable::new(50);
        table
            .add(LootableItem::ranged(5, 2, 4, 1.0).unwrap())
            .unwrap();

        let mut selector = LootSelector::new(5);
        let drops = selector.roll_drops(&table, PlayerId(1), &bus);
        assert_eq!(drops.len(), 50);
        assert!(drops.iter().all(|(_, amount)| (2..=4).contains(amount)));
    }

    #[test]
    fn test_roll_amount_fixed_and_inverted_ranges() {
        let mut rng = Pcg32::seed_from_u64(6);
        assert_eq!(roll_amount(&LootableItem::guaranteed(1, 3), &mut rng), 3);
        let inverted = LootableItem {
            item_id: 2,
            weight: 1.0,
            min_amount: 4,
            max_amount: 1,
        };
        assert_eq!(roll_amount(&inverted, &mut rng), 4);
    }

    #[test]
    fn test_same_seed_same_drops() {
        let bus = EventBus::new();
        let mut table = DropTable::new(20);
        for id in 0..5 {
            table.add(LootableItem::new(id, 1, id as f64 + 1.0)).unwrap();
        }
        let a: Vec<u32> = LootSelector::new(99)
            .select_from(&table, (), &bus)
            .iter()
            .map(|i| i.item_id)
            .collect();
        let b: Vec<u32> = LootSelector::new(99)
            .select_from(&table, (), &bus)
            .iter()
            .map(|i| i.item_id)
            .collect();
        assert_eq!(a, b);
    }
}
