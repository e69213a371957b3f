//! Frame Runtime demo driver
//!
//! Builds a `Runtime` from an optional JSON settings file and runs a few
//! seconds of fixed-step frames: a turret fires bolts at a drifting target,
//! and every kill rolls a drop table that an inventory listener collects.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;

use frame_runtime::consts::SIM_DT;
use frame_runtime::loot::{DropTable, LootDropEvent, LootableItem};
use frame_runtime::sim::{TargetSource, VisualHandle};
use frame_runtime::{HandlerResult, Listener, Runtime, RuntimeSettings, Subscriptions};

/// Seconds of simulated time
const DEMO_SECONDS: f32 = 5.0;

type KillDrop = LootDropEvent<LootableItem, &'static str>;

/// A target drifting along the x axis
struct Drifter {
    pos: Cell<Vec2>,
}

impl TargetSource for Drifter {
    fn position(&self) -> Vec2 {
        self.pos.get()
    }
}

#[derive(Default)]
struct Inventory {
    items: Vec<(u32, u32)>,
    drops_seen: u32,
}

impl Inventory {
    fn on_drop(&mut self, event: &mut KillDrop) -> HandlerResult {
        self.drops_seen += 1;
        log::info!("{} dropped {} item(s)", event.receiver(), event.items().len());
        Ok(())
    }

    fn store(&mut self, item_id: u32, amount: u32) {
        match self.items.iter_mut().find(|(id, _)| *id == item_id) {
            Some((_, held)) => *held += amount,
            None => self.items.push((item_id, amount)),
        }
    }
}

impl Listener for Inventory {
    fn subscriptions(subs: &mut Subscriptions<Self>) {
        subs.on(Self::on_drop);
    }
}

fn drop_table() -> Result<DropTable<LootableItem>, frame_runtime::LootError> {
    let mut table = DropTable::new(2);
    table
        .add_always(LootableItem::guaranteed(1, 5))
        .add(LootableItem::ranged(2, 1, 3, 60.0)?)?
        .add(LootableItem::ranged(3, 2, 6, 30.0)?)?
        .add(LootableItem::new(4, 1, 10.0))?;
    Ok(table)
}

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => match RuntimeSettings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => RuntimeSettings::default(),
    };
    let table = match drop_table() {
        Ok(table) => table,
        Err(err) => {
            log::error!("Invalid drop table: {}", err);
            std::process::exit(1);
        }
    };

    let mut runtime = Runtime::new(settings);
    let inventory = Rc::new(RefCell::new(Inventory::default()));
    runtime.events.register(&inventory);

    let target = Rc::new(Drifter {
        pos: Cell::new(Vec2::new(200.0, 50.0)),
    });

    // Turret trigger, polled by the frame loop below
    let volleys = Rc::new(Cell::new(0u32));
    let trigger = Rc::clone(&volleys);
    let turret = runtime.scheduler.schedule(move || trigger.set(trigger.get() + 1), 0.5);
    let turret = match turret {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("Turret not scheduled: {}", err);
            std::process::exit(1);
        }
    };

    let frames = (DEMO_SECONDS / SIM_DT) as u32;
    let mut fired = 0;
    let mut kills = 0;
    for frame in 0..frames {
        let drift = target.position() + Vec2::new(-20.0 * SIM_DT, 0.0);
        target.pos.set(drift);

        while fired < volleys.get() {
            let mut bolt = runtime.motion.spawn();
            bolt.set_origin(Vec2::ZERO)
                .set_target(target.position())
                .set_speed(180.0)
                .with_visual(VisualHandle(fired))
                .track(target.clone());
            runtime.motion.launch(bolt);
            fired += 1;
        }

        let before = runtime.motion.active_count();
        runtime.frame(SIM_DT);
        let landed = before - runtime.motion.active_count();
        for _ in 0..landed {
            let drops = runtime.loot.roll_drops(&table, "drifter", &runtime.events);
            let mut inventory = inventory.borrow_mut();
            for (item, amount) in drops {
                inventory.store(item.item_id, amount);
            }
            kills += 1;
        }

        if frame % 60 == 0 {
            let mut drawn = 0;
            runtime.render(|instance| {
                log::debug!(
                    "bolt {:?} at {:?} heading {:.1}",
                    instance.visual,
                    instance.position,
                    instance.rotation
                );
                drawn += 1;
            });
            log::info!("frame {}: {} bolt(s) in flight", frame, drawn);
        }
    }

    turret.stop();
    runtime.frame(SIM_DT);

    log::info!(
        "Fired {} bolts ({} hits), turret ran {} times",
        fired,
        kills,
        turret.fired_count()
    );
    let inventory = inventory.borrow();
    log::info!("inventory saw {} drop event(s)", inventory.drops_seen);
    for (id, amount) in &inventory.items {
        log::info!("inventory: item {} x{}", id, amount);
    }
}
