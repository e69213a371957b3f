//! Composition root
//!
//! Owns one instance of every runtime service. Construct it once at startup
//! and hand references to whatever needs the services.

use std::rc::Rc;

use crate::event::EventBus;
use crate::loot::LootSelector;
use crate::settings::RuntimeSettings;
use crate::sim::{MotionEntityPool, RenderInstance, TickScheduler};

#[derive(Debug)]
pub struct Runtime {
    pub scheduler: TickScheduler,
    pub motion: MotionEntityPool,
    /// Shared so listeners can keep a handle to the bus they live on
    pub events: Rc<EventBus>,
    pub loot: LootSelector,
    settings: RuntimeSettings,
    paused: bool,
    frames: u64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeSettings::default())
    }
}

impl Runtime {
    pub fn new(settings: RuntimeSettings) -> Self {
        let mut scheduler = TickScheduler::new(settings.tick_capacity);
        let mut motion = MotionEntityPool::new(settings.motion_capacity);
        if settings.prewarm {
            scheduler.prewarm(settings.tick_capacity);
            motion.prewarm(settings.motion_capacity);
        }

        Self {
            scheduler,
            motion,
            events: Rc::new(EventBus::new()),
            loot: LootSelector::from_seed(settings.loot_seed),
            settings,
            paused: false,
            frames: 0,
        }
    }

    /// Advance one frame: ticks first, then motion entities.
    ///
    /// `delta` is clamped to the configured maximum. Paused frames do nothing.
    pub fn frame(&mut self, delta: f32) {
        if self.paused {
            return;
        }
        let delta = self.settings.clamp_delta(delta);
        self.scheduler.advance(delta);
        self.motion.advance_all(delta);
        self.frames += 1;
    }

    /// Draw every visible motion entity
    pub fn render(&self, draw: impl FnMut(RenderInstance)) {
        self.motion.render_all(draw);
    }

    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("Runtime paused after {} frames", self.frames);
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Runtime resumed");
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames advanced so far, excluding paused ones
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::{DropTable, LootableItem};
    use crate::sim::VisualHandle;
    use glam::Vec2;
    use std::cell::Cell;

    fn seeded() -> Runtime {
        Runtime::new(RuntimeSettings {
            loot_seed: Some(1),
            prewarm: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_prewarm_fills_pools() {
        let runtime = seeded();
        assert_eq!(runtime.scheduler.pool().free_count(), runtime.settings().tick_capacity);
        assert_eq!(runtime.motion.pool().free_count(), runtime.settings().motion_capacity);
    }

    #[test]
    fn test_frame_drives_ticks_and_motion() {
        let mut runtime = seeded();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        runtime
            .scheduler
            .schedule(move || counter.set(counter.get() + 1), 0.05)
            .unwrap();

        let mut bolt = runtime.motion.spawn();
        bolt.set_origin(Vec2::ZERO)
            .set_target(Vec2::new(1.0, 0.0))
            .set_speed(10.0)
            .with_visual(VisualHandle(3));
        runtime.motion.launch(bolt);

        let mut drawn = 0;
        runtime.render(|_| drawn += 1);
        assert_eq!(drawn, 1);

        runtime.frame(0.1);
        assert_eq!(fired.get(), 1);
        assert_eq!(runtime.motion.active_count(), 0);
        assert_eq!(runtime.frames(), 1);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut runtime = seeded();
        let mut bolt = runtime.motion.spawn();
        bolt.set_origin(Vec2::ZERO)
            .set_target(Vec2::new(100.0, 0.0))
            .set_speed(10.0);
        runtime.motion.launch(bolt);

        runtime.frame(30.0);
        let pos = runtime.motion.iter().next().unwrap().position();
        assert!((pos.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_paused_frames_do_not_advance() {
        let mut runtime = seeded();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        runtime
            .scheduler
            .schedule(move || counter.set(counter.get() + 1), 0.0)
            .unwrap();

        runtime.pause();
        runtime.frame(0.1);
        assert!(runtime.is_paused());
        assert_eq!(fired.get(), 0);
        assert_eq!(runtime.frames(), 0);

        runtime.resume();
        runtime.frame(0.1);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_loot_through_shared_bus() {
        let mut runtime = seeded();
        let mut table = DropTable::new(0);
        table.add_always(LootableItem::guaranteed(1, 1));

        let drops = runtime.loot.select_from(&table, (), &runtime.events);
        assert_eq!(drops.len(), 1);
    }
}
