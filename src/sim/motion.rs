//! Pooled kinematic entities
//!
//! A motion entity travels in a straight line from its origin toward a target,
//! optionally re-aiming at a live target every frame, and retires once it
//! arrives or runs out of travel distance.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::heading_degrees;
use crate::pool::{ObjectPool, Poolable, SlotArray};

/// Anything a motion entity can follow
pub trait TargetSource {
    fn position(&self) -> Vec2;
}

/// Opaque reference to a drawable owned by the render collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// One draw request produced by [`MotionEntityPool::render_all`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderInstance {
    pub visual: VisualHandle,
    pub position: Vec2,
    /// Heading from origin to target, in degrees
    pub rotation: f32,
}

/// A projectile-like entity. Poolable.
#[derive(Default)]
pub struct MotionEntity {
    origin: Vec2,
    position: Vec2,
    target: Vec2,
    /// Unit direction toward the target; zero means dormant
    direction: Vec2,
    /// Units per second
    speed: f32,
    /// Maximum distance from origin; <= 0 means unlimited
    distance_limit: f32,
    /// Limit set by the caller rather than derived from the target
    explicit_limit: bool,
    tracker: Option<Rc<dyn TargetSource>>,
    visual: Option<VisualHandle>,
}

impl fmt::Debug for MotionEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionEntity")
            .field("origin", &self.origin)
            .field("position", &self.position)
            .field("target", &self.target)
            .field("direction", &self.direction)
            .field("speed", &self.speed)
            .field("distance_limit", &self.distance_limit)
            .field("explicit_limit", &self.explicit_limit)
            .field("tracking", &self.tracker.is_some())
            .field("visual", &self.visual)
            .finish()
    }
}

impl MotionEntity {
    /// Set the starting point; also moves the entity there
    pub fn set_origin(&mut self, origin: Vec2) -> &mut Self {
        self.origin = origin;
        self.position = origin;
        self
    }

    /// Aim at `target` from the current position
    pub fn set_target(&mut self, target: Vec2) -> &mut Self {
        self.target = target;
        self.direction = (target - self.position).normalize_or_zero();
        self.default_distance_limit();
        self
    }

    /// Limit how far from the origin the entity may travel.
    ///
    /// A value <= 0 without a tracked target means "stop at the target".
    pub fn set_distance_limit(&mut self, limit: f32) -> &mut Self {
        self.distance_limit = limit;
        self.explicit_limit = limit > 0.0;
        self.default_distance_limit();
        self
    }

    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed;
        self
    }

    /// Follow a live target, re-aiming whenever it moves
    pub fn track(&mut self, source: Rc<dyn TargetSource>) -> &mut Self {
        let target = source.position();
        self.tracker = Some(source);
        if !self.explicit_limit {
            self.distance_limit = 0.0;
        }
        self.set_target(target)
    }

    pub fn with_visual(&mut self, visual: VisualHandle) -> &mut Self {
        self.visual = Some(visual);
        self
    }

    fn default_distance_limit(&mut self) {
        if self.tracker.is_none() && !self.explicit_limit {
            self.distance_limit = self.origin.distance(self.target);
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn distance_limit(&self) -> f32 {
        self.distance_limit
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_some()
    }

    /// A zero direction means the entity has nowhere to go
    pub fn is_dormant(&self) -> bool {
        self.direction == Vec2::ZERO
    }

    /// Distance covered since the origin
    pub fn travelled(&self) -> f32 {
        self.origin.distance(self.position)
    }

    pub fn heading_degrees(&self) -> f32 {
        heading_degrees(self.origin, self.target)
    }

    /// Move one frame. Returns true once the entity should retire.
    fn update(&mut self, delta: f32) -> bool {
        if let Some(live) = self.tracker.as_ref().map(|t| t.position()) {
            if live != self.target {
                self.origin = self.position;
                self.set_target(live);
                if self.is_dormant() {
                    // The live target sits on top of us
                    return true;
                }
            }
        }

        let lo = self.origin.min(self.target);
        let hi = self.origin.max(self.target);
        let step = self.direction * self.speed * delta;
        self.position = (self.position + step).clamp(lo, hi);

        if self.position == self.target {
            return true;
        }
        self.distance_limit > 0.0 && self.travelled() >= self.distance_limit
    }

    fn render_instance(&self) -> Option<RenderInstance> {
        if self.is_dormant() {
            return None;
        }
        let visual = self.visual?;
        Some(RenderInstance {
            visual,
            position: self.position,
            rotation: self.heading_degrees(),
        })
    }
}

impl Poolable for MotionEntity {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Updates, renders and recycles motion entities
#[derive(Debug)]
pub struct MotionEntityPool {
    active: SlotArray<MotionEntity>,
    pool: ObjectPool<MotionEntity>,
}

impl Default for MotionEntityPool {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_MOTION_CAPACITY)
    }
}

impl MotionEntityPool {
    pub fn new(capacity: usize) -> Self {
        log::info!("Motion pool created with initial capacity of {}", capacity);
        Self {
            active: SlotArray::with_capacity(capacity),
            pool: ObjectPool::with_capacity(capacity),
        }
    }

    pub fn prewarm(&mut self, count: usize) {
        self.pool.fill(count);
    }

    /// Obtain an unconfigured entity
    pub fn spawn(&mut self) -> MotionEntity {
        self.pool.obtain()
    }

    /// Start updating and rendering a configured entity
    pub fn launch(&mut self, entity: MotionEntity) {
        let slot = self.active.insert(entity);
        log::trace!("Motion entity launched in slot {}", slot);
    }

    /// Move every active entity and retire those that arrived.
    ///
    /// Dormant entities never move and are retired on the pass that finds them.
    pub fn advance_all(&mut self, delta: f32) {
        for index in 0..self.active.slot_count() {
            let retire = match self.active.get_mut(index) {
                Some(entity) if entity.is_dormant() => true,
                Some(entity) => entity.update(delta),
                None => continue,
            };

            if retire {
                if let Some(entity) = self.active.remove(index) {
                    self.pool.free(entity);
                }
            }
        }
    }

    /// Emit a draw request for every moving entity that has a visual
    pub fn render_all(&self, mut draw: impl FnMut(RenderInstance)) {
        for (_, entity) in self.active.iter() {
            if let Some(instance) = entity.render_instance() {
                draw(instance);
            }
        }
    }

    /// Retire every active entity immediately
    pub fn clear(&mut self) {
        let retired: Vec<_> = self.active.drain().collect();
        log::debug!("Cleared {} motion entities", retired.len());
        self.pool.free_all(retired);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionEntity> {
        self.active.iter().map(|(_, e)| e)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pool(&self) -> &ObjectPool<MotionEntity> {
        &self.pool
    }
}
