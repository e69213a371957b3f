//! Frame Runtime - runtime substrate for small interactive applications
//!
//! Core modules:
//! - `pool`: Reusable object pools and hole-marking slot arrays
//! - `sim`: Tick scheduler and pooled motion entities
//! - `event`: Typed publish/subscribe bus with cancel/consume semantics
//! - `loot`: Weighted drop tables
//! - `runtime`: Composition root owning one of each service

pub mod error;
pub mod event;
pub mod loot;
pub mod pool;
pub mod runtime;
pub mod settings;
pub mod sim;

pub use error::{DispatchError, LootError, SchedulerError, SettingsError};
pub use event::{Event, EventBus, EventFlags, HandlerResult, Listener, ListenerId, Subscriptions};
pub use loot::{DropTable, LootDropEvent, LootSelector, Lootable, LootableItem};
pub use pool::{ObjectPool, Poolable};
pub use runtime::Runtime;
pub use settings::RuntimeSettings;
pub use sim::{MotionEntity, MotionEntityPool, TickHandle, TickScheduler};

use glam::Vec2;

/// Runtime configuration constants
pub mod consts {
    /// Fixed timestep used by the demo driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest frame delta applied in one step, to survive stalls
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Initial tick scheduler capacity
    pub const DEFAULT_TICK_CAPACITY: usize = 10;
    /// Initial motion pool capacity
    pub const DEFAULT_MOTION_CAPACITY: usize = 10;
}

/// Angle of the line from `from` to `to`, in degrees within (-180, 180]
#[inline]
pub fn heading_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_degrees() {
        assert_eq!(heading_degrees(Vec2::ZERO, Vec2::X), 0.0);
        assert!((heading_degrees(Vec2::ZERO, Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((heading_degrees(Vec2::ONE, Vec2::ZERO) + 135.0).abs() < 1e-4);
    }
}
