//! Frame-driven simulation services
//!
//! Both services follow the same pattern: instances come from an object pool,
//! live in a slot array while active, advance once per frame and go back to
//! the pool when they finish.
//! - `tick`: recurring timed actions
//! - `motion`: entities travelling toward a fixed or live target

pub mod motion;
pub mod tick;

pub use motion::{MotionEntity, MotionEntityPool, RenderInstance, TargetSource, VisualHandle};
pub use tick::{Tick, TickAction, TickHandle, TickScheduler};
