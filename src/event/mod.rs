//! Synchronous publish/subscribe event bus
//!
//! Listeners declare one typed handler per event type they care about. The
//! bus keys registrations by event type and dispatches in registration order.
//!
//! # Dispatch rules
//! - A cancelled event reaches no further listener, including the next one in line.
//! - A consumed event finishes the current listener, then stops.
//! - A handler returning `Err` is logged; the remaining listeners still run.
//!
//! Every bus method takes `&self`, so handlers holding an `Rc<EventBus>` may
//! register, unregister or publish while a dispatch is in flight. Removal
//! clears the entry in place; cleared entries are compacted once no dispatch
//! is running.

use std::any::{Any, TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::rc::{Rc, Weak};

use crate::error::DispatchError;

/// Result of a single handler invocation
pub type HandlerResult = Result<(), Box<dyn Error>>;

/// Cancellation and consumption state carried by every event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFlags {
    cancelled: bool,
    consumed: bool,
}

/// Payload that can travel through an [`EventBus`]
pub trait Event: Any {
    fn flags(&self) -> &EventFlags;
    fn flags_mut(&mut self) -> &mut EventFlags;

    /// Prevent delivery to any remaining listener
    fn cancel(&mut self) {
        self.flags_mut().cancelled = true;
    }

    /// Stop delivery after the current listener
    fn consume(&mut self) {
        self.flags_mut().consumed = true;
    }

    fn is_cancelled(&self) -> bool {
        self.flags().cancelled
    }

    fn is_consumed(&self) -> bool {
        self.flags().consumed
    }
}

type TypedHandler<L> = Box<dyn Fn(&mut L, &mut dyn Any) -> HandlerResult>;
type ErasedHandler = Rc<dyn Fn(&mut dyn Any) -> HandlerResult>;

/// Handlers a [`Listener`] declares, one per event type
pub struct Subscriptions<L> {
    handlers: Vec<(TypeId, &'static str, TypedHandler<L>)>,
}

impl<L: 'static> Subscriptions<L> {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Handle events of type `E` with `handler`
    pub fn on<E: Event>(&mut self, handler: fn(&mut L, &mut E) -> HandlerResult) -> &mut Self {
        let typed: TypedHandler<L> =
            Box::new(move |listener: &mut L, event: &mut dyn Any| -> HandlerResult {
                match event.downcast_mut::<E>() {
                    Some(event) => handler(listener, event),
                    None => Ok(()),
                }
            });
        self.handlers.push((TypeId::of::<E>(), type_name::<E>(), typed));
        self
    }
}

/// An object that handles events through typed methods
///
/// ```ignore
/// impl Listener for Inventory {
///     fn subscriptions(subs: &mut Subscriptions<Self>) {
///         subs.on(Self::on_loot_drop);
///     }
/// }
/// ```
pub trait Listener: 'static {
    fn subscriptions(subs: &mut Subscriptions<Self>)
    where
        Self: Sized;
}

/// Identifies everything registered by one `register`/`subscribe` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of one `publish`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Handlers that ran, including failed ones
    pub invoked: usize,
    /// Handlers that returned an error
    pub failed: usize,
}

struct Registration {
    id: ListenerId,
    /// Address of the listener object; 0 for closure subscriptions
    identity: usize,
    event_type: TypeId,
    event_name: &'static str,
    listener_name: &'static str,
    /// Set for object listeners so dropped listeners are skipped
    owner: Option<Weak<dyn Any>>,
    handler: ErasedHandler,
}

impl Registration {
    fn is_live(&self) -> bool {
        self.owner.as_ref().is_none_or(|owner| owner.strong_count() > 0)
    }
}

fn identity_of<L>(listener: &Rc<RefCell<L>>) -> usize {
    Rc::as_ptr(listener) as *const () as usize
}

#[derive(Default)]
pub struct EventBus {
    entries: RefCell<Vec<Option<Registration>>>,
    /// Number of cleared entries awaiting compaction
    cleared: Cell<usize>,
    /// Nesting level of in-flight `publish` calls
    depth: Cell<usize>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("entries", &self.entries.borrow().len())
            .field("cleared", &self.cleared.get())
            .field("depth", &self.depth.get())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ListenerId(id)
    }

    /// Register every handler `L` declares.
    ///
    /// The bus holds the listener weakly: dropping the last `Rc` silently ends delivery.
    pub fn register<L: Listener>(&self, listener: &Rc<RefCell<L>>) -> ListenerId {
        let mut subs = Subscriptions::new();
        L::subscriptions(&mut subs);

        let id = self.allocate_id();
        let identity = identity_of(listener);
        let listener_name = type_name::<L>();
        let owner: Weak<dyn Any> = Rc::downgrade(listener) as Weak<dyn Any>;
        let count = subs.handlers.len();

        let mut entries = self.entries.borrow_mut();
        for (event_type, event_name, typed) in subs.handlers {
            let weak = Rc::downgrade(listener);
            let handler: ErasedHandler = Rc::new(move |event: &mut dyn Any| -> HandlerResult {
                let Some(listener) = weak.upgrade() else {
                    return Ok(());
                };
                let mut guard = listener
                    .try_borrow_mut()
                    .map_err(|_| DispatchError::ListenerBusy(listener_name))?;
                typed(&mut *guard, event)
            });
            entries.push(Some(Registration {
                id,
                identity,
                event_type,
                event_name,
                listener_name,
                owner: Some(owner.clone()),
                handler,
            }));
        }

        if count == 0 {
            log::warn!("{} registered without any event handlers", listener_name);
        } else {
            log::debug!("Registered {} handler(s) for {}", count, listener_name);
        }
        id
    }

    /// Register a closure for events of type `E`
    pub fn subscribe<E: Event>(
        &self,
        handler: impl FnMut(&mut E) -> HandlerResult + 'static,
    ) -> ListenerId {
        let id = self.allocate_id();
        let event_name = type_name::<E>();
        let cell = RefCell::new(handler);
        let erased: ErasedHandler = Rc::new(move |event: &mut dyn Any| -> HandlerResult {
            let mut handler = cell
                .try_borrow_mut()
                .map_err(|_| DispatchError::ListenerBusy("closure"))?;
            match event.downcast_mut::<E>() {
                Some(event) => (&mut *handler)(event),
                None => Ok(()),
            }
        });

        self.entries.borrow_mut().push(Some(Registration {
            id,
            identity: 0,
            event_type: TypeId::of::<E>(),
            event_name,
            listener_name: "closure",
            owner: None,
            handler: erased,
        }));
        log::debug!("Subscribed closure to {}", event_name);
        id
    }

    /// Remove every registration of `listener`. Returns how many were cleared.
    pub fn unregister<L: Listener>(&self, listener: &Rc<RefCell<L>>) -> usize {
        let identity = identity_of(listener);
        let removed = self.clear_where(|r| r.identity == identity);
        log::debug!("Unregistered {} handler(s) of {}", removed, type_name::<L>());
        removed
    }

    /// Remove every registration made under `id`
    pub fn unsubscribe(&self, id: ListenerId) -> usize {
        self.clear_where(|r| r.id == id)
    }

    fn clear_where(&self, matches: impl Fn(&Registration) -> bool) -> usize {
        let mut removed = 0;
        {
            let mut entries = self.entries.borrow_mut();
            for entry in entries.iter_mut() {
                if entry.as_ref().is_some_and(&matches) {
                    *entry = None;
                    removed += 1;
                }
            }
        }
        self.cleared.set(self.cleared.get() + removed);
        self.compact_if_idle();
        removed
    }

    pub fn is_registered<L: Listener>(&self, listener: &Rc<RefCell<L>>) -> bool {
        let identity = identity_of(listener);
        self.entries
            .borrow()
            .iter()
            .flatten()
            .any(|r| r.identity == identity)
    }

    /// Number of distinct live listeners
    pub fn listener_count(&self) -> usize {
        let entries = self.entries.borrow();
        let mut ids: Vec<ListenerId> = entries
            .iter()
            .flatten()
            .filter(|r| r.is_live())
            .map(|r| r.id)
            .collect();
        ids.dedup();
        ids.len()
    }

    /// Deliver `event` to every matching handler in registration order
    pub fn publish<E: Event>(&self, event: &mut E) -> Dispatch {
        let event_type = TypeId::of::<E>();
        let mut report = Dispatch::default();
        let depth = DepthGuard::enter(&self.depth);

        let mut index = 0;
        loop {
            let next = {
                let mut entries = self.entries.borrow_mut();
                let Some(slot) = entries.get_mut(index) else {
                    break;
                };
                if slot.as_ref().is_some_and(|r| !r.is_live()) {
                    // Listener dropped without unregistering
                    *slot = None;
                    self.cleared.set(self.cleared.get() + 1);
                }
                slot.as_ref()
                    .filter(|r| r.event_type == event_type)
                    .map(|r| (Rc::clone(&r.handler), r.listener_name, r.event_name))
            };
            index += 1;

            let Some((handler, listener_name, event_name)) = next else {
                continue;
            };
            if event.is_cancelled() {
                break;
            }

            report.invoked += 1;
            if let Err(err) = handler(&mut *event) {
                report.failed += 1;
                log::error!("{} failed handling {}: {}", listener_name, event_name, err);
            }

            if event.is_consumed() {
                break;
            }
        }

        drop(depth);
        self.compact_if_idle();
        report
    }

    /// Drop cleared entries once they make up half the list and nothing is dispatching
    fn compact_if_idle(&self) {
        if self.depth.get() > 0 {
            return;
        }
        let cleared = self.cleared.get();
        let mut entries = self.entries.borrow_mut();
        if cleared == 0 || cleared * 2 < entries.len() {
            return;
        }
        entries.retain(|entry| entry.as_ref().is_some_and(Registration::is_live));
        self.cleared.set(0);
    }
}

/// Tracks one in-flight `publish`, unwinding included
struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}
