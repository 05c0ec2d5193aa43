use std::collections::HashMap;
use std::fmt;

use crate::gamepad::event::{EventKind, GamepadEvent};

/// What a listener asks the dispatcher to do after it ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Hand the event to the next listener of the same kind
    #[default]
    Continue,
    /// Skip the remaining listeners for this event
    StopDispatch,
}

/// Trait for reacting to gamepad events.
///
/// Any `FnMut(&GamepadEvent) -> Dispatch + Send` closure is a listener.
pub trait Listener: Send {
    fn on_event(&mut self, event: &GamepadEvent) -> Dispatch;
}

impl<F> Listener for F
where
    F: FnMut(&GamepadEvent) -> Dispatch + Send,
{
    fn on_event(&mut self, event: &GamepadEvent) -> Dispatch {
        self(event)
    }
}

/// Handle returned by registration, used to remove the listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    listener: Box<dyn Listener>,
}

/// Listeners grouped by event kind, kept in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<ListenerEntry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, listener: Box<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push(ListenerEntry { id, listener });
        id
    }

    /// Unregisters a listener. Returns false when the id is unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for entries in self.listeners.values_mut() {
            if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.values().all(Vec::is_empty)
    }

    /// Runs the listeners registered for `event.kind` until one stops the chain.
    ///
    /// Returns how many listeners ran.
    pub fn dispatch(&mut self, event: &GamepadEvent) -> usize {
        let Some(entries) = self.listeners.get_mut(&event.kind) else {
            return 0;
        };

        let mut invoked = 0;
        for entry in entries.iter_mut() {
            invoked += 1;
            if entry.listener.on_event(event) == Dispatch::StopDispatch {
                break;
            }
        }
        invoked
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .iter()
            .map(|(kind, entries)| (*kind, entries.len()))
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("next_id", &self.next_id)
            .field("listeners", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::sync::{Arc, Mutex};

    fn event(kind: EventKind) -> GamepadEvent {
        GamepadEvent {
            kind,
            id: 0,
            current_value: 1.0,
            delta_value: 1.0,
            at: Local::now(),
        }
    }

    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
        result: Dispatch,
    ) -> Box<dyn Listener> {
        let log = log.clone();
        Box::new(move |_: &GamepadEvent| {
            log.lock().unwrap().push(name);
            result
        })
    }

    #[test]
    fn runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add(EventKind::ButtonPressed, recorder(&log, "first", Dispatch::Continue));
        registry.add(EventKind::ButtonPressed, recorder(&log, "second", Dispatch::Continue));
        registry.add(EventKind::AxisMoved, recorder(&log, "axis", Dispatch::Continue));

        assert_eq!(registry.dispatch(&event(EventKind::ButtonPressed)), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn stop_dispatch_skips_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add(EventKind::AxisMoved, recorder(&log, "a", Dispatch::Continue));
        registry.add(EventKind::AxisMoved, recorder(&log, "b", Dispatch::StopDispatch));
        registry.add(EventKind::AxisMoved, recorder(&log, "c", Dispatch::Continue));

        assert_eq!(registry.dispatch(&event(EventKind::AxisMoved)), 2);
        // The chain restarts from the top for the next event.
        registry.dispatch(&event(EventKind::AxisMoved));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn remove_unregisters_only_that_listener() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let first = registry.add(EventKind::ButtonReleased, recorder(&log, "first", Dispatch::Continue));
        registry.add(EventKind::ButtonReleased, recorder(&log, "second", Dispatch::Continue));

        assert!(registry.remove(first));
        assert!(!registry.remove(first));
        assert_eq!(registry.len(EventKind::ButtonReleased), 1);

        registry.dispatch(&event(EventKind::ButtonReleased));
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn dispatch_without_listeners_is_a_no_op() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.dispatch(&event(EventKind::ButtonPressed)), 0);
    }
}
