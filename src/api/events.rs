//! Event callback registry.
//!
//! The engine is single-threaded by design, so callbacks are plain boxed
//! closures invoked synchronously on the driving thread. Handles allow a
//! host to unregister a listener it no longer wants.

use std::collections::HashMap;

use crate::processing::tracker::TrackerEvent;

/// Callback invoked for every tracker event
pub type EventCallback = Box<dyn Fn(&TrackerEvent)>;

/// Registration handle returned by [`EventDispatcher::add_callback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Synchronous fan-out of tracker events to registered listeners
#[derive(Default)]
pub struct EventDispatcher {
    callbacks: HashMap<CallbackHandle, EventCallback>,
    next_id: u32,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        let handle = CallbackHandle(self.next_id);
        self.next_id += 1;
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Remove a listener; returns whether it was registered
    pub fn remove_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Deliver one event to every registered listener
    pub fn dispatch(&self, event: &TrackerEvent) {
        for callback in self.callbacks.values() {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_reaches_all_listeners() {
        let mut dispatcher = EventDispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            dispatcher.add_callback(Box::new(move |event| {
                if let TrackerEvent::HeadingUpdated { heading } = event {
                    seen.borrow_mut().push((tag, *heading));
                }
            }));
        }

        dispatcher.dispatch(&TrackerEvent::HeadingUpdated { heading: 42.0 });

        let mut seen = seen.borrow().clone();
        seen.sort_by_key(|(tag, _)| *tag);
        assert_eq!(seen, vec![("a", 42.0), ("b", 42.0)]);
    }

    #[test]
    fn test_removed_listener_stops_receiving() {
        let mut dispatcher = EventDispatcher::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let handle = dispatcher.add_callback(Box::new(move |_| {
            *counter.borrow_mut() += 1;
        }));

        dispatcher.dispatch(&TrackerEvent::HeadingUpdated { heading: 1.0 });
        assert!(dispatcher.remove_callback(handle));
        assert!(!dispatcher.remove_callback(handle));
        dispatcher.dispatch(&TrackerEvent::HeadingUpdated { heading: 2.0 });

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut dispatcher = EventDispatcher::new();
        let a = dispatcher.add_callback(Box::new(|_| {}));
        let b = dispatcher.add_callback(Box::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(dispatcher.len(), 2);
    }
}
