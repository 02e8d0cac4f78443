use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::event::{Event, EventId, EventResult};

/// Handler invoked with any event of a given name
pub type EventHandler = Arc<dyn Fn(&dyn Event) -> EventResult + Send + Sync>;

type TypedHandler = Arc<dyn Fn(&dyn Event) -> EventResult + Send + Sync>;

#[derive(Default)]
struct Handlers {
    by_name: HashMap<&'static str, Vec<(EventId, EventHandler)>>,
    by_type: HashMap<TypeId, Vec<(EventId, TypedHandler)>>,
    next_handler_id: EventId,
}

/// Synchronous event dispatcher, safe to share between threads.
///
/// Handlers run on the dispatching thread, name handlers before type
/// handlers, each group in registration order. A handler returning
/// [`EventResult::Stop`] ends propagation.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Handlers>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handler_count", &self.handler_count())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(handlers: &mut Handlers) -> EventId {
        handlers.next_handler_id += 1;
        handlers.next_handler_id
    }

    pub fn register_handler<F>(&self, event_name: &'static str, handler: F) -> EventId
    where
        F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        let id = Self::next_id(&mut handlers);
        handlers
            .by_name
            .entry(event_name)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    pub fn register_type_handler<E, F>(&self, handler: F) -> EventId
    where
        E: Event + 'static,
        F: Fn(&E) -> EventResult + Send + Sync + 'static,
    {
        let typed: TypedHandler = Arc::new(move |event: &dyn Event| match event.as_any().downcast_ref::<E>() {
            Some(e) => handler(e),
            None => EventResult::Continue,
        });
        let mut handlers = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        let id = Self::next_id(&mut handlers);
        handlers.by_type.entry(TypeId::of::<E>()).or_default().push((id, typed));
        id
    }

    pub fn unregister_handler(&self, id: EventId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        let mut found = false;
        for list in handlers.by_name.values_mut() {
            let len_before = list.len();
            list.retain(|(h_id, _)| *h_id != id);
            found |= list.len() < len_before;
        }
        for list in handlers.by_type.values_mut() {
            let len_before = list.len();
            list.retain(|(h_id, _)| *h_id != id);
            found |= list.len() < len_before;
        }
        found
    }

    pub fn dispatch(&self, event: &dyn Event) -> EventResult {
        // Snapshot so handlers may (un)register without deadlocking
        let (named, typed) = {
            let handlers = self.handlers.read().unwrap_or_else(|p| p.into_inner());
            let named: Vec<EventHandler> = handlers
                .by_name
                .get(event.name())
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default();
            let typed: Vec<TypedHandler> = handlers
                .by_type
                .get(&event.as_any().type_id())
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default();
            (named, typed)
        };

        for handler in named.iter().chain(typed.iter()) {
            if handler(event) == EventResult::Stop {
                return EventResult::Stop;
            }
        }
        EventResult::Continue
    }

    pub fn handler_count(&self) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(|p| p.into_inner());
        handlers.by_name.values().map(Vec::len).sum::<usize>()
            + handlers.by_type.values().map(Vec::len).sum::<usize>()
    }
}
