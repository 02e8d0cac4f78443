//! # Change notification
//!
//! A small synchronous event system. Storage objects announce configuration
//! changes as [`StorageEvent`]s; interested parties register handlers with an
//! [`EventDispatcher`], by event name or by event type.
pub mod dispatcher;
pub mod types;

use std::any::Any;
use std::fmt;

/// Type for event handler identifiers
pub type EventId = u64;

/// Result of event processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed successfully and propagation should continue
    Continue,
    /// Event was processed and propagation should stop
    Stop,
}

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    /// Clone this event
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Re-export important types
pub use dispatcher::EventDispatcher;
pub use types::StorageEvent;
