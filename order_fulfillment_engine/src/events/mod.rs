//! Async event hooks for order lifecycle changes.
//!
//! The server subscribes to these events to trigger notification fan-out. Dispatch is decoupled from the
//! request/response cycle: publishing is a bounded channel send, handling happens in separate tasks, and a slow or
//! failing subscriber can never fail or delay the mutation that produced the event.

mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{CustomerContact, OrderPlacedEvent, OrderUpdatedEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
