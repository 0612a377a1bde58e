//! Event handling system for remote status updates.
//!
//! The manager actor emits these; the dispatcher in `main` turns them into
//! D-Bus signals and desktop notifications.

use std::sync::Arc;

use crate::{bluetooth::platform::DeviceRecord, remote::status::Status};

/// Events that can be emitted by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
   StatusChanged(Status),
   DeviceConnected(DeviceRecord),
   DeviceDisconnected(DeviceRecord),
}

/// Trait for implementing event emission.
pub trait EventBus: Send + Sync {
   /// Emits an event to all registered listeners.
   fn emit(&self, event: RemoteEvent);
}

/// Type alias for a thread-safe event sender.
pub type EventSender = Arc<dyn EventBus>;
