//! Fire TV Remote D-Bus Service
//!
//! This service turns the host into a Bluetooth remote control for a Fire TV.
//! It opens an HID channel to a paired Fire TV and exposes the remote's keys
//! and connection status over the session bus.

use std::{sync::Arc, time::Duration};

use crossbeam::queue::SegQueue;
use log::{info, warn};
use tokio::{signal, sync::Notify, task::JoinHandle, time};
use zbus::{Connection, connection, object_server::InterfaceRef};

use bluetooth::{bluez::BluezPlatform, manager::RemoteManager};
use dbus::RemoteService;
use event::{EventBus, RemoteEvent};
use notify::Notifier;

mod bluetooth;
mod config;
mod dbus;
mod error;
mod event;
mod notify;
mod remote;

use crate::{dbus::RemoteServiceSignals, error::Result};

const OBJECT_PATH: &str = "/org/firetvremote/remote";

/// Upper bound on delivering the events queued during shutdown.
const DISPATCH_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
   env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

   info!("Starting Fire TV remote service...");

   // Load configuration
   let config = config::Config::load()?;
   info!(
      "Loaded configuration with {} known devices",
      config.known_devices.len()
   );

   // Create event channel
   let event_bus = EventProcessor::new();

   let platform = BluezPlatform::new(config.adapter.as_deref()).await?;
   let manager = RemoteManager::new(platform, config.clone(), event_bus.clone());

   // Build D-Bus connection
   let connection = connection::Builder::session()?
      .name("org.firetvremote")?
      .serve_at(OBJECT_PATH, RemoteService::new(manager.clone()))?
      .build()
      .await?;

   info!("Fire TV remote service started at org.firetvremote");

   let notifier = Notifier::new(&connection, config.notifications).await;
   let dispatcher = event_bus.spawn_dispatcher(connection, notifier).await?;

   if config.auto_connect {
      match manager.connect(None).await {
         Ok(device) => info!("Auto-connected to {}", device.name),
         Err(e) => warn!("Auto-connect failed: {e}"),
      }
   }

   // Wait for shutdown signal
   signal::ctrl_c().await?;
   info!("Shutting down Fire TV remote service...");
   manager.shutdown().await;

   // The dispatcher exits once the stopped actor drops its event sender and
   // the queue is empty.
   match time::timeout(DISPATCH_FLUSH_TIMEOUT, dispatcher).await {
      Ok(Ok(())) => {},
      Ok(Err(e)) => warn!("Event dispatcher failed: {e}"),
      Err(_) => warn!("Timed out flushing pending events"),
   }

   Ok(())
}

struct EventProcessor {
   queue: SegQueue<RemoteEvent>,
   notifier: Notify,
}

impl EventProcessor {
   fn new() -> Arc<Self> {
      Arc::new(Self {
         queue: SegQueue::new(),
         notifier: Notify::new(),
      })
   }
}

impl EventProcessor {
   async fn recv(self: &Arc<Self>) -> Option<RemoteEvent> {
      loop {
         if let Some(event) = self.queue.pop() {
            return Some(event);
         }
         let notify = self.notifier.notified();
         if let Some(event) = self.queue.pop() {
            return Some(event);
         }
         if Arc::strong_count(self) == 1 {
            return None;
         }
         let _ = time::timeout(Duration::from_secs(1), notify).await;
      }
   }

   async fn dispatch(
      &self,
      iface: &InterfaceRef<RemoteService>,
      notifier: &Notifier,
      event: RemoteEvent,
   ) -> Result<()> {
      match event {
         RemoteEvent::StatusChanged(status) => {
            iface.status_updated(&status.to_string()).await?;
            let service = iface.get().await;
            service.status_changed(iface.signal_emitter()).await?;
            service.connected_changed(iface.signal_emitter()).await?;
         },
         RemoteEvent::DeviceConnected(device) => {
            iface
               .device_connected(&device.address_str(), &device.name)
               .await?;
            notifier.device_connected(&device.name).await;
         },
         RemoteEvent::DeviceDisconnected(device) => {
            iface.device_disconnected(&device.address_str()).await?;
         },
      }
      Ok(())
   }

   async fn spawn_dispatcher(
      self: Arc<Self>,
      connection: Connection,
      notifier: Notifier,
   ) -> Result<JoinHandle<()>> {
      let iface = connection
         .object_server()
         .interface::<_, RemoteService>(OBJECT_PATH)
         .await?;
      Ok(tokio::spawn(async move {
         while let Some(event) = self.recv().await {
            if let Err(e) = self.dispatch(&iface, &notifier, event).await {
               warn!("Error dispatching event: {e}");
            }
         }
      }))
   }
}

impl EventBus for EventProcessor {
   fn emit(&self, event: RemoteEvent) {
      self.queue.push(event);
      self.notifier.notify_waiters();
   }
}
