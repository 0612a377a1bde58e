//! Remote manager for the Fire TV connection.
//!
//! A single actor task owns the [`RemoteController`] and handles one command
//! at a time, so there is never more than one write in flight on the channel.
//! [`RemoteManager`] is the cheap, cloneable handle used by the D-Bus surface.

use std::sync::Arc;

use bluer::Address;
use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::{
   bluetooth::platform::{BluetoothPlatform, DeviceRecord},
   config::Config,
   error::{RemoteError, Result},
   event::{EventSender, RemoteEvent},
   remote::{controller::RemoteController, status::Status},
};

/// Channel buffer size
const CHANNEL_BUFFER_SIZE: usize = 64;

// === Commands ===

#[derive(Debug)]
enum ManagerCommand {
   ListDevices(oneshot::Sender<Vec<DeviceRecord>>),
   Connect(Option<Address>, oneshot::Sender<Result<DeviceRecord>>),
   Disconnect(oneshot::Sender<()>),
   SendKey(u8, oneshot::Sender<bool>),
   Shutdown(oneshot::Sender<()>),
}

// === Handle ===

/// Handle to the manager actor.
#[derive(Clone)]
pub struct RemoteManager {
   inbox: mpsc::Sender<ManagerCommand>,
   status: Arc<Mutex<Status>>,
}

impl RemoteManager {
   pub fn new<P: BluetoothPlatform>(platform: P, config: Config, event_tx: EventSender) -> Self {
      let (command_tx, command_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
      let status = Arc::new(Mutex::new(Status::default()));
      tokio::spawn(ManagerActor::new(platform, config, event_tx, command_rx, status.clone()).run());
      Self {
         inbox: command_tx,
         status,
      }
   }

   async fn request<T>(
      &self,
      command: impl FnOnce(oneshot::Sender<T>) -> ManagerCommand,
   ) -> Result<T> {
      let (tx, rx) = oneshot::channel();
      self
         .inbox
         .send(command(tx))
         .await
         .map_err(|_| RemoteError::ManagerShutdown)?;
      rx.await.map_err(|_| RemoteError::ManagerShutdown)
   }

   /// Fire TV candidates, preferred and known devices first.
   pub async fn devices(&self) -> Vec<DeviceRecord> {
      self
         .request(ManagerCommand::ListDevices)
         .await
         .unwrap_or_default()
   }

   /// Connects to `address`, or picks a candidate when `None`.
   pub async fn connect(&self, address: Option<Address>) -> Result<DeviceRecord> {
      self
         .request(|tx| ManagerCommand::Connect(address, tx))
         .await?
   }

   pub async fn disconnect(&self) -> Result<()> {
      self.request(ManagerCommand::Disconnect).await
   }

   pub async fn send_key(&self, keycode: u8) -> bool {
      self
         .request(|tx| ManagerCommand::SendKey(keycode, tx))
         .await
         .unwrap_or(false)
   }

   pub fn status(&self) -> Status {
      self.status.lock().clone()
   }

   /// Disconnects and stops the actor.
   pub async fn shutdown(&self) {
      if self.request(ManagerCommand::Shutdown).await.is_err() {
         debug!("Manager already stopped");
      }
   }
}

// === Manager Actor ===

struct ManagerActor<P: BluetoothPlatform> {
   config: Config,
   event_tx: EventSender,
   command_rx: mpsc::Receiver<ManagerCommand>,
   status: Arc<Mutex<Status>>,
   remote: RemoteController<P>,
   connected: Option<DeviceRecord>,
}

impl<P: BluetoothPlatform> ManagerActor<P> {
   fn new(
      platform: P,
      config: Config,
      event_tx: EventSender,
      command_rx: mpsc::Receiver<ManagerCommand>,
      status: Arc<Mutex<Status>>,
   ) -> Self {
      let remote = RemoteController::new(platform, config.key_release_delay());
      Self {
         config,
         event_tx,
         command_rx,
         status,
         remote,
         connected: None,
      }
   }

   async fn run(mut self) {
      info!("Remote manager starting up");

      while let Some(cmd) = self.command_rx.recv().await {
         if !self.handle_command(cmd).await {
            break;
         }
      }

      // Cleanup
      self.remote.disconnect().await;
      info!("Remote manager shut down");
   }

   async fn handle_command(&mut self, cmd: ManagerCommand) -> bool {
      match cmd {
         ManagerCommand::ListDevices(reply) => {
            let devices = self.candidates().await;
            let _ = reply.send(devices);
         },
         ManagerCommand::Connect(address, reply) => {
            let result = self.connect(address).await;
            let _ = reply.send(result);
         },
         ManagerCommand::Disconnect(reply) => {
            self.disconnect().await;
            let _ = reply.send(());
         },
         ManagerCommand::SendKey(keycode, reply) => {
            let sent = self.send_key(keycode).await;
            let _ = reply.send(sent);
         },
         ManagerCommand::Shutdown(reply) => {
            self.disconnect().await;
            let _ = reply.send(());
            return false;
         },
      }
      true
   }

   async fn candidates(&mut self) -> Vec<DeviceRecord> {
      let mut devices = self.remote.list_candidate_devices().await;
      devices.sort_by_key(|device| self.rank(device));
      devices
   }

   fn rank(&self, device: &DeviceRecord) -> u8 {
      let address = device.address_str();
      if self.config.is_preferred(&address) {
         0
      } else if self.config.is_known_device(&address).is_some() {
         1
      } else {
         2
      }
   }

   async fn connect(&mut self, address: Option<Address>) -> Result<DeviceRecord> {
      let candidates = self.candidates().await;
      let device = match address {
         Some(address) => candidates
            .into_iter()
            .find(|d| d.address == address)
            .unwrap_or_else(|| {
               let addr = address.to_string();
               let name = self.config.is_known_device(&addr).unwrap_or(addr.as_str());
               DeviceRecord::new(name, address)
            }),
         None => {
            let Some(device) = candidates.into_iter().next() else {
               self.set_status(Status::NoDevice);
               return Err(RemoteError::NoCandidateDevice);
            };
            device
         },
      };

      if let Some(previous) = self.connected.take() {
         self.event_tx.emit(RemoteEvent::DeviceDisconnected(previous));
      }

      self.set_status(Status::Connecting(device.name.clone()));
      if self.remote.connect(device.address).await {
         self.set_status(Status::Connected(device.name.clone()));
         self.connected = Some(device.clone());
         self
            .event_tx
            .emit(RemoteEvent::DeviceConnected(device.clone()));
         Ok(device)
      } else {
         self.set_status(Status::ConnectionFailed);
         Err(RemoteError::ConnectionFailed(device.name.to_string()))
      }
   }

   async fn disconnect(&mut self) {
      self.remote.disconnect().await;
      if let Some(device) = self.connected.take() {
         self.event_tx.emit(RemoteEvent::DeviceDisconnected(device));
      }
      self.set_status(Status::NotConnected);
   }

   async fn send_key(&mut self, keycode: u8) -> bool {
      if self.remote.send(keycode).await {
         info!("Sent keycode: {keycode}");
         return true;
      }

      if let Some(device) = self.connected.take() {
         self.event_tx.emit(RemoteEvent::DeviceDisconnected(device));
      }
      self.set_status(Status::SendFailed);
      false
   }

   fn set_status(&self, status: Status) {
      debug!("Status: {status}");
      *self.status.lock() = status.clone();
      self.event_tx.emit(RemoteEvent::StatusChanged(status));
   }
}
