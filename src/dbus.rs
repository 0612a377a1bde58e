use std::str::FromStr;

use bluer::Address;
use log::info;
use zbus::{interface, object_server::SignalEmitter};

use crate::{
   bluetooth::manager::RemoteManager,
   error::RemoteError,
   remote::keymap::{self, RemoteKey},
};

pub struct RemoteService {
   manager: RemoteManager,
}

impl RemoteService {
   pub const fn new(manager: RemoteManager) -> Self {
      Self { manager }
   }
}

fn invalid_args(e: RemoteError) -> zbus::fdo::Error {
   zbus::fdo::Error::InvalidArgs(e.to_string())
}

#[interface(name = "org.firetvremote.Remote")]
impl RemoteService {
   async fn list_devices(&self) -> zbus::fdo::Result<String> {
      let devices: Vec<serde_json::Value> = self
         .manager
         .devices()
         .await
         .iter()
         .map(|d| d.to_json())
         .collect();
      serde_json::to_string(&devices).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
   }

   async fn connect(&self, address: String) -> zbus::fdo::Result<String> {
      let address = if address.is_empty() {
         None
      } else {
         Some(
            Address::from_str(&address)
               .map_err(|_| invalid_args(RemoteError::InvalidAddress(address.clone())))?,
         )
      };

      let device = self
         .manager
         .connect(address)
         .await
         .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
      Ok(device.name.to_string())
   }

   async fn disconnect(&self) -> zbus::fdo::Result<bool> {
      info!("Disconnect requested over D-Bus");
      self
         .manager
         .disconnect()
         .await
         .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
      Ok(true)
   }

   async fn send_key(&self, key: String) -> zbus::fdo::Result<bool> {
      let key =
         RemoteKey::from_str(&key).map_err(|_| invalid_args(RemoteError::UnknownKey(key.clone())))?;
      Ok(self.manager.send_key(key.keycode()).await)
   }

   async fn send_keycode(&self, keycode: u8) -> bool {
      self.manager.send_key(keycode).await
   }

   async fn get_status(&self) -> String {
      self.manager.status().to_string()
   }

   async fn list_keys(&self) -> String {
      keymap::panel_json().to_string()
   }

   // Signals
   #[zbus(signal)]
   pub async fn status_updated(emitter: &SignalEmitter<'_>, status: &str) -> zbus::Result<()>;

   #[zbus(signal)]
   pub async fn device_connected(
      emitter: &SignalEmitter<'_>,
      address: &str,
      name: &str,
   ) -> zbus::Result<()>;

   #[zbus(signal)]
   pub async fn device_disconnected(emitter: &SignalEmitter<'_>, address: &str)
   -> zbus::Result<()>;

   #[zbus(property)]
   async fn status(&self) -> String {
      self.manager.status().to_string()
   }

   #[zbus(property)]
   async fn connected(&self) -> bool {
      self.manager.status().is_connected()
   }
}
