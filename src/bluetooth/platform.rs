//! Platform seam between the remote logic and a Bluetooth stack.
//!
//! The remote only needs four things from the platform: the bonded device
//! list, a way to open a channel to a service, and writing to and closing that
//! channel. [`BluetoothPlatform`] and [`HidChannel`] are those operations.

use std::future::Future;

use bluer::Address;
use serde_json::json;
use smol_str::SmolStr;
use uuid::Uuid;

use crate::error::Result;

/// A bonded device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
   pub name: SmolStr,
   pub address: Address,
}

impl DeviceRecord {
   pub fn new(name: impl Into<SmolStr>, address: Address) -> Self {
      Self {
         name: name.into(),
         address,
      }
   }

   pub fn address_str(&self) -> String {
      self.address.to_string()
   }

   pub fn to_json(&self) -> serde_json::Value {
      json!({
         "name": self.name.as_str(),
         "address": self.address_str(),
      })
   }
}

/// Access to the local Bluetooth stack.
pub trait BluetoothPlatform: Send + Sync + 'static {
   type Channel: HidChannel + 'static;

   /// Lists previously paired devices. No adapter means an empty list.
   fn bonded_devices(&self) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send;

   /// Opens a serial channel to `service` on the device at `address`,
   /// waiting until the platform reports it open or fails.
   fn open_channel(
      &self,
      address: Address,
      service: Uuid,
   ) -> impl Future<Output = Result<Self::Channel>> + Send;
}

/// An open byte channel to a remote device.
pub trait HidChannel: Send {
   /// Whether the platform still considers the channel connected.
   fn is_connected(&self) -> bool;

   fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send;

   fn close(self) -> impl Future<Output = Result<()>> + Send;
}
