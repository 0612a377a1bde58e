//! BlueZ implementation of the Bluetooth platform.
//!
//! Channels are RFCOMM streams obtained through a client profile registered
//! for the requested service UUID. BlueZ resolves the service record, and the
//! resulting connection is handed back to us as a profile connect request.

use std::time::Duration;

use bluer::{
   Adapter, Address, Session,
   rfcomm::{Profile, ProfileHandle, ReqError, Role, Stream},
};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::{
   io::AsyncWriteExt,
   select,
   time::{self, Instant},
};
use uuid::Uuid;

use crate::{
   bluetooth::platform::{BluetoothPlatform, DeviceRecord, HidChannel},
   error::{RemoteError, Result},
};

const PROFILE_NAME: &str = "Fire TV Remote";

/// How long BlueZ gets to hand over the socket once `ConnectProfile` returned.
const PROFILE_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BluezPlatform {
   session: Session,
   adapter: Option<Adapter>,
}

impl BluezPlatform {
   /// Opens a BlueZ session on the named adapter, or the default one.
   ///
   /// A missing adapter is not an error: the platform then reports no bonded
   /// devices and refuses to open channels.
   pub async fn new(adapter_name: Option<&str>) -> Result<Self> {
      let session = Session::new().await?;

      let adapter = match adapter_name {
         Some(name) => session.adapter(name),
         None => session.default_adapter().await,
      };
      let adapter = match adapter {
         Ok(adapter) => {
            Self::ensure_powered(&adapter).await;
            info!("Using Bluetooth adapter: {}", adapter.name());
            Some(adapter)
         },
         Err(e) => {
            warn!("No Bluetooth adapter available: {e}");
            None
         },
      };

      Ok(Self { session, adapter })
   }

   async fn ensure_powered(adapter: &Adapter) {
      if let Ok(powered) = adapter.is_powered().await
         && !powered
      {
         match adapter.set_powered(true).await {
            Ok(()) => info!("Powered on adapter: {}", adapter.name()),
            Err(e) => warn!("Failed to power on adapter {}: {e}", adapter.name()),
         }
      }
   }
}

fn is_bonded(address: Address, paired: bluer::Result<bool>) -> bool {
   paired.unwrap_or_else(|e| {
      debug!("Skipping {address}: pairing state unavailable: {e}");
      false
   })
}

/// Name, then alias, then the address itself.
fn display_name(
   address: Address,
   name: bluer::Result<Option<String>>,
   alias: bluer::Result<String>,
) -> String {
   match name {
      Ok(Some(name)) => return name,
      Ok(None) => {},
      Err(e) => debug!("Name of {address} unavailable: {e}"),
   }
   alias.unwrap_or_else(|e| {
      debug!("Alias of {address} unavailable: {e}");
      address.to_string()
   })
}

/// Drives a profile connect until `take` claims a request.
///
/// Requests for which `take` returns `None` are skipped. Once `connect` has
/// succeeded, a request must arrive within `grace` or the wait fails with
/// [`RemoteError::RequestTimeout`].
async fn await_request<R, T>(
   connect: impl Future<Output = Result<()>>,
   requests: impl futures::Stream<Item = R>,
   grace: Duration,
   mut take: impl FnMut(R) -> Option<Result<T>>,
) -> Result<T> {
   tokio::pin!(connect);
   tokio::pin!(requests);
   let expiry = time::sleep(grace);
   tokio::pin!(expiry);
   let mut replied = false;

   loop {
      select! {
         res = &mut connect, if !replied => {
            res?;
            replied = true;
            expiry.as_mut().reset(Instant::now() + grace);
         }
         () = &mut expiry, if replied => {
            debug!("No profile connection within {grace:?} of the connect reply");
            return Err(RemoteError::RequestTimeout);
         }
         req = requests.next() => {
            let req = req.ok_or(RemoteError::ConnectionClosed)?;
            if let Some(res) = take(req) {
               return res;
            }
         }
      }
   }
}

impl BluetoothPlatform for BluezPlatform {
   type Channel = BluezChannel;

   async fn bonded_devices(&self) -> Result<Vec<DeviceRecord>> {
      let Some(adapter) = &self.adapter else {
         return Ok(Vec::new());
      };

      let mut devices = Vec::new();
      for address in adapter.device_addresses().await? {
         let device = match adapter.device(address) {
            Ok(device) => device,
            Err(e) => {
               debug!("Skipping {address}: {e}");
               continue;
            },
         };
         if !is_bonded(address, device.is_paired().await) {
            continue;
         }
         let name = display_name(address, device.name().await, device.alias().await);
         debug!("Bonded device: {name} ({address})");
         devices.push(DeviceRecord::new(name, address));
      }
      Ok(devices)
   }

   async fn open_channel(&self, address: Address, service: Uuid) -> Result<BluezChannel> {
      let adapter = self.adapter.as_ref().ok_or(RemoteError::AdapterNotFound)?;
      let device = adapter.device(address)?;

      let profile = Profile {
         uuid: service,
         name: Some(PROFILE_NAME.to_string()),
         role: Some(Role::Client),
         require_authentication: Some(false),
         require_authorization: Some(false),
         auto_connect: Some(false),
         ..Default::default()
      };
      let mut profile = self.session.register_profile(profile).await?;
      debug!("Registered client profile {service}, connecting to {address}");

      let connect =
         async { device.connect_profile(&service).await.map_err(RemoteError::from) };
      let stream = await_request(connect, &mut profile, PROFILE_REQUEST_TIMEOUT, |req| {
         if req.device() == address {
            return Some(req.accept().map_err(RemoteError::from));
         }
         debug!("Rejecting profile connection from {}", req.device());
         req.reject(ReqError::Rejected);
         None
      })
      .await?;

      Ok(BluezChannel {
         address,
         stream,
         _profile: profile,
      })
   }
}

/// RFCOMM stream to one device. The profile registration lives as long as the
/// stream does.
pub struct BluezChannel {
   address: Address,
   stream: Stream,
   _profile: ProfileHandle,
}

impl HidChannel for BluezChannel {
   fn is_connected(&self) -> bool {
      self.stream.peer_addr().is_ok()
   }

   async fn write(&mut self, bytes: &[u8]) -> Result<()> {
      self.stream.write_all(bytes).await?;
      Ok(())
   }

   async fn close(mut self) -> Result<()> {
      debug!("Closing RFCOMM stream to {}", self.address);
      self.stream.shutdown().await?;
      Ok(())
   }
}
