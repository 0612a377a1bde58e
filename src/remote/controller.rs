//! Connection manager and key sender.
//!
//! [`RemoteController`] owns at most one HID channel to a Fire TV. All of its
//! operations report failure as a boolean plus a log line; nothing here is
//! retried.

use std::{future::Future, time::Duration};

use bluer::Address;
use log::{debug, info, warn};
use tokio::time;

use crate::{
   bluetooth::platform::{BluetoothPlatform, DeviceRecord, HidChannel},
   error::{RemoteError, Result},
   remote::{
      protocol::{HID_SERVICE_UUID, KeyReport},
      recognition,
   },
};

/// Delay between the press and release reports.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionState {
   Disconnected,
   Connecting,
   Connected,
}

struct Link<C> {
   channel: C,
   address: Address,
}

pub struct RemoteController<P: BluetoothPlatform> {
   platform: P,
   link: Option<Link<P::Channel>>,
   state: ConnectionState,
   release_delay: Duration,
}

impl<P: BluetoothPlatform> RemoteController<P> {
   pub const fn new(platform: P, release_delay: Duration) -> Self {
      Self {
         platform,
         link: None,
         state: ConnectionState::Disconnected,
         release_delay,
      }
   }

   #[cfg(test)]
   pub const fn state(&self) -> ConnectionState {
      self.state
   }

   #[cfg(test)]
   pub fn connected_address(&self) -> Option<Address> {
      self.link.as_ref().map(|link| link.address)
   }

   /// Bonded devices that look like a Fire TV. Platform errors yield an empty
   /// list.
   ///
   /// The returned future borrows only the platform.
   pub fn list_candidate_devices(&self) -> impl Future<Output = Vec<DeviceRecord>> + Send + '_ {
      let platform = &self.platform;
      async move {
         match platform.bonded_devices().await {
            Ok(devices) => recognition::filter_candidates(devices),
            Err(e) => {
               warn!("Failed to enumerate bonded devices: {e}");
               Vec::new()
            },
         }
      }
   }

   /// Opens the HID channel to `address`, replacing any existing one.
   pub async fn connect(&mut self, address: Address) -> bool {
      self.disconnect().await;

      self.state = ConnectionState::Connecting;
      debug!("Opening HID channel to {address}");
      match self.platform.open_channel(address, HID_SERVICE_UUID).await {
         Ok(channel) => {
            info!("Connected to {address}");
            self.link = Some(Link { channel, address });
            self.state = ConnectionState::Connected;
            true
         },
         Err(e) => {
            warn!("Connection failed: {e}");
            self.state = ConnectionState::Disconnected;
            false
         },
      }
   }

   /// Closes the channel if one is open. Close errors are ignored.
   pub async fn disconnect(&mut self) {
      if let Some(Link { channel, address }) = self.link.take() {
         match channel.close().await {
            Ok(()) => info!("Disconnected from {address}"),
            Err(e) => debug!("Ignoring close error for {address}: {e}"),
         }
      }
      self.state = ConnectionState::Disconnected;
   }

   /// Presses and releases `keycode`. Any failure tears the connection down.
   pub async fn send(&mut self, keycode: u8) -> bool {
      match self.press_and_release(keycode).await {
         Ok(()) => true,
         Err(RemoteError::NotConnected) => {
            debug!("Dropping keycode {keycode}: {:?}", self.state);
            self.disconnect().await;
            false
         },
         Err(e) => {
            warn!("Send failed: {e}");
            self.disconnect().await;
            false
         },
      }
   }

   async fn press_and_release(&mut self, keycode: u8) -> Result<()> {
      let delay = self.release_delay;
      let Some(link) = self.link.as_mut().filter(|link| link.channel.is_connected()) else {
         return Err(RemoteError::NotConnected);
      };

      let press = KeyReport::press(keycode);
      debug!("→ {}: {}", link.address, hex::encode(press.as_bytes()));
      if let Err(e) = link.channel.write(press.as_bytes()).await {
         // A failed write may still have reached the device.
         if let Err(release_err) = link.channel.write(KeyReport::RELEASE.as_bytes()).await {
            debug!("Release after failed press also failed: {release_err}");
         }
         return Err(e);
      }

      time::sleep(delay).await;

      debug!("→ {}: {}", link.address, hex::encode(KeyReport::RELEASE.as_bytes()));
      link.channel.write(KeyReport::RELEASE.as_bytes()).await
   }
}

#[cfg(test)]
mod tests {
   use std::time::Instant;

   use super::*;
   use crate::bluetooth::mock::MockPlatform;

   const FIRE_TV: Address = Address::new([0x00, 0xFC, 0x8B, 0x12, 0x34, 0x56]);

   fn controller(platform: &MockPlatform) -> RemoteController<MockPlatform> {
      RemoteController::new(platform.clone(), Duration::ZERO)
   }

   #[tokio::test]
   async fn test_send_writes_press_then_release() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);

      assert!(remote.connect(FIRE_TV).await);
      assert_eq!(remote.state(), ConnectionState::Connected);
      assert_eq!(platform.opened(), vec![(FIRE_TV, HID_SERVICE_UUID)]);

      assert!(remote.send(23).await);
      assert_eq!(
         platform.writes(),
         vec![vec![0, 0, 23, 0, 0, 0, 0, 0], vec![0, 0, 0, 0, 0, 0, 0, 0]]
      );
      assert_eq!(remote.state(), ConnectionState::Connected);
   }

   #[tokio::test]
   async fn test_consecutive_sends_are_paired() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);
      assert!(remote.connect(FIRE_TV).await);

      for keycode in [19u8, 20, 85] {
         assert!(remote.send(keycode).await);
      }

      let writes = platform.writes();
      assert_eq!(writes.len(), 6);
      for (pair, keycode) in writes.chunks(2).zip([19u8, 20, 85]) {
         assert_eq!(pair[0], KeyReport::press(keycode).as_bytes());
         assert_eq!(pair[1], KeyReport::RELEASE.as_bytes());
      }
   }

   #[tokio::test]
   async fn test_send_without_connection_does_nothing() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);

      assert!(!remote.send(23).await);
      assert!(platform.writes().is_empty());
      assert_eq!(remote.state(), ConnectionState::Disconnected);
   }

   #[tokio::test]
   async fn test_send_after_disconnect_fails() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);

      assert!(remote.connect(FIRE_TV).await);
      remote.disconnect().await;

      assert!(!remote.send(23).await);
      assert!(platform.writes().is_empty());
      assert_eq!(remote.connected_address(), None);
   }

   #[tokio::test]
   async fn test_send_on_dead_link_fails_without_writing() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);

      assert!(remote.connect(FIRE_TV).await);
      platform.drop_link();

      assert!(!remote.send(4).await);
      assert!(platform.writes().is_empty());
      assert_eq!(remote.state(), ConnectionState::Disconnected);
   }

   #[tokio::test]
   async fn test_repeated_disconnect_is_harmless() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);

      remote.disconnect().await;
      remote.disconnect().await;
      assert_eq!(platform.closes(), 0);

      assert!(remote.connect(FIRE_TV).await);
      platform.set_fail_close(true);
      remote.disconnect().await;
      remote.disconnect().await;
      assert_eq!(platform.closes(), 1);
      assert_eq!(remote.state(), ConnectionState::Disconnected);
   }

   #[tokio::test]
   async fn test_connect_failure_reports_false() {
      let platform = MockPlatform::default();
      platform.set_refuse_connect(true);
      let mut remote = controller(&platform);

      assert!(!remote.connect(FIRE_TV).await);
      assert_eq!(remote.state(), ConnectionState::Disconnected);
      assert!(!remote.send(23).await);
      assert!(platform.writes().is_empty());
   }

   #[tokio::test]
   async fn test_reconnect_closes_previous_channel() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);
      let other = Address::new([0x00, 0xFC, 0x8B, 0x65, 0x43, 0x21]);

      assert!(remote.connect(FIRE_TV).await);
      assert!(remote.connect(other).await);

      assert_eq!(platform.closes(), 1);
      assert_eq!(remote.connected_address(), Some(other));
   }

   #[tokio::test]
   async fn test_failed_press_still_attempts_release() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);
      assert!(remote.connect(FIRE_TV).await);
      platform.fail_write(0);

      assert!(!remote.send(21).await);
      assert_eq!(
         platform.writes(),
         vec![KeyReport::press(21).as_bytes().to_vec(), vec![0; 8]]
      );
      assert_eq!(remote.state(), ConnectionState::Disconnected);
      assert_eq!(platform.closes(), 1);
   }

   #[tokio::test]
   async fn test_failed_release_tears_down() {
      let platform = MockPlatform::default();
      let mut remote = controller(&platform);
      assert!(remote.connect(FIRE_TV).await);
      platform.fail_write(1);

      assert!(!remote.send(22).await);
      assert_eq!(platform.writes().len(), 2);
      assert_eq!(remote.state(), ConnectionState::Disconnected);
      assert!(!remote.send(22).await);
      assert_eq!(platform.writes().len(), 2);
   }

   #[tokio::test]
   async fn test_release_waits_for_delay() {
      let platform = MockPlatform::default();
      let mut remote = RemoteController::new(platform.clone(), DEFAULT_RELEASE_DELAY);
      assert!(remote.connect(FIRE_TV).await);

      let start = Instant::now();
      assert!(remote.send(3).await);
      assert!(start.elapsed() >= DEFAULT_RELEASE_DELAY);
   }

   #[tokio::test]
   async fn test_candidates_are_filtered() {
      let platform = MockPlatform::with_bonded([
         DeviceRecord::new("Fire TV Stick", FIRE_TV),
         DeviceRecord::new("Headphones", Address::new([1, 2, 3, 4, 5, 6])),
         DeviceRecord::new("AFTMM", Address::new([6, 5, 4, 3, 2, 1])),
      ]);
      let remote = controller(&platform);

      let names: Vec<String> = remote
         .list_candidate_devices()
         .await
         .into_iter()
         .map(|d| d.name.to_string())
         .collect();
      assert_eq!(names, ["Fire TV Stick", "AFTMM"]);
   }

   #[tokio::test]
   async fn test_candidates_empty_without_adapter() {
      let platform = MockPlatform::with_bonded([DeviceRecord::new("Fire TV", FIRE_TV)]);
      platform.set_adapter_broken(true);
      let remote = controller(&platform);

      assert!(remote.list_candidate_devices().await.is_empty());
   }
}
