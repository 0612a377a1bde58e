//! In-memory Bluetooth platform used by tests.

use std::{
   collections::HashSet,
   io,
   sync::{
      Arc,
      atomic::{AtomicBool, AtomicUsize, Ordering},
   },
};

use bluer::Address;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
   bluetooth::platform::{BluetoothPlatform, DeviceRecord, HidChannel},
   error::{RemoteError, Result},
};

#[derive(Default)]
struct Radio {
   bonded: Mutex<Vec<DeviceRecord>>,
   adapter_broken: AtomicBool,
   refuse_connect: AtomicBool,
   opened: Mutex<Vec<(Address, Uuid)>>,
   writes: Mutex<Vec<Vec<u8>>>,
   failing_writes: Mutex<HashSet<usize>>,
   closes: AtomicUsize,
   fail_close: AtomicBool,
   link_up: AtomicBool,
}

/// Cloneable handle; every clone observes the same radio.
#[derive(Default, Clone)]
pub struct MockPlatform(Arc<Radio>);

impl MockPlatform {
   pub fn with_bonded(devices: impl IntoIterator<Item = DeviceRecord>) -> Self {
      let platform = Self::default();
      platform.0.bonded.lock().extend(devices);
      platform
   }

   pub fn set_adapter_broken(&self, broken: bool) {
      self.0.adapter_broken.store(broken, Ordering::SeqCst);
   }

   pub fn set_refuse_connect(&self, refuse: bool) {
      self.0.refuse_connect.store(refuse, Ordering::SeqCst);
   }

   pub fn set_fail_close(&self, fail: bool) {
      self.0.fail_close.store(fail, Ordering::SeqCst);
   }

   /// Makes the n-th write attempt (0-based, counted across channels) fail.
   pub fn fail_write(&self, n: usize) {
      self.0.failing_writes.lock().insert(n);
   }

   /// Simulates the remote end dropping the link.
   pub fn drop_link(&self) {
      self.0.link_up.store(false, Ordering::SeqCst);
   }

   /// Every write attempt, failed ones included.
   pub fn writes(&self) -> Vec<Vec<u8>> {
      self.0.writes.lock().clone()
   }

   pub fn opened(&self) -> Vec<(Address, Uuid)> {
      self.0.opened.lock().clone()
   }

   pub fn closes(&self) -> usize {
      self.0.closes.load(Ordering::SeqCst)
   }
}

pub struct MockChannel {
   radio: Arc<Radio>,
}

impl BluetoothPlatform for MockPlatform {
   type Channel = MockChannel;

   async fn bonded_devices(&self) -> Result<Vec<DeviceRecord>> {
      if self.0.adapter_broken.load(Ordering::SeqCst) {
         return Err(RemoteError::AdapterNotFound);
      }
      Ok(self.0.bonded.lock().clone())
   }

   async fn open_channel(&self, address: Address, service: Uuid) -> Result<MockChannel> {
      if self.0.refuse_connect.load(Ordering::SeqCst) {
         return Err(RemoteError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)));
      }
      self.0.opened.lock().push((address, service));
      self.0.link_up.store(true, Ordering::SeqCst);
      Ok(MockChannel {
         radio: self.0.clone(),
      })
   }
}

impl HidChannel for MockChannel {
   fn is_connected(&self) -> bool {
      self.radio.link_up.load(Ordering::SeqCst)
   }

   async fn write(&mut self, bytes: &[u8]) -> Result<()> {
      let attempt = {
         let mut writes = self.radio.writes.lock();
         writes.push(bytes.to_vec());
         writes.len() - 1
      };
      if self.radio.failing_writes.lock().contains(&attempt) {
         return Err(RemoteError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
      }
      Ok(())
   }

   async fn close(self) -> Result<()> {
      self.radio.closes.fetch_add(1, Ordering::SeqCst);
      self.radio.link_up.store(false, Ordering::SeqCst);
      if self.radio.fail_close.load(Ordering::SeqCst) {
         return Err(RemoteError::ConnectionClosed);
      }
      Ok(())
   }
}
