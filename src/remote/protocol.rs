//! HID wire format spoken to the Fire TV.
//!
//! Reports are raw 8-byte boot-protocol keyboard reports written straight to
//! the RFCOMM channel. There is no framing, length prefix or checksum.

use uuid::Uuid;

/// Standard Bluetooth HID profile service class.
pub const HID_SERVICE_UUID: Uuid = Uuid::from_u128(0x00001124_0000_1000_8000_00805f9b34fb);

/// Size of a boot keyboard report.
pub const REPORT_LEN: usize = 8;

#[cfg(test)]
const MODIFIER_OFFSET: usize = 0;
const KEYCODE_OFFSET: usize = 2;

/// A single keyboard report.
///
/// Layout: `[modifier, reserved, keycode, reserved x5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct KeyReport([u8; REPORT_LEN]);

impl KeyReport {
   /// All keys up.
   pub const RELEASE: Self = Self([0; REPORT_LEN]);

   pub const fn press(keycode: u8) -> Self {
      let mut bytes = [0; REPORT_LEN];
      bytes[KEYCODE_OFFSET] = keycode;
      Self(bytes)
   }

   pub const fn as_bytes(&self) -> &[u8; REPORT_LEN] {
      &self.0
   }

   #[cfg(test)]
   pub const fn keycode(&self) -> u8 {
      self.0[KEYCODE_OFFSET]
   }

   #[cfg(test)]
   pub const fn modifier(&self) -> u8 {
      self.0[MODIFIER_OFFSET]
   }

   #[cfg(test)]
   pub fn is_release(&self) -> bool {
      self.0.iter().all(|&b| b == 0)
   }
}
