//! Status line shown by the control panel.

use std::fmt;

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
   #[default]
   NotConnected,
   NoDevice,
   Connecting(SmolStr),
   Connected(SmolStr),
   ConnectionFailed,
   /// A key press found no live channel.
   SendFailed,
}

impl Status {
   pub const fn is_connected(&self) -> bool {
      matches!(self, Self::Connected(_))
   }
}

impl fmt::Display for Status {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::NotConnected => f.write_str("Not Connected"),
         Self::NoDevice => f.write_str("No Fire TV found. Pair device first."),
         Self::Connecting(name) => write!(f, "Connecting to {name}..."),
         Self::Connected(name) => write!(f, "Connected: {name}"),
         Self::ConnectionFailed => f.write_str("Connection failed"),
         Self::SendFailed => f.write_str("Not connected!"),
      }
   }
}
