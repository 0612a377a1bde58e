//! Error types for the Fire TV remote service.
//!
//! Every fallible path outside the core controller funnels into
//! [`RemoteError`]; the controller itself flattens failures to booleans.

use thiserror::Error;

/// Main error type for the remote service.
#[derive(Error, Debug)]
pub enum RemoteError {
   #[error("Bluetooth error: {0}")]
   Bluetooth(#[from] bluer::Error),

   #[error("D-Bus error: {0}")]
   DBus(#[from] zbus::Error),

   #[error("I/O error: {0}")]
   Io(#[from] std::io::Error),

   #[error("Invalid Bluetooth address: {0}")]
   InvalidAddress(String),

   #[error("Unknown key: {0}")]
   UnknownKey(String),

   #[error("No Fire TV found among paired devices")]
   NoCandidateDevice,

   #[error("Connection to {0} failed")]
   ConnectionFailed(String),

   #[error("Device not connected")]
   NotConnected,

   #[error("Connection closed")]
   ConnectionClosed,

   #[error("Request timeout")]
   RequestTimeout,

   #[error("Could not determine config directory")]
   ConfigDirNotFound,

   #[error("TOML parsing error: {0}")]
   TomlParse(#[from] toml::de::Error),

   #[error("TOML serialization error: {0}")]
   TomlSerialize(#[from] toml::ser::Error),

   #[error("Manager has been shut down")]
   ManagerShutdown,

   #[error("Adapter not found")]
   AdapterNotFound,
}

/// Convenience type alias for Results with `RemoteError`.
pub type Result<T> = std::result::Result<T, RemoteError>;
