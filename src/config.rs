//! Configuration management for the remote service.
//!
//! This module handles loading and saving configuration from disk,
//! including known devices and key timing.

use std::{
   env, fs,
   path::{Path, PathBuf},
   time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
   error::{RemoteError, Result},
   remote::controller::DEFAULT_RELEASE_DELAY,
};

/// Main configuration structure for the service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
   #[serde(default)]
   pub known_devices: Vec<KnownDevice>,

   /// Device picked by an automatic connect when it is among the candidates.
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub preferred_address: Option<String>,

   /// Adapter name such as `hci0`; the default adapter is used when unset.
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub adapter: Option<String>,

   #[serde(default = "default_key_release_delay")]
   pub key_release_delay_ms: u64,

   #[serde(default = "default_notifications")]
   pub notifications: bool,

   #[serde(default)]
   pub auto_connect: bool,
}

/// A device the user has named explicitly.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KnownDevice {
   pub address: String,
   pub name: String,
}

const fn default_key_release_delay() -> u64 {
   DEFAULT_RELEASE_DELAY.as_millis() as u64
}

const fn default_notifications() -> bool {
   true
}

impl Default for Config {
   fn default() -> Self {
      Self {
         known_devices: vec![],
         preferred_address: None,
         adapter: None,
         key_release_delay_ms: default_key_release_delay(),
         notifications: default_notifications(),
         auto_connect: false,
      }
   }
}

impl Config {
   /// Loads configuration from disk or creates default if not exists.
   pub fn load() -> Result<Self> {
      Self::load_from(&Self::config_path()?)
   }

   /// Loads from an explicit path, writing the defaults there when missing.
   pub fn load_from(path: &Path) -> Result<Self> {
      if path.exists() {
         let contents = fs::read_to_string(path)?;
         Ok(toml::from_str(&contents)?)
      } else {
         let config = Self::default();
         config.save_to(path)?;
         Ok(config)
      }
   }

   pub fn save_to(&self, path: &Path) -> Result<()> {
      if let Some(parent) = path.parent() {
         fs::create_dir_all(parent)?;
      }

      let contents = toml::to_string_pretty(self)?;
      fs::write(path, contents)?;

      Ok(())
   }

   fn config_path() -> Result<PathBuf> {
      if let Ok(remote_home) = env::var("FIRETV_REMOTE_HOME") {
         return Ok(PathBuf::from(remote_home).join("config.toml"));
      }

      let config_dir = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
         PathBuf::from(config_home)
      } else {
         dirs::config_dir().ok_or(RemoteError::ConfigDirNotFound)?
      };

      Ok(config_dir.join("firetv-remote").join("config.toml"))
   }

   /// Checks if the given address is a known device and returns its name.
   pub fn is_known_device(&self, address: &str) -> Option<&str> {
      self
         .known_devices
         .iter()
         .find(|d| d.address.eq_ignore_ascii_case(address))
         .map(|d| d.name.as_str())
   }

   pub fn is_preferred(&self, address: &str) -> bool {
      self
         .preferred_address
         .as_deref()
         .is_some_and(|p| p.eq_ignore_ascii_case(address))
   }

   pub const fn key_release_delay(&self) -> Duration {
      Duration::from_millis(self.key_release_delay_ms)
   }
}
