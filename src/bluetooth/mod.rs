//! Bluetooth communication layer for the remote.
//!
//! This module provides the platform abstraction, its BlueZ implementation,
//! and the manager actor that owns the connection.

pub mod bluez;
pub mod manager;
pub mod platform;

#[cfg(test)]
pub mod mock;
