//! Fire TV remote logic: report format, key table, device recognition and
//! the connection controller.

pub mod controller;
pub mod keymap;
pub mod protocol;
pub mod recognition;
pub mod status;
