//! RoomStation firmware library.
//!
//! Everything here except [`hardware`] is independent of the ESP32-S3 and is
//! tested on the host:
//!
//! ```text
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```
//!
//! The binary (`src/bin/main.rs`) wires the board in [`hardware`] into a
//! [`station::Station`] and hands control to it.

// Tests need std for the harness; the firmware itself is no_std.
#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod gate;
pub mod model;
pub mod record;
pub mod refresh;
pub mod station;
pub mod traits;

#[cfg(target_arch = "xtensa")]
pub mod hardware;

#[cfg(test)]
mod testing;
