//! `pasw` - sound switcher core
//!
//! Model layer for an indicator applet that shows and switches the active
//! input/output port of audio devices. Tracks cards, sinks, and sources with
//! their ports, enforces single-active-port exclusivity per device, and keeps
//! a menu of selectable items synchronized with that state in both directions
//! without feedback loops.
//!
//! # Features
//! - Port availability/activity tracking with menu reflection
//! - Single-active-port exclusivity enforced at the device level
//! - Handler suppression so model-originated UI updates never re-enter
//!   activation
//! - Dummy entries for portless devices, priority-based fallback selection
//! - Per-device/per-port user overrides (display names, visibility,
//!   "always available" pinning, preferred profiles) from a TOML config
//! - Desktop notifications on switches
//!
//! The audio-server client layer and the UI toolkit stay outside this crate:
//! server changes arrive as [`server::ServerEvent`] values, outbound
//! activation goes through the [`server::AudioServer`] trait, and menu items
//! are whatever the embedder provides behind [`menu::MenuItem`].

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod menu;
pub mod notification;
pub mod port;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use device::Device;
pub use error::{Error, Result};
pub use menu::{MenuBinding, MenuItem, MenuItemSource, Selection, SelectionQueue};
pub use port::{Port, PortOwner};
pub use server::{
    ActivationRequest, AudioServer, DeviceInfo, DeviceKey, DeviceKind, Direction, PortInfo,
    ServerEvent,
};
pub use state::State;
