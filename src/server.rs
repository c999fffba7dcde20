//! Audio server interface
//!
//! Data shapes and interfaces of the audio-server client layer. This crate
//! never speaks the server protocol itself: discovery and change
//! notifications arrive as [`ServerEvent`] values, and the single outbound
//! call ("make this port active") goes through the [`AudioServer`] trait.
//! The outbound call is assumed to eventually produce the confirming event,
//! which is what actually mutates the model.

use std::fmt;

use crate::error::Result;

// ============================================================================
// Identity
// ============================================================================

/// Port direction as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Input,
    Output,
}

/// What kind of object owns a set of ports.
///
/// Cards are physical hardware; sinks and sources are the streams running on
/// top of them. Sink and source ports map to stream owners, card ports to
/// card owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    Card,
    Sink,
    Source,
}

impl DeviceKind {
    /// Whether this kind is a stream (sink or source) rather than a card.
    #[must_use]
    pub fn is_stream(self) -> bool {
        matches!(self, Self::Sink | Self::Source)
    }

    /// The direction implied by the kind, if any. Cards carry ports of both
    /// directions and imply none.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Sink => Some(Direction::Output),
            Self::Source => Some(Direction::Input),
            Self::Card => None,
        }
    }
}

/// Stable handle for a device: its kind plus the server-side index.
///
/// Indices are only unique per kind (sink #0 and source #0 coexist), hence
/// the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey {
    pub kind: DeviceKind,
    pub index: u32,
}

impl DeviceKey {
    #[must_use]
    pub fn new(kind: DeviceKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DeviceKind::Card => "card",
            DeviceKind::Sink => "sink",
            DeviceKind::Source => "source",
        };
        write!(f, "{kind} #{}", self.index)
    }
}

// ============================================================================
// Discovery payloads
// ============================================================================

/// One port as reported by the server during device discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Stable internal identifier, unique within the owning device.
    pub name: String,
    /// Human label. `None` only for synthetic placeholder ports; the server
    /// layer itself never omits it for real ports.
    pub description: Option<String>,
    /// Ordering hint, higher preferred.
    pub priority: u32,
    /// Whether something is currently plugged into the port.
    pub available: bool,
    /// Whether the server considers the port user-facing at all. Distinct
    /// from availability.
    pub visible: bool,
    pub direction: Direction,
    /// Profiles that have to be active for this port to exist.
    pub profiles: Vec<String>,
    /// Profile the server suggests when activating this port.
    pub preferred_profile: Option<String>,
}

/// One device (card, sink, or source) as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub key: DeviceKey,
    /// Stable internal identifier (e.g. `alsa_card.pci-0000_00_1f.3`).
    pub name: String,
    /// Human label (e.g. `Built-in Audio`).
    pub description: String,
    /// Ports in server order. May be empty for portless network streams.
    pub ports: Vec<PortInfo>,
    /// Name of the currently active port, if the server reports one.
    pub active_port: Option<String>,
}

// ============================================================================
// Events and requests
// ============================================================================

/// Change notification from the server, applied by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A device appeared, or an existing one was rebuilt after a profile
    /// change (same key replaces the previous entry wholesale).
    DeviceAdded(DeviceInfo),
    DeviceRemoved(DeviceKey),
    /// A cable was plugged or unplugged.
    PortAvailabilityChanged {
        device: DeviceKey,
        port: String,
        available: bool,
    },
    /// The active port changed. `port: None` means no port is active.
    ActivePortChanged {
        device: DeviceKey,
        port: Option<String>,
    },
}

/// Outbound request asking the server to make a port active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub device: DeviceKey,
    /// `None` selects the device itself (a portless device's placeholder
    /// entry was chosen, i.e. "make this the default").
    pub port: Option<String>,
    /// Card ports may require a profile switch first; this carries the
    /// profile to use.
    pub profile: Option<String>,
}

/// The one outbound capability this crate needs from the server layer.
pub trait AudioServer {
    /// Ask the server to activate a port. Must not mutate local model state:
    /// the confirming [`ServerEvent`] does that once the server applied it.
    ///
    /// # Errors
    /// Returns an error if the request could not be delivered or the server
    /// rejected it; the model is left unchanged either way.
    fn activate_port(&mut self, request: &ActivationRequest) -> Result<()>;
}
