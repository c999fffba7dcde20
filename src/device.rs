//! Port owners
//!
//! A device is a card or a stream (sink/source) holding an ordered port
//! collection. It mediates everything that needs sibling context: the
//! single-active-port exclusivity invariant, the priority-based preferred
//! port, and the display-name prefix used in menu titles. Portless streams
//! get a synthesized dummy port so they still appear as a selectable entry.

use tracing::{debug, warn};

use crate::config::DeviceOverride;
use crate::error::{Error, Result};
use crate::port::{Port, PortOwner};
use crate::server::{DeviceInfo, DeviceKey, DeviceKind, Direction};

/// A card, sink, or source with its ports.
#[derive(Debug)]
pub struct Device {
    key: DeviceKey,
    name: String,
    description: String,
    /// Config override, or the server description when no override is set.
    display_name: String,
    ports: Vec<Port>,
}

impl Device {
    /// Build a device from server-reported data, applying config overrides
    /// to its display name and to each port. Ports keep server order; a
    /// portless stream gets a dummy port appended.
    #[must_use]
    pub fn from_info(info: &DeviceInfo, override_: Option<&DeviceOverride>) -> Self {
        let display_name = override_
            .filter(|o| !o.display_name.is_empty())
            .map_or_else(|| info.description.clone(), |o| o.display_name.clone());

        let mut device = Self {
            key: info.key,
            name: info.name.clone(),
            description: info.description.clone(),
            display_name,
            ports: Vec::with_capacity(info.ports.len().max(1)),
        };

        for port_info in &info.ports {
            let port_override = override_.and_then(|o| o.port_override(&port_info.name));
            device.add_port(Port::from_info(port_info, port_override));
        }
        device.ensure_dummy_port();

        device
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn key(&self) -> DeviceKey {
        self.key
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.key.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Device-level display name used as the menu-title prefix. Pure
    /// accessor, never fails.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    #[must_use]
    pub fn ports_mut(&mut self) -> &mut [Port] {
        &mut self.ports
    }

    #[must_use]
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn port_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.name() == name)
    }

    /// The currently active port, if any.
    #[must_use]
    pub fn active_port(&self) -> Option<&Port> {
        self.ports.iter().find(|p| p.is_active())
    }

    /// The port to assume active when the server reports no explicit
    /// selection: the highest-priority effectively-available real port.
    /// First listed wins on priority ties; dummy ports never qualify.
    #[must_use]
    pub fn preferred_port(&self) -> Option<&Port> {
        self.ports
            .iter()
            .filter(|p| !p.is_dummy() && p.effective_availability())
            .fold(None, |best: Option<&Port>, p| match best {
                Some(b) if b.priority() >= p.priority() => Some(b),
                _ => Some(p),
            })
    }

    // ------------------------------------------------------------------
    // Collection mutation (driven by device discovery)
    // ------------------------------------------------------------------

    /// Append a port, attaching the owner back-link. A duplicate name is a
    /// server-layer bug: logged and dropped, preserving name uniqueness.
    pub fn add_port(&mut self, mut port: Port) {
        if self.port(port.name()).is_some() {
            warn!(
                "Device `{}`: duplicate port {} dropped",
                self.name,
                port.id_text()
            );
            return;
        }
        port.attach_owner(self.owner_link());
        self.ports.push(port);
    }

    /// Synthesize the dummy port for a portless stream. Cards without ports
    /// stay empty; they have nothing selectable.
    pub fn ensure_dummy_port(&mut self) {
        if !self.ports.is_empty() || !self.kind().is_stream() {
            return;
        }
        debug!("Device `{}` has no ports, adding dummy", self.name);
        let direction = self
            .kind()
            .direction()
            .unwrap_or(Direction::Output);
        self.add_port(Port::dummy(direction));
    }

    fn owner_link(&self) -> PortOwner {
        match self.kind() {
            DeviceKind::Card => PortOwner::Card {
                index: self.key.index,
                display_name: self.display_name.clone(),
            },
            DeviceKind::Sink | DeviceKind::Source => PortOwner::Stream {
                index: self.key.index,
                display_name: self.display_name.clone(),
            },
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Make `name` the active port and every sibling inactive.
    ///
    /// Exclusivity lives here, not in [`Port`]: after any sequence of
    /// successful calls, exactly one member port is active. On failure no
    /// port's active flag changes.
    ///
    /// # Errors
    /// [`Error::NotAMember`] if the port is not in this device's collection;
    /// [`Error::UnavailablePort`] if it is not effectively available.
    pub fn activate_port(&mut self, name: &str) -> Result<&Port> {
        let target = self
            .ports
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| Error::NotAMember {
                device: self.name.clone(),
                port: name.to_string(),
            })?;

        if !self.ports[target].effective_availability() {
            return Err(Error::UnavailablePort {
                device: self.name.clone(),
                port: name.to_string(),
            });
        }

        // Deactivate siblings first so no observer sees two active ports
        for (i, port) in self.ports.iter_mut().enumerate() {
            if i != target && port.is_active() {
                port.set_active(false);
            }
        }
        self.ports[target].set_active(true);
        debug!("Device `{}`: active port is now `{}`", self.name, name);

        Ok(&self.ports[target])
    }

    /// Clear the active flag on every port (the server reported that no
    /// port is active). Bound items keep their selected state per the
    /// deactivation rule in the menu layer.
    pub fn deactivate_all(&mut self) {
        for port in &mut self.ports {
            if port.is_active() {
                port.set_active(false);
            }
        }
    }
}
