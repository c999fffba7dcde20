//! Port state reconciliation
//!
//! Owns the device registries and keeps model and menu consistent in both
//! directions. Server events mutate devices and ports, and the bindings
//! reflect the result into the menu without re-raising a model update. User
//! selections flow the opposite way: item handlers queue a [`Selection`],
//! [`State::process_selections`] validates it, asks the server, and applies
//! an accepted activation locally; the confirming server event re-applies it
//! idempotently. A rejected or failed request mutates nothing.
//!
//! Everything here runs on one logical turn sequence; within a single event
//! all state transitions run to completion before the next one is processed.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{Config, Settings};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::menu::{MenuBinding, MenuItemSource, Selection, SelectionQueue};
use crate::notification::{port_icon, send_notification};
use crate::port::Port;
use crate::server::{
    ActivationRequest, AudioServer, DeviceInfo, DeviceKey, DeviceKind, Direction, ServerEvent,
};

/// The reconciler: device registries plus the menu and server glue.
pub struct State {
    config: Config,
    server: Box<dyn AudioServer>,
    item_source: Box<dyn MenuItemSource>,
    cards: BTreeMap<u32, Device>,
    sinks: BTreeMap<u32, Device>,
    sources: BTreeMap<u32, Device>,
    selections: SelectionQueue,
}

impl State {
    #[must_use]
    pub fn new(
        config: Config,
        server: Box<dyn AudioServer>,
        item_source: Box<dyn MenuItemSource>,
    ) -> Self {
        Self {
            config,
            server,
            item_source,
            cards: BTreeMap::new(),
            sinks: BTreeMap::new(),
            sources: BTreeMap::new(),
            selections: SelectionQueue::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle to the selection queue. Embedders can push selections from
    /// surfaces other than the bound items (e.g. keyboard shortcuts).
    #[must_use]
    pub fn selections(&self) -> SelectionQueue {
        self.selections.clone()
    }

    #[must_use]
    pub fn device(&self, key: DeviceKey) -> Option<&Device> {
        self.registry(key.kind).get(&key.index)
    }

    /// All known devices: cards, then sinks, then sources, each in index
    /// order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.cards
            .values()
            .chain(self.sinks.values())
            .chain(self.sources.values())
    }

    // ------------------------------------------------------------------
    // Server-originated mutation
    // ------------------------------------------------------------------

    /// Apply one server event. Recoverable faults (unknown devices, races
    /// with unplug events) are absorbed here per the error policy; at worst
    /// a single device's state goes stale until the next event.
    pub fn apply_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::DeviceAdded(info) => self.add_device(info),
            ServerEvent::DeviceRemoved(key) => self.remove_device(key),
            ServerEvent::PortAvailabilityChanged {
                device,
                port,
                available,
            } => self.set_port_availability(device, &port, available),
            ServerEvent::ActivePortChanged { device, port } => self.set_active_port(device, port),
        }
    }

    fn add_device(&mut self, info: DeviceInfo) {
        let key = info.key;
        let mut device = {
            let override_ = self.config.device_override(&info.name);
            Device::from_info(&info, override_)
        };
        debug!(
            "Discovered {key}: `{}` ({}) with {} port(s)",
            device.name(),
            device.description(),
            device.ports().len()
        );

        // One menu item per visible port
        for port in device.ports_mut() {
            if !Self::should_show(&self.config.settings, port) {
                continue;
            }
            let title = match port.menu_item_title() {
                Ok(title) => title,
                Err(e) => {
                    warn!("Skipping menu item for port {}: {e}", port.id_text());
                    continue;
                }
            };
            let item = self.item_source.create_item(&title);
            let queue = self.selections.clone();
            let selection = Selection {
                device: key,
                port: (!port.is_dummy()).then(|| port.name().to_string()),
            };
            port.attach_binding(MenuBinding::bind(
                item,
                Box::new(move || queue.push(selection.clone())),
            ));
        }

        // Mark the reported active port, or assume the preferred one when
        // the server reported no explicit selection for a stream
        if let Some(active) = info.active_port.as_deref() {
            if let Err(e) = device.activate_port(active) {
                warn!("Reported active port rejected on `{}`: {e}", device.name());
            }
        } else if device.kind().is_stream()
            && let Some(name) = device.preferred_port().map(|p| p.name().to_string())
        {
            debug!(
                "No active port reported for `{}`, assuming `{name}`",
                device.name()
            );
            if let Err(e) = device.activate_port(&name) {
                warn!("Preferred port rejected on `{}`: {e}", device.name());
            }
        }

        if self
            .registry_mut(key.kind)
            .insert(key.index, device)
            .is_some()
        {
            debug!("{key} rebuilt, previous entry replaced");
        }
    }

    fn remove_device(&mut self, key: DeviceKey) {
        if let Some(device) = self.registry_mut(key.kind).remove(&key.index) {
            debug!("{key} removed: `{}`", device.name());
        } else {
            debug!("Removal for unknown {key}, dropped");
        }
    }

    fn set_port_availability(&mut self, key: DeviceKey, name: &str, available: bool) {
        let Some(device) = self.registry_mut(key.kind).get_mut(&key.index) else {
            warn!("Availability change for unknown {key}, dropped");
            return;
        };
        let Some(port) = device.port_mut(name) else {
            warn!("Availability change for unknown port `{name}` on {key}, dropped");
            return;
        };
        port.set_available(available);
    }

    fn set_active_port(&mut self, key: DeviceKey, port: Option<String>) {
        let notify = self.config.settings.notify_switch;
        let Some(device) = self.registry_mut(key.kind).get_mut(&key.index) else {
            warn!("Active port change for unknown {key}, dropped");
            return;
        };

        let Some(name) = port else {
            device.deactivate_all();
            return;
        };

        let previous = device.active_port().map(|p| p.name().to_string());
        match device.activate_port(&name) {
            Ok(active) => {
                if notify && previous.as_deref() != Some(active.name()) {
                    notify_switch(active);
                }
            }
            // A user click can race an unplug event; the item is already
            // hidden, so ignoring keeps model and menu consistent
            Err(e @ Error::UnavailablePort { .. }) => {
                debug!("Ignoring activation race: {e}");
            }
            Err(e) => warn!("Active port change rejected: {e}"),
        }
    }

    // ------------------------------------------------------------------
    // User-originated activation
    // ------------------------------------------------------------------

    /// Drain queued selections and turn each into a server request. Invalid
    /// selections are surfaced or absorbed per the error policy. A request
    /// the server accepted is applied locally right away (exclusivity plus
    /// suppressed reflect-back), and the confirming server event re-applies
    /// it idempotently.
    pub fn process_selections(&mut self) {
        for selection in self.selections.drain() {
            match self.request_activation(&selection) {
                Ok(()) => {}
                Err(e @ Error::UnavailablePort { .. }) => {
                    debug!("Ignoring selection race: {e}");
                }
                Err(e) => warn!("Selection dropped: {e}"),
            }
        }
    }

    fn request_activation(&mut self, selection: &Selection) -> Result<()> {
        let Some(device) = self.device(selection.device) else {
            warn!("Selection for unknown {}, dropped", selection.device);
            return Ok(());
        };

        let profile = match selection.port.as_deref() {
            Some(name) => {
                let port = device.port(name).ok_or_else(|| Error::NotAMember {
                    device: device.name().to_string(),
                    port: name.to_string(),
                })?;
                if !port.effective_availability() {
                    return Err(Error::UnavailablePort {
                        device: device.name().to_string(),
                        port: name.to_string(),
                    });
                }
                // Card ports may need a profile switch before the port can
                // become active
                match device.kind() {
                    DeviceKind::Card => port
                        .preferred_profile()
                        .map(String::from)
                        .or_else(|| port.profiles().first().cloned()),
                    DeviceKind::Sink | DeviceKind::Source => None,
                }
            }
            None => None,
        };

        let request = ActivationRequest {
            device: selection.device,
            port: selection.port.clone(),
            profile,
        };
        info!("Requesting activation: {} `{:?}`", request.device, request.port);
        self.server.activate_port(&request)?;

        // Accepted: enforce exclusivity locally so the menu reacts in this
        // turn. The suppressed reflect-back cannot queue a second selection,
        // and the confirming server event re-applies this idempotently.
        // Placeholder selections stay server-driven until that event.
        if let Some(name) = selection.port.as_deref()
            && let Some(device) = self
                .registry_mut(selection.device.kind)
                .get_mut(&selection.device.index)
            && let Err(e) = device.activate_port(name)
        {
            debug!("Local activation after accepted request failed: {e}");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn should_show(settings: &Settings, port: &Port) -> bool {
        if !port.is_visible() {
            return false;
        }
        match port.direction() {
            Direction::Input => settings.show_inputs,
            Direction::Output => settings.show_outputs,
        }
    }

    fn registry(&self, kind: DeviceKind) -> &BTreeMap<u32, Device> {
        match kind {
            DeviceKind::Card => &self.cards,
            DeviceKind::Sink => &self.sinks,
            DeviceKind::Source => &self.sources,
        }
    }

    fn registry_mut(&mut self, kind: DeviceKind) -> &mut BTreeMap<u32, Device> {
        match kind {
            DeviceKind::Card => &mut self.cards,
            DeviceKind::Sink => &mut self.sinks,
            DeviceKind::Source => &mut self.sources,
        }
    }
}

fn notify_switch(port: &Port) {
    let summary = if port.is_output() {
        "Audio Output"
    } else {
        "Audio Input"
    };
    let title = match port.menu_item_title() {
        Ok(title) => title,
        Err(e) => {
            warn!("No title for switch notification: {e}");
            return;
        }
    };
    let icon = port_icon(port);
    if let Err(e) = send_notification(summary, &title, Some(&icon)) {
        warn!("Notification failed: {e}");
    }
}
