//! Port state
//!
//! A port is one addressable connection point on a device ("Headphones",
//! "Line Out", "HDMI"), with availability/activity flags and display-name
//! resolution. Availability and activity are orthogonal: availability can
//! drop while a port remains logically active, and the menu item follows
//! effective availability regardless. Exclusivity among sibling ports is the
//! owning device's responsibility, not the port's.

use tracing::trace;

use crate::config::PortOverride;
use crate::error::{Error, Result};
use crate::menu::MenuBinding;
use crate::server::{Direction, PortInfo};

/// Fallback owner segment for a port observed before its owner attach.
/// Transient by construction; an embedding application substitutes its own
/// localized text at the menu layer.
pub const UNKNOWN_DEVICE: &str = "(unknown device)";

/// Separator between the device and port segments of a menu title.
const TITLE_SEPARATOR: &str = " \u{2023} "; // ‣

/// Non-owning back-link from a port to the device that holds it.
///
/// A port belongs to exactly one kind of owner, card or stream, never both
/// and never neither once attached; the tagged variant makes that structural.
/// Carries the owner's display name so title resolution needs no registry
/// lookup; devices are rebuilt wholesale on profile changes, so the snapshot
/// cannot go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortOwner {
    /// Port on a physical card.
    Card { index: u32, display_name: String },
    /// Port on a sink or source.
    Stream { index: u32, display_name: String },
}

impl PortOwner {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Card { display_name, .. } | Self::Stream { display_name, .. } => display_name,
        }
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        match self {
            Self::Card { index, .. } | Self::Stream { index, .. } => *index,
        }
    }
}

/// One port of a card, sink, or source.
#[derive(Debug)]
pub struct Port {
    name: String,
    /// Server-provided human label. `None` marks a dummy port synthesized
    /// for a portless device.
    description: Option<String>,
    /// User override from config; empty means "use description".
    display_name: String,
    priority: u32,
    is_available: bool,
    /// Whether the port appears in the menu at all. Set once at creation
    /// from the server flag and the config override.
    is_visible: bool,
    direction: Direction,
    profiles: Vec<String>,
    preferred_profile: Option<String>,
    /// Bypasses the availability check for visibility purposes (ports such
    /// as "Auto Detect").
    always_available: bool,
    is_active: bool,
    owner: Option<PortOwner>,
    binding: Option<MenuBinding>,
}

impl Port {
    /// Build a port from server-reported data, applying config overrides.
    #[must_use]
    pub fn from_info(info: &PortInfo, override_: Option<&PortOverride>) -> Self {
        let display_name = override_.map(|o| o.display_name.clone()).unwrap_or_default();
        let is_visible = info.visible && override_.is_none_or(|o| o.visible);
        let always_available = override_.is_some_and(|o| o.always_available);
        let preferred_profile = override_
            .and_then(|o| o.preferred_profile.clone())
            .or_else(|| info.preferred_profile.clone());

        Self {
            name: info.name.clone(),
            description: info.description.clone(),
            display_name,
            priority: info.priority,
            is_available: info.available,
            is_visible,
            direction: info.direction,
            profiles: info.profiles.clone(),
            preferred_profile,
            always_available,
            is_active: false,
            owner: None,
            binding: None,
        }
    }

    /// Synthesize the placeholder port for a device that exposes no real
    /// ports, so the device still gets a selectable menu entry.
    #[must_use]
    pub fn dummy(direction: Direction) -> Self {
        Self {
            name: String::new(),
            description: None,
            display_name: String::new(),
            priority: 0,
            is_available: false,
            is_visible: true,
            direction,
            profiles: Vec::new(),
            preferred_profile: None,
            always_available: false,
            is_active: false,
            owner: None,
            binding: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    #[must_use]
    pub fn preferred_profile(&self) -> Option<&str> {
        self.preferred_profile.as_deref()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_available
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn always_available(&self) -> bool {
        self.always_available
    }

    /// Whether this is the synthetic placeholder for a portless device.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.description.is_none()
    }

    #[must_use]
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Availability as it should affect menu visibility: a dummy port is
    /// always considered available, and `always_available` pins the port
    /// visible regardless of its plugged state.
    #[must_use]
    pub fn effective_availability(&self) -> bool {
        self.is_available || self.is_dummy() || self.always_available
    }

    #[must_use]
    pub fn owner(&self) -> Option<&PortOwner> {
        self.owner.as_ref()
    }

    #[must_use]
    pub fn has_binding(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn binding(&self) -> Option<&MenuBinding> {
        self.binding.as_ref()
    }

    // ------------------------------------------------------------------
    // State transitions (externally triggered only)
    // ------------------------------------------------------------------

    /// Update availability. Shows or hides the bound menu item per effective
    /// availability. Observably idempotent: repeating the same value yields
    /// the same visible result.
    pub fn set_available(&mut self, value: bool) {
        self.is_available = value;
        trace!("Port {}: available={}", self.id_text(), value);

        let effective = self.effective_availability();
        if let Some(binding) = self.binding.as_mut() {
            binding.reflect_availability(effective);
        }
    }

    /// Update the active flag. Activation drives the bound item selected
    /// under handler suppression so the toolkit notification does not
    /// re-enter activation; deactivation leaves the item untouched.
    ///
    /// Exclusivity among siblings is enforced by `Device::activate_port`,
    /// not here; mutating ports directly bypasses that invariant.
    pub fn set_active(&mut self, value: bool) {
        self.is_active = value;
        trace!("Port {}: active={}", self.id_text(), value);

        if value && let Some(binding) = self.binding.as_mut() {
            binding.reflect_active(true);
        }
    }

    /// Attach the owner back-link. Set once after construction, never
    /// transferred.
    ///
    /// # Panics
    /// Panics if the port already has an owner (programming error).
    pub fn attach_owner(&mut self, owner: PortOwner) {
        assert!(
            self.owner.is_none(),
            "BUG: port {} already has an owner",
            self.id_text()
        );
        self.owner = Some(owner);
    }

    /// Attach the menu binding and bring the item in line with current
    /// state (visibility, and selection if this port is already active).
    ///
    /// # Panics
    /// Panics if the port already has a binding (programming error).
    pub fn attach_binding(&mut self, mut binding: MenuBinding) {
        assert!(
            self.binding.is_none(),
            "BUG: port {} already has a menu binding",
            self.id_text()
        );
        binding.reflect_availability(self.effective_availability());
        if self.is_active {
            binding.reflect_active(true);
        }
        self.binding = Some(binding);
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Resolved display name: the user override if non-empty, else the
    /// server description.
    ///
    /// # Errors
    /// Returns [`Error::MissingDescription`] when both are absent or empty.
    /// On a non-dummy port that signals malformed server input; dummy ports
    /// have no display name by construction and callers are expected to
    /// check [`Self::is_dummy`] first.
    pub fn display_name(&self) -> Result<&str> {
        if !self.display_name.is_empty() {
            return Ok(&self.display_name);
        }
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => Ok(desc),
            _ => Err(Error::MissingDescription {
                port: self.name.clone(),
            }),
        }
    }

    /// Descriptive identifier for diagnostics.
    #[must_use]
    pub fn id_text(&self) -> String {
        format!(
            "`{}` ({})",
            self.name,
            self.description.as_deref().unwrap_or("dummy")
        )
    }

    /// Full label shown to the user: the owning device's display name alone
    /// for a dummy port, else `<device> ‣ <port>`. A port observed without
    /// an owner resolves to the [`UNKNOWN_DEVICE`] placeholder instead of
    /// failing.
    ///
    /// # Errors
    /// Returns [`Error::MissingDescription`] for a non-dummy port with no
    /// resolvable display name.
    pub fn menu_item_title(&self) -> Result<String> {
        let owner_name = self
            .owner
            .as_ref()
            .map_or(UNKNOWN_DEVICE, PortOwner::display_name);

        if self.is_dummy() {
            Ok(owner_name.to_string())
        } else {
            Ok(format!(
                "{owner_name}{TITLE_SEPARATOR}{}",
                self.display_name()?
            ))
        }
    }
}
