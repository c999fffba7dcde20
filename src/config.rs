//! Configuration management
//!
//! Handles loading, parsing, and validating the TOML configuration file.
//! The config carries global settings plus per-device overrides: custom
//! display names, port visibility, `always_available` pinning for ports such
//! as "Auto Detect", and preferred profiles.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

// ============================================================================
// Configuration Types
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    /// Per-device overrides, matched by device name.
    pub devices: Vec<DeviceOverride>,
}

/// Global settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show source/input ports in the menu
    pub show_inputs: bool,
    /// Show sink/output ports in the menu
    pub show_outputs: bool,
    /// Notify when the active port changes
    pub notify_switch: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_inputs: true,
            show_outputs: true,
            notify_switch: true,
            log_level: "info".to_string(),
        }
    }
}

/// User overrides for one device, matched by its internal name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceOverride {
    /// Internal device name (e.g. `alsa_card.pci-0000_00_1f.3`)
    pub name: String,
    /// Replacement display name; empty keeps the server description
    pub display_name: String,
    pub ports: Vec<PortOverride>,
}

/// User overrides for one port of a device
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortOverride {
    /// Internal port name (e.g. `analog-output-speaker`)
    pub name: String,
    /// Replacement display name; empty keeps the server description
    pub display_name: String,
    /// Hide the port from the menu entirely when false
    pub visible: bool,
    /// Show the port even while nothing is plugged in (e.g. "Auto Detect")
    pub always_available: bool,
    /// Profile to request when activating this port, overriding the
    /// server-suggested one
    pub preferred_profile: Option<String>,
}

impl Default for PortOverride {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            visible: true,
            always_available: false,
            preferred_profile: None,
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Config {
    /// Load configuration from the default XDG config path, creating a
    /// commented default file on first run.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or the
    /// file cannot be read, parsed, or validated.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Creating default config at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.settings.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => {
                return Err(Error::ConfigInvalid {
                    reason: format!(
                        "invalid log_level '{level}'; must be: error, warn, info, debug, or trace"
                    ),
                });
            }
        }

        for (i, device) in self.devices.iter().enumerate() {
            if device.name.is_empty() {
                return Err(Error::ConfigInvalid {
                    reason: format!("device override {} has an empty name", i + 1),
                });
            }
            if self.devices[..i].iter().any(|d| d.name == device.name) {
                return Err(Error::ConfigInvalid {
                    reason: format!("duplicate device override: '{}'", device.name),
                });
            }
            for (j, port) in device.ports.iter().enumerate() {
                if port.name.is_empty() {
                    return Err(Error::ConfigInvalid {
                        reason: format!(
                            "port override {} of device '{}' has an empty name",
                            j + 1,
                            device.name
                        ),
                    });
                }
                if device.ports[..j].iter().any(|p| p.name == port.name) {
                    return Err(Error::ConfigInvalid {
                        reason: format!(
                            "duplicate port override '{}' on device '{}'",
                            port.name, device.name
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Look up the override block for a device by internal name.
    #[must_use]
    pub fn device_override(&self, device_name: &str) -> Option<&DeviceOverride> {
        self.devices.iter().find(|d| d.name == device_name)
    }

    /// Get the XDG config path
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or created.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(Error::NoConfigDir)?.join("pasw");
        fs::create_dir_all(&config_dir).map_err(|source| Error::ConfigRead {
            path: config_dir.clone(),
            source,
        })?;
        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<()> {
        let default_config = r#"# pasw configuration
#
# Ports and devices are matched by their internal names. Those show up in the
# logs at debug level whenever a device is discovered.

[settings]
show_inputs = true     # List source/input ports in the menu
show_outputs = true    # List sink/output ports in the menu
notify_switch = true   # Desktop notification when the active port changes
log_level = "info"     # error, warn, info, debug, trace

# Device overrides
#
# [[devices]]
# name = "alsa_card.pci-0000_00_1f.3"
# display_name = "Built-in Audio"
#
# [[devices.ports]]
# name = "analog-output-speaker"
# display_name = "Speakers"
# visible = true
# always_available = false
# preferred_profile = "output:analog-stereo"
"#;
        fs::write(path, default_config).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}

impl DeviceOverride {
    /// Look up the override block for a port by internal name.
    #[must_use]
    pub fn port_override(&self, port_name: &str) -> Option<&PortOverride> {
        self.ports.iter().find(|p| p.name == port_name)
    }
}
