//! Desktop notifications
//!
//! Sends a notification when the active port changes, with icon detection
//! using `FreeDesktop` standard icon names.

use notify_rust::Notification;

use crate::error::Result;
use crate::port::Port;
use crate::server::Direction;

/// Send a desktop notification
///
/// # Errors
/// Returns an error if the notification cannot be sent (e.g., no notification
/// daemon running).
pub fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<()> {
    let icon = icon.unwrap_or("audio-card");

    Notification::new()
        .summary(summary)
        .body(body)
        .appname("pasw")
        .icon(icon)
        .timeout(3000)
        .show()?;

    Ok(())
}

/// Auto-detect an icon for a port from its naming (`FreeDesktop` standard
/// names).
#[must_use]
pub fn port_icon(port: &Port) -> String {
    if port.direction() == Direction::Input {
        return "audio-input-microphone".to_string();
    }

    let label = port.display_name().unwrap_or_default().to_lowercase();
    let name = port.name().to_lowercase();

    if label.contains("hdmi")
        || label.contains("tv")
        || label.contains("display")
        || name.contains("hdmi")
    {
        "video-display".to_string()
    } else if label.contains("headphone")
        || label.contains("headset")
        || label.contains("bluetooth")
        || name.contains("bluez")
    {
        "audio-headphones".to_string()
    } else {
        // Speakers, line out, optical, and everything else
        "audio-speakers".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_port_info;

    fn make_port(name: &str, description: &str, direction: Direction) -> Port {
        let mut info = make_port_info(name, direction);
        info.description = Some(description.to_string());
        Port::from_info(&info, None)
    }

    #[test]
    fn test_port_icon_input_is_microphone() {
        let port = make_port("analog-input-mic", "Microphone", Direction::Input);
        assert_eq!(port_icon(&port), "audio-input-microphone");
    }

    #[test]
    fn test_port_icon_hdmi_detection() {
        let port = make_port("hdmi-output", "HDMI / DisplayPort", Direction::Output);
        assert_eq!(port_icon(&port), "video-display");

        let port2 = make_port("iec958-stereo-output", "Digital TV Out", Direction::Output);
        assert_eq!(port_icon(&port2), "video-display");
    }

    #[test]
    fn test_port_icon_headphone_detection() {
        let port = make_port("analog-output-headphones", "Headphones", Direction::Output);
        assert_eq!(port_icon(&port), "audio-headphones");

        let port2 = make_port("bluez_output.port", "A2DP Sink", Direction::Output);
        assert_eq!(port_icon(&port2), "audio-headphones");
    }

    #[test]
    fn test_port_icon_default_speakers() {
        let port = make_port("analog-output-speaker", "Speakers", Direction::Output);
        assert_eq!(port_icon(&port), "audio-speakers");

        let port2 = make_port("analog-output-lineout", "Line Out", Direction::Output);
        assert_eq!(port_icon(&port2), "audio-speakers");
    }
}
