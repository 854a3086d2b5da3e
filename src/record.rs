use serde::{Deserialize, Serialize};

use crate::{Environment, PlatformDetector};

/// Page, screen, device and viewport metadata sent with every beacon.
///
/// Device fields the platform detector could not determine are serialized as `null`. The device
/// name is sent as `deviceName`, the key Ackee stores. Earlier trackers sent it as
/// `devicedeviceName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    /// URL of the tracked page.
    pub site_location: String,
    /// URL of the referring page.
    pub site_referrer: String,
    /// Title of the tracked page.
    pub site_title: String,
    /// Two-letter language code.
    pub site_language: String,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Screen color depth in bits.
    pub screen_color_depth: u32,
    /// Device name, e.g. `"iPhone"`.
    pub device_name: Option<String>,
    /// Device manufacturer.
    pub device_manufacturer: Option<String>,
    /// Operating system family.
    pub os_name: Option<String>,
    /// Operating system version.
    pub os_version: Option<String>,
    /// Browser name.
    pub browser_name: Option<String>,
    /// Browser version.
    pub browser_version: Option<String>,
    /// Viewport width in pixels.
    pub browser_width: u32,
    /// Viewport height in pixels.
    pub browser_height: u32,
}

impl EnvironmentRecord {
    /// Read the current state of `environment` into a record.
    ///
    /// Performs no I/O. Calling it twice on an unchanged environment produces equal records.
    pub fn snapshot(
        environment: &impl Environment,
        platform_detector: &impl PlatformDetector,
    ) -> EnvironmentRecord {
        let platform = platform_detector.detect(&environment.user_agent());

        EnvironmentRecord {
            site_location: environment.location_href(),
            site_referrer: environment.referrer(),
            site_title: environment.title(),
            site_language: language_code(&environment.language()),
            screen_width: environment.screen_width(),
            screen_height: environment.screen_height(),
            screen_color_depth: environment.screen_color_depth(),
            device_name: platform.product,
            device_manufacturer: platform.manufacturer,
            os_name: platform.os.family,
            os_version: platform.os.version,
            browser_name: platform.name,
            browser_version: platform.version,
            browser_width: viewport_dimension(environment.client_width(), environment.outer_width()),
            browser_height: viewport_dimension(
                environment.client_height(),
                environment.outer_height(),
            ),
        }
    }
}

fn language_code(language: &str) -> String {
    language.chars().take(2).collect()
}

/// Client dimension, unless it is unknown or zero.
fn viewport_dimension(client: Option<u32>, outer: u32) -> u32 {
    client.filter(|&value| value != 0).unwrap_or(outer)
}
