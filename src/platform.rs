//! Best-effort detection of device, operating system and browser.
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Device, operating system and browser as far as they could be determined. Any field may be
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Name of the device, e.g. `"iPhone"`.
    pub product: Option<String>,
    /// Manufacturer of the device, e.g. `"Apple"`.
    pub manufacturer: Option<String>,
    /// Operating system.
    pub os: OperatingSystem,
    /// Name of the browser, e.g. `"Firefox"`.
    pub name: Option<String>,
    /// Version of the browser.
    pub version: Option<String>,
}

/// Operating system part of a [`Platform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingSystem {
    /// Family of the operating system, e.g. `"Windows"`.
    pub family: Option<String>,
    /// Version of the operating system, e.g. `"10"`.
    pub version: Option<String>,
}

/// Detects the platform the page is viewed on.
///
/// Implemented for closures, so a custom detector can be passed inline:
/// ```
/// # use ackee_tracker::{Platform, PlatformDetector};
/// let detector = |_user_agent: &str| Platform {
///     name: Some("Custom".to_owned()),
///     ..Default::default()
/// };
/// assert_eq!(detector.detect("").name.as_deref(), Some("Custom"));
/// ```
pub trait PlatformDetector {
    /// Describe the platform identified by `user_agent`. Must not fail: undetermined fields are left
    /// empty.
    fn detect(&self, user_agent: &str) -> Platform;
}

impl<T: Fn(&str) -> Platform> PlatformDetector for T {
    fn detect(&self, user_agent: &str) -> Platform {
        self(user_agent)
    }
}

/// Default [`PlatformDetector`] parsing well-known user agent tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentDetector;

struct Rule {
    name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn compile(table: &[(&'static str, &'static str)]) -> Vec<Rule> {
        table
            .iter()
            .map(|&(name, pattern)| Rule {
                name,
                pattern: Regex::new(pattern).expect("user agent pattern is valid"),
            })
            .collect()
    }

    /// First rule matching `user_agent`, with the first participating capture group.
    fn first_match<'a, 'u>(
        rules: &'a [Rule],
        user_agent: &'u str,
    ) -> Option<(&'a Rule, Option<&'u str>)> {
        rules.iter().find_map(|rule| {
            let captures = rule.pattern.captures(user_agent)?;
            let group = captures.iter().skip(1).flatten().next().map(|m| m.as_str());
            Some((rule, group))
        })
    }
}

// Order matters: most browsers also claim to be Chrome or Safari.
const BROWSERS: &[(&str, &str)] = &[
    ("Microsoft Edge", r"\bEdg(?:e|A|iOS)?/([\d.]+)"),
    ("Opera", r"\bOPR/([\d.]+)|\bOpera\b.*\bVersion/([\d.]+)"),
    ("Samsung Internet", r"\bSamsungBrowser/([\d.]+)"),
    ("Chrome", r"\b(?:Chrome|CriOS)/([\d.]+)"),
    ("Firefox", r"\b(?:Firefox|FxiOS)/([\d.]+)"),
    ("Safari", r"\bVersion/([\d.]+).*\bSafari/"),
    ("IE", r"\bMSIE ([\d.]+)|\bTrident/.*\brv:([\d.]+)"),
];

// iOS and Android user agents also mention OS X and Linux, so they go first.
const OPERATING_SYSTEMS: &[(&str, &str)] = &[
    ("Windows", r"\bWindows NT ([\d.]+)"),
    ("iOS", r"\b(?:iPhone|iPad|iPod)\b.*? OS (\d+(?:_\d+)*)"),
    ("Android", r"\bAndroid(?: (\d+(?:\.\d+)*))?"),
    ("Chrome OS", r"\bCrOS \S+ ([\d.]+)"),
    ("OS X", r"\bMac OS X(?: (\d+(?:[._]\d+)*))?"),
    ("Ubuntu", r"\bUbuntu\b"),
    ("Linux", r"\bLinux\b"),
];

// The name of a device rule is its manufacturer; the product is captured.
const DEVICES: &[(&str, &str)] = &[
    ("Apple", r"\b(iPhone|iPad|iPod)\b"),
    ("Google", r"\b((?:Pixel|Nexus)(?: [0-9A-Za-z]+)*)\s*(?:Build/|;|\))"),
    ("Samsung", r"\b(SM-[0-9A-Z]+)\b"),
];

fn browsers() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| Rule::compile(BROWSERS))
}

fn operating_systems() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| Rule::compile(OPERATING_SYSTEMS))
}

fn devices() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| Rule::compile(DEVICES))
}

/// Marketing name of a Windows NT kernel version.
fn windows_version(nt_version: &str) -> &str {
    match nt_version {
        "10.0" => "10",
        "6.3" => "8.1",
        "6.2" => "8",
        "6.1" => "7",
        "6.0" => "Vista",
        "5.2" | "5.1" => "XP",
        other => other,
    }
}

impl PlatformDetector for UserAgentDetector {
    fn detect(&self, user_agent: &str) -> Platform {
        let mut platform = Platform::default();

        if let Some((rule, version)) = Rule::first_match(browsers(), user_agent) {
            platform.name = Some(rule.name.to_owned());
            platform.version = version.map(str::to_owned);
        }

        if let Some((rule, version)) = Rule::first_match(operating_systems(), user_agent) {
            platform.os.family = Some(rule.name.to_owned());
            platform.os.version = version.map(|version| {
                if rule.name == "Windows" {
                    windows_version(version).to_owned()
                } else {
                    version.replace('_', ".")
                }
            });
        }

        if let Some((rule, product)) = Rule::first_match(devices(), user_agent) {
            platform.manufacturer = Some(rule.name.to_owned());
            platform.product = product.map(str::to_owned);
        }

        log::trace!(target: "ackee", user_agent, platform:serde; "detected platform");

        platform
    }
}

#[cfg(test)]
mod tests {
    use super::{OperatingSystem, Platform, PlatformDetector, UserAgentDetector};

    fn os(family: &str, version: Option<&str>) -> OperatingSystem {
        OperatingSystem {
            family: Some(family.to_owned()),
            version: version.map(str::to_owned),
        }
    }

    #[test]
    fn detects_chrome_on_windows() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.109 Safari/537.36",
        );

        assert_eq!(
            platform,
            Platform {
                product: None,
                manufacturer: None,
                os: os("Windows", Some("10")),
                name: Some("Chrome".to_owned()),
                version: Some("120.0.6099.109".to_owned()),
            }
        );
    }

    #[test]
    fn detects_edge_before_chrome() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.61",
        );

        assert_eq!(platform.name.as_deref(), Some("Microsoft Edge"));
        assert_eq!(platform.version.as_deref(), Some("120.0.2210.61"));
        assert_eq!(platform.os, os("Windows", Some("7")));
    }

    #[test]
    fn detects_safari_on_iphone() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1.2 Mobile/15E148 Safari/604.1",
        );

        assert_eq!(
            platform,
            Platform {
                product: Some("iPhone".to_owned()),
                manufacturer: Some("Apple".to_owned()),
                os: os("iOS", Some("17.1.2")),
                name: Some("Safari".to_owned()),
                version: Some("17.1.2".to_owned()),
            }
        );
    }

    #[test]
    fn detects_safari_on_os_x() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
        );

        assert_eq!(platform.os, os("OS X", Some("10.15.7")));
        assert_eq!(platform.name.as_deref(), Some("Safari"));
        assert_eq!(platform.product, None);
    }

    #[test]
    fn detects_firefox_on_ubuntu() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
        );

        assert_eq!(platform.os, os("Ubuntu", None));
        assert_eq!(platform.name.as_deref(), Some("Firefox"));
        assert_eq!(platform.version.as_deref(), Some("121.0"));
    }

    #[test]
    fn detects_pixel_on_android() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (Linux; Android 14; Pixel 7 Pro Build/UQ1A.231205.015) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
        );

        assert_eq!(platform.product.as_deref(), Some("Pixel 7 Pro"));
        assert_eq!(platform.manufacturer.as_deref(), Some("Google"));
        assert_eq!(platform.os, os("Android", Some("14")));
        assert_eq!(platform.name.as_deref(), Some("Chrome"));
    }

    #[test]
    fn detects_samsung_internet() {
        let platform = UserAgentDetector.detect(
            "Mozilla/5.0 (Linux; Android 13; SM-S911B) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/23.0 Chrome/115.0.0.0 Mobile Safari/537.36",
        );

        assert_eq!(platform.product.as_deref(), Some("SM-S911B"));
        assert_eq!(platform.manufacturer.as_deref(), Some("Samsung"));
        assert_eq!(platform.name.as_deref(), Some("Samsung Internet"));
        assert_eq!(platform.version.as_deref(), Some("23.0"));
    }

    #[test]
    fn detects_internet_explorer_11() {
        let platform = UserAgentDetector
            .detect("Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko");

        assert_eq!(platform.name.as_deref(), Some("IE"));
        assert_eq!(platform.version.as_deref(), Some("11.0"));
        assert_eq!(platform.os, os("Windows", Some("8.1")));
    }

    #[test]
    fn unknown_user_agent_yields_empty_platform() {
        assert_eq!(UserAgentDetector.detect(""), Platform::default());
        assert_eq!(UserAgentDetector.detect("curl/8.4.0"), Platform::default());
    }

    #[test]
    fn closures_are_detectors() {
        let detector = |user_agent: &str| Platform {
            product: Some(user_agent.to_owned()),
            ..Default::default()
        };

        assert_eq!(detector.detect("toaster").product.as_deref(), Some("toaster"));
    }
}
