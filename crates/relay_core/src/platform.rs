use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Support platform whose DOM layout the relay knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Intercom,
    #[default]
    Unknown,
}

/// Host fragments that identify a known platform. A host matches when it is
/// the fragment itself or a subdomain of it.
const KNOWN_HOSTS: &[(&str, Platform)] = &[("intercom.io", Platform::Intercom)];

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Intercom => "intercom",
            Platform::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != Platform::Unknown
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the platform from a page host (`app.intercom.io`) or a full
/// location (`https://app.intercom.io/a/inbox`). Unmatched input is
/// `Platform::Unknown`.
pub fn detect_platform(location: &str) -> Platform {
    let host = host_of(location);
    if host.is_empty() {
        return Platform::Unknown;
    }
    KNOWN_HOSTS
        .iter()
        .find(|(fragment, _)| host_matches(&host, fragment))
        .map(|(_, platform)| *platform)
        .unwrap_or(Platform::Unknown)
}

fn host_of(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.contains("://") {
        if let Some(host) = Url::parse(trimmed)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
        {
            return host.to_ascii_lowercase();
        }
    }
    trimmed
        .split(['/', ':', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn host_matches(host: &str, fragment: &str) -> bool {
    host == fragment
        || host
            .strip_suffix(fragment)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
