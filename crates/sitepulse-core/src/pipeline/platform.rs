//! Platform detection
//!
//! An explicit platform wins. Otherwise a target whose host equals the
//! reference URL's host is WordPress; failing that, the heuristic substrings
//! are matched against the whole target URL.

use url::Url;

use super::config::PlatformConfig;
use crate::event_bus::Platform;

fn normalized_host(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Decide which platform a target URL runs on.
#[must_use]
pub fn detect_platform(
    config: &PlatformConfig,
    target: &str,
    explicit: Option<Platform>,
) -> Platform {
    if let Some(platform) = explicit {
        return platform;
    }

    let reference_host = config.reference_url.as_deref().and_then(normalized_host);
    if let (Some(reference), Some(target_host)) = (reference_host, normalized_host(target)) {
        if reference == target_host {
            return Platform::WordPress;
        }
    }

    let lowered = target.to_ascii_lowercase();
    if config
        .heuristics
        .iter()
        .filter(|h| !h.is_empty())
        .any(|h| lowered.contains(&h.to_ascii_lowercase()))
    {
        return Platform::WordPress;
    }

    Platform::Generic
}

/// Host part of a URL, used as a fallback session key.
#[must_use]
pub fn url_host(raw: &str) -> Option<String> {
    normalized_host(raw)
}
