/// Scheme and host extraction for tab URLs
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*:)").unwrap());

/// Extract the leading `scheme:` token of a URL
///
/// The token keeps its trailing colon and is lower-cased, so the tally built
/// during a snapshot pass and the deltas computed on close always agree.
///
/// Examples:
/// - https://a.com → https:
/// - about:blank → about:
/// - MOZ-EXTENSION://abc/page.html → moz-extension:
/// - "" or a string without a scheme → None
pub fn scheme_of(url: Option<&str>) -> Option<String> {
    let url = url?;
    SCHEME_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Extract the host of a URL, including a non-default port
///
/// URLs that do not parse, or parse without a host (about:, data:, file:///),
/// yield None instead of failing the snapshot pass.
///
/// Examples:
/// - https://github.com/rust-lang → github.com
/// - http://localhost:3000/ → localhost:3000
/// - https://example.com:443/ → example.com
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;

    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
