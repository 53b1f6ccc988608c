//! Reconciles relative image and cue-file references against a base URL.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub pathname: String,
}

impl PageLocation {
    pub fn from_url(url: &Url) -> Self {
        Self {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or("").to_string(),
            port: url.port(),
            pathname: url.path().to_string(),
        }
    }

    /// The page address with its trailing file name removed.
    pub fn base(&self) -> String {
        let port = self.port.map(|p| format!(":{}", p)).unwrap_or_default();
        let full = format!("{}//{}{}{}", self.protocol, self.hostname, port, self.pathname);
        directory_of(&full).to_string()
    }
}

/// Everything up to and including the last `/`, or an empty string when there is none.
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

pub fn is_fully_qualified(reference: &str) -> bool {
    reference.contains("//") || reference.starts_with("data:")
}

/// Resolves `reference` against `base`.
///
/// References that cannot be resolved are returned unchanged.
pub fn resolve(reference: &str, base: &str) -> String {
    if is_fully_qualified(reference) {
        return reference.to_string();
    }

    match base.find("//") {
        Some(0) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            trim_slashes(reference)
        ),
        Some(_) => format!("{}/{}", trim_slashes(base), trim_slashes(reference)),
        None => reference.to_string(),
    }
}

pub fn trim_slashes(s: &str) -> &str {
    s.trim_matches(|c: char| c == '/' || c.is_whitespace())
}
