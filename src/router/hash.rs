//! Hash fragment parsing.

use percent_encoding::percent_decode_str;

/// Tag of the root route.
pub const ROOT: &str = "/";
/// Tag of the home route, which resets navigation.
pub const HOME: &str = "/home";

/// A parsed hash fragment.
///
/// `tag` is the canonical form used to compare navigation targets
/// (`#/user/alice/` and `/user/alice` share the tag `/user/alice`);
/// `segments` are the percent-decoded path components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRoute {
    tag: String,
    segments: Vec<String>,
}

impl HashRoute {
    pub fn parse(hash: &str) -> Self {
        let path = hash.trim().trim_start_matches('#');
        let raw: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

        let tag = if raw.is_empty() {
            ROOT.to_string()
        } else {
            format!("/{}", raw.join("/"))
        };
        let segments = raw.into_iter().map(decode_component).collect();

        Self { tag, segments }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First path component; empty for the root route.
    pub fn head(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    /// Positional parameter `index` (0-based) after the head.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.segments.get(index + 1).map(String::as_str)
    }

    pub fn is_home(&self) -> bool {
        self.tag == HOME
    }
}

/// Decode `%XX` escapes; malformed escapes are kept literally and invalid
/// UTF-8 is replaced.
fn decode_component(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}
