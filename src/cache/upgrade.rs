/// Tracks the backend release marker across refreshes.
///
/// The first marker seen is the baseline and is never announced. A later,
/// different marker is announced exactly once.
#[derive(Debug, Default, Clone)]
pub struct UpgradeWatch {
    seen: Option<String>,
}

impl UpgradeWatch {
    /// Create a watch with no baseline yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the marker of a fresh snapshot; returns it when it should be announced.
    pub fn observe(&mut self, marker: Option<String>) -> Option<String> {
        let marker = marker?;
        match self.seen.replace(marker.clone()) {
            None => None,
            Some(previous) if previous == marker => None,
            Some(_) => Some(marker),
        }
    }

    /// The most recently observed marker.
    pub fn baseline(&self) -> Option<&str> {
        self.seen.as_deref()
    }
}
