//! Commit-message markers that opt a trigger commit in or out of a deploy

/// Markers that abort the deploy before anything is built
pub const DEFAULT_NO_BUILD_MARKERS: &[&str] = &["nobuild!", "!nobuild"];

/// Markers that redeploy every build file even when nothing changed
pub const DEFAULT_FORCE_DEPLOY_MARKERS: &[&str] = &["forcefleekdeploy!", "!forcefleekdeploy"];

/// A set of literal markers matched case-insensitively against a commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMarkers {
    markers: Vec<String>,
}

impl CommitMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn no_build_defaults() -> Self {
        Self::new(DEFAULT_NO_BUILD_MARKERS.iter().copied())
    }

    pub fn force_deploy_defaults() -> Self {
        Self::new(DEFAULT_FORCE_DEPLOY_MARKERS.iter().copied())
    }

    /// First marker contained in `message`, if any
    pub fn find_in(&self, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.markers
            .iter()
            .find(|marker| message.contains(marker.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, message: &str) -> bool {
        self.find_in(message).is_some()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.markers
    }
}

impl std::fmt::Display for CommitMarkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.markers.join(" | "))
    }
}
