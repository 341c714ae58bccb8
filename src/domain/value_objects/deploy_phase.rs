//! Deploy phase value object - the states of an iterative deploy run

/// Phase of the deploy state machine
///
/// `RollingBack` is reachable from any step of `Uploading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployPhase {
    ResolvingBranches,
    Syncing,
    Replaying,
    Building,
    Diffing,
    Chunking,
    Uploading,
    RollingBack,
    Finalizing,
}

impl DeployPhase {
    /// Stable identifier used in machine-readable output
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployPhase::ResolvingBranches => "resolving_branches",
            DeployPhase::Syncing => "syncing",
            DeployPhase::Replaying => "replaying",
            DeployPhase::Building => "building",
            DeployPhase::Diffing => "diffing",
            DeployPhase::Chunking => "chunking",
            DeployPhase::Uploading => "uploading",
            DeployPhase::RollingBack => "rolling_back",
            DeployPhase::Finalizing => "finalizing",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DeployPhase::ResolvingBranches => "Resolving branches",
            DeployPhase::Syncing => "Syncing with remote",
            DeployPhase::Replaying => "Replaying previous build",
            DeployPhase::Building => "Building",
            DeployPhase::Diffing => "Detecting changes",
            DeployPhase::Chunking => "Chunking changes",
            DeployPhase::Uploading => "Uploading chunks",
            DeployPhase::RollingBack => "Rolling back",
            DeployPhase::Finalizing => "Finalizing",
        }
    }
}

impl std::fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
