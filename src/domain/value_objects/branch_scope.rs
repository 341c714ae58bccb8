//! Branch scope value object - which refs a branch query looks at

/// Where a branch is looked up or deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchScope {
    /// Only `refs/heads`
    Local,
    /// Only `refs/remotes/<remote>`
    Remote(String),
    /// Local branches and the named remote
    Both(String),
}

impl BranchScope {
    pub fn includes_local(&self) -> bool {
        matches!(self, BranchScope::Local | BranchScope::Both(_))
    }

    /// Remote name, when the scope covers a remote
    pub fn remote(&self) -> Option<&str> {
        match self {
            BranchScope::Local => None,
            BranchScope::Remote(remote) | BranchScope::Both(remote) => Some(remote),
        }
    }

    /// Ref prefix passed to `git for-each-ref`
    ///
    /// `Both` uses `refs` so local heads and remote-tracking refs are listed together.
    pub fn ref_pattern(&self) -> String {
        match self {
            BranchScope::Local => "refs/heads".to_string(),
            BranchScope::Remote(remote) => format!("refs/remotes/{}", remote),
            BranchScope::Both(_) => "refs".to_string(),
        }
    }

    /// Name a branch is listed under for this scope's remote (`origin/main`)
    pub fn remote_branch_name(&self, branch: &str) -> Option<String> {
        self.remote().map(|remote| format!("{}/{}", remote, branch))
    }
}

impl std::fmt::Display for BranchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchScope::Local => write!(f, "local"),
            BranchScope::Remote(remote) => write!(f, "remote '{}'", remote),
            BranchScope::Both(remote) => write!(f, "local and remote '{}'", remote),
        }
    }
}

/// Reduce a ref such as `refs/heads/main` or `refs/remotes/origin/main` to its
/// short name (`main`, `origin/main`).
pub fn ref_base_name(reference: &str) -> String {
    let trimmed = reference.trim();
    trimmed
        .strip_prefix("refs/heads/")
        .or_else(|| trimmed.strip_prefix("refs/remotes/"))
        .unwrap_or(trimmed)
        .to_string()
}
