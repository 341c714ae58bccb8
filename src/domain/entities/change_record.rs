//! ChangeRecord entity - one entry of a working-tree status listing
//!
//! Produced fresh from `git status --porcelain=v1 -z` on every diff query;
//! never persisted.

/// Kind of change git reports for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Unmerged,
    Untracked,
    /// Any other two-letter status code (e.g. `!!` for ignored)
    Other(String),
}

impl ChangeType {
    /// Interpret a two-character porcelain `XY` status code
    ///
    /// The index column wins over the worktree column since the deploy flow
    /// stages everything before asking for changes.
    pub fn from_status_code(code: &str) -> Self {
        let mut chars = code.chars();
        let x = chars.next().unwrap_or(' ');
        let y = chars.next().unwrap_or(' ');

        match (x, y) {
            ('?', '?') => ChangeType::Untracked,
            ('U', _) | (_, 'U') | ('A', 'A') | ('D', 'D') => ChangeType::Unmerged,
            _ => {
                let effective = if x == ' ' { y } else { x };
                match effective {
                    'A' => ChangeType::Added,
                    'M' => ChangeType::Modified,
                    'D' => ChangeType::Deleted,
                    'R' => ChangeType::Renamed,
                    'C' => ChangeType::Copied,
                    'T' => ChangeType::TypeChanged,
                    _ => ChangeType::Other(code.to_string()),
                }
            }
        }
    }

    /// Renames and copies carry a second (origin) path in porcelain output
    pub fn has_origin_path(&self) -> bool {
        matches!(self, ChangeType::Renamed | ChangeType::Copied)
    }
}

/// One changed path in the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub change_type: ChangeType,
    /// Current path, relative to the repository root, `/`-separated
    pub path: String,
    /// Previous path for renames and copies
    pub from_path: Option<String>,
}

impl ChangeRecord {
    pub fn new(change_type: ChangeType, path: impl Into<String>) -> Self {
        Self {
            change_type,
            path: path.into(),
            from_path: None,
        }
    }

    /// Whether the current path lies inside `dir` (a repository-relative directory)
    pub fn is_within(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            return true;
        }
        self.path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Porcelain output that does not follow the `XY <path>` layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeParseError {
    pub entry: String,
}

impl std::fmt::Display for ChangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid porcelain status entry: {:?}", self.entry)
    }
}

impl std::error::Error for ChangeParseError {}

/// Parse NUL-separated `git status --porcelain=v1 -z` output
///
/// With `-z`, paths are never quoted and a rename is written as
/// `R  <new path>\0<old path>\0`.
pub fn parse_porcelain_z(output: &str) -> Result<Vec<ChangeRecord>, ChangeParseError> {
    let mut records = Vec::new();
    let mut entries = output.split('\0').filter(|entry| !entry.is_empty());

    while let Some(entry) = entries.next() {
        if entry.len() < 4 || !entry.is_char_boundary(2) || entry.as_bytes()[2] != b' ' {
            return Err(ChangeParseError {
                entry: entry.to_string(),
            });
        }

        let change_type = ChangeType::from_status_code(&entry[..2]);
        let path = entry[3..].to_string();
        let from_path = if change_type.has_origin_path() {
            Some(
                entries
                    .next()
                    .ok_or_else(|| ChangeParseError {
                        entry: entry.to_string(),
                    })?
                    .to_string(),
            )
        } else {
            None
        };

        records.push(ChangeRecord {
            change_type,
            path,
            from_path,
        });
    }

    Ok(records)
}
