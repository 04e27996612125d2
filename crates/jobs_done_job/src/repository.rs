use serde::Serialize;

/// The repository a document belongs to. Supplies the `{name}` and `{branch}` placeholders
/// and the branch that `branch-*` conditions and `branch_patterns` are tested against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub branch: String,
    pub url: String,
}

impl Repository {
    /// A repository whose name is derived from its url
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: name_from_url(&url),
            branch: branch.into(),
            url,
        }
    }

    /// Override the derived name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// The last path segment of a clone url, without a `.git` suffix.
///
/// Handles both `https://host/group/project.git` and scp-like `git@host:project.git` urls.
pub fn name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    segment.strip_suffix(".git").unwrap_or(segment).to_string()
}
