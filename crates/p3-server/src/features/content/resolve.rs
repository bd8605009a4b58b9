use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Directory that static content is served from
#[derive(Debug, Clone)]
pub struct ContentRoot {
    root: PathBuf,
}

impl ContentRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Map a decoded URL remainder to a regular file under the root.
    ///
    /// Returns `None` for anything that is not an existing file inside the
    /// root: missing paths, directories, parent components, absolute paths
    /// and symlinks pointing outside the root.
    pub async fn resolve(&self, remainder: &str) -> Option<PathBuf> {
        let relative = Path::new(remainder.trim_start_matches('/'));

        let mut has_name = false;
        for component in relative.components() {
            match component {
                Component::Normal(_) => has_name = true,
                Component::CurDir => {},
                _ => {
                    tracing::warn!(path = %remainder, "Rejected content path outside the root");
                    return None;
                },
            }
        }
        if !has_name {
            return None;
        }

        let root = match fs::canonicalize(&self.root).await {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(
                    root = %self.root.display(),
                    error = %e,
                    "Content directory not found or inaccessible"
                );
                return None;
            },
        };

        // missing files are the common case, not worth a log line
        let candidate = fs::canonicalize(root.join(relative)).await.ok()?;
        if !candidate.starts_with(&root) {
            tracing::warn!(
                path = %remainder,
                resolved = %candidate.display(),
                "Path traversal attempt blocked"
            );
            return None;
        }

        let metadata = fs::metadata(&candidate).await.ok()?;
        metadata.is_file().then_some(candidate)
    }
}
