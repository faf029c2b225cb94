use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

/// File name that turns a directory into an article.
pub const MARKER_FILE: &str = "page.mdx";

/// One discovered article: its slug and the file backing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentSource {
    /// Relative directory path joined with `/`, e.g. `2023/my-post`.
    pub slug: String,
    #[serde(skip)]
    pub source_path: PathBuf,
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalkError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Enumerate every article under `root`.
///
/// A directory containing [`MARKER_FILE`] is an article; every other
/// directory is descended into. Any unreadable directory aborts the walk so
/// callers can tell "no articles" apart from "cannot read articles". The
/// order of the result follows the traversal and carries no meaning.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn discover(root: &Path) -> Result<Vec<ContentSource>, WalkError> {
    let mut found = Vec::new();
    // (directory, slug segments leading to it)
    let mut pending: Vec<(PathBuf, Vec<String>)> = vec![(root.to_path_buf(), Vec::new())];

    while let Some((dir, segments)) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| WalkError::io(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WalkError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| WalkError::io(&path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                let mut child = segments.clone();
                child.push(name);
                pending.push((path, child));
            } else if name == MARKER_FILE && !segments.is_empty() {
                found.push(ContentSource {
                    slug: segments.join("/"),
                    source_path: path,
                });
            }
        }
    }

    debug!(count = found.len(), "content discovered");
    Ok(found)
}
