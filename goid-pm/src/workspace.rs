// Workspace root lookup
//
// Maps a directory relative to the current directory onto the import path it
// has inside one of the configured workspace roots (`<root>/src/<import path>`).
// The lookup is lexical. The caller supplies the current directory and the
// roots, and nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Capability answering "which import path does this directory have"
pub trait WorkspaceContext {
    /// Import path of `pattern_dir`, interpreted relative to the current directory
    ///
    /// Returns `None` when the directory lies outside every workspace root.
    fn import_path_for(&self, pattern_dir: &str) -> Option<String>;
}

/// Context with no workspace roots configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorkspace;

impl WorkspaceContext for NoWorkspace {
    fn import_path_for(&self, _pattern_dir: &str) -> Option<String> {
        None
    }
}

/// GOPATH-style workspace: each root holds packages under `<root>/src`
#[derive(Debug, Clone)]
pub struct GopathWorkspace {
    cwd: PathBuf,
    roots: Vec<PathBuf>,
}

impl GopathWorkspace {
    pub fn new(cwd: PathBuf, roots: Vec<PathBuf>) -> Self {
        let cwd = normalize(&cwd);
        let roots = roots.iter().map(|root| normalize(root)).collect();
        Self { cwd, roots }
    }
}

impl WorkspaceContext for GopathWorkspace {
    fn import_path_for(&self, pattern_dir: &str) -> Option<String> {
        let dir = normalize(&self.cwd.join(pattern_dir));

        self.roots.iter().find_map(|root| {
            let rel = dir.strip_prefix(root.join("src")).ok()?;
            let segments = rel
                .components()
                .map(|c| match c {
                    Component::Normal(seg) => seg.to_str(),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;

            // The source directory itself has no import path
            if segments.is_empty() {
                None
            } else {
                Some(segments.join("/"))
            }
        })
    }
}

/// Lexically resolve `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
}
