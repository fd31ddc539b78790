use std::path::{Path, PathBuf};

/// Files whose presence marks a project root.
pub const ROOT_MARKERS: &[&str] = &[".git", "Cargo.toml", "pyproject.toml", "setup.py", "setup.cfg"];

/// Guess the project root for `start`.
///
/// Walks from `start` toward the filesystem root and returns the first
/// directory holding one of `markers`. Falls back to `start` itself.
pub fn guess_root_dir(start: &Path, markers: &[&str]) -> PathBuf {
    start
        .ancestors()
        .find(|dir| markers.iter().any(|m| dir.join(m).exists()))
        .unwrap_or(start)
        .to_path_buf()
}

/// [`guess_root_dir`] from the current directory with [`ROOT_MARKERS`].
pub fn current_root_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    guess_root_dir(&cwd, ROOT_MARKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nearest_marked_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let deep = root.join("data/samples");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(root.join("pyproject.toml"), "").unwrap();

        assert_eq!(guess_root_dir(&deep, ROOT_MARKERS), root);
        assert_eq!(guess_root_dir(&root, ROOT_MARKERS), root);
    }

    #[test]
    fn falls_back_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("a/b");
        std::fs::create_dir_all(&start).unwrap();
        assert_eq!(guess_root_dir(&start, &["no-such-marker-file"]), start);
    }
}
