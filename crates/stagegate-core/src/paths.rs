use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STAGEGATE_DIR: &str = ".stagegate";
pub const CONFIG_FILE: &str = ".stagegate/config.yaml";

/// Marker directories that identify a project root, in priority order.
pub const ROOT_MARKERS: &[&str] = &[STAGEGATE_DIR, ".git"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Nearest ancestor of `start` (inclusive) containing the directory `marker`.
pub fn find_ancestor_with(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

/// Walk up from `start` trying each of [`ROOT_MARKERS`] in turn.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    ROOT_MARKERS
        .iter()
        .find_map(|marker| find_ancestor_with(start, marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_path_layout() {
        assert_eq!(
            config_path(Path::new("/proj")),
            PathBuf::from("/proj/.stagegate/config.yaml")
        );
    }

    #[test]
    fn stagegate_dir_beats_git() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("svc");
        std::fs::create_dir_all(inner.join(".stagegate")).unwrap();
        let deep = inner.join("src/deep");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_project_root(&deep), Some(inner));
    }

    #[test]
    fn falls_back_to_git() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let deep = dir.path().join("a/b");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_project_root(&deep), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn marker_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".stagegate"), "not a dir").unwrap();
        assert_eq!(find_ancestor_with(dir.path(), STAGEGATE_DIR), None);
    }
}
