use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static BARE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bare\s*=\s*true").expect("static pattern"));

/// A directory with a `.git` directory inside, or a bare repository
pub fn is_valid_repository(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path.is_dir()
        && (path.join(".git").is_dir() || is_bare_repository(path))
}

/// `config` at the top level declares `bare = true`
pub fn is_bare_repository(path: &Path) -> bool {
    std::fs::read_to_string(path.join("config"))
        .map(|config| BARE_ENTRY.is_match(&config))
        .unwrap_or(false)
}

/// Directory holding refs and objects: `.git` for work trees, the path itself when bare
pub fn git_dir(path: &Path) -> PathBuf {
    if is_bare_repository(path) {
        path.to_path_buf()
    } else {
        path.join(".git")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_and_missing_paths_are_invalid() {
        assert!(!is_valid_repository(Path::new("")));
        assert!(!is_valid_repository(Path::new("/definitely/not/here")));
    }

    #[test]
    fn plain_directory_is_invalid() {
        let dir = TempDir::new().unwrap();
        assert!(!is_valid_repository(dir.path()));
    }

    #[test]
    fn work_tree_is_valid() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        assert!(is_valid_repository(dir.path()));
        assert!(!is_bare_repository(dir.path()));
        assert_eq!(git_dir(dir.path()), dir.path().join(".git"));
    }

    #[test]
    fn bare_repository_is_valid() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init_bare(dir.path()).unwrap();
        assert!(is_bare_repository(dir.path()));
        assert!(is_valid_repository(dir.path()));
        assert_eq!(git_dir(dir.path()), dir.path());
    }

    #[test]
    fn bare_entry_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config"), "[core]\n\tBare=TRUE\n").unwrap();
        assert!(is_bare_repository(dir.path()));

        fs::write(dir.path().join("config"), "[core]\n\tbare = false\n").unwrap();
        assert!(!is_bare_repository(dir.path()));
    }
}
