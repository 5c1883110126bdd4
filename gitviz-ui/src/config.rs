use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_COMMIT_COUNT: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(count) => count,
    None => panic!("default commit count must be non-zero"),
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options that shape what a refresh retrieves and shows.
///
/// Every field change triggers a refresh; `visualize_comments` only affects
/// presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub number_of_commits_to_show: NonZeroUsize,
    pub visualize_unreachable: bool,
    pub visualize_comments: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            number_of_commits_to_show: DEFAULT_COMMIT_COUNT,
            visualize_unreachable: false,
            visualize_comments: false,
        }
    }
}

impl GraphConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn commit_count(&self) -> usize {
        self.number_of_commits_to_show.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let config = GraphConfig::from_toml_str("visualize_unreachable = true\n").unwrap();
        assert_eq!(
            config,
            GraphConfig {
                visualize_unreachable: true,
                ..GraphConfig::default()
            }
        );
        assert_eq!(config.commit_count(), 20);
    }

    #[test]
    fn full_config() {
        let config = GraphConfig::from_toml_str(
            "number_of_commits_to_show = 5\nvisualize_unreachable = false\nvisualize_comments = true\n",
        )
        .unwrap();
        assert_eq!(config.commit_count(), 5);
        assert!(config.visualize_comments);
    }

    #[test]
    fn zero_commits_is_rejected() {
        let err = GraphConfig::from_toml_str("number_of_commits_to_show = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = GraphConfig::load(Path::new("/no/such/gitviz.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gitviz.toml");
        std::fs::write(&path, "number_of_commits_to_show = 7\n").unwrap();
        assert_eq!(GraphConfig::load(&path).unwrap().commit_count(), 7);
    }
}
