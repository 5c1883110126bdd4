use anyhow::Result;
use gitviz_core::LogRetriever;
use graph::{build_graph, CommitGraph};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::GraphConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No valid repository; the graph is empty
    Unset,
    /// A repository is attached and loaded. Its filesystem watch runs unless
    /// the coordinator was built with watching disabled, or the watch failed
    /// to start, which is reported as [`SessionEvent::WatchFailed`].
    ///
    /// [`SessionEvent::WatchFailed`]: crate::events::SessionEvent::WatchFailed
    Watching,
}

/// Everything the coordinator knows about the repository being shown
pub struct Session {
    path: Option<PathBuf>,
    config: GraphConfig,
    retriever: Option<Box<dyn LogRetriever>>,
}

impl Session {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            path: None,
            config,
            retriever: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.retriever.is_some() {
            SessionState::Watching
        } else {
            SessionState::Unset
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// Store `config`; returns whether it differs from the current one
    pub fn set_config(&mut self, config: GraphConfig) -> bool {
        let changed = self.config != config;
        self.config = config;
        changed
    }

    pub fn attach(&mut self, path: PathBuf, retriever: Box<dyn LogRetriever>) {
        self.path = Some(path);
        self.retriever = Some(retriever);
    }

    pub fn detach(&mut self) {
        self.path = None;
        self.retriever = None;
    }

    /// Retrieve and build a fresh graph; `None` when no repository is attached
    pub fn load(&self) -> Option<Result<CommitGraph>> {
        self.retriever
            .as_deref()
            .map(|retriever| load_graph(retriever, &self.config))
    }
}

/// Retrieve commits for `config` and build the graph from them
pub fn load_graph(retriever: &dyn LogRetriever, config: &GraphConfig) -> Result<CommitGraph> {
    let commits = retriever.recent_commits(config.commit_count())?;
    let active_ref_name = retriever.active_reference_name()?;

    let unreachable = if config.visualize_unreachable {
        let reachable: HashSet<&str> = commits.iter().map(|c| c.hash.as_str()).collect();
        let hashes = retriever.recent_unreachable_commit_hashes()?;
        let orphans: Vec<_> = retriever
            .specific_commits(&hashes)?
            .into_iter()
            .filter(|commit| !reachable.contains(commit.hash.as_str()))
            .collect();
        debug!(candidates = hashes.len(), orphans = orphans.len(), "loaded unreachable commits");
        Some(orphans)
    } else {
        None
    };

    Ok(build_graph(&commits, &active_ref_name, unreachable.as_deref()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::bail;
    use graph::Commit;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory retriever shared between a test and the code under test
    #[derive(Clone, Default)]
    pub(crate) struct FakeRetriever {
        pub commits: Arc<Mutex<Vec<Commit>>>,
        pub active: Arc<Mutex<String>>,
        pub unreachable: Arc<Mutex<Vec<Commit>>>,
        pub fail: Arc<AtomicBool>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeRetriever {
        pub fn with_commits(commits: Vec<Commit>, active: &str) -> Self {
            let fake = Self::default();
            *fake.commits.lock() = commits;
            *fake.active.lock() = active.to_string();
            fake
        }
    }

    impl LogRetriever for FakeRetriever {
        fn recent_commits(&self, count: usize) -> Result<Vec<Commit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                bail!("git log failed");
            }
            Ok(self.commits.lock().iter().take(count).cloned().collect())
        }

        fn active_reference_name(&self) -> Result<String> {
            Ok(self.active.lock().clone())
        }

        fn recent_unreachable_commit_hashes(&self) -> Result<Vec<String>> {
            Ok(self.unreachable.lock().iter().map(|c| c.hash.clone()).collect())
        }

        fn specific_commits(&self, hashes: &[String]) -> Result<Vec<Commit>> {
            Ok(self
                .unreachable
                .lock()
                .iter()
                .filter(|c| hashes.contains(&c.hash))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn load_graph_respects_commit_count() {
        let fake = FakeRetriever::with_commits(
            vec![
                Commit::new("C").with_parents(["B"]),
                Commit::new("B").with_parents(["A"]),
                Commit::new("A"),
            ],
            "",
        );
        let config = GraphConfig {
            number_of_commits_to_show: std::num::NonZeroUsize::new(2).unwrap(),
            ..GraphConfig::default()
        };

        let graph = load_graph(&fake, &config).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        // B's parent A fell outside the window.
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn unreachable_commits_only_when_enabled() {
        let fake = FakeRetriever::with_commits(vec![Commit::new("A").with_refs(["HEAD", "main"])], "main");
        *fake.unreachable.lock() = vec![Commit::new("A"), Commit::new("Z").with_parents(["A"])];

        let hidden = load_graph(&fake, &GraphConfig::default()).unwrap();
        assert_eq!(hidden.stats().orphan_commits, 0);
        assert_eq!(hidden.vertex_count(), 3);

        let config = GraphConfig {
            visualize_unreachable: true,
            ..GraphConfig::default()
        };
        let shown = load_graph(&fake, &config).unwrap();
        assert_eq!(shown.stats().orphan_commits, 1);
        assert!(!shown.commit("A").unwrap().orphan);
        assert!(shown.commit("Z").unwrap().orphan);
    }

    #[test]
    fn session_state_follows_attachment() {
        let mut session = Session::new(GraphConfig::default());
        assert_eq!(session.state(), SessionState::Unset);
        assert!(session.load().is_none());

        session.attach(PathBuf::from("/repo"), Box::new(FakeRetriever::default()));
        assert_eq!(session.state(), SessionState::Watching);
        assert_eq!(session.path(), Some(Path::new("/repo")));
        assert!(session.load().unwrap().unwrap().is_empty());

        session.detach();
        assert_eq!(session.state(), SessionState::Unset);
        assert_eq!(session.path(), None);
    }

    #[test]
    fn set_config_reports_change() {
        let mut session = Session::new(GraphConfig::default());
        assert!(!session.set_config(GraphConfig::default()));
        let config = GraphConfig {
            visualize_comments: true,
            ..GraphConfig::default()
        };
        assert!(session.set_config(config));
        assert!(!session.set_config(config));
    }
}
