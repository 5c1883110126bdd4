use std::path::{Path, PathBuf};
use std::time::Duration;
use std::sync::mpsc::Sender;
use notify::{RecommendedWatcher, Watcher, RecursiveMode, Event, EventKind, Config};
use anyhow::{Context, Result};
use tracing::warn;
use super::types::RepositoryEvent;

/// Watches a repository's git directory and forwards changes as
/// [`RepositoryEvent::Changed`]. Dropping it stops the watch.
pub struct GitWatcher {
    watcher: RecommendedWatcher,
    git_dir: PathBuf,
    watching: bool,
}

impl GitWatcher {
    pub fn new<P: AsRef<Path>>(repo_path: P, sender: Sender<RepositoryEvent>) -> Result<Self> {
        let git_dir = gitviz_core::git_dir(repo_path.as_ref());
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(ev) if is_relevant(&ev) => {
                    let _ = sender.send(RepositoryEvent::Changed);
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "repository watch error"),
            }
        })?;
        watcher.configure(Config::default().with_poll_interval(Duration::from_millis(500)))?;
        Ok(Self { watcher, git_dir, watching: false })
    }

    pub fn watch(&mut self) -> Result<()> {
        self.watcher
            .watch(&self.git_dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", self.git_dir.display()))?;
        self.watching = true;
        Ok(())
    }

    pub fn unwatch(&mut self) -> Result<()> {
        if self.watching {
            self.watcher.unwatch(&self.git_dir)?;
            self.watching = false;
        }
        Ok(())
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

/// Coarse mapping: any create/modify/remove outside lock-file churn
fn is_relevant(ev: &Event) -> bool {
    matches!(ev.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_))
        && ev.paths.iter().any(|path| !is_lock_file(path))
}

fn is_lock_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "lock")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn lock_files_are_ignored() {
        assert!(!is_relevant(&event(EventKind::Create(CreateKind::File), "/r/.git/index.lock")));
        assert!(is_relevant(&event(EventKind::Create(CreateKind::File), "/r/.git/refs/heads/main")));
    }

    #[test]
    fn access_events_are_ignored() {
        assert!(!is_relevant(&event(EventKind::Access(notify::event::AccessKind::Any), "/r/.git/HEAD")));
        assert!(is_relevant(&event(EventKind::Modify(ModifyKind::Any), "/r/.git/HEAD")));
    }
}
