use anyhow::Result;
use gitviz_core::{is_valid_repository, LogRetriever, Repository};
use graph::CommitGraph;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{mpsc, Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::events::{EventBus, EventDebouncer, GitWatcher, RepositoryEvent, SessionEvent};
use crate::session::{Session, SessionState};

/// Opens a retriever for a repository path
pub type RetrieverFactory = Box<dyn Fn(&Path) -> Result<Box<dyn LogRetriever>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Start a filesystem watch for every repository that is set
    pub watch: bool,
    /// Quiet period before a burst of changes triggers one refresh
    pub debounce: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            watch: true,
            debounce: Duration::from_millis(300),
        }
    }
}

/// Owns the current graph and rebuilds it on every trigger.
///
/// Readers get an immutable snapshot from [`graph`](Self::graph); only the
/// pointer swap is locked. Refreshes are serialized, and triggers that arrive
/// while one is running collapse into a single follow-up refresh.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
    options: CoordinatorOptions,
    open_retriever: RetrieverFactory,
    watch: Mutex<Option<WatchHandle>>,
}

struct Inner {
    session: Mutex<Session>,
    current: RwLock<Arc<CommitGraph>>,
    refresh_lock: Mutex<()>,
    pending: AtomicBool,
    observers: Mutex<Vec<Sender<SessionEvent>>>,
}

impl RefreshCoordinator {
    /// Coordinator backed by git2 repositories
    pub fn new(config: GraphConfig, options: CoordinatorOptions) -> Self {
        Self::with_retriever_factory(
            config,
            options,
            Box::new(|path: &Path| -> Result<Box<dyn LogRetriever>> {
                Ok(Box::new(Repository::open(path)?))
            }),
        )
    }

    pub fn with_retriever_factory(
        config: GraphConfig,
        options: CoordinatorOptions,
        open_retriever: RetrieverFactory,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::new(config)),
                current: RwLock::new(Arc::new(CommitGraph::new())),
                refresh_lock: Mutex::new(()),
                pending: AtomicBool::new(false),
                observers: Mutex::new(Vec::new()),
            }),
            options,
            open_retriever,
            watch: Mutex::new(None),
        }
    }

    /// Current graph snapshot
    pub fn graph(&self) -> Arc<CommitGraph> {
        self.inner.current.read().clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.session.lock().state()
    }

    pub fn config(&self) -> GraphConfig {
        self.inner.session.lock().config()
    }

    pub fn repository_path(&self) -> Option<PathBuf> {
        self.inner.session.lock().path().map(Path::to_path_buf)
    }

    /// Receive one [`SessionEvent`] per completed refresh or reset
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.inner.observers.lock().push(tx);
        rx
    }

    /// Point the session at a repository, or clear it with `None`.
    ///
    /// Any existing watch is torn down first. An empty, missing or non-git
    /// path leaves the session unset with an empty graph.
    pub fn set_repository_path(&self, path: Option<PathBuf>) -> SessionState {
        self.stop_watch();

        let Some(path) = path.filter(|path| is_valid_repository(path)) else {
            info!("repository path cleared");
            self.inner.reset(SessionEvent::Cleared);
            return SessionState::Unset;
        };

        let retriever = match (self.open_retriever)(&path) {
            Ok(retriever) => retriever,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open repository");
                self.inner.reset(SessionEvent::RefreshFailed(format!("{:#}", err)));
                return SessionState::Unset;
            }
        };

        {
            let mut session = self.inner.session.lock();
            session.attach(path.clone(), retriever);
            // A different repository's graph must not linger if the first load fails.
            *self.inner.current.write() = Arc::new(CommitGraph::new());
        }
        info!(path = %path.display(), "repository set");
        self.inner.refresh();

        if self.options.watch {
            match WatchHandle::start(&path, Arc::downgrade(&self.inner), self.options.debounce) {
                Ok(handle) => *self.watch.lock() = Some(handle),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to watch repository");
                    self.inner.notify(SessionEvent::WatchFailed(format!("{:#}", err)));
                }
            }
        }
        SessionState::Watching
    }

    /// Replace the configuration. Returns the graph after the change and
    /// whether anything changed; an unchanged config does not refresh.
    pub fn apply_config(&self, config: GraphConfig) -> (Arc<CommitGraph>, bool) {
        let (changed, attached) = {
            let mut session = self.inner.session.lock();
            (session.set_config(config), session.state() == SessionState::Watching)
        };
        if changed && attached {
            debug!(?config, "config changed");
            self.inner.refresh();
        }
        (self.graph(), changed)
    }

    /// Rebuild the graph now; blocks until the refresh (or the one it was
    /// merged into) has finished.
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    fn stop_watch(&self) {
        // Take the handle first: the worker needs the session while stopping.
        let handle = self.watch.lock().take();
        drop(handle);
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.stop_watch();
    }
}

impl Inner {
    fn refresh(&self) {
        self.pending.store(true, Ordering::SeqCst);
        let _guard = self.refresh_lock.lock();
        while self.pending.swap(false, Ordering::SeqCst) {
            self.refresh_once();
        }
    }

    fn refresh_once(&self) {
        let session = self.session.lock();
        let event = match session.load() {
            None => return,
            Some(Ok(graph)) => {
                let graph = Arc::new(graph);
                *self.current.write() = graph.clone();
                debug!(vertices = graph.vertex_count(), edges = graph.edge_count(), "graph replaced");
                SessionEvent::GraphReplaced(graph)
            }
            Some(Err(err)) => {
                warn!(error = %format!("{:#}", err), "refresh failed; keeping previous graph");
                SessionEvent::RefreshFailed(format!("{:#}", err))
            }
        };
        // Notify under the session lock so a concurrent reset cannot be overtaken.
        self.notify(event);
    }

    fn reset(&self, event: SessionEvent) {
        let mut session = self.session.lock();
        session.detach();
        *self.current.write() = Arc::new(CommitGraph::new());
        self.notify(event);
    }

    fn notify(&self, event: SessionEvent) {
        self.observers
            .lock()
            .retain(|observer| observer.send(event.clone()).is_ok());
    }
}

/// Filesystem watch plus the worker thread turning its events into refreshes
struct WatchHandle {
    watcher: GitWatcher,
    shutdown: Sender<RepositoryEvent>,
    worker: Option<JoinHandle<()>>,
}

impl WatchHandle {
    fn start(path: &Path, inner: Weak<Inner>, debounce: Duration) -> Result<Self> {
        let bus = EventBus::new();
        let shutdown = bus.sender();
        let mut watcher = GitWatcher::new(path, bus.sender())?;
        watcher.watch()?;

        let events = bus.into_receiver();
        let worker = thread::Builder::new()
            .name("gitviz-watch".into())
            .spawn(move || run_watch_loop(events, inner, debounce))?;
        debug!(git_dir = %watcher.git_dir().display(), "watching repository");

        Ok(Self {
            watcher,
            shutdown,
            worker: Some(worker),
        })
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Err(err) = self.watcher.unwatch() {
            debug!(error = %err, "unwatch failed");
        }
        let _ = self.shutdown.send(RepositoryEvent::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("watch worker panicked");
            }
        }
    }
}

fn run_watch_loop(events: Receiver<RepositoryEvent>, inner: Weak<Inner>, debounce: Duration) {
    let mut debouncer = EventDebouncer::new(debounce);
    loop {
        let received = match debouncer.remaining() {
            Some(timeout) => events.recv_timeout(timeout),
            None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(RepositoryEvent::Changed) => debouncer.add(RepositoryEvent::Changed),
            Ok(RepositoryEvent::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if debouncer.take_if_ready().is_some() {
            let Some(inner) = inner.upgrade() else { break };
            debug!("repository changed on disk");
            inner.refresh();
        }
    }
    debug!("watch worker stopped");
}
