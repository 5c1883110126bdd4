//! Session state for a live commit graph: configuration, change events,
//! filesystem watching and the refresh coordinator that ties them together.

pub mod config;
pub mod events;
pub mod session;
pub mod coordinator;

pub use config::{ConfigError, GraphConfig};
pub use coordinator::{CoordinatorOptions, RefreshCoordinator, RetrieverFactory};
pub use events::{EventBus, EventDebouncer, GitWatcher, RepositoryEvent, SessionEvent};
pub use session::{load_graph, Session, SessionState};
