pub mod types;
pub mod bus;
pub mod debounce;
pub mod watcher;

pub use types::{RepositoryEvent, SessionEvent};
pub use bus::EventBus;
pub use debounce::EventDebouncer;
pub use watcher::GitWatcher;
