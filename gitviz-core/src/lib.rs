pub mod path;
pub mod repository;
pub mod retriever;

pub use path::{git_dir, is_bare_repository, is_valid_repository};
pub use repository::{Repository, UNREACHABLE_LIMIT};
pub use retriever::LogRetriever;
