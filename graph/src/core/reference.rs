use serde::{Deserialize, Serialize};

/// Name of the symbolic reference to the current position. Matched exactly.
pub const HEAD: &str = "HEAD";

/// A named pointer to a commit: branch, tag, or the symbolic HEAD
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    /// True iff HEAD currently resolves through this reference
    pub is_active: bool,
}

impl Reference {
    pub fn new(name: impl Into<String>, is_active: bool) -> Self {
        Self {
            name: name.into(),
            is_active,
        }
    }

    pub fn head() -> Self {
        Self::new(HEAD, false)
    }

    pub fn is_head(&self) -> bool {
        self.name == HEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_sentinel_is_case_sensitive() {
        assert!(Reference::head().is_head());
        assert!(!Reference::new("head", false).is_head());
        assert!(!Reference::new("main", true).is_head());
    }
}
