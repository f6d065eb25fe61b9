//! Server-assigned identifiers.

use std::fmt;
use std::sync::Arc;

/// A place id as the server reports it; numeric ids arrive in their decimal
/// text form.
///
/// Backed by `Arc<str>` so place lists clone into every state snapshot
/// without copying strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceId(Arc<str>);

impl PlaceId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlaceId {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
