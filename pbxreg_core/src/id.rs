//! Object identifiers for the project's `objects` table.

use serde::Serialize;
use std::fmt;

/// Number of bytes in a generated id (24 hex characters, as Xcode writes them).
pub const ID_SIZE: usize = 12;

/// Key of an object in the project's `objects` table.
///
/// Ids read from disk are kept verbatim. Ids created by this crate are
/// derived from a BLAKE3 hash of a seed, so the same edit applied to the
/// same project always produces the same ids.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an id read from a project file.
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    /// Derive an id from seed parts and a collision counter.
    ///
    /// Parts are length-prefixed before hashing so `["ab", "c"]` and
    /// `["a", "bc"]` give different ids.
    pub fn derive(parts: &[&str], attempt: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.update(&attempt.to_le_bytes());
        let hash = hasher.finalize();
        ObjectId(hex::encode_upper(&hash.as_bytes()[..ID_SIZE]))
    }

    /// The id as written in the project file.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::new(id)
    }
}
