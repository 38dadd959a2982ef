//! Collection and document paths
//!
//! Messages live in a sub-collection per conversation
//! (`chats/{id}/messages`, `groups/{id}/messages`), so paths alternate
//! collection / document segments the whole way down.

use std::fmt;

/// Path of a collection, e.g. `chats` or `chats/c42/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Top-level collection by name.
    pub fn root(name: &str) -> Self {
        CollectionPath(name.to_string())
    }

    /// Path of a document inside this collection.
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a single document, e.g. `chats/c42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// Sub-collection under this document.
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}/{}", self.collection.0, self.id, name))
    }

    pub fn parent(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection.0, self.id)
    }
}
