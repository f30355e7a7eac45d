//! JSON container for compact documents
//!
//! The minimize core only produces `CompactDocument`s; this module packs
//! them as JSON text (`{"version": 1, "body": {"1": {...}, "33": [...]}}`).
//! Key codes travel as decimal object keys and sequence order is kept.

mod errors;

pub use errors::{ContainerError, ContainerResult};

use crate::minimize::CompactDocument;

/// Packs a document into JSON bytes.
pub fn encode(document: &CompactDocument) -> ContainerResult<Vec<u8>> {
    serde_json::to_vec(document).map_err(|e| ContainerError::Encode(e.to_string()))
}

/// Unpacks a document from JSON bytes.
pub fn decode(bytes: &[u8]) -> ContainerResult<CompactDocument> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ContainerError::Empty);
    }
    serde_json::from_slice(bytes).map_err(|e| ContainerError::Decode(e.to_string()))
}
