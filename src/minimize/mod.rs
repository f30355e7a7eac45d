//! Minimize protocol
//!
//! Maps structured records to a dense, key-coded form and back:
//!
//! ```ignore
//! let (version, compact) = minimize(&record, tree)?;
//! let decoded = maximize(version, &compact, tree);
//! assert_eq!(decoded.record, record);
//! ```
//!
//! `minimize` is strict and fails on fields the schema does not declare.
//! `maximize` is lenient: it skips unknown key codes and drops malformed
//! fields, reporting both in `Maximized`.

mod maximizer;
mod minimizer;
mod record;

pub use maximizer::{maximize, Maximized, Maximizer};
pub use minimizer::{minimize, Minimizer};
pub use record::{CompactDocument, CompactRecord, CompactValue, StructuredRecord};
