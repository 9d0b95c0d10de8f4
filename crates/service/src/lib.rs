//! Core document-store services.
//! - Resolves the store location from a sidecar config record.
//! - Seeds a default document on first use.
//! - Whole-document reads and optimistically checked whole-document writes.

pub mod errors;
pub mod paths;
pub mod runtime;
pub mod store;
