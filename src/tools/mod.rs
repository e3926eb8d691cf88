//! Resources a stage can be granted
//!
//! The only tool the crew uses is read access to a local knowledge file.
//! Access is granted per stage, and only to roles that declare
//! [`Capability::CanReadFile`](crate::agents::Capability::CanReadFile).
//!
//! ```ignore
//! let knowledge = FileResource::new("texto.txt");
//! let text = knowledge.read_or_describe().await;
//! ```

/// Knowledge file resource.
pub mod file;

pub use file::{FileResource, TEXT_FILE_READ_TOOL};
