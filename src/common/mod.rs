//! Common types shared across clockpool.
//!
//! - Configuration constants
//! - Error types
//! - Identifiers (FileId, PageId, FrameId)

pub mod config;
pub mod error;
mod file_id;
mod frame_id;
mod page_id;

pub use error::{DirectoryError, Error, Result};
pub use file_id::FileId;
pub use frame_id::FrameId;
pub use page_id::PageId;
