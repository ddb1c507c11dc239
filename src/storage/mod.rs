//! Storage layer - page files and the page slot type.
//!
//! - [`PageFile`] - The file collaborator interface used by the buffer manager
//! - [`DiskFile`] - A page file stored as one OS file
//! - [`MemFile`] - An in-memory page file with fault injection
//! - [`page`] - The fixed-size page slot

mod disk_file;
mod file;
mod mem_file;
pub mod page;

pub use disk_file::DiskFile;
pub use file::PageFile;
pub use mem_file::MemFile;
