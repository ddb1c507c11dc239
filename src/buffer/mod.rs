//! Buffer pool management.
//!
//! The buffer manager is the in-memory page cache between callers and page
//! files. It owns a fixed pool of frames, each holding at most one page.
//!
//! # Components
//! - [`BufferManager`] - The page cache and its pin/release protocol
//! - [`FrameTable`] / [`FrameDesc`] - Per-frame metadata
//! - [`PageDirectory`] - `(file, page) → frame` index
//! - [`ClockReplacer`] - CLOCK (second-chance) victim selection
//! - [`SharedBufferManager`] / [`PinnedPage`] - Locked sharing and RAII pins
//! - [`BufferStats`] - Access and I/O counters

mod buffer_manager;
pub mod clock;
pub mod directory;
mod files;
pub mod frame;
mod page_guard;
mod shared;
mod stats;

pub use buffer_manager::BufferManager;
pub use clock::{ClockReplacer, Victim};
pub use directory::PageDirectory;
pub use frame::{FrameDesc, FrameTable};
pub use page_guard::PinnedPage;
pub use shared::SharedBufferManager;
pub use stats::BufferStats;
