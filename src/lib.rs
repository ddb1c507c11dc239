//! clockpool - a page-cache buffer manager with CLOCK replacement.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          clockpool                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │     SharedBufferManager (one lock) + PinnedPage guards   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Buffer Manager (buffer/)                   │   │
//! │  │   fetch / release / allocate / dispose / flush          │   │
//! │  │   ┌─────────────┐ ┌──────────────┐ ┌────────────────┐   │   │
//! │  │   │ FrameTable  │ │PageDirectory │ │ ClockReplacer  │   │   │
//! │  │   └─────────────┘ └──────────────┘ └────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │        PageFile trait: DiskFile | MemFile | yours        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (FileId, PageId, FrameId, Error, config)
//! - [`buffer`] - The buffer manager and its parts
//! - [`storage`] - Page files and the page slot type
//!
//! # Quick Start
//! ```no_run
//! use clockpool::{BufferManager, storage::DiskFile};
//!
//! let mut bm = BufferManager::new(64);
//! let file = bm.register_file(DiskFile::create("my_table.db")?);
//!
//! let (page_id, page) = bm.allocate_page(file)?;
//! page.as_mut_slice()[..5].copy_from_slice(b"hello");
//! bm.release_page(file, page_id, true)?;
//!
//! bm.flush_file(file)?;
//! # Ok::<(), clockpool::Error>(())
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{DirectoryError, Error, FileId, FrameId, PageId, Result};

pub use buffer::{BufferManager, BufferStats, PinnedPage, SharedBufferManager};
pub use storage::page::Page;
pub use storage::{DiskFile, MemFile, PageFile};
