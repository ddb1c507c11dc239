//! Error types for clockpool.

use thiserror::Error;

use crate::common::{FileId, FrameId, PageId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors from the buffer manager.
///
/// None of these are retried internally. `BufferExceeded` is an expected
/// condition under load; `BadBuffer` and `Directory` point at a logic defect.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure reported by a file collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Page directory insert/remove inconsistency.
    #[error("page directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// The clock sweep found no evictable frame: every frame is pinned.
    #[error("buffer pool exceeded: no unpinned frame available")]
    BufferExceeded,

    /// The page is not resident in the pool.
    #[error("{page} of {file} is not in the buffer pool")]
    NotFound { file: FileId, page: PageId },

    /// Release (or access) of a page whose pin count is already zero.
    #[error("{page} of {file} is not pinned")]
    NotPinned { file: FileId, page: PageId },

    /// The page is pinned and the operation requires it not to be.
    #[error("{page} of {file} is still pinned")]
    PagePinned { file: FileId, page: PageId },

    /// Frame metadata disagrees with itself or with the directory.
    #[error("bad buffer: {frame} is in an inconsistent state")]
    BadBuffer { frame: FrameId },

    /// The operation names a file that was never registered (or was closed).
    #[error("{0} is not registered with the buffer manager")]
    UnknownFile(FileId),
}

/// Errors from the page directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// An entry for this page already exists.
    #[error("{page} of {file} is already mapped to {frame}")]
    Duplicate {
        file: FileId,
        page: PageId,
        frame: FrameId,
    },

    /// No entry exists for this page.
    #[error("{page} of {file} has no directory entry")]
    Missing { file: FileId, page: PageId },
}
