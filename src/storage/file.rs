//! The file collaborator interface.

use std::io;

use crate::common::PageId;
use crate::storage::page::Page;

/// A file of fixed-size pages, as seen by the buffer manager.
///
/// The buffer manager never touches disk itself: every read, write,
/// allocation and deallocation goes through this trait. Calls are
/// synchronous and either complete or fail; failures are surfaced to the
/// buffer manager's caller unchanged, never retried.
///
/// Implementations are [`Send`] so a manager holding them can sit behind a
/// lock shared between threads.
pub trait PageFile: Send {
    /// Read page `page_id` into `dest`.
    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> io::Result<()>;

    /// Write `src` to page `page_id`.
    fn write_page(&mut self, page_id: PageId, src: &Page) -> io::Result<()>;

    /// Assign and reserve a fresh page number.
    fn allocate_page(&mut self) -> io::Result<PageId>;

    /// Release the on-disk storage of page `page_id`.
    fn dispose_page(&mut self, page_id: PageId) -> io::Result<()>;
}

impl<F: PageFile + ?Sized> PageFile for Box<F> {
    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> io::Result<()> {
        (**self).read_page(page_id, dest)
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> io::Result<()> {
        (**self).write_page(page_id, src)
    }

    fn allocate_page(&mut self) -> io::Result<PageId> {
        (**self).allocate_page()
    }

    fn dispose_page(&mut self, page_id: PageId) -> io::Result<()> {
        (**self).dispose_page(page_id)
    }
}

/// Error for a page number the file has not allocated.
pub(crate) fn unallocated(page_id: PageId) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} is not allocated", page_id),
    )
}
