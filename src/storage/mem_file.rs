//! In-memory [`PageFile`] with fault injection.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::PageId;
use crate::storage::file::{unallocated, PageFile};
use crate::storage::page::Page;

/// An in-memory page file.
///
/// `MemFile` is a cheap handle: clones share the same pages, counters and
/// failure switches. Register one clone with a buffer manager and keep
/// another to inspect what reached "disk" or to make the next I/O fail.
///
/// # Example
/// ```
/// use clockpool::storage::{MemFile, PageFile};
///
/// let mut file = MemFile::new();
/// let probe = file.clone();
///
/// file.allocate_page().unwrap();
/// assert_eq!(probe.allocated_count(), 1);
///
/// probe.fail_allocations(true);
/// assert!(file.allocate_page().is_err());
/// ```
#[derive(Clone, Default)]
pub struct MemFile {
    inner: Arc<Mutex<MemFileState>>,
}

#[derive(Default)]
struct MemFileState {
    /// Slot `n` holds page `n`; `None` once disposed.
    pages: Vec<Option<Box<Page>>>,
    fail_reads: bool,
    fail_writes: bool,
    fail_allocations: bool,
    reads: u64,
    writes: u64,
}

impl MemFile {
    /// Create an empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Make every subsequent allocation fail (or succeed again).
    pub fn fail_allocations(&self, fail: bool) {
        self.inner.lock().fail_allocations = fail;
    }

    /// Number of successful reads.
    pub fn reads(&self) -> u64 {
        self.inner.lock().reads
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }

    /// Number of pages currently allocated.
    pub fn allocated_count(&self) -> usize {
        self.inner.lock().pages.iter().filter(|p| p.is_some()).count()
    }

    /// Copy of byte `offset` of page `page_id` as stored in the file.
    pub fn byte_at(&self, page_id: PageId, offset: usize) -> Option<u8> {
        let state = self.inner.lock();
        state
            .pages
            .get(page_id.0 as usize)?
            .as_ref()
            .and_then(|page| page.as_slice().get(offset).copied())
    }
}

fn injected(op: &str) -> io::Error {
    io::Error::other(format!("injected {} failure", op))
}

impl PageFile for MemFile {
    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> io::Result<()> {
        let mut state = self.inner.lock();
        if state.fail_reads {
            return Err(injected("read"));
        }

        let page = state
            .pages
            .get(page_id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| unallocated(page_id))?;
        dest.copy_from(page);

        state.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> io::Result<()> {
        let mut state = self.inner.lock();
        if state.fail_writes {
            return Err(injected("write"));
        }

        let page = state
            .pages
            .get_mut(page_id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| unallocated(page_id))?;
        page.copy_from(src);

        state.writes += 1;
        Ok(())
    }

    fn allocate_page(&mut self) -> io::Result<PageId> {
        let mut state = self.inner.lock();
        if state.fail_allocations {
            return Err(injected("allocation"));
        }

        let slot = state.pages.iter().position(Option::is_none);
        let n = match slot {
            Some(n) => {
                state.pages[n] = Some(Box::default());
                n
            }
            None => {
                state.pages.push(Some(Box::default()));
                state.pages.len() - 1
            }
        };
        Ok(PageId::new(n as u32))
    }

    fn dispose_page(&mut self, page_id: PageId) -> io::Result<()> {
        let mut state = self.inner.lock();
        state
            .pages
            .get_mut(page_id.0 as usize)
            .and_then(Option::take)
            .map(|_| ())
            .ok_or_else(|| unallocated(page_id))
    }
}
