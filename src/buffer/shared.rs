//! A buffer manager shared between threads behind one lock.

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::{BufferManager, PinnedPage};
use crate::common::{FileId, PageId, Result};

/// A [`BufferManager`] behind a single coarse lock.
///
/// The clock sweep mutates frame state across many steps, so every public
/// operation runs under the same mutex. Pins are handed out as
/// [`PinnedPage`] guards that release themselves on drop.
///
/// # Example
/// ```
/// use clockpool::{BufferManager, SharedBufferManager, storage::MemFile};
///
/// let mut bm = BufferManager::new(4);
/// let file = bm.register_file(MemFile::new());
/// let shared = SharedBufferManager::new(bm);
///
/// let pid = {
///     let mut guard = shared.allocate(file).unwrap();
///     guard.write(|page| page.as_mut_slice()[0] = 7).unwrap();
///     guard.page_id()
/// }; // released, marked dirty
///
/// let guard = shared.fetch(file, pid).unwrap();
/// assert_eq!(guard.read(|page| page.as_slice()[0]).unwrap(), 7);
/// ```
#[derive(Debug)]
pub struct SharedBufferManager {
    inner: Mutex<BufferManager>,
}

impl SharedBufferManager {
    /// Wrap `manager`.
    pub fn new(manager: BufferManager) -> Self {
        Self {
            inner: Mutex::new(manager),
        }
    }

    /// Pin `page` of `file` and return a guard for it.
    ///
    /// # Errors
    /// Same as [`BufferManager::fetch_page`].
    pub fn fetch(&self, file: FileId, page: PageId) -> Result<PinnedPage<'_>> {
        self.inner.lock().fetch_page(file, page)?;
        Ok(PinnedPage::new(self, file, page))
    }

    /// Allocate a fresh page in `file` and return a guard for it.
    ///
    /// # Errors
    /// Same as [`BufferManager::allocate_page`].
    pub fn allocate(&self, file: FileId) -> Result<PinnedPage<'_>> {
        let (page, _) = self.inner.lock().allocate_page(file)?;
        Ok(PinnedPage::new(self, file, page))
    }

    /// Lock the manager for any other operation.
    ///
    /// Do not hold the returned guard while dropping a [`PinnedPage`]: the
    /// lock is not reentrant.
    pub fn lock(&self) -> MutexGuard<'_, BufferManager> {
        self.inner.lock()
    }

    /// Unwrap the manager.
    pub fn into_inner(self) -> BufferManager {
        self.inner.into_inner()
    }
}
