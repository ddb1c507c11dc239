//! RAII pin guard for pages of a [`SharedBufferManager`].
//!
//! A [`PinnedPage`] stands for one pin. While it lives the page cannot be
//! evicted; when it drops the pin is released, marked dirty if the page was
//! written through the guard.

use tracing::warn;

use super::shared::SharedBufferManager;
use crate::common::{FileId, PageId, Result};
use crate::storage::page::Page;

/// One pin on a resident page.
///
/// Content is reached through [`read`](Self::read) and
/// [`write`](Self::write), each of which takes the manager lock for the
/// duration of the closure. The closure must not call back into the same
/// manager.
///
/// Pinning only prevents eviction. Two guards on the same page may both
/// write; ordering their writes is up to the caller.
///
/// # Example
/// ```ignore
/// let mut guard = shared.fetch(file, page_id)?;
/// guard.write(|page| page.as_mut_slice()[0] = 0xFF)?;
/// // guard drops here, page marked dirty and unpinned
/// ```
pub struct PinnedPage<'a> {
    /// Manager to release through on drop.
    manager: &'a SharedBufferManager,
    file: FileId,
    page_id: PageId,
    /// Written through this guard; reported on release.
    dirty: bool,
    released: bool,
}

impl<'a> PinnedPage<'a> {
    /// Wrap a pin already taken on `page_id` of `file`.
    pub(crate) fn new(manager: &'a SharedBufferManager, file: FileId, page_id: PageId) -> Self {
        Self {
            manager,
            file,
            page_id,
            dirty: false,
            released: false,
        }
    }

    /// Get the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Get the file ID.
    #[inline]
    pub fn file_id(&self) -> FileId {
        self.file
    }

    /// Whether the page will be released dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Have the page released dirty even if it was not written through
    /// this guard.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Run `f` on the page content.
    ///
    /// # Errors
    /// `Error::NotFound` if the page has been taken out of the pool
    /// underneath the guard.
    pub fn read<R>(&self, f: impl FnOnce(&Page) -> R) -> Result<R> {
        let manager = self.manager.lock();
        let page = manager.page(self.file, self.page_id)?;
        Ok(f(page))
    }

    /// Run `f` on the mutable page content and mark the guard dirty.
    ///
    /// # Errors
    /// Same as [`read`](Self::read).
    pub fn write<R>(&mut self, f: impl FnOnce(&mut Page) -> R) -> Result<R> {
        let mut manager = self.manager.lock();
        let page = manager.page_mut(self.file, self.page_id)?;
        let out = f(page);
        self.dirty = true;
        Ok(out)
    }

    /// Release the pin now, reporting any error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.manager
            .lock()
            .release_page(self.file, self.page_id, self.dirty)
    }
}

impl Drop for PinnedPage<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let result = self
            .manager
            .lock()
            .release_page(self.file, self.page_id, self.dirty);
        if let Err(err) = result {
            warn!(file = %self.file, page = %self.page_id, error = %err, "release on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::common::Error;
    use crate::storage::MemFile;

    fn shared_with_file(num_frames: usize) -> (SharedBufferManager, FileId) {
        let mut bm = BufferManager::new(num_frames);
        let file = bm.register_file(MemFile::new());
        (SharedBufferManager::new(bm), file)
    }

    #[test]
    fn test_drop_releases_pin() {
        let (shared, f) = shared_with_file(2);

        let guard = shared.allocate(f).unwrap();
        let pid = guard.page_id();
        assert_eq!(shared.lock().pin_count(f, pid), Some(1));

        drop(guard);
        assert_eq!(shared.lock().pin_count(f, pid), Some(0));
        assert_eq!(shared.lock().is_dirty(f, pid), Some(false));
    }

    #[test]
    fn test_write_marks_dirty() {
        let (shared, f) = shared_with_file(2);

        let mut guard = shared.allocate(f).unwrap();
        let pid = guard.page_id();
        guard.write(|page| page.as_mut_slice()[1] = 0x21).unwrap();
        assert!(guard.is_dirty());
        drop(guard);

        assert_eq!(shared.lock().is_dirty(f, pid), Some(true));

        let guard = shared.fetch(f, pid).unwrap();
        assert_eq!(guard.read(|page| page.as_slice()[1]).unwrap(), 0x21);
    }

    #[test]
    fn test_read_only_guard_stays_clean() {
        let (shared, f) = shared_with_file(2);
        let pid = shared.allocate(f).unwrap().page_id();

        let guard = shared.fetch(f, pid).unwrap();
        guard.read(|page| page.as_slice()[0]).unwrap();
        drop(guard);

        assert_eq!(shared.lock().is_dirty(f, pid), Some(false));
    }

    #[test]
    fn test_guards_hold_pins_against_eviction() {
        let (shared, f) = shared_with_file(2);

        let g0 = shared.allocate(f).unwrap();
        let g1 = shared.allocate(f).unwrap();
        assert!(matches!(shared.allocate(f), Err(Error::BufferExceeded)));

        drop(g0);
        let g2 = shared.allocate(f).unwrap();
        assert_eq!(shared.lock().resident_count(), 2);
        drop(g1);
        drop(g2);
    }

    #[test]
    fn test_explicit_release() {
        let (shared, f) = shared_with_file(2);

        let mut guard = shared.allocate(f).unwrap();
        let pid = guard.page_id();
        guard.mark_dirty();
        guard.release().unwrap();

        assert_eq!(shared.lock().pin_count(f, pid), Some(0));
        assert_eq!(shared.lock().is_dirty(f, pid), Some(true));
    }
}
