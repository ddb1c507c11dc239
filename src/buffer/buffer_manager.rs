//! Buffer Manager - the page cache.
//!
//! The [`BufferManager`] provides:
//! - Page caching between files and memory
//! - Pin-based exclusion from eviction
//! - Write-back of dirty pages on eviction and flush
//! - CLOCK (second-chance) replacement

use std::fmt;

use tracing::{debug, trace, warn};

use crate::buffer::clock::{ClockReplacer, Victim};
use crate::buffer::directory::PageDirectory;
use crate::buffer::files::FileRegistry;
use crate::buffer::frame::FrameTable;
use crate::buffer::BufferStats;
use crate::common::{Error, FileId, FrameId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageFile;

/// Multiplexes a fixed pool of page frames across the pages of any number
/// of files.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                      BufferManager                          │
/// │  ┌──────────────────┐  ┌───────────────────────────────┐    │
/// │  │    directory     │  │   frames: FrameTable          │    │
/// │  │(File,Page) → Fid │─▶│  [Desc0] [Desc1] [Desc2] ...  │    │
/// │  └──────────────────┘  ├───────────────────────────────┤    │
/// │                        │   pool: Vec<Page>             │    │
/// │                        │  [Page0] [Page1] [Page2] ...  │    │
/// │                        └───────────────────────────────┘    │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
/// │  │    clock     │  │    files     │  │    stats     │       │
/// │  │ hand + sweep │  │FileId → File │  │   counters   │       │
/// │  └──────────────┘  └──────────────┘  └──────────────┘       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Protocol
/// Every [`fetch_page`](Self::fetch_page) or
/// [`allocate_page`](Self::allocate_page) pins the page once; the caller
/// must balance it with [`release_page`](Self::release_page). A pinned page
/// is never evicted, so its content stays in place until the last pin goes.
/// The returned `&mut Page` borrow ends before the next call; use
/// [`page`](Self::page) / [`page_mut`](Self::page_mut) to get back at a page
/// still pinned.
///
/// # Concurrency
/// No internal synchronization: every method takes `&self` or `&mut self`.
/// Use [`SharedBufferManager`](crate::buffer::SharedBufferManager) to share
/// one manager between threads behind a single lock.
///
/// # Shutdown
/// Dropping the manager writes back every dirty page. Write failures at
/// that point are logged and otherwise ignored.
///
/// # Usage
/// ```
/// use clockpool::{BufferManager, storage::MemFile};
///
/// let mut bm = BufferManager::new(8);
/// let file = bm.register_file(MemFile::new());
///
/// let (pid, page) = bm.allocate_page(file).unwrap();
/// page.as_mut_slice()[0] = 0xAB;
/// bm.release_page(file, pid, true).unwrap();
///
/// let page = bm.fetch_page(file, pid).unwrap();
/// assert_eq!(page.as_slice()[0], 0xAB);
/// bm.release_page(file, pid, false).unwrap();
/// ```
pub struct BufferManager {
    /// Per-frame metadata.
    frames: FrameTable,

    /// Page content, slot `i` belongs to frame `i`.
    pool: Vec<Page>,

    /// Maps resident pages to frames.
    directory: PageDirectory,

    /// Eviction cursor.
    clock: ClockReplacer,

    /// Registered file collaborators.
    files: FileRegistry,

    stats: BufferStats,
}

impl BufferManager {
    /// Create a buffer manager with `num_frames` frames.
    ///
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");

        Self {
            frames: FrameTable::new(num_frames),
            pool: (0..num_frames).map(|_| Page::new()).collect(),
            directory: PageDirectory::new(num_frames),
            clock: ClockReplacer::new(num_frames),
            files: FileRegistry::new(),
            stats: BufferStats::default(),
        }
    }

    // ========================================================================
    // Public API: Files
    // ========================================================================

    /// Hand a file to the manager and get its id.
    pub fn register_file<F: PageFile + 'static>(&mut self, file: F) -> FileId {
        let id = self.files.register(Box::new(file));
        debug!(file = %id, "registered file");
        id
    }

    /// Flush every page of `file` out of the pool, then hand the file back.
    ///
    /// # Errors
    /// Fails like [`flush_file`](Self::flush_file); the file stays
    /// registered in that case.
    pub fn close_file(&mut self, file: FileId) -> Result<Box<dyn PageFile>> {
        self.flush_file(file)?;
        let handle = self.files.remove(file)?;
        debug!(file = %file, "closed file");
        Ok(handle)
    }

    /// Number of registered files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // ========================================================================
    // Public API: Pin and release
    // ========================================================================

    /// Pin `page` of `file`, reading it in if it is not resident.
    ///
    /// # Errors
    /// - `Error::UnknownFile` if `file` is not registered
    /// - `Error::NotFound` for `PageId::INVALID`
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - `Error::Io` if evicting a dirty page or reading this one fails
    /// - `Error::Directory` on a directory inconsistency
    pub fn fetch_page(&mut self, file: FileId, page: PageId) -> Result<&mut Page> {
        self.files.check(file)?;
        if !page.is_valid() {
            return Err(Error::NotFound { file, page });
        }

        if let Some(frame_id) = self.directory.lookup(file, page) {
            let desc = &mut self.frames[frame_id];
            desc.referenced = true;
            desc.pin_count += 1;

            self.stats.accesses += 1;
            self.stats.hits += 1;
            trace!(file = %file, page = %page, frame = %frame_id, "hit");

            return Ok(&mut self.pool[frame_id.0]);
        }

        let frame_id = self.allocate_frame()?;

        self.files
            .get_mut(file)?
            .read_page(page, &mut self.pool[frame_id.0])?;
        self.stats.disk_reads += 1;

        self.directory.insert(file, page, frame_id)?;
        self.frames.set(frame_id, file, page);

        self.stats.accesses += 1;
        self.stats.misses += 1;
        debug!(file = %file, page = %page, frame = %frame_id, "miss: read from disk");

        Ok(&mut self.pool[frame_id.0])
    }

    /// Drop one pin on `page` of `file`, marking it dirty if `dirty`.
    ///
    /// The dirty flag is sticky: passing `false` never clears it.
    ///
    /// # Errors
    /// - `Error::NotFound` if the page is not resident
    /// - `Error::NotPinned` if its pin count is already zero
    pub fn release_page(&mut self, file: FileId, page: PageId, dirty: bool) -> Result<()> {
        let frame_id = self
            .directory
            .lookup(file, page)
            .ok_or(Error::NotFound { file, page })?;

        let desc = &mut self.frames[frame_id];
        if !desc.is_pinned() {
            return Err(Error::NotPinned { file, page });
        }

        desc.pin_count -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Allocate a fresh page in `file` and pin it in the pool.
    ///
    /// The page starts zeroed; nothing is read from disk.
    ///
    /// If the file allocation succeeds but no frame can be found, the
    /// error is returned and the page stays allocated in the file.
    ///
    /// # Errors
    /// - `Error::UnknownFile` if `file` is not registered
    /// - `Error::Io` if the file cannot allocate, or evicting a dirty page fails
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - `Error::Directory` on a directory inconsistency
    pub fn allocate_page(&mut self, file: FileId) -> Result<(PageId, &mut Page)> {
        let page = self.files.get_mut(file)?.allocate_page()?;

        let frame_id = self.allocate_frame()?;

        self.directory.insert(file, page, frame_id)?;
        self.frames.set(frame_id, file, page);
        self.pool[frame_id.0].reset();

        self.stats.accesses += 1;
        debug!(file = %file, page = %page, frame = %frame_id, "allocated page");

        Ok((page, &mut self.pool[frame_id.0]))
    }

    /// Drop `page` of `file` from the pool and deallocate it in the file.
    ///
    /// A resident page is discarded without write-back. A pinned page is
    /// refused: the pool and the file are left untouched.
    ///
    /// # Errors
    /// - `Error::UnknownFile` if `file` is not registered
    /// - `Error::NotFound` for `PageId::INVALID`
    /// - `Error::PagePinned` if the page is resident and pinned
    /// - `Error::Io` if the file deallocation fails
    pub fn dispose_page(&mut self, file: FileId, page: PageId) -> Result<()> {
        self.files.check(file)?;
        if !page.is_valid() {
            return Err(Error::NotFound { file, page });
        }

        if let Some(frame_id) = self.directory.lookup(file, page) {
            if self.frames[frame_id].is_pinned() {
                return Err(Error::PagePinned { file, page });
            }
            self.directory.remove(file, page)?;
            self.frames.clear(frame_id);
            debug!(file = %file, page = %page, frame = %frame_id, "disposed resident page");
        }

        self.files.get_mut(file)?.dispose_page(page)?;
        Ok(())
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write back and evict every resident page of `file`.
    ///
    /// Frames are visited in order. The call is not atomic: if it stops on
    /// an error, pages handled before that point stay written and evicted.
    ///
    /// # Errors
    /// - `Error::UnknownFile` if `file` is not registered
    /// - `Error::PagePinned` on the first pinned page of `file`; its dirty
    ///   bit is left as is
    /// - `Error::Io` if a write-back fails
    /// - `Error::BadBuffer` if an empty frame claims to belong to `file`
    /// - `Error::Directory` if a resident page has no directory entry
    pub fn flush_file(&mut self, file: FileId) -> Result<()> {
        self.files.check(file)?;

        for i in 0..self.frames.len() {
            let frame_id = FrameId::new(i);
            let desc = self.frames[frame_id];

            let page = match desc.owner {
                Some((owner, page)) if owner == file => page,
                _ => continue,
            };

            if !desc.occupied {
                return Err(Error::BadBuffer { frame: frame_id });
            }
            if desc.is_pinned() {
                return Err(Error::PagePinned { file, page });
            }

            if desc.dirty {
                self.write_back(frame_id, file, page)?;
            }

            self.directory.remove(file, page)?;
            self.frames.clear(frame_id);
        }

        debug!(file = %file, "flushed file");
        Ok(())
    }

    /// Write back `page` of `file` if it is resident and dirty.
    ///
    /// The page stays resident (and pinned, if it was).
    ///
    /// # Errors
    /// - `Error::Io` if the write-back fails
    pub fn flush_page(&mut self, file: FileId, page: PageId) -> Result<()> {
        let Some(frame_id) = self.directory.lookup(file, page) else {
            return Ok(());
        };

        if self.frames[frame_id].dirty {
            self.write_back(frame_id, file, page)?;
        }
        Ok(())
    }

    /// Write back every dirty page in the pool, keeping them resident.
    ///
    /// # Errors
    /// Stops at the first failed write-back.
    pub fn flush_all(&mut self) -> Result<()> {
        for i in 0..self.frames.len() {
            let frame_id = FrameId::new(i);
            let desc = self.frames[frame_id];

            if let (true, true, Some((file, page))) = (desc.occupied, desc.dirty, desc.owner) {
                self.write_back(frame_id, file, page)?;
            }
        }
        Ok(())
    }

    /// Shut the manager down: write back dirty pages and free the pool.
    ///
    /// Same as dropping it; write-back failures are logged and ignored.
    pub fn shutdown(self) {
        drop(self);
    }

    // ========================================================================
    // Public API: Page access and info
    // ========================================================================

    /// Content of a resident, pinned page.
    ///
    /// # Errors
    /// - `Error::NotFound` if the page is not resident
    /// - `Error::NotPinned` if nobody holds a pin on it
    pub fn page(&self, file: FileId, page: PageId) -> Result<&Page> {
        let frame_id = self.pinned_frame(file, page)?;
        Ok(&self.pool[frame_id.0])
    }

    /// Mutable content of a resident, pinned page.
    ///
    /// Writing does not mark the page dirty; say so on release.
    ///
    /// # Errors
    /// Same as [`page`](Self::page).
    pub fn page_mut(&mut self, file: FileId, page: PageId) -> Result<&mut Page> {
        let frame_id = self.pinned_frame(file, page)?;
        Ok(&mut self.pool[frame_id.0])
    }

    /// Pin count of a resident page, or `None` if it is not resident.
    pub fn pin_count(&self, file: FileId, page: PageId) -> Option<u32> {
        self.directory
            .lookup(file, page)
            .map(|fid| self.frames[fid].pin_count)
    }

    /// Dirty flag of a resident page, or `None` if it is not resident.
    pub fn is_dirty(&self, file: FileId, page: PageId) -> Option<bool> {
        self.directory
            .lookup(file, page)
            .map(|fid| self.frames[fid].dirty)
    }

    /// Check if `page` of `file` is in the pool.
    pub fn is_resident(&self, file: FileId, page: PageId) -> bool {
        self.directory.lookup(file, page).is_some()
    }

    /// Frame currently holding `page` of `file`.
    pub fn frame_of(&self, file: FileId, page: PageId) -> Option<FrameId> {
        self.directory.lookup(file, page)
    }

    /// Number of frames in the pool.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of pages in the pool.
    pub fn resident_count(&self) -> usize {
        self.directory.len()
    }

    /// Current counters.
    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Reset all counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Verify that the frame table is self-consistent and agrees with the
    /// directory in both directions.
    ///
    /// # Errors
    /// `Error::BadBuffer` naming the first offending frame.
    pub fn check_invariants(&self) -> Result<()> {
        for (frame_id, desc) in self.frames.iter() {
            if !desc.is_consistent() {
                return Err(Error::BadBuffer { frame: frame_id });
            }
            if let Some((file, page)) = desc.owner {
                if self.directory.lookup(file, page) != Some(frame_id) {
                    return Err(Error::BadBuffer { frame: frame_id });
                }
            }
        }

        for (file, page, frame_id) in self.directory.iter() {
            let owned = frame_id.0 < self.frames.len()
                && self.frames[frame_id].occupied
                && self.frames[frame_id].is_owned_by(file, page);
            if !owned {
                return Err(Error::BadBuffer { frame: frame_id });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn pinned_frame(&self, file: FileId, page: PageId) -> Result<FrameId> {
        let frame_id = self
            .directory
            .lookup(file, page)
            .ok_or(Error::NotFound { file, page })?;

        if !self.frames[frame_id].is_pinned() {
            return Err(Error::NotPinned { file, page });
        }
        Ok(frame_id)
    }

    /// Find a frame for a new page, evicting if necessary.
    ///
    /// On success the frame is empty and has no directory entry. If a dirty
    /// victim cannot be written back, the victim keeps its page and dirty bit.
    fn allocate_frame(&mut self) -> Result<FrameId> {
        let frame_id = match self.clock.sweep(&mut self.frames) {
            Some(Victim::Free(frame_id)) => return Ok(frame_id),
            Some(Victim::Evict(frame_id)) => frame_id,
            None => {
                debug!(frames = self.frames.len(), "every frame is pinned");
                return Err(Error::BufferExceeded);
            }
        };

        let desc = self.frames[frame_id];
        let (file, page) = desc.owner.ok_or(Error::BadBuffer { frame: frame_id })?;

        if desc.dirty {
            self.write_back(frame_id, file, page)?;
        }

        self.directory.remove(file, page)?;
        self.frames.clear(frame_id);

        self.stats.evictions += 1;
        debug!(file = %file, page = %page, frame = %frame_id, "evicted");

        Ok(frame_id)
    }

    /// Write frame `frame_id` to `page` of `file` and clear its dirty bit.
    fn write_back(&mut self, frame_id: FrameId, file: FileId, page: PageId) -> Result<()> {
        self.files
            .get_mut(file)?
            .write_page(page, &self.pool[frame_id.0])?;

        self.frames[frame_id].dirty = false;
        self.stats.disk_writes += 1;
        trace!(file = %file, page = %page, frame = %frame_id, "wrote back");
        Ok(())
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        for i in 0..self.frames.len() {
            let frame_id = FrameId::new(i);
            let desc = self.frames[frame_id];

            if let (true, true, Some((file, page))) = (desc.occupied, desc.dirty, desc.owner) {
                if let Err(err) = self.write_back(frame_id, file, page) {
                    warn!(file = %file, page = %page, error = %err, "lost dirty page at shutdown");
                }
            }
        }
    }
}

impl fmt::Display for BufferManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BufferManager: {} frames, {} resident, hand at {}",
            self.frames.len(),
            self.directory.len(),
            self.clock.hand()
        )?;

        for (frame_id, desc) in self.frames.iter() {
            write!(f, "{:>4}", frame_id.0)?;
            match desc.owner {
                Some((file, page)) => write!(f, "  {} {}", file, page)?,
                None => write!(f, "  -")?,
            }
            write!(f, "  pin: {}", desc.pin_count)?;
            if desc.dirty {
                write!(f, "  dirty")?;
            }
            if desc.referenced {
                write!(f, "  ref")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BufferManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferManager")
            .field("num_frames", &self.frames.len())
            .field("resident", &self.directory.len())
            .field("files", &self.files.len())
            .field("stats", &self.stats)
            .finish()
    }
}
