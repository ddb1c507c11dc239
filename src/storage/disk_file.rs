//! DiskFile - a [`PageFile`] backed by one OS file.
//!
//! Handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and disposing pages
//! - Creating and opening the file

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;
use crate::storage::file::{unallocated, PageFile};
use crate::storage::page::Page;

/// A page file stored as a single OS file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Free Pages
/// Disposed page numbers go on an in-memory free list and are handed out
/// again (lowest first) by `allocate_page`. The list is not persisted:
/// reopening a file treats every page up to its length as allocated.
///
/// # Durability
/// Writes and allocations are followed by `fsync()`.
#[derive(Debug)]
pub struct DiskFile {
    file: File,
    /// Number of page slots in the file, allocated or free.
    page_count: u32,
    /// Disposed page numbers available for reuse.
    free: BTreeSet<u32>,
}

impl DiskFile {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            free: BTreeSet::new(),
        })
    }

    /// Open an existing page file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened, and
    /// `InvalidData` if its size is not a whole number of pages or it holds
    /// more pages than a `PageId` can name.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let file_size = file.metadata()?.len();
        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file size {file_size} is not a multiple of {PAGE_SIZE}"),
            ));
        }
        let page_count = u32::try_from(file_size / PAGE_SIZE as u64).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file of {file_size} bytes has too many pages"),
            )
        })?;

        Ok(Self {
            file,
            page_count,
            free: BTreeSet::new(),
        })
    }

    /// Open an existing page file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of page slots in the file, including disposed ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of pages currently allocated.
    #[inline]
    pub fn allocated_count(&self) -> u32 {
        self.page_count - self.free.len() as u32
    }

    /// Get the total size of the file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    fn is_allocated(&self, page_id: PageId) -> bool {
        page_id.0 < self.page_count && !self.free.contains(&page_id.0)
    }

    fn write_at(&mut self, page_id: PageId, data: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(page_id.offset()))?;
        self.file.write_all(data)?;
        self.file.sync_all()
    }
}

impl PageFile for DiskFile {
    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> io::Result<()> {
        if !self.is_allocated(page_id) {
            return Err(unallocated(page_id));
        }

        self.file.seek(SeekFrom::Start(page_id.offset()))?;
        self.file.read_exact(dest.as_mut_slice())
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> io::Result<()> {
        if !self.is_allocated(page_id) {
            return Err(unallocated(page_id));
        }

        self.write_at(page_id, src.as_slice())
    }

    fn allocate_page(&mut self) -> io::Result<PageId> {
        let (page_id, reused) = match self.free.first() {
            Some(&n) => (PageId::new(n), true),
            None => (PageId::new(self.page_count), false),
        };

        // Zero the slot so a reused page never leaks its previous content.
        let zeros = [0u8; PAGE_SIZE];
        self.write_at(page_id, &zeros)?;

        if reused {
            self.free.remove(&page_id.0);
        } else {
            self.page_count += 1;
        }
        Ok(page_id)
    }

    fn dispose_page(&mut self, page_id: PageId) -> io::Result<()> {
        if !self.is_allocated(page_id) {
            return Err(unallocated(page_id));
        }

        self.free.insert(page_id.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let df = DiskFile::create(&path).unwrap();
        assert_eq!(df.page_count(), 0);
        assert_eq!(df.file_size(), 0);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        DiskFile::create(&path).unwrap();
        assert!(DiskFile::create(&path).is_err());
    }

    #[test]
    fn test_allocate_and_read_page() {
        let dir = tempdir().unwrap();
        let mut df = DiskFile::create(dir.path().join("test.db")).unwrap();

        let page_id = df.allocate_page().unwrap();
        assert_eq!(page_id, PageId::new(0));
        assert_eq!(df.page_count(), 1);

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xEE;
        df.read_page(page_id, &mut page).unwrap();
        assert_eq!(page.as_slice()[0], 0);
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let mut df = DiskFile::create(dir.path().join("test.db")).unwrap();
        let page_id = df.allocate_page().unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[4095] = 0xEF;
        df.write_page(page_id, &page).unwrap();

        let mut read_back = Page::new();
        df.read_page(page_id, &mut read_back).unwrap();
        assert_eq!(read_back.as_slice()[0], 0xAB);
        assert_eq!(read_back.as_slice()[4095], 0xEF);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut df = DiskFile::create(&path).unwrap();
            let page_id = df.allocate_page().unwrap();

            let mut page = Page::new();
            page.as_mut_slice()[0] = 0x42;
            df.write_page(page_id, &page).unwrap();
        }

        {
            let mut df = DiskFile::open(&path).unwrap();
            assert_eq!(df.page_count(), 1);

            let mut page = Page::new();
            df.read_page(PageId::new(0), &mut page).unwrap();
            assert_eq!(page.as_slice()[0], 0x42);
        }
    }

    #[test]
    fn test_open_rejects_partial_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("torn.db");
        std::fs::write(&path, vec![0u8; PAGE_SIZE + 100]).unwrap();

        let err = DiskFile::open(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_unallocated_page_is_invalid_input() {
        let dir = tempdir().unwrap();
        let mut df = DiskFile::create(dir.path().join("test.db")).unwrap();
        df.allocate_page().unwrap();

        let mut page = Page::new();
        let err = df.read_page(PageId::new(1), &mut page).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err = df.write_page(PageId::new(5), &page).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_dispose_and_reuse() {
        let dir = tempdir().unwrap();
        let mut df = DiskFile::create(dir.path().join("test.db")).unwrap();

        for _ in 0..3 {
            df.allocate_page().unwrap();
        }

        let mut page = Page::new();
        page.as_mut_slice()[7] = 0x77;
        df.write_page(PageId::new(1), &page).unwrap();

        df.dispose_page(PageId::new(1)).unwrap();
        assert_eq!(df.allocated_count(), 2);

        // Disposed pages can be neither read nor disposed again
        assert!(df.read_page(PageId::new(1), &mut page).is_err());
        assert!(df.dispose_page(PageId::new(1)).is_err());

        // The freed slot is reused and comes back zeroed
        let reused = df.allocate_page().unwrap();
        assert_eq!(reused, PageId::new(1));
        assert_eq!(df.page_count(), 3);
        df.read_page(reused, &mut page).unwrap();
        assert_eq!(page.as_slice()[7], 0);
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut df = DiskFile::open_or_create(&path).unwrap();
            assert_eq!(df.page_count(), 0);
            df.allocate_page().unwrap();
        }

        {
            let df = DiskFile::open_or_create(&path).unwrap();
            assert_eq!(df.page_count(), 1);
        }
    }
}
