//! Page directory - maps resident pages to their frames.

use crate::common::config::directory_buckets;
use crate::common::{DirectoryError, FileId, FrameId, PageId};

#[derive(Debug, Clone, Copy)]
struct Entry {
    file: FileId,
    page: PageId,
    frame: FrameId,
}

/// Reverse index from `(FileId, PageId)` to the frame holding that page.
///
/// A chained hash table with a fixed, odd number of buckets chosen at
/// construction (≈1.2 per frame). The pool never holds more pages than
/// frames, so chains stay short and lookups are O(1) on average without
/// ever rehashing.
///
/// ```text
/// buckets: [0] → (f0,p3→F1)
///          [1] → (f1,p0→F0) → (f0,p9→F4)
///          [2] →
///          ...
/// ```
#[derive(Debug)]
pub struct PageDirectory {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl PageDirectory {
    /// Create a directory sized for a pool of `num_frames` frames.
    pub fn new(num_frames: usize) -> Self {
        Self::with_buckets(directory_buckets(num_frames))
    }

    /// Create a directory with exactly `buckets` chains.
    ///
    /// # Panics
    /// Panics if `buckets` is 0.
    pub fn with_buckets(buckets: usize) -> Self {
        assert!(buckets > 0, "directory needs at least one bucket");
        Self {
            buckets: vec![Vec::new(); buckets],
            len: 0,
        }
    }

    fn bucket(&self, file: FileId, page: PageId) -> usize {
        let key = (((file.0 as u64) << 32) | page.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        ((key >> 17) % self.buckets.len() as u64) as usize
    }

    /// Find the frame holding `page` of `file`.
    pub fn lookup(&self, file: FileId, page: PageId) -> Option<FrameId> {
        self.buckets[self.bucket(file, page)]
            .iter()
            .find(|e| e.file == file && e.page == page)
            .map(|e| e.frame)
    }

    /// Record that `page` of `file` lives in `frame`.
    ///
    /// # Errors
    /// `DirectoryError::Duplicate` if the page already has an entry; the
    /// existing entry is left untouched.
    pub fn insert(
        &mut self,
        file: FileId,
        page: PageId,
        frame: FrameId,
    ) -> Result<(), DirectoryError> {
        let b = self.bucket(file, page);
        let chain = &mut self.buckets[b];

        if let Some(existing) = chain.iter().find(|e| e.file == file && e.page == page) {
            return Err(DirectoryError::Duplicate {
                file,
                page,
                frame: existing.frame,
            });
        }

        chain.push(Entry { file, page, frame });
        self.len += 1;
        Ok(())
    }

    /// Remove the entry for `page` of `file`, returning its frame.
    ///
    /// # Errors
    /// `DirectoryError::Missing` if there is no such entry.
    pub fn remove(&mut self, file: FileId, page: PageId) -> Result<FrameId, DirectoryError> {
        let b = self.bucket(file, page);
        let chain = &mut self.buckets[b];

        let pos = chain
            .iter()
            .position(|e| e.file == file && e.page == page)
            .ok_or(DirectoryError::Missing { file, page })?;

        self.len -= 1;
        Ok(chain.swap_remove(pos).frame)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the directory is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over every `(FileId, PageId, FrameId)` entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, PageId, FrameId)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (e.file, e.page, e.frame))
    }
}
