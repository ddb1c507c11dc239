//! Frame descriptors - per-frame metadata for the buffer pool.
//!
//! A [`FrameDesc`] records, for one slot of the pool:
//! - Whether it holds a page, and which one
//! - Pin count (active holders)
//! - Dirty flag for write-back tracking
//! - Reference bit for the clock sweep
//!
//! The [`FrameTable`] owns one descriptor per frame.

use std::ops::{Index, IndexMut};

use crate::common::{FileId, FrameId, PageId};

/// Metadata for one frame of the buffer pool.
///
/// An empty frame carries no stale state: `occupied == false` holds exactly
/// when `owner` is `None`, the pin count is zero and both bits are clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameDesc {
    /// Whether the frame currently holds a page.
    pub occupied: bool,

    /// File and page number of the resident page.
    pub owner: Option<(FileId, PageId)>,

    /// Number of active holders. A pinned frame is never evicted.
    pub pin_count: u32,

    /// Content differs from disk. Stays set until written back.
    pub dirty: bool,

    /// Second-chance bit: set on every access, cleared by the clock sweep.
    pub referenced: bool,
}

impl FrameDesc {
    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = FrameDesc::default();
    }

    /// Occupy the frame with `page` of `file`, pinned once and referenced.
    pub fn set(&mut self, file: FileId, page: PageId) {
        *self = FrameDesc {
            occupied: true,
            owner: Some((file, page)),
            pin_count: 1,
            dirty: false,
            referenced: true,
        };
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    /// Check if the frame holds `page` of `file`.
    #[inline]
    pub fn is_owned_by(&self, file: FileId, page: PageId) -> bool {
        self.owner == Some((file, page))
    }

    /// Check the empty-frame invariant.
    ///
    /// Occupied frames are consistent when they have an owner; empty ones
    /// must carry no owner, pins or bits.
    pub fn is_consistent(&self) -> bool {
        if self.occupied {
            self.owner.is_some()
        } else {
            *self == FrameDesc::default()
        }
    }
}

/// The frame descriptor table: one [`FrameDesc`] per pool slot.
///
/// Indexed by [`FrameId`].
#[derive(Debug)]
pub struct FrameTable {
    descs: Vec<FrameDesc>,
}

impl FrameTable {
    /// Create a table of `num_frames` empty frames.
    pub fn new(num_frames: usize) -> Self {
        Self {
            descs: vec![FrameDesc::default(); num_frames],
        }
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    /// Whether the table has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    /// Reset frame `frame_id` to the empty state.
    #[inline]
    pub fn clear(&mut self, frame_id: FrameId) {
        self.descs[frame_id.0].clear();
    }

    /// Occupy frame `frame_id` with `page` of `file`, pinned once.
    #[inline]
    pub fn set(&mut self, frame_id: FrameId, file: FileId, page: PageId) {
        self.descs[frame_id.0].set(file, page);
    }

    /// Iterate over `(FrameId, &FrameDesc)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &FrameDesc)> {
        self.descs
            .iter()
            .enumerate()
            .map(|(i, desc)| (FrameId::new(i), desc))
    }

    /// Number of occupied frames.
    pub fn occupied_count(&self) -> usize {
        self.descs.iter().filter(|d| d.occupied).count()
    }
}

impl Index<FrameId> for FrameTable {
    type Output = FrameDesc;

    #[inline]
    fn index(&self, frame_id: FrameId) -> &FrameDesc {
        &self.descs[frame_id.0]
    }
}

impl IndexMut<FrameId> for FrameTable {
    #[inline]
    fn index_mut(&mut self, frame_id: FrameId) -> &mut FrameDesc {
        &mut self.descs[frame_id.0]
    }
}
