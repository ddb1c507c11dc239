//! CLOCK (second-chance) replacement policy.
//!
//! A single hand sweeps the frame table circularly. Referenced frames lose
//! their reference bit and survive one more rotation; pinned frames are
//! skipped; the first unreferenced, unpinned frame is the victim. Empty
//! frames are taken immediately.

use tracing::trace;

use crate::buffer::frame::FrameTable;
use crate::common::FrameId;

/// Outcome of a successful sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// An empty frame, ready for use.
    Free(FrameId),
    /// An occupied, unpinned, unreferenced frame. The caller must write it
    /// back if dirty and drop its directory entry before reusing it.
    Evict(FrameId),
}

impl Victim {
    /// The selected frame.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        match *self {
            Victim::Free(fid) | Victim::Evict(fid) => fid,
        }
    }
}

/// The clock hand and its sweep.
///
/// The sweep visits at most `2 × num_frames` frames: one rotation to clear
/// every reference bit, one more to find a frame whose bit stayed clear.
/// If neither finds a victim, every frame is pinned.
#[derive(Debug)]
pub struct ClockReplacer {
    hand: usize,
    num_frames: usize,
}

impl ClockReplacer {
    /// Create a replacer for `num_frames` frames.
    ///
    /// The hand starts on the last frame, so the first sweep begins at frame 0.
    ///
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");
        Self {
            hand: num_frames - 1,
            num_frames,
        }
    }

    /// Current hand position.
    #[inline]
    pub fn hand(&self) -> FrameId {
        FrameId::new(self.hand)
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.num_frames;
    }

    /// Sweep for a victim frame.
    ///
    /// Clears reference bits as it passes. Returns `None` once the step
    /// budget is spent, in which case only reference bits were touched.
    pub fn sweep(&mut self, frames: &mut FrameTable) -> Option<Victim> {
        debug_assert_eq!(frames.len(), self.num_frames);

        for _ in 0..self.num_frames * 2 {
            self.advance();
            let frame_id = FrameId::new(self.hand);
            let desc = &mut frames[frame_id];

            if !desc.occupied {
                desc.clear();
                return Some(Victim::Free(frame_id));
            }

            if desc.referenced {
                trace!(frame = %frame_id, "clock: second chance");
                desc.referenced = false;
                continue;
            }

            if desc.is_pinned() {
                continue;
            }

            return Some(Victim::Evict(frame_id));
        }

        None
    }
}
