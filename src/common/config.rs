//! Configuration constants for clockpool.

/// Size of a page slot in bytes (4KB).
///
/// Every frame in the pool and every page in a file has exactly this size.
/// Matches the OS page size on most systems, so frames stay page-aligned.
pub const PAGE_SIZE: usize = 4096;

/// Page directory load factor, as a ratio (6/5 = 1.2 buckets per frame).
pub const DIRECTORY_LOAD_FACTOR: (usize, usize) = (6, 5);

/// Number of directory buckets for a pool of `num_frames` frames.
///
/// Roughly 1.2× the frame count, forced odd so that chains spread evenly
/// when keys share common factors with the bucket count.
///
/// # Example
/// ```
/// use clockpool::common::config::directory_buckets;
///
/// assert_eq!(directory_buckets(10), 13);
/// assert_eq!(directory_buckets(1), 1);
/// ```
pub fn directory_buckets(num_frames: usize) -> usize {
    let (num, den) = DIRECTORY_LOAD_FACTOR;
    (num_frames * num / den) | 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_directory_buckets_is_odd() {
        for n in 0..200 {
            let buckets = directory_buckets(n);
            assert_eq!(buckets % 2, 1, "{} frames gave {} buckets", n, buckets);
            assert!(buckets >= n, "{} frames gave only {} buckets", n, buckets);
        }
    }

    #[test]
    fn test_directory_buckets_values() {
        assert_eq!(directory_buckets(0), 1);
        assert_eq!(directory_buckets(3), 3);
        assert_eq!(directory_buckets(100), 121);
    }
}
