//! Buffer manager statistics.

use std::fmt;

/// Cumulative counters kept by the buffer manager.
///
/// Each counter moves exactly once per successful event:
/// - `accesses`: a page handed out by `fetch_page` or `allocate_page`
/// - `hits` / `misses`: `fetch_page` found / did not find the page resident
/// - `disk_reads`: a page read from a file into the pool
/// - `disk_writes`: a page written back from the pool to a file
/// - `evictions`: a resident page pushed out by the clock sweep
///
/// # Example
/// ```
/// use clockpool::BufferStats;
///
/// let mut stats = BufferStats::default();
/// stats.hits = 3;
/// stats.misses = 1;
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
    pub evictions: u64,
}

impl BufferStats {
    /// Fraction of `fetch_page` calls served from the pool (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = BufferStats::default();
    }
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ accesses: {}, reads: {}, writes: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.accesses,
            self.disk_reads,
            self.disk_writes,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = BufferStats::default();
        assert_eq!(stats.accesses, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = BufferStats {
            accesses: 10,
            disk_writes: 4,
            ..BufferStats::default()
        };

        stats.reset();

        assert_eq!(stats, BufferStats::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = BufferStats {
            accesses: 100,
            hits: 80,
            misses: 20,
            disk_reads: 20,
            disk_writes: 7,
            evictions: 5,
        };

        let display = format!("{}", stats);

        assert!(display.contains("accesses: 100"));
        assert!(display.contains("writes: 7"));
        assert!(display.contains("80.00%"));
    }
}
