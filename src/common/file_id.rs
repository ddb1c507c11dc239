//! File identifier type.

use std::fmt;

/// Identifies a file registered with a buffer manager.
///
/// Handed out by [`BufferManager::register_file`](crate::BufferManager::register_file).
/// Two ids are equal exactly when they name the same underlying file, and an
/// id is never reused within one manager's lifetime.
///
/// # Example
/// ```
/// use clockpool::FileId;
///
/// assert_eq!(FileId::new(3), FileId::new(3));
/// assert_eq!(format!("{}", FileId::new(3)), "File(3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId.
    #[inline]
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_equality() {
        assert_eq!(FileId::new(5), FileId::new(5));
        assert_ne!(FileId::new(5), FileId::new(6));
    }

    #[test]
    fn test_file_id_display() {
        assert_eq!(format!("{}", FileId::new(7)), "File(7)");
    }
}
