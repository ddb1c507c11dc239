//! Registry of the files a buffer manager serves.

use std::collections::HashMap;

use crate::common::{Error, FileId, Result};
use crate::storage::PageFile;

/// Owns the registered file collaborators and hands out their ids.
///
/// Ids are never reused, so a stale `FileId` can only ever miss.
#[derive(Default)]
pub(crate) struct FileRegistry {
    files: HashMap<FileId, Box<dyn PageFile>>,
    next_id: u32,
}

impl FileRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, file: Box<dyn PageFile>) -> FileId {
        let id = FileId::new(self.next_id);
        self.next_id += 1;
        self.files.insert(id, file);
        id
    }

    pub(crate) fn remove(&mut self, id: FileId) -> Result<Box<dyn PageFile>> {
        self.files.remove(&id).ok_or(Error::UnknownFile(id))
    }

    pub(crate) fn get_mut(&mut self, id: FileId) -> Result<&mut dyn PageFile> {
        match self.files.get_mut(&id) {
            Some(file) => Ok(file.as_mut()),
            None => Err(Error::UnknownFile(id)),
        }
    }

    pub(crate) fn check(&self, id: FileId) -> Result<()> {
        if self.files.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::UnknownFile(id))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemFile;

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = FileRegistry::new();

        let a = registry.register(Box::new(MemFile::new()));
        let b = registry.register(Box::new(MemFile::new()));
        assert_ne!(a, b);

        registry.remove(a).unwrap();
        let c = registry.register(Box::new(MemFile::new()));
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_file() {
        let mut registry = FileRegistry::new();
        let id = FileId::new(9);

        assert!(matches!(registry.check(id), Err(Error::UnknownFile(f)) if f == id));
        assert!(matches!(registry.get_mut(id), Err(Error::UnknownFile(_))));
        assert!(matches!(registry.remove(id), Err(Error::UnknownFile(_))));
    }
}
