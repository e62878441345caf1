use super::inode::InodeNumber;

/// A directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    /// The inode number.
    pub inum: InodeNumber,
    /// The name of the entry.
    pub name: String,
}

impl DirectoryEntry {
    /// Constructs a new [`DirectoryEntry`] instance.
    pub fn new(inum: InodeNumber, name: &str) -> DirectoryEntry {
        DirectoryEntry {
            inum,
            name: name.to_owned(),
        }
    }
}

/// The children of one directory inode.
///
/// Entries are kept in insertion order so that listings come back in the order the children
/// were created. Names are unique within a directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<InodeNumber> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.inum)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Appends an entry. Returns `false`, leaving the directory untouched, if the name is taken.
    pub fn insert(&mut self, entry: DirectoryEntry) -> bool {
        if self.contains(&entry.name) {
            return false;
        }

        self.entries.push(entry);
        true
    }

    /// Removes the entry with the given name, returning the inode it pointed to.
    pub fn remove(&mut self, name: &str) -> Option<InodeNumber> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).inum)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let mut directory = Directory::new();
        assert!(directory.insert(DirectoryEntry::new(4, "zeta")));
        assert!(directory.insert(DirectoryEntry::new(2, "alpha")));
        assert!(directory.insert(DirectoryEntry::new(3, "mu")));

        assert_eq!(directory.names(), ["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_duplicate_name() {
        let mut directory = Directory::new();
        assert!(directory.insert(DirectoryEntry::new(2, "a")));
        assert!(!directory.insert(DirectoryEntry::new(3, "a")));

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("a"), Some(2));
    }

    #[test]
    fn test_remove() {
        let mut directory = Directory::new();
        directory.insert(DirectoryEntry::new(2, "a"));
        directory.insert(DirectoryEntry::new(3, "b"));
        directory.insert(DirectoryEntry::new(4, "c"));

        assert_eq!(directory.remove("b"), Some(3));
        assert_eq!(directory.remove("b"), None);
        assert_eq!(directory.names(), ["a", "c"]);
    }

    #[test]
    fn test_reinsert_goes_last() {
        let mut directory = Directory::new();
        directory.insert(DirectoryEntry::new(2, "a"));
        directory.insert(DirectoryEntry::new(3, "b"));
        directory.remove("a");
        directory.insert(DirectoryEntry::new(5, "a"));

        assert_eq!(directory.names(), ["b", "a"]);
        assert_eq!(directory.lookup("a"), Some(5));
    }

    #[test]
    fn test_empty() {
        let directory = Directory::new();

        assert!(directory.is_empty());
        assert_eq!(directory.lookup("anything"), None);
    }
}
