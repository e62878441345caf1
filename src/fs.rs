use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use anyhow::{bail, ensure, Context};
use log::{debug, info, warn};

use crate::{
    bitmap::BlockBitmap,
    error::FsError,
    journal::{Journal, JournalRecord},
    layout::{
        block::{BlockNumber, Geometry},
        directory::{Directory, DirectoryEntry},
        inode::{Inode, InodeKind, InodeNumber, ROOT_INODE},
    },
    metadata::{Metadata, Usage},
    path,
    storage::{BlockStorage, MemoryDisk},
};

pub type Result<T, E = FsError> = std::result::Result<T, E>;

/// The journal action name used for file writes.
const WRITE_ACTION: &str = "write";

/// An in-memory block filesystem.
///
/// All access goes through path-based operations. The block storage, the bitmap and the inode
/// and directory tables are private to the filesystem.
pub struct FileSystem<S: BlockStorage = MemoryDisk> {
    storage: S,
    geometry: Geometry,
    block_bitmap: BlockBitmap,
    inodes: HashMap<InodeNumber, Inode>,
    /// One entry per directory inode.
    directories: HashMap<InodeNumber, Directory>,
    journal: Journal,
    next_inum: InodeNumber,
}

impl FileSystem<MemoryDisk> {
    /// Constructs a filesystem on a default-sized memory disk with an in-memory journal.
    pub fn new() -> Self {
        Self::with_geometry(Geometry::default())
    }

    pub fn with_geometry(geometry: Geometry) -> Self {
        Self::with_journal(geometry, Journal::new())
    }

    pub fn with_journal(geometry: Geometry, journal: Journal) -> Self {
        Self::with_storage(MemoryDisk::new(geometry), journal)
    }
}

impl Default for FileSystem<MemoryDisk> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BlockStorage> FileSystem<S> {
    /// Constructs an empty filesystem (just the root directory) on top of `storage`.
    ///
    /// Whatever the storage already holds is treated as garbage: every block starts out free.
    pub fn with_storage(storage: S, journal: Journal) -> Self {
        let geometry = Geometry {
            block_size: storage.block_size(),
            num_blocks: storage.num_blocks(),
        };

        let mut fs = Self {
            storage,
            geometry,
            block_bitmap: BlockBitmap::new(geometry.num_blocks),
            inodes: HashMap::new(),
            directories: HashMap::new(),
            journal,
            next_inum: ROOT_INODE,
        };

        let root = fs.new_inode(InodeKind::Directory);
        debug_assert_eq!(root, ROOT_INODE);

        info!("{} total blocks", geometry.num_blocks);
        info!("{} bytes per block", geometry.block_size);

        fs
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Resolves `path` to an inode number by walking directory entries from the root.
    ///
    /// Returns `None` if any segment is missing or if a regular file is met before the last
    /// segment.
    pub fn resolve(&self, path: &str) -> Option<InodeNumber> {
        self.resolve_segments(path::components(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    pub fn mkdir(&mut self, path: &str) -> Result<InodeNumber> {
        let inum = self.link_new_inode(path, InodeKind::Directory)?;
        info!("[inode #{inum}] created directory {}", path::normalize(path));

        Ok(inum)
    }

    pub fn create(&mut self, path: &str) -> Result<InodeNumber> {
        let inum = self.link_new_inode(path, InodeKind::Regular)?;
        info!("[inode #{inum}] created file {}", path::normalize(path));

        Ok(inum)
    }

    /// Replaces the contents of the file at `path` with `text`, creating the file if needed.
    ///
    /// New blocks are reserved before the old ones are released, so a failed write (e.g. out of
    /// space) leaves the file exactly as it was.
    ///
    /// A journal sink that rejects the intent record fails the write before anything changes.
    /// Once the data is in place the write succeeds; a sink that rejects the commit record is
    /// only logged, and the commit is still kept in the in-memory journal.
    pub fn write(&mut self, path: &str, text: &str) -> Result<()> {
        let data = text.as_bytes();

        self.journal
            .append(JournalRecord::intent(WRITE_ACTION, path))?;

        let existing = self.resolve(path);
        match existing {
            Some(inum) => {
                if self.inode(inum)?.is_dir() {
                    return Err(FsError::IsADirectory(path::normalize(path)));
                }
            }
            None => {
                // fail early on a bad parent, before any blocks are reserved
                self.lookup_parent(path)?;
            }
        }

        let num_blocks = self.geometry.blocks_for(data.len());
        let blocks = self.block_bitmap.allocate(num_blocks)?;

        let inum = match existing {
            Some(inum) => inum,
            None => match self.link_new_inode(path, InodeKind::Regular) {
                Ok(inum) => inum,
                Err(err) => {
                    self.block_bitmap.free(&blocks);
                    return Err(err);
                }
            },
        };

        for (chunk, &block_number) in data.chunks(self.geometry.block_size).zip(&blocks) {
            self.storage.write_block(block_number, chunk);
        }

        let Some(inode) = self.inodes.get_mut(&inum) else {
            self.block_bitmap.free(&blocks);
            return Err(dangling(inum));
        };

        let old_blocks = std::mem::replace(&mut inode.blocks, blocks);
        inode.size = data.len();
        inode.modified = SystemTime::now();

        self.block_bitmap.free(&old_blocks);

        info!(
            "[inode #{inum}] wrote {} bytes in {num_blocks} blocks (released {})",
            data.len(),
            old_blocks.len()
        );

        if let Err(err) = self
            .journal
            .append(JournalRecord::commit(WRITE_ACTION, path))
        {
            warn!("[inode #{inum}] write applied but its commit record was not mirrored: {err}");
        }

        Ok(())
    }

    pub fn read(&self, path: &str) -> Result<String> {
        let inum = self.lookup(path)?;
        let inode = self.inode(inum)?;

        if inode.is_dir() {
            return Err(FsError::IsADirectory(path::normalize(path)));
        }

        if self.geometry.blocks_for(inode.size) != inode.blocks.len() {
            return Err(FsError::Corrupted(format!(
                "[inode #{inum}] {} bytes stored in {} blocks",
                inode.size,
                inode.blocks.len()
            )));
        }

        if let Some(block_number) = inode
            .blocks
            .iter()
            .find(|&&b| !self.block_bitmap.is_allocated(b))
        {
            return Err(FsError::Corrupted(format!(
                "[inode #{inum}] block {block_number} is not allocated"
            )));
        }

        let mut data = Vec::with_capacity(inode.blocks.len() * self.geometry.block_size);
        for &block_number in &inode.blocks {
            data.extend_from_slice(self.storage.read_block(block_number));
        }
        data.truncate(inode.size);

        debug!("[inode #{inum}] read {} bytes", data.len());

        String::from_utf8(data)
            .map_err(|_| FsError::Corrupted(format!("[inode #{inum}] contents are not UTF-8")))
    }

    /// Lists the names in the directory at `path`, in creation order.
    pub fn ls(&self, path: &str) -> Result<Vec<String>> {
        let inum = self.lookup(path)?;

        if !self.inode(inum)?.is_dir() {
            return Err(FsError::NotADirectory(path::normalize(path)));
        }

        let directory = self.directories.get(&inum).ok_or_else(|| {
            FsError::Corrupted(format!("[inode #{inum}] directory has no entry table"))
        })?;

        Ok(directory.names())
    }

    /// Unlinks `path` and reclaims its blocks and inode. Directories are removed together with
    /// everything beneath them.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        let inum = self.lookup(path)?;
        let (parent, name) = self.lookup_parent(path)?;

        self.directories
            .get_mut(&parent)
            .and_then(|directory| directory.remove(name))
            .ok_or_else(|| FsError::NotFound(path::normalize(path)))?;
        self.touch(parent);

        let (num_inodes, num_blocks) = self.reclaim(inum);
        info!(
            "[inode #{inum}] deleted {} ({num_inodes} inodes, {num_blocks} blocks released)",
            path::normalize(path)
        );

        Ok(())
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        let inum = self.lookup(path)?;
        let inode = self.inode(inum)?;

        Ok(Metadata {
            inum,
            kind: inode.kind,
            size: inode.size,
            blocks: inode.blocks.len(),
            created: inode.created,
            modified: inode.modified,
        })
    }

    pub fn statfs(&self) -> Usage {
        Usage {
            block_size: self.geometry.block_size,
            total_blocks: self.geometry.num_blocks,
            free_blocks: self.block_bitmap.num_free(),
            used_blocks: self.block_bitmap.num_allocated(),
            inodes: self.inodes.len(),
        }
    }

    /// Checks the filesystem for consistency. Performs a depth-first traversal of the directory
    /// tree, then cross-checks the bitmap and the tables against what was reached.
    pub fn check(&self) -> anyhow::Result<()> {
        let root = self.inodes.get(&ROOT_INODE).context("no root inode")?;
        ensure!(root.is_dir(), "root inode does not represent a directory");

        let mut queue = vec![ROOT_INODE];
        let mut seen = HashSet::<InodeNumber>::new();
        let mut block_owners = HashMap::<BlockNumber, InodeNumber>::new();

        while let Some(inum) = queue.pop() {
            ensure!(seen.insert(inum), "directory tree reaches inode #{inum} twice");

            let inode = self
                .inodes
                .get(&inum)
                .with_context(|| format!("directory tree includes missing inode #{inum}"))?;

            ensure!(
                self.geometry.blocks_for(inode.size) == inode.blocks.len(),
                "inode #{inum} has {} blocks for {} bytes",
                inode.blocks.len(),
                inode.size
            );

            for &block_number in &inode.blocks {
                ensure!(
                    block_number < self.geometry.num_blocks,
                    "invalid block number: {block_number}"
                );
                ensure!(
                    self.block_bitmap.is_allocated(block_number),
                    "block number {block_number} of inode #{inum} is marked free"
                );

                if let Some(owner) = block_owners.insert(block_number, inum) {
                    bail!("block number {block_number} is owned by inodes #{owner} and #{inum}");
                }
            }

            if !inode.is_dir() {
                ensure!(
                    !self.directories.contains_key(&inum),
                    "regular file #{inum} has a directory table"
                );
                continue;
            }

            ensure!(
                inode.size == 0 && inode.blocks.is_empty(),
                "directory #{inum} owns data blocks"
            );

            let directory = self
                .directories
                .get(&inum)
                .with_context(|| format!("directory #{inum} has no entry table"))?;

            let mut names = HashSet::new();
            for entry in directory.entries() {
                ensure!(
                    !entry.name.is_empty() && !entry.name.contains('/'),
                    "invalid directory entry name: {:?}",
                    entry.name
                );
                ensure!(
                    names.insert(entry.name.as_str()),
                    "directory #{inum} contains duplicate entry: {}",
                    entry.name
                );

                queue.push(entry.inum);
            }
        }

        ensure!(
            seen.len() == self.inodes.len(),
            "{} inodes are unreachable from the root",
            self.inodes.len() - seen.len()
        );

        if let Some(block_number) = self
            .block_bitmap
            .allocated()
            .find(|b| !block_owners.contains_key(b))
        {
            bail!("block number {block_number} is allocated but owned by no inode");
        }

        Ok(())
    }

    fn resolve_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Option<InodeNumber> {
        let mut inum = ROOT_INODE;

        for segment in segments {
            // regular files have no directory table, so walking through one fails here
            inum = self.directories.get(&inum)?.lookup(segment)?;
        }

        Some(inum)
    }

    fn lookup(&self, path: &str) -> Result<InodeNumber> {
        self.resolve(path)
            .ok_or_else(|| FsError::NotFound(path::normalize(path)))
    }

    /// Resolves the directory that holds (or would hold) `path`, along with the final name.
    fn lookup_parent<'p>(&self, path: &'p str) -> Result<(InodeNumber, &'p str)> {
        let (segments, name) = path::split_parent(path)
            .ok_or_else(|| FsError::NotFound(format!("parent of {}", path::normalize(path))))?;

        let parent_path = format!("/{}", segments.join("/"));
        let parent = self
            .resolve_segments(segments)
            .ok_or_else(|| FsError::NotFound(parent_path.clone()))?;

        if !self.inode(parent)?.is_dir() {
            return Err(FsError::NotADirectory(parent_path));
        }

        Ok((parent, name))
    }

    fn inode(&self, inum: InodeNumber) -> Result<&Inode> {
        self.inodes.get(&inum).ok_or_else(|| dangling(inum))
    }

    /// Creates an inode of the given kind and links it into its parent directory.
    fn link_new_inode(&mut self, path: &str, kind: InodeKind) -> Result<InodeNumber> {
        let (parent, name) = self.lookup_parent(path)?;

        let directory = self
            .directories
            .get_mut(&parent)
            .ok_or_else(|| FsError::NotADirectory(path::normalize(path)))?;

        if !directory.insert(DirectoryEntry::new(self.next_inum, name)) {
            return Err(FsError::AlreadyExists(path::normalize(path)));
        }

        let inum = self.new_inode(kind);
        self.touch(parent);

        Ok(inum)
    }

    fn new_inode(&mut self, kind: InodeKind) -> InodeNumber {
        let inum = self.next_inum;
        self.next_inum += 1;

        self.inodes.insert(inum, Inode::new(kind));
        if kind == InodeKind::Directory {
            self.directories.insert(inum, Directory::new());
        }

        inum
    }

    fn touch(&mut self, inum: InodeNumber) {
        if let Some(inode) = self.inodes.get_mut(&inum) {
            inode.modified = SystemTime::now();
        }
    }

    /// Drops the inode and, for directories, everything below it. Returns the number of inodes
    /// and blocks released.
    fn reclaim(&mut self, inum: InodeNumber) -> (usize, usize) {
        let mut queue = vec![inum];
        let mut num_inodes = 0;
        let mut num_blocks = 0;

        while let Some(inum) = queue.pop() {
            if let Some(directory) = self.directories.remove(&inum) {
                queue.extend(directory.entries().iter().map(|entry| entry.inum));
            }

            match self.inodes.remove(&inum) {
                Some(inode) => {
                    self.block_bitmap.free(&inode.blocks);
                    num_inodes += 1;
                    num_blocks += inode.blocks.len();
                }
                None => warn!("[inode #{inum}] already gone while reclaiming"),
            }
        }

        (num_inodes, num_blocks)
    }
}

fn dangling(inum: InodeNumber) -> FsError {
    FsError::Corrupted(format!("directory entry points to missing inode #{inum}"))
}
