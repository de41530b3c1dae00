//! Archive stores: the durable side of the virtual file system.
//!
//! An [`ArchiveStore`] owns every interaction with the backing container. Member names are kept
//! in canonical form (`home/docs/notes.txt`, no root marker, no trailing `/`). Stores are
//! append-only: appending a name that already exists adds a second member and the **last**
//! occurrence wins on every later read or load.

mod mem_archive;
mod tar_archive;

pub use mem_archive::MemArchive;
pub use tar_archive::TarArchive;

use crate::core::Result;
use crate::vfs::EntryType;

/// One entry of the archive's member directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    name: String,
    entry_type: EntryType,
    size: u64,
}

impl ArchiveMember {
    pub fn new<S: Into<String>>(name: S, entry_type: EntryType, size: u64) -> ArchiveMember {
        ArchiveMember {
            name: name.into(),
            entry_type,
            size,
        }
    }

    /// Canonical member name, without the root marker.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Payload size in bytes (zero for directories).
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

pub trait ArchiveStore {
    /// Reads the member directory in archive order.
    /// Fails with `ArchiveUnreadable` if the container cannot be opened or parsed.
    fn enumerate_members(&self) -> Result<Vec<ArchiveMember>>;

    /// Returns the full payload of the regular-file member `name`.
    /// Fails with `MemberNotFound` if absent and `NotAFile` if it is a directory.
    fn read_member(&self, name: &str) -> Result<Vec<u8>>;

    /// Appends a new regular-file member. Existing members are never rewritten.
    /// Fails with `WriteFailed`.
    fn append_member(&mut self, name: &str, content: &[u8]) -> Result<()>;
}
