use std::io;

use crate::archive::{ArchiveMember, ArchiveStore};
use crate::core::{Result, utils};
use crate::error::VfsError;
use crate::vfs::EntryType;

/// An archive store kept entirely in memory.
///
/// Follows the same rules as `TarArchive`: members keep insertion order, appends never replace
/// existing members and the last member with a given name wins on read. A read-only store
/// rejects every append with `WriteFailed`.
///
/// ### Example
///
/// ```
/// use tar_vfs::{ArchiveStore, MemArchive};
///
/// let archive = MemArchive::new()
///     .with_dir("home/docs")
///     .with_file("home/notes.txt", b"hello");
///
/// assert_eq!(archive.enumerate_members().unwrap().len(), 2);
/// assert_eq!(archive.read_member("home/notes.txt").unwrap(), b"hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemArchive {
    members: Vec<(String, Option<Vec<u8>>)>, // `None` content marks a directory member
    read_only: bool,
}

impl MemArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a regular-file member. Names denoting the root are ignored.
    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        if let Some(key) = utils::member_key(name) {
            self.members.push((key, Some(content.to_vec())));
        }
        self
    }

    /// Adds a directory member. Names denoting the root are ignored.
    pub fn with_dir(mut self, name: &str) -> Self {
        if let Some(key) = utils::member_key(name) {
            self.members.push((key, None));
        }
        self
    }

    /// Makes every following `append_member()` fail (or succeed again).
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of members, duplicates included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl ArchiveStore for MemArchive {
    fn enumerate_members(&self) -> Result<Vec<ArchiveMember>> {
        Ok(self
            .members
            .iter()
            .map(|(name, content)| match content {
                Some(content) => ArchiveMember::new(name, EntryType::File, content.len() as u64),
                None => ArchiveMember::new(name, EntryType::Directory, 0),
            })
            .collect())
    }

    fn read_member(&self, name: &str) -> Result<Vec<u8>> {
        let key =
            utils::member_key(name).ok_or_else(|| VfsError::MemberNotFound(name.to_string()))?;
        match self.members.iter().rev().find(|(n, _)| *n == key) {
            None => Err(VfsError::MemberNotFound(key)),
            Some((_, None)) => Err(VfsError::NotAFile(key)),
            Some((_, Some(content))) => Ok(content.clone()),
        }
    }

    fn append_member(&mut self, name: &str, content: &[u8]) -> Result<()> {
        if self.read_only {
            return Err(VfsError::WriteFailed {
                name: name.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "archive is read-only"),
            });
        }
        let key = utils::member_key(name).ok_or_else(|| VfsError::WriteFailed {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty member name"),
        })?;
        self.members.push((key, Some(content.to_vec())));
        Ok(())
    }
}
