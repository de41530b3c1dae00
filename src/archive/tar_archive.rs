//! Tar-backed archive store.
//!
//! The archive file is never held open: every operation opens it, performs one scan (and at most
//! one append) and closes it again.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::archive::{ArchiveMember, ArchiveStore};
use crate::core::{Result, utils};
use crate::error::VfsError;
use crate::vfs::EntryType;

const BLOCK_SIZE: u64 = 512;

/// Archive store over a POSIX tar file on the host.
///
/// ### Example:
/// ```no_run
/// use tar_vfs::{ArchiveStore, TarArchive};
///
/// let mut archive = TarArchive::open("/tmp/vfs.tar").unwrap();
/// let notes = archive.read_member("home/notes.txt").unwrap();
/// archive.append_member("home/notes.bak", &notes).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TarArchive {
    path: PathBuf, // host path of the tar file
}

impl TarArchive {
    /// Binds the store to an existing archive.
    /// * `path` must point to a regular file, otherwise `ArchiveUnreadable` returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|source| VfsError::ArchiveUnreadable {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(VfsError::ArchiveUnreadable {
                path,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }
        Ok(Self { path })
    }

    /// Writes a new, empty archive at `path` (replacing any existing file) and binds the store
    /// to it.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let init = || -> io::Result<()> {
            let file = File::create(&path)?;
            tar::Builder::new(file).finish()
        };
        init().map_err(|source| VfsError::WriteFailed {
            name: path.display().to_string(),
            source,
        })?;
        info!("created empty archive {}", path.display());
        Ok(Self { path })
    }

    /// Returns the host path of the archive.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn unreadable(&self, source: io::Error) -> VfsError {
        VfsError::ArchiveUnreadable {
            path: self.path.clone(),
            source,
        }
    }

    fn open_archive(&self) -> Result<tar::Archive<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| self.unreadable(e))?;
        Ok(tar::Archive::new(BufReader::new(file)))
    }

    /// Byte offset just past the last member's padded payload, i.e. where the end-of-archive
    /// marker starts. Zero for an empty file.
    fn end_of_members(&self) -> io::Result<u64> {
        let mut archive = tar::Archive::new(BufReader::new(File::open(&self.path)?));
        let mut end = 0;
        for entry in archive.entries()? {
            let entry = entry?;
            let size = entry.header().entry_size()?;
            end = entry.raw_file_position() + size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
        }
        Ok(end)
    }

    /// Cuts the file back to `end` and writes a fresh end-of-archive marker there.
    fn truncate_to(&self, end: u64) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(end)?;
        file.seek(SeekFrom::Start(end))?;
        file.write_all(&[0; 2 * BLOCK_SIZE as usize])?;
        file.sync_all()
    }
}

/// Maps a tar entry kind onto the tree's entry types; `None` for kinds the VFS ignores.
fn member_type(kind: tar::EntryType) -> Option<EntryType> {
    match kind {
        tar::EntryType::Directory => Some(EntryType::Directory),
        tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::GNUSparse => {
            Some(EntryType::File)
        }
        _ => None,
    }
}

impl ArchiveStore for TarArchive {
    fn enumerate_members(&self) -> Result<Vec<ArchiveMember>> {
        let mut archive = self.open_archive()?;
        let mut members = Vec::new();
        for entry in archive.entries().map_err(|e| self.unreadable(e))? {
            let entry = entry.map_err(|e| self.unreadable(e))?;
            let kind = entry.header().entry_type();
            let path = entry.path().map_err(|e| self.unreadable(e))?;
            let Some(entry_type) = member_type(kind) else {
                debug!("skipping {:?} member {}", kind, path.display());
                continue;
            };
            let Some(name) = utils::member_key(&path) else {
                continue;
            };
            let size = match entry_type {
                EntryType::File => entry.size(),
                EntryType::Directory => 0,
            };
            members.push(ArchiveMember::new(name, entry_type, size));
        }
        debug!("{}: {} members", self.path.display(), members.len());
        Ok(members)
    }

    fn read_member(&self, name: &str) -> Result<Vec<u8>> {
        let key =
            utils::member_key(name).ok_or_else(|| VfsError::MemberNotFound(name.to_string()))?;
        let mut archive = self.open_archive()?;

        // later duplicates shadow earlier ones
        let mut found: Option<Option<Vec<u8>>> = None;
        for entry in archive.entries().map_err(|e| self.unreadable(e))? {
            let mut entry = entry.map_err(|e| self.unreadable(e))?;
            let Some(entry_type) = member_type(entry.header().entry_type()) else {
                continue;
            };
            let matches = {
                let path = entry.path().map_err(|e| self.unreadable(e))?;
                utils::member_key(&path).as_deref() == Some(key.as_str())
            };
            if !matches {
                continue;
            }
            found = Some(match entry_type {
                EntryType::Directory => None,
                EntryType::File => {
                    let mut content = Vec::with_capacity(entry.size() as usize);
                    entry
                        .read_to_end(&mut content)
                        .map_err(|e| self.unreadable(e))?;
                    Some(content)
                }
            });
        }

        match found {
            None => Err(VfsError::MemberNotFound(key)),
            Some(None) => Err(VfsError::NotAFile(key)),
            Some(Some(content)) => Ok(content),
        }
    }

    fn append_member(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let key = utils::member_key(name).ok_or_else(|| VfsError::WriteFailed {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty member name"),
        })?;
        let write_failed = |source: io::Error| VfsError::WriteFailed {
            name: key.clone(),
            source,
        };
        let end = self.end_of_members().map_err(write_failed)?;

        let append = || -> io::Result<()> {
            let mut file = OpenOptions::new().write(true).open(&self.path)?;
            file.seek(SeekFrom::Start(end))?;

            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(chrono::Utc::now().timestamp().max(0) as u64);

            // `finish()` re-terminates the archive with two zero blocks
            let mut builder = tar::Builder::new(file);
            builder.append_data(&mut header, &key, content)?;
            builder.finish()
        };
        if let Err(source) = append() {
            // a torn header or payload would make every later scan fail
            if let Err(err) = self.truncate_to(end) {
                warn!(
                    "cannot restore {} after failed append of {}: {}",
                    self.path.display(),
                    key,
                    err
                );
            }
            return Err(write_failed(source));
        }

        info!(
            "appended {} ({} bytes) to {} at offset {}",
            key,
            content.len(),
            self.path.display(),
            end
        );
        Ok(())
    }
}
