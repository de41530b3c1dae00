//! A minimal hierarchical file system emulated on top of a single tar archive.
//!
//! ### Overview
//!
//! `tar-vfs` loads the member list of an archive into an in-memory directory tree and lets you
//! navigate it like a shell: list directories, change the current directory and copy entries.
//! Copying a file writes through to the archive, so the tree and the archive never disagree
//! about which files have payloads.
//!
//! **Key ideas**:
//! - **Archive as storage**: file contents live only in the archive (`ArchiveStore`); the tree
//!   holds structure.
//! - **Append-only writes**: copies append new members, existing ones are never rewritten.
//! - **Scoped I/O**: the archive and the audit log are opened per operation, never held.
//! - **Testability**: `MemArchive` stands in for a tar file, including read-only failures.
//!
//! ### Example
//!
//! ```no_run
//! use tar_vfs::{AuditLog, Shell, TarArchive, VirtualTree};
//!
//! let tree = VirtualTree::build(TarArchive::open("vfs.tar").unwrap()).unwrap();
//! let audit = AuditLog::create("log.csv").unwrap();
//! let mut shell = Shell::new("localhost", tree, audit);
//!
//! shell.execute("cd /home");
//! shell.execute("cp notes.txt docs/notes.txt");
//! ```

mod archive;
mod audit;
mod core;
mod error;
mod shell;
mod vfs;

pub use crate::archive::{ArchiveMember, ArchiveStore, MemArchive, TarArchive};
pub use crate::audit::{AuditEvent, AuditLog};
pub use crate::core::{Result, utils};
pub use crate::error::VfsError;
pub use crate::shell::{Outcome, Shell};
pub use crate::vfs::{EntryType, Node, VirtualTree};
