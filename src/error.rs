use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the archive store, the virtual tree and the audit log.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The archive cannot be opened or its member directory cannot be parsed.
    #[error("archive '{}' is unreadable: {source}", path.display())]
    ArchiveUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path does not resolve, or resolves to a node of the wrong kind.
    #[error("'{}' not found", .0.display())]
    NotFound(PathBuf),

    /// The source of a copy is not a child of its parent directory.
    #[error("source '{}' not found", .0.display())]
    SourceMissing(PathBuf),

    #[error("archive member '{0}' not found")]
    MemberNotFound(String),

    #[error("archive member '{0}' is not a file")]
    NotAFile(String),

    /// Appending to the archive failed.
    #[error("failed to write '{name}' to the archive: {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write audit log '{}': {source}", path.display())]
    AuditLog {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
