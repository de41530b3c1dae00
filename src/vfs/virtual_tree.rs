//! This module provides the in-memory directory tree projected from an archive store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::archive::{ArchiveMember, ArchiveStore};
use crate::audit::AuditEvent;
use crate::core::{Result, utils};
use crate::error::VfsError;
use crate::vfs::{EntryType, Node};

/// A virtual file system whose structure is loaded from an archive and whose file payloads stay
/// in that archive.
///
/// `VirtualTree` keeps the directory hierarchy in memory, resolves absolute and relative paths
/// against a current working directory and writes file copies through to the backing
/// `ArchiveStore`.
///
/// ### Internal state
///
/// * `store`: The archive store the tree was built from. Only `cp()` of a file and `read()`
///   touch it after construction.
///
/// * `cwd`: Current Working Directory, expressed as an **inner absolute normalized path**.
///   - Determines how relative paths (e.g., `docs/file.txt`) are resolved.
///   - Default value: `/`.
///   - Changed only by a successful `cd()`.
///
/// * `root`: The root `Node::Directory`. Children are kept in `BTreeMap`s, so listings come out
///   in lexicographic order.
///
/// ### Invariants
///
/// 1. **Root existence**: `root` is always a directory.
/// 2. **Path normalization**: `cwd` is absolute and normalized; `..` never climbs above `/`.
/// 3. **Dual-write consistency**: a file node created by `cp()` is inserted only after its
///    payload has been appended to the archive.
///
/// ### Example
///
/// ```
/// use tar_vfs::{MemArchive, VirtualTree};
///
/// let archive = MemArchive::new()
///     .with_file("home/notes.txt", b"hello")
///     .with_dir("home/docs");
/// let mut fs = VirtualTree::build(archive).unwrap();
///
/// fs.cd("/home").unwrap();
/// assert_eq!(fs.ls("").unwrap(), vec!["docs", "notes.txt"]);
///
/// fs.cp("notes.txt", "docs/notes.txt").unwrap();
/// assert_eq!(fs.read("/home/docs/notes.txt").unwrap(), b"hello");
/// ```
pub struct VirtualTree<S: ArchiveStore> {
    store: S,
    cwd: PathBuf, // inner absolute normalized path
    root: Node,
}

impl<S: ArchiveStore> VirtualTree<S> {
    /// Builds the tree from a full scan of `store`.
    ///
    /// Members may come in any order. Directories that only appear as a prefix of other members
    /// are created implicitly. A name that any member declares or implies as a directory stays a
    /// directory, so the resulting tree does not depend on member order.
    pub fn build(store: S) -> Result<Self> {
        let members = store.enumerate_members()?;
        let mut root = Node::new_dir();
        for member in &members {
            Self::insert_member(&mut root, member);
        }
        debug!("virtual tree built from {} archive members", members.len());

        Ok(Self {
            store,
            cwd: PathBuf::from("/"),
            root,
        })
    }

    fn insert_member(root: &mut Node, member: &ArchiveMember) {
        let segments: Vec<&str> = member.name().split('/').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = root;
        for segment in parents {
            current = current
                .ensure_dir()
                .entry(segment.to_string())
                .or_insert_with(Node::new_dir);
        }

        let children = current.ensure_dir();
        match member.entry_type() {
            EntryType::Directory => {
                children
                    .entry(last.to_string())
                    .or_insert_with(Node::new_dir)
                    .ensure_dir();
            }
            EntryType::File => {
                // a file never shadows a directory
                children.entry(last.to_string()).or_insert(Node::File);
            }
        }
    }

    /// Returns current working directory.
    pub fn cwd(&self) -> &Path {
        self.cwd.as_path()
    }

    /// Returns the backing archive store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the root directory node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    fn to_inner<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        utils::normalize(self.cwd.join(path))
    }

    fn lookup<'a>(root: &'a Node, inner_path: &Path) -> Option<&'a Node> {
        let mut current = root;
        for segment in utils::segments(inner_path) {
            current = current.children()?.get(&segment)?;
        }
        Some(current)
    }

    fn lookup_dir_mut<'a>(
        root: &'a mut Node,
        inner_path: &Path,
    ) -> Option<&'a mut BTreeMap<String, Node>> {
        let mut current = root;
        for segment in utils::segments(inner_path) {
            current = current.children_mut()?.get_mut(&segment)?;
        }
        current.children_mut()
    }

    /// Resolves `path` (absolute or relative to `cwd`) to a node.
    ///
    /// Returns `None` if a segment is missing or if the walk would have to descend through a
    /// file. `/` always resolves to the root directory.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> Option<&Node> {
        let inner = self.to_inner(path);
        Self::lookup(&self.root, &inner)
    }

    /// Checks if a `path` exists in the VFS.
    /// The `path` can be in relative or absolute form.
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.resolve(path).is_some()
    }

    /// Checks if `path` is a directory.
    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let inner = self.to_inner(path);
        match Self::lookup(&self.root, &inner) {
            Some(node) => Ok(node.is_dir()),
            None => Err(VfsError::NotFound(inner)),
        }
    }

    /// Checks if `path` is a regular file.
    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        Ok(!self.is_dir(path)?)
    }

    /// Lists the names of the immediate children of a directory.
    ///
    /// * `path` - directory to list; an empty path lists `cwd`.
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - child names in lexicographic order.
    /// * `Err(VfsError::NotFound)` - if the path does not resolve or names a file.
    ///
    /// Never changes `cwd`.
    pub fn ls<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let inner = self.to_inner(path);
        match Self::lookup(&self.root, &inner).and_then(Node::children) {
            Some(children) => Ok(children.keys().cloned().collect()),
            None => Err(VfsError::NotFound(inner)),
        }
    }

    /// Returns every descendant of `path` with its type, depth-first in listing order.
    ///
    /// The starting directory itself is not included; a file path yields just the file.
    pub fn tree<P: AsRef<Path>>(&self, path: P) -> Result<Vec<(PathBuf, EntryType)>> {
        let inner = self.to_inner(path);
        let node =
            Self::lookup(&self.root, &inner).ok_or_else(|| VfsError::NotFound(inner.clone()))?;

        let mut entries = Vec::new();
        match node {
            Node::File => entries.push((inner, EntryType::File)),
            Node::Directory(children) => Self::walk(&inner, children, &mut entries),
        }
        Ok(entries)
    }

    fn walk(
        prefix: &Path,
        children: &BTreeMap<String, Node>,
        entries: &mut Vec<(PathBuf, EntryType)>,
    ) {
        for (name, node) in children {
            let path = prefix.join(name);
            entries.push((path.clone(), node.entry_type()));
            if let Node::Directory(grandchildren) = node {
                Self::walk(&path, grandchildren, entries);
            }
        }
    }

    /// Changes the current working directory.
    /// * `path` can be in relative or absolute form, but in both cases it must be an existing
    ///   directory. `..` at the root stays at the root.
    ///
    /// Returns the new `cwd`. On error `cwd` is left unchanged.
    pub fn cd<P: AsRef<Path>>(&mut self, path: P) -> Result<&Path> {
        let target = self.to_inner(path);
        match Self::lookup(&self.root, &target) {
            Some(node) if node.is_dir() => {}
            _ => return Err(VfsError::NotFound(target)),
        }
        debug!("cwd {} -> {}", self.cwd.display(), target.display());
        self.cwd = target;
        Ok(self.cwd.as_path())
    }

    /// Reads the archive payload of the file at `path`.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let inner = self.to_inner(path);
        match Self::lookup(&self.root, &inner) {
            None => Err(VfsError::NotFound(inner)),
            Some(Node::Directory(_)) => Err(VfsError::NotAFile(utils::member_name(&inner))),
            Some(Node::File) => self.store.read_member(&utils::member_name(&inner)),
        }
    }

    /// Copies a file or a whole directory subtree.
    ///
    /// * `src`, `dest` - absolute or relative to `cwd`. The parents of both must be existing
    ///   directories; an existing `dest` is replaced.
    ///
    /// A directory is deep-copied in memory only. A file is first read from the archive and
    /// appended under the destination name, and only then inserted into the tree, so a failed
    /// archive step leaves the tree untouched.
    ///
    /// # Returns
    /// * `Ok(AuditEvent)` - `cp` event with detail `"<src> -> <dest>"` as given by the caller.
    /// * `Err(VfsError::NotFound)` - a parent does not resolve to a directory, or `dest` is `/`.
    /// * `Err(VfsError::SourceMissing)` - `src` is not in its parent (or is `/`).
    /// * `Err(VfsError::MemberNotFound | NotAFile | WriteFailed)` - archive step failed.
    pub fn cp<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, src: P, dest: Q) -> Result<AuditEvent> {
        let (src, dest) = (src.as_ref(), dest.as_ref());
        let src_path = self.to_inner(src);
        let dest_path = self.to_inner(dest);

        let (Some(src_parent), Some(src_name)) = (src_path.parent(), src_path.file_name()) else {
            return Err(VfsError::SourceMissing(src_path));
        };
        let (Some(dest_parent), Some(dest_name)) = (dest_path.parent(), dest_path.file_name())
        else {
            return Err(VfsError::NotFound(dest_path));
        };
        let src_name = src_name.to_string_lossy();
        let dest_name = dest_name.to_string_lossy().into_owned();

        let src_dir = Self::lookup(&self.root, src_parent)
            .and_then(Node::children)
            .ok_or_else(|| VfsError::NotFound(src_parent.to_path_buf()))?;
        if !Self::lookup(&self.root, dest_parent).is_some_and(Node::is_dir) {
            return Err(VfsError::NotFound(dest_parent.to_path_buf()));
        }
        let node = src_dir
            .get(&*src_name)
            .cloned()
            .ok_or_else(|| VfsError::SourceMissing(src_path.clone()))?;

        if node.is_file() {
            let content = self.store.read_member(&utils::member_name(&src_path))?;
            self.store
                .append_member(&utils::member_name(&dest_path), &content)?;
        }

        let dest_dir = Self::lookup_dir_mut(&mut self.root, dest_parent)
            .ok_or_else(|| VfsError::NotFound(dest_parent.to_path_buf()))?;
        dest_dir.insert(dest_name, node);
        info!("copied {} -> {}", src_path.display(), dest_path.display());

        Ok(AuditEvent::new(
            "cp",
            format!("{} -> {}", src.display(), dest.display()),
        ))
    }
}
