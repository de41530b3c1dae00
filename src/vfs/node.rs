use std::collections::BTreeMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A node of the in-memory tree.
///
/// Directories own their children keyed by name, so every node is reachable from the root by
/// exactly one path and sibling names are unique. Files carry no content: payloads live in the
/// archive only.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Directory(BTreeMap<String, Node>),
    File,
}

impl Node {
    pub fn new_dir() -> Node {
        Node::Directory(BTreeMap::new())
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Node::Directory(_) => EntryType::Directory,
            Node::File => EntryType::File,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    /// Children of a directory, `None` for a file.
    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Directory(children) => Some(children),
            Node::File => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut BTreeMap<String, Node>> {
        match self {
            Node::Directory(children) => Some(children),
            Node::File => None,
        }
    }

    /// Children of this node, turning a file into an empty directory first.
    pub(crate) fn ensure_dir(&mut self) -> &mut BTreeMap<String, Node> {
        if self.is_file() {
            *self = Node::new_dir();
        }
        match self {
            Node::Directory(children) => children,
            Node::File => unreachable!("file nodes are promoted above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type() {
        assert!(Node::File.is_file());
        assert!(!Node::File.is_dir());
        assert!(Node::new_dir().is_dir());
        assert_eq!(Node::new_dir().entry_type(), EntryType::Directory);
        assert!(Node::File.children().is_none());
        assert_eq!(Node::new_dir().children().map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_ensure_dir_promotes_file() {
        let mut node = Node::File;
        node.ensure_dir().insert("child".to_string(), Node::File);
        assert!(node.is_dir());
        assert_eq!(node.children().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_dir_keeps_children() {
        let mut node = Node::new_dir();
        node.ensure_dir().insert("a".to_string(), Node::File);
        node.ensure_dir().insert("b".to_string(), Node::new_dir());
        let names: Vec<_> = node.children().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = Node::new_dir();
        original
            .ensure_dir()
            .insert("sub".to_string(), Node::new_dir());
        let mut copy = original.clone();
        copy.ensure_dir()
            .get_mut("sub")
            .unwrap()
            .ensure_dir()
            .insert("f".to_string(), Node::File);
        assert_ne!(original, copy);
        assert!(original.children().unwrap()["sub"].children().unwrap().is_empty());
    }
}
