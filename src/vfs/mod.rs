mod node;
mod virtual_tree;

pub use node::{EntryType, Node};
pub use virtual_tree::VirtualTree;
