//! Virtual file system for the folio terminal.
//!
//! The tree is an arena of slots addressed by [`NodeId`]. Directories own a
//! sorted list of child ids, files own their text. Copying clones a subtree
//! into fresh slots; moving relinks the same slot under a new parent, so no
//! two paths ever alias one node.

mod memory;
pub mod path;

pub use memory::{MemoryVfs, Removal, WalkEntry, WriteOptions};

/// Stable handle to a slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    File(String),
    Dir(Vec<NodeId>),
}

/// A live node inside the tree.
#[derive(Debug, Clone)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) section: Option<String>,
    pub(crate) payload: Payload,
    pub(crate) parent: Option<NodeId>,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        match self.payload {
            Payload::File(_) => EntryKind::File,
            Payload::Dir(_) => EntryKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.payload, Payload::Dir(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.payload, Payload::File(_))
    }

    /// File text, or `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            Payload::File(text) => Some(text),
            Payload::Dir(_) => None,
        }
    }

    /// Page section this node links to, if any.
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Number of direct children (0 for files).
    pub fn child_count(&self) -> usize {
        match &self.payload {
            Payload::Dir(children) => children.len(),
            Payload::File(_) => 0,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.payload {
            Payload::Dir(children) => children,
            Payload::File(_) => &[],
        }
    }
}

/// A detached, owned subtree (for example the result of a removal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub section: Option<String>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File { content: String },
    Directory { children: Vec<Node> },
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Count of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        match &self.kind {
            NodeKind::File { .. } => 1,
            NodeKind::Directory { children } => {
                1 + children.iter().map(Node::node_count).sum::<usize>()
            },
        }
    }
}
