//! In-memory VFS implementation.
//!
//! The whole tree lives in a slot arena. Slot 0 is the root directory.
//! Freed slots are recycled, so a `NodeId` is only meaningful while the
//! node it names is still attached.

use folio_types::config::{SeedFile, SeedKind};

use crate::path::{self, file_name, join, parent};
use crate::{Entry, Node, NodeId, NodeKind, Payload};

const ROOT: NodeId = NodeId(0);

/// Flags for [`MemoryVfs::write_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Concatenate onto existing content instead of overwriting.
    pub append: bool,
    /// Create the file if it does not exist (the parent must exist).
    pub create: bool,
}

/// Outcome of [`MemoryVfs::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The node (and its subtree) was detached and is returned.
    Removed(Node),
    /// Target is a non-empty directory and `recursive` was not set.
    NotEmpty,
    /// Nothing exists at the resolved path.
    NotFound,
    /// The root directory cannot be removed.
    Protected,
}

/// One node visited by [`MemoryVfs::walk`].
#[derive(Debug, Clone)]
pub struct WalkEntry<'a> {
    /// Absolute path of the node.
    pub path: String,
    /// Depth below the walk start (the start itself is 0).
    pub depth: usize,
    pub entry: &'a Entry,
}

/// A fully in-memory virtual file system with a working directory.
#[derive(Debug, Clone)]
pub struct MemoryVfs {
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    cwd: String,
    home: String,
}

impl MemoryVfs {
    /// Create a VFS containing only the root and the home directory.
    pub fn new(home: &str) -> Self {
        let root = Entry {
            name: "/".to_string(),
            section: None,
            payload: Payload::Dir(Vec::new()),
            parent: None,
        };
        let home = path::normalize(home).into_owned();
        let mut vfs = Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            cwd: "/".to_string(),
            home: home.clone(),
        };
        if !vfs.create_dir(&home, true) {
            log::warn!("home directory {home} could not be created");
        } else {
            vfs.cwd = home;
        }
        vfs
    }

    /// Build a tree from flat seed records.
    ///
    /// Intermediate directories are created as needed. A path seen twice
    /// updates the existing leaf. A record whose ancestor is a file is
    /// skipped.
    pub fn from_seeds(seeds: &[SeedFile], home: &str) -> Self {
        let mut vfs = Self::new(home);
        for seed in seeds {
            vfs.apply_seed(seed);
        }
        log::debug!("built vfs with {} nodes", vfs.node_count());
        vfs
    }

    /// Replace the tree with one built from `seeds`, keeping the working
    /// directory when it still exists in the new tree.
    pub fn rebuild(&mut self, seeds: &[SeedFile], home: &str) {
        let previous = self.cwd.clone();
        *self = Self::from_seeds(seeds, home);
        if self.lookup(&previous).is_some_and(|id| self.entry(id).is_dir()) {
            self.cwd = previous;
        }
    }

    fn apply_seed(&mut self, seed: &SeedFile) {
        let target = path::normalize(&seed.path).into_owned();
        if target == "/" {
            return;
        }
        let dir = parent(&target).to_string();
        if !self.create_dir(&dir, true) {
            log::warn!("skipping seed {target}: an ancestor is a file");
            return;
        }
        let Some(parent_id) = self.lookup(&dir) else {
            return;
        };
        let name = file_name(&target).to_string();
        match (self.find_child(parent_id, &name), seed.kind) {
            (Some(id), SeedKind::File) => {
                let entry = self.entry_mut(id);
                match &mut entry.payload {
                    Payload::File(text) => {
                        *text = seed.content.clone().unwrap_or_default();
                        if seed.section.is_some() {
                            entry.section = seed.section.clone();
                        }
                    },
                    Payload::Dir(_) => {
                        log::warn!("skipping seed {target}: a directory already exists there");
                    },
                }
            },
            (Some(id), SeedKind::Directory) => {
                let entry = self.entry_mut(id);
                if entry.is_dir() {
                    if seed.section.is_some() {
                        entry.section = seed.section.clone();
                    }
                } else {
                    log::warn!("skipping seed {target}: a file already exists there");
                }
            },
            (None, kind) => {
                let payload = match kind {
                    SeedKind::File => Payload::File(seed.content.clone().unwrap_or_default()),
                    SeedKind::Directory => Payload::Dir(Vec::new()),
                };
                self.insert_child(parent_id, name, seed.section.clone(), payload);
            },
        }
    }

    // -- Arena plumbing --

    fn entry(&self, id: NodeId) -> &Entry {
        match self.slots.get(id.0) {
            Some(Some(entry)) => entry,
            _ => unreachable!("dangling node id {}", id.0),
        }
    }

    fn entry_mut(&mut self, id: NodeId) -> &mut Entry {
        match self.slots.get_mut(id.0) {
            Some(Some(entry)) => entry,
            _ => unreachable!("dangling node id {}", id.0),
        }
    }

    fn alloc(&mut self, entry: Entry) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(entry);
            NodeId(index)
        } else {
            self.slots.push(Some(entry));
            NodeId(self.slots.len() - 1)
        }
    }

    fn release(&mut self, id: NodeId) -> Entry {
        let entry = self.slots[id.0].take();
        self.free.push(id.0);
        match entry {
            Some(entry) => entry,
            None => unreachable!("double free of node id {}", id.0),
        }
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn find_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        let children = self.entry(dir).children();
        children
            .binary_search_by(|id| self.entry(*id).name.as_str().cmp(name))
            .ok()
            .map(|i| children[i])
    }

    /// Link `child` under `dir`, keeping children sorted by name.
    fn link(&mut self, dir: NodeId, child: NodeId) {
        let name = self.entry(child).name.clone();
        let pos = {
            let children = self.entry(dir).children();
            children
                .binary_search_by(|id| self.entry(*id).name.as_str().cmp(&name))
                .unwrap_or_else(|i| i)
        };
        if let Payload::Dir(children) = &mut self.entry_mut(dir).payload {
            children.insert(pos, child);
        }
        self.entry_mut(child).parent = Some(dir);
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(dir) = self.entry(child).parent {
            if let Payload::Dir(children) = &mut self.entry_mut(dir).payload {
                children.retain(|id| *id != child);
            }
        }
        self.entry_mut(child).parent = None;
    }

    fn insert_child(
        &mut self,
        dir: NodeId,
        name: String,
        section: Option<String>,
        payload: Payload,
    ) -> NodeId {
        let id = self.alloc(Entry {
            name,
            section,
            payload,
            parent: None,
        });
        self.link(dir, id);
        id
    }

    /// Walk a normalized absolute path from the root.
    fn lookup(&self, abs: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for seg in abs.split('/').filter(|s| !s.is_empty()) {
            if !self.entry(current).is_dir() {
                return None;
            }
            current = self.find_child(current, seg)?;
        }
        Some(current)
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.entry(id).parent;
        }
        false
    }

    /// Detach a subtree and return it as an owned `Node`, freeing its slots.
    fn detach(&mut self, id: NodeId) -> Node {
        self.unlink(id);
        self.take_subtree(id)
    }

    fn take_subtree(&mut self, id: NodeId) -> Node {
        let entry = self.release(id);
        let kind = match entry.payload {
            Payload::File(content) => NodeKind::File { content },
            Payload::Dir(children) => NodeKind::Directory {
                children: children.into_iter().map(|c| self.take_subtree(c)).collect(),
            },
        };
        Node {
            name: entry.name,
            section: entry.section,
            kind,
        }
    }

    /// Clone a subtree into an owned `Node` without touching the arena.
    fn snapshot(&self, id: NodeId) -> Node {
        let entry = self.entry(id);
        let kind = match &entry.payload {
            Payload::File(content) => NodeKind::File {
                content: content.clone(),
            },
            Payload::Dir(children) => NodeKind::Directory {
                children: children.iter().map(|c| self.snapshot(*c)).collect(),
            },
        };
        Node {
            name: entry.name.clone(),
            section: entry.section.clone(),
            kind,
        }
    }

    /// Insert an owned subtree under `dir` into fresh slots.
    fn attach(&mut self, dir: NodeId, node: Node) -> NodeId {
        match node.kind {
            NodeKind::File { content } => {
                self.insert_child(dir, node.name, node.section, Payload::File(content))
            },
            NodeKind::Directory { children } => {
                let id = self.insert_child(dir, node.name, node.section, Payload::Dir(Vec::new()));
                for child in children {
                    self.attach(id, child);
                }
                id
            },
        }
    }

    /// Fall back to home (then root) when the working directory vanished.
    fn repair_cwd(&mut self) {
        let valid = |vfs: &Self, p: &str| vfs.lookup(p).is_some_and(|id| vfs.entry(id).is_dir());
        if valid(self, &self.cwd) {
            return;
        }
        self.cwd = if valid(self, &self.home) {
            self.home.clone()
        } else {
            "/".to_string()
        };
    }

    // -- Navigation --

    /// Current working directory (absolute, normalized).
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Home directory (absolute, normalized).
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Resolve user input (`~`, absolute, or relative) to a normalized path.
    pub fn resolve_path(&self, input: &str) -> String {
        path::resolve(&self.cwd, &self.home, input)
    }

    /// Look up any node. Returns `None` when missing or when an ancestor
    /// is a file.
    pub fn get_node(&self, input: &str) -> Option<&Entry> {
        let abs = self.resolve_path(input);
        self.lookup(&abs).map(|id| self.entry(id))
    }

    /// Read a file's content. `None` for directories and missing paths.
    pub fn read_file(&self, input: &str) -> Option<&str> {
        self.get_node(input).and_then(Entry::content)
    }

    /// List a directory's children sorted by name (`None` = current
    /// directory). Returns `None` if the target is missing or a file.
    pub fn list_dir(&self, input: Option<&str>) -> Option<Vec<&Entry>> {
        let abs = match input {
            Some(p) => self.resolve_path(p),
            None => self.cwd.clone(),
        };
        let id = self.lookup(&abs)?;
        let entry = self.entry(id);
        if !entry.is_dir() {
            return None;
        }
        Some(entry.children().iter().map(|c| self.entry(*c)).collect())
    }

    /// Change the working directory. Only succeeds for existing directories.
    pub fn change_dir(&mut self, input: &str) -> bool {
        let abs = self.resolve_path(input);
        match self.lookup(&abs) {
            Some(id) if self.entry(id).is_dir() => {
                self.cwd = abs;
                true
            },
            _ => false,
        }
    }

    // -- Mutation --

    /// Create a directory.
    ///
    /// Without `recursive`, every ancestor must already exist and the target
    /// must not. Fails whenever an existing node on the path is a file.
    pub fn create_dir(&mut self, input: &str, recursive: bool) -> bool {
        let abs = self.resolve_path(input);
        let segments: Vec<&str> = abs.split('/').filter(|s| !s.is_empty()).collect();
        let mut current = ROOT;
        for (i, seg) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            match self.find_child(current, seg) {
                Some(id) => {
                    if !self.entry(id).is_dir() {
                        return false;
                    }
                    if last && !recursive {
                        return false;
                    }
                    current = id;
                },
                None => {
                    if !last && !recursive {
                        return false;
                    }
                    current = self.insert_child(
                        current,
                        (*seg).to_string(),
                        None,
                        Payload::Dir(Vec::new()),
                    );
                },
            }
        }
        true
    }

    /// Create a new file. Fails if the parent is not an existing directory
    /// or if anything already exists at the path.
    pub fn create_file(&mut self, input: &str, content: &str) -> bool {
        let abs = self.resolve_path(input);
        if abs == "/" || self.lookup(&abs).is_some() {
            return false;
        }
        match self.lookup(parent(&abs)) {
            Some(dir) if self.entry(dir).is_dir() => {
                let name = file_name(&abs).to_string();
                self.insert_child(dir, name, None, Payload::File(content.to_string()));
                true
            },
            _ => false,
        }
    }

    /// Write to a file, overwriting or appending.
    ///
    /// A missing file is only created when `opts.create` is set and the
    /// parent directory exists. Writing to a directory fails.
    pub fn write_file(&mut self, input: &str, content: &str, opts: WriteOptions) -> bool {
        let abs = self.resolve_path(input);
        match self.lookup(&abs) {
            Some(id) => match &mut self.entry_mut(id).payload {
                Payload::File(text) => {
                    if opts.append {
                        text.push_str(content);
                    } else {
                        *text = content.to_string();
                    }
                    true
                },
                Payload::Dir(_) => false,
            },
            None if opts.create => self.create_file(&abs, content),
            None => false,
        }
    }

    /// Remove a node. Non-empty directories need `recursive`.
    pub fn remove(&mut self, input: &str, recursive: bool) -> Removal {
        let abs = self.resolve_path(input);
        if abs == "/" {
            return Removal::Protected;
        }
        let Some(id) = self.lookup(&abs) else {
            return Removal::NotFound;
        };
        if self.entry(id).child_count() > 0 && !recursive {
            return Removal::NotEmpty;
        }
        let node = self.detach(id);
        self.repair_cwd();
        Removal::Removed(node)
    }

    /// Work out where `src` lands for a copy or move to `dest`: inside
    /// `dest` when it is a directory, otherwise as `dest` itself.
    fn placement(&self, src: NodeId, dest_abs: &str) -> Option<(NodeId, String)> {
        if let Some(id) = self.lookup(dest_abs) {
            if self.entry(id).is_dir() && id != src {
                return Some((id, self.entry(src).name.clone()));
            }
        }
        let dir = self.lookup(parent(dest_abs))?;
        if !self.entry(dir).is_dir() {
            return None;
        }
        let name = file_name(dest_abs);
        if name.is_empty() {
            return None;
        }
        Some((dir, name.to_string()))
    }

    /// Check the slot at `(dir, name)` can receive `src`, clearing an
    /// existing file when one is in the way.
    fn make_room(&mut self, src: NodeId, dir: NodeId, name: &str) -> bool {
        if self.is_within(dir, src) {
            return false;
        }
        match self.find_child(dir, name) {
            None => true,
            Some(existing) if existing == src => true,
            Some(existing) => {
                if self.entry(existing).is_dir() || self.entry(src).is_dir() {
                    return false;
                }
                self.detach(existing);
                true
            },
        }
    }

    /// Deep-copy a file or directory subtree.
    pub fn copy(&mut self, src: &str, dest: &str) -> bool {
        let src_abs = self.resolve_path(src);
        let dest_abs = self.resolve_path(dest);
        let Some(src_id) = self.lookup(&src_abs) else {
            return false;
        };
        if src_id == ROOT {
            return false;
        }
        let Some((dir, name)) = self.placement(src_id, &dest_abs) else {
            return false;
        };
        if self.find_child(dir, &name) == Some(src_id) {
            return false;
        }
        if !self.make_room(src_id, dir, &name) {
            return false;
        }
        let mut copy = self.snapshot(src_id);
        copy.name = name;
        self.attach(dir, copy);
        true
    }

    /// Move (rename) a node by relinking its slot under the destination.
    ///
    /// Every precondition is checked before the source is unlinked, so a
    /// failed move leaves the tree untouched.
    pub fn move_node(&mut self, src: &str, dest: &str) -> bool {
        let src_abs = self.resolve_path(src);
        let dest_abs = self.resolve_path(dest);
        let Some(src_id) = self.lookup(&src_abs) else {
            return false;
        };
        if src_id == ROOT {
            return false;
        }
        let Some((dir, name)) = self.placement(src_id, &dest_abs) else {
            return false;
        };
        if !self.make_room(src_id, dir, &name) {
            return false;
        }
        self.unlink(src_id);
        self.entry_mut(src_id).name = name;
        self.link(dir, src_id);
        self.repair_cwd();
        true
    }

    // -- Traversal --

    /// Pre-order traversal starting at `input`. Empty when the path is
    /// missing; a single entry when it is a file.
    pub fn walk(&self, input: &str) -> Vec<WalkEntry<'_>> {
        let mut out = Vec::new();
        self.walk_with(input, |e| out.push(e.clone()));
        out
    }

    /// Pre-order traversal invoking `visit` for every node.
    pub fn walk_with<'a, F>(&'a self, input: &str, mut visit: F)
    where
        F: FnMut(&WalkEntry<'a>),
    {
        let abs = self.resolve_path(input);
        let Some(start) = self.lookup(&abs) else {
            return;
        };
        let mut stack = vec![(start, abs, 0usize)];
        while let Some((id, path, depth)) = stack.pop() {
            let entry = self.entry(id);
            // Push in reverse so children pop in name order.
            for child in entry.children().iter().rev() {
                let child_path = join(&path, &self.entry(*child).name);
                stack.push((*child, child_path, depth + 1));
            }
            visit(&WalkEntry { path, depth, entry });
        }
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new("/home/visitor")
    }
}
