use crate::error::{Result, TreeError};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

pub type NodeId = u64;

/// Document type tag carried by leaf nodes. Only used for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileKind {
    Pdf,
    Ppt,
    Doc,
    Xls,
    Other(String),
}

impl FileKind {
    /// Parse a free-text kind, normalising it to lowercase
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "pdf" => FileKind::Pdf,
            "ppt" => FileKind::Ppt,
            "doc" => FileKind::Doc,
            "xls" => FileKind::Xls,
            _ => FileKind::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Ppt => "ppt",
            FileKind::Doc => "doc",
            FileKind::Xls => "xls",
            FileKind::Other(raw) => raw,
        }
    }
}

impl From<String> for FileKind {
    fn from(raw: String) -> Self {
        FileKind::parse(&raw)
    }
}

impl From<FileKind> for String {
    fn from(kind: FileKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored metadata of a leaf document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Caller-supplied values for creating or editing a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFields {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl FileFields {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            code: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn to_meta(&self) -> FileMeta {
        FileMeta {
            kind: FileKind::parse(&self.kind),
            description: non_blank(self.description.as_deref()),
            code: non_blank(self.code.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Directory,
    File(FileMeta),
}

/// A directory or leaf document, linked to its parent by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub order: u32,
    pub entry: Entry,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self.entry, Entry::Directory)
    }

    pub fn file_meta(&self) -> Option<&FileMeta> {
        match &self.entry {
            Entry::File(meta) => Some(meta),
            Entry::Directory => None,
        }
    }

    pub fn kind(&self) -> Option<&FileKind> {
        self.file_meta().map(|meta| &meta.kind)
    }
}

/// Flat node collection with a derived `parent -> children` index.
///
/// Every public mutation either applies completely or returns an error
/// without touching the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr", into = "TreeRepr")]
pub struct DocumentTree {
    nodes: BTreeMap<NodeId, Node>,
    // Sibling groups, each kept sorted by (order, id)
    children: HashMap<Option<NodeId>, Vec<NodeId>>,
    next_id: NodeId,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DocumentTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.next_id == other.next_id
    }
}

impl DocumentTree {
    /// Create a new empty tree. The first allocated id is 1.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            children: HashMap::new(),
            next_id: 1,
        }
    }

    /// The prototype's starting data: two roots, a nested project folder
    /// and two documents.
    pub fn sample() -> Self {
        let mut tree = Self::new();
        let file = |kind: FileKind| {
            Entry::File(FileMeta {
                kind,
                description: None,
                code: None,
            })
        };
        let sample = [
            (1, "Documentos", None, 1, Entry::Directory),
            (2, "Informe Financiero.pdf", Some(1), 1, file(FileKind::Pdf)),
            (3, "Proyectos", Some(1), 2, Entry::Directory),
            (4, "Presentación.pptx", Some(3), 1, file(FileKind::Ppt)),
            (5, "Plantillas", None, 2, Entry::Directory),
        ];
        for (id, name, parent_id, order, entry) in sample {
            tree.insert(Node {
                id,
                name: name.to_string(),
                parent_id,
                order,
                entry,
            });
        }
        tree.next_id = 6;
        tree
    }

    /// Rebuild a tree from raw nodes, rejecting anything that breaks the
    /// collection invariants.
    pub fn from_nodes(nodes: Vec<Node>, next_id: NodeId) -> Result<Self> {
        let mut tree = Self::new();
        for node in nodes {
            if tree.nodes.contains_key(&node.id) {
                return Err(TreeError::Inconsistent(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
            tree.insert(node);
        }
        let floor = match tree.nodes.keys().next_back() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                TreeError::Inconsistent(format!("node id {} is out of range", max))
            })?,
            None => 1,
        };
        tree.next_id = next_id.max(floor);
        tree.validate()?;
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn is_directory(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_dir)
    }

    /// The id the next create will receive
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ids of the direct children of `parent` (or of the roots), in render order
    pub fn child_ids(&self, parent: Option<NodeId>) -> &[NodeId] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// Direct children of `parent` (or the roots), sorted by `order`
    pub fn children_of(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.child_ids(parent)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Parent chain of `id`, nearest first. Empty for roots and unknown ids.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|node| node.parent_id);
        while let Some(parent) = current {
            // A well-formed tree never has a chain longer than its node count
            if chain.len() > self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = self.get(parent).and_then(|node| node.parent_id);
        }
        chain
    }

    /// Nesting level of a node; roots are at depth 0
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// All transitive descendants of `id`, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut closure = self.removal_closure(id);
        closure.remove(&id);
        closure
    }

    /// Create a directory under `parent_id`, or at the root when `None`.
    ///
    /// An empty (or blank) name means the prompt was dismissed: nothing is
    /// allocated and `Ok(None)` is returned.
    pub fn create_directory(
        &mut self,
        parent_id: Option<NodeId>,
        name: &str,
    ) -> Result<Option<NodeId>> {
        let name = name.trim();
        if name.is_empty() {
            log::debug!("create_directory: empty name, nothing created");
            return Ok(None);
        }
        if let Some(parent) = parent_id {
            self.require_directory(parent)?;
        }

        let order = self.next_order(parent_id)?;
        let id = self.allocate_id()?;
        self.insert(Node {
            id,
            name: name.to_string(),
            parent_id,
            order,
            entry: Entry::Directory,
        });
        log::debug!(
            "create_directory: id={} name={:?} parent={:?} order={}",
            id,
            name,
            parent_id,
            order
        );
        Ok(Some(id))
    }

    /// Create a leaf document under an existing directory
    pub fn create_file(&mut self, parent_id: NodeId, fields: &FileFields) -> Result<NodeId> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(TreeError::ValidationFailed("name"));
        }
        self.require_directory(parent_id)?;

        let order = self.next_order(Some(parent_id))?;
        let id = self.allocate_id()?;
        let meta = fields.to_meta();
        log::debug!(
            "create_file: id={} name={:?} kind={} parent={} order={}",
            id,
            name,
            meta.kind,
            parent_id,
            order
        );
        self.insert(Node {
            id,
            name: name.to_string(),
            parent_id: Some(parent_id),
            order,
            entry: Entry::File(meta),
        });
        Ok(id)
    }

    /// Overwrite a node's name. Returns `false` when `new_name` is blank.
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<bool> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            log::debug!("rename: empty name for {}, ignored", id);
            return Ok(false);
        }
        log::debug!("rename: {} {:?} -> {:?}", id, node.name, new_name);
        node.name = new_name.to_string();
        Ok(true)
    }

    /// Replace the name and metadata of a leaf node
    pub fn update_file(&mut self, id: NodeId, fields: &FileFields) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        let name = fields.name.trim();
        let Entry::File(meta) = &mut node.entry else {
            return Err(TreeError::NotAFile(id));
        };
        if name.is_empty() {
            return Err(TreeError::ValidationFailed("name"));
        }
        *meta = fields.to_meta();
        node.name = name.to_string();
        log::debug!("update_file: {} now {:?} ({})", id, node.name, meta.kind);
        Ok(())
    }

    /// Remove `id` and everything beneath it. Unknown ids remove nothing.
    pub fn delete_subtree(&mut self, id: NodeId) -> BTreeSet<NodeId> {
        if !self.contains(id) {
            log::debug!("delete_subtree: {} not present, nothing to do", id);
            return BTreeSet::new();
        }
        let removed = self.removal_closure(id);

        for removed_id in &removed {
            if let Some(node) = self.nodes.remove(removed_id) {
                if let Some(group) = self.children.get_mut(&node.parent_id) {
                    group.retain(|child| child != removed_id);
                }
            }
            self.children.remove(&Some(*removed_id));
        }
        self.children.retain(|_, group| !group.is_empty());

        log::debug!("delete_subtree: {} removed {:?}", id, removed);
        removed
    }

    /// Re-parent a node, appending it at the end of its new sibling group
    pub fn move_node(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<()> {
        let old_parent = self.get(id).ok_or(TreeError::NotFound(id))?.parent_id;
        if let Some(parent) = new_parent {
            self.require_directory(parent)?;
            if parent == id || self.ancestors(parent).contains(&id) {
                return Err(TreeError::Cycle { id, parent });
            }
        }
        if old_parent == new_parent {
            return Ok(());
        }

        let order = self.next_order(new_parent)?;
        if let Some(group) = self.children.get_mut(&old_parent) {
            group.retain(|child| *child != id);
            if group.is_empty() {
                self.children.remove(&old_parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = new_parent;
            node.order = order;
        }
        self.children.entry(new_parent).or_default().push(id);
        self.sort_group(new_parent);
        log::debug!(
            "move_node: {} from {:?} to {:?} at order {}",
            id,
            old_parent,
            new_parent,
            order
        );
        Ok(())
    }

    /// Move a node to a 1-based position among its siblings, clamping to the
    /// group bounds, and renumber the group 1..n.
    pub fn reorder(&mut self, id: NodeId, position: usize) -> Result<()> {
        let parent = self.get(id).ok_or(TreeError::NotFound(id))?.parent_id;
        let mut group: Vec<NodeId> = self
            .child_ids(parent)
            .iter()
            .copied()
            .filter(|child| *child != id)
            .collect();
        let index = position.clamp(1, group.len() + 1) - 1;
        group.insert(index, id);

        for (rank, child) in group.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(child) {
                node.order = rank as u32 + 1;
            }
        }
        self.children.insert(parent, group);
        log::debug!("reorder: {} to position {} under {:?}", id, index + 1, parent);
        Ok(())
    }

    /// Fuzzy name search over every node, best match first
    pub fn search(&self, query: &str) -> Vec<(&Node, i64)> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut hits: Vec<(&Node, i64)> = self
            .nodes
            .values()
            .filter_map(|node| {
                matcher
                    .fuzzy_match(&node.name, query)
                    .map(|score| (node, score))
            })
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id.cmp(&b.0.id)));
        log::debug!("search: {:?} matched {} nodes", query, hits.len());
        hits
    }

    /// Get tree statistics
    pub fn stats(&self, expanded: &BTreeSet<NodeId>) -> TreeStats {
        let mut stats = TreeStats::default();
        for node in self.nodes.values() {
            if node.is_dir() {
                stats.directories += 1;
                if expanded.contains(&node.id) {
                    stats.expanded_directories += 1;
                }
            } else {
                stats.files += 1;
            }
            stats.total_nodes += 1;
            stats.max_depth = stats.max_depth.max(self.ancestors(node.id).len());
        }
        stats
    }

    /// Check the collection invariants, reporting the first violation
    pub fn validate(&self) -> Result<()> {
        let broken = |msg: String| -> Result<()> { Err(TreeError::Inconsistent(msg)) };
        let mut orders: HashMap<Option<NodeId>, BTreeSet<u32>> = HashMap::new();

        for (key, node) in &self.nodes {
            if *key != node.id {
                return broken(format!("node {} stored under key {}", node.id, key));
            }
            if node.id >= self.next_id {
                return broken(format!("node {} not below next id {}", node.id, self.next_id));
            }
            if node.name.trim().is_empty() {
                return broken(format!("node {} has an empty name", node.id));
            }
            if let Some(parent) = node.parent_id {
                if !self.is_directory(parent) {
                    return broken(format!(
                        "node {} is parented under {}, which is not a directory",
                        node.id, parent
                    ));
                }
            }
            if self.ancestors(node.id).len() > self.nodes.len() {
                return broken(format!("node {} is part of a cycle", node.id));
            }
            if !orders.entry(node.parent_id).or_default().insert(node.order) {
                return broken(format!(
                    "order {} repeated under {:?}",
                    node.order, node.parent_id
                ));
            }
            if !self.child_ids(node.parent_id).contains(&node.id) {
                return broken(format!("node {} missing from the child index", node.id));
            }
        }

        let indexed: usize = self.children.values().map(Vec::len).sum();
        if indexed != self.nodes.len() {
            return broken(format!(
                "child index holds {} entries for {} nodes",
                indexed,
                self.nodes.len()
            ));
        }
        Ok(())
    }

    fn require_directory(&self, parent: NodeId) -> Result<()> {
        if self.is_directory(parent) {
            Ok(())
        } else {
            Err(TreeError::InvalidParent(parent))
        }
    }

    fn allocate_id(&mut self) -> Result<NodeId> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| TreeError::Inconsistent("node ids exhausted".to_string()))?;
        Ok(id)
    }

    /// One past the highest order in the sibling group. Equal to the sibling
    /// count + 1 for gap-free groups and never collides after deletions.
    fn next_order(&self, parent: Option<NodeId>) -> Result<u32> {
        self.children_of(parent)
            .iter()
            .map(|node| node.order)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                TreeError::Inconsistent(format!("sibling orders exhausted under {:?}", parent))
            })
    }

    fn insert(&mut self, node: Node) {
        let parent = node.parent_id;
        self.children.entry(parent).or_default().push(node.id);
        self.nodes.insert(node.id, node);
        self.sort_group(parent);
    }

    fn sort_group(&mut self, parent: Option<NodeId>) {
        let nodes = &self.nodes;
        if let Some(group) = self.children.get_mut(&parent) {
            group.sort_by_key(|id| (nodes.get(id).map_or(u32::MAX, |n| n.order), *id));
        }
    }

    /// Fixed-point expansion over parent links: keep adding nodes whose
    /// parent is already in the set until a pass adds nothing.
    fn removal_closure(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut closure = BTreeSet::new();
        if !self.contains(id) {
            return closure;
        }
        closure.insert(id);

        let mut changed = true;
        while changed {
            changed = false;
            for node in self.nodes.values() {
                if let Some(parent) = node.parent_id {
                    if closure.contains(&parent) && closure.insert(node.id) {
                        changed = true;
                    }
                }
            }
        }
        closure
    }
}

/// Serialized form: the nodes plus the id counter. The child index is
/// rebuilt on load.
#[derive(Serialize, Deserialize)]
struct TreeRepr {
    next_id: NodeId,
    nodes: Vec<Node>,
}

impl TryFrom<TreeRepr> for DocumentTree {
    type Error = TreeError;

    fn try_from(repr: TreeRepr) -> Result<Self> {
        DocumentTree::from_nodes(repr.nodes, repr.next_id)
    }
}

impl From<DocumentTree> for TreeRepr {
    fn from(tree: DocumentTree) -> Self {
        TreeRepr {
            next_id: tree.next_id,
            nodes: tree.nodes.into_values().collect(),
        }
    }
}

/// Statistics about the document tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub files: usize,
    pub directories: usize,
    pub expanded_directories: usize,
    pub max_depth: usize,
}
