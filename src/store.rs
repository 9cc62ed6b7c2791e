//! Directory tree store
//!
//! Owns the node collection together with the session's view state: the
//! expanded set, the single open context menu, the pending create/edit
//! dialog and the recently opened documents. Every operation runs to
//! completion before returning, so callers only ever see whole states.

use crate::config::Config;
use crate::dialog::{Dialog, DialogTarget, Draft, DraftField};
use crate::error::{Result, TreeError};
use crate::session::{RecentEntry, SessionState};
use crate::traversal::{visible_items, Visible, VisibleItem};
use crate::tree::{DocumentTree, FileFields, Node, NodeId, TreeStats};
use chrono::Utc;
use std::collections::BTreeSet;

/// Events that can be sent to the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    CreateDirectory { parent: Option<NodeId>, name: String },
    CreateFile { parent: NodeId, fields: FileFields },
    Rename { id: NodeId, name: String },
    UpdateFile { id: NodeId, fields: FileFields },
    Delete(NodeId),
    Move { id: NodeId, parent: Option<NodeId> },
    Reorder { id: NodeId, position: usize },
    ToggleExpanded(NodeId),
    ToggleMenu(NodeId),
    CloseMenu,
    OpenCreateDialog(NodeId),
    OpenEditDialog(NodeId),
    EditDialog(DraftField, String),
    ConfirmDialog,
    CancelDialog,
}

/// Result of activating (tapping) a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A directory was opened or closed
    Toggled { id: NodeId, expanded: bool },
    /// A document was opened and should be shown by the viewer
    Opened(Node),
}

/// Read-only view of one list level plus the transient state
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub parent: Option<NodeId>,
    pub children: Vec<&'a Node>,
    pub expanded: &'a BTreeSet<NodeId>,
    pub active_menu: Option<NodeId>,
    pub dialog: &'a Dialog,
}

#[derive(Debug, Clone)]
pub struct TreeStore {
    tree: DocumentTree,
    expanded: BTreeSet<NodeId>,
    active_menu: Option<NodeId>,
    dialog: Dialog,
    recent: Vec<RecentEntry>,
    config: Config,
}

impl TreeStore {
    /// Create a store over `tree` with every directory collapsed
    pub fn new(tree: DocumentTree, config: Config) -> Self {
        Self {
            tree,
            expanded: BTreeSet::new(),
            active_menu: None,
            dialog: Dialog::Closed,
            recent: Vec::new(),
            config,
        }
    }

    /// Restore a session, dropping view state that points at missing nodes
    pub fn from_session(state: SessionState, config: Config) -> Self {
        let SessionState {
            tree,
            mut expanded,
            active_menu,
            dialog,
            mut recent,
        } = state;

        expanded.retain(|id| tree.is_directory(*id));
        let active_menu = active_menu.filter(|id| tree.contains(*id));
        let dialog = match dialog.target() {
            Some(DialogTarget::CreateIn(parent)) if !tree.is_directory(parent) => {
                log::warn!("Dropping new-document dialog: {} is not a directory", parent);
                Dialog::Closed
            }
            Some(DialogTarget::Edit(id)) if !tree.get(id).is_some_and(|node| !node.is_dir()) => {
                log::warn!("Dropping edit dialog: {} is not a document", id);
                Dialog::Closed
            }
            _ => dialog,
        };
        recent.retain(|entry| tree.get(entry.id).is_some_and(|node| !node.is_dir()));
        recent.truncate(config.recent_limit);

        Self {
            tree,
            expanded,
            active_menu,
            dialog,
            recent,
            config,
        }
    }

    pub fn to_session(&self) -> SessionState {
        SessionState {
            tree: self.tree.clone(),
            expanded: self.expanded.clone(),
            active_menu: self.active_menu,
            dialog: self.dialog.clone(),
            recent: self.recent.clone(),
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn expanded(&self) -> &BTreeSet<NodeId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn active_menu(&self) -> Option<NodeId> {
        self.active_menu
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// Recently opened documents, most recent first
    pub fn recent(&self) -> &[RecentEntry] {
        &self.recent
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle an event and return whether the state changed
    pub fn handle_event(&mut self, event: StoreEvent) -> Result<bool> {
        log::debug!("handle_event: {:?}", event);
        let changed = match event {
            StoreEvent::CreateDirectory { parent, name } => {
                self.create_directory(parent, &name)?.is_some()
            }
            StoreEvent::CreateFile { parent, fields } => {
                self.create_file(parent, &fields)?;
                true
            }
            StoreEvent::Rename { id, name } => self.rename(id, &name)?,
            StoreEvent::UpdateFile { id, fields } => {
                self.update_file(id, &fields)?;
                true
            }
            StoreEvent::Delete(id) => !self.delete(id).is_empty(),
            StoreEvent::Move { id, parent } => {
                let before = self.tree.get(id).map(|node| node.parent_id);
                self.move_node(id, parent)?;
                before != Some(parent)
            }
            StoreEvent::Reorder { id, position } => {
                let before = self.tree.child_ids(self.parent_of(id)?).to_vec();
                self.reorder(id, position)?;
                before != self.tree.child_ids(self.parent_of(id)?)
            }
            StoreEvent::ToggleExpanded(id) => self.toggle_expanded(id),
            StoreEvent::ToggleMenu(id) => {
                self.toggle_menu(id)?;
                true
            }
            StoreEvent::CloseMenu => self.close_menu(),
            StoreEvent::OpenCreateDialog(parent) => {
                self.open_create_dialog(parent)?;
                true
            }
            StoreEvent::OpenEditDialog(id) => {
                self.open_edit_dialog(id)?;
                true
            }
            StoreEvent::EditDialog(field, value) => self.edit_dialog(field, value),
            StoreEvent::ConfirmDialog => self.confirm_dialog()?.is_some(),
            StoreEvent::CancelDialog => self.cancel_dialog(),
        };
        Ok(changed)
    }

    /// Create a directory, expanding it when the configuration asks for it
    pub fn create_directory(&mut self, parent: Option<NodeId>, name: &str) -> Result<Option<NodeId>> {
        let expand = self.config.expand_new_directories;
        self.create_directory_with(parent, name, expand)
    }

    /// Create a directory, expanding it only if `expand` is set
    pub fn create_directory_with(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        expand: bool,
    ) -> Result<Option<NodeId>> {
        let id = self.tree.create_directory(parent, name)?;
        if let (Some(id), true) = (id, expand) {
            self.expanded.insert(id);
        }
        self.check_invariants();
        Ok(id)
    }

    pub fn create_file(&mut self, parent: NodeId, fields: &FileFields) -> Result<NodeId> {
        let id = self.tree.create_file(parent, fields)?;
        self.check_invariants();
        Ok(id)
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<bool> {
        self.tree.rename(id, name)
    }

    pub fn update_file(&mut self, id: NodeId, fields: &FileFields) -> Result<()> {
        self.tree.update_file(id, fields)
    }

    /// Delete a node and its subtree, dropping any view state that pointed
    /// into it. Returns the removed ids.
    pub fn delete(&mut self, id: NodeId) -> BTreeSet<NodeId> {
        let removed = self.tree.delete_subtree(id);
        if removed.is_empty() {
            return removed;
        }

        self.expanded.retain(|id| !removed.contains(id));
        if self.active_menu.is_some_and(|menu| removed.contains(&menu)) {
            self.active_menu = None;
        }
        if let Some(target) = self.dialog.target() {
            if removed.contains(&target.node_id()) {
                log::debug!("delete: closing dialog targeting removed node {}", target.node_id());
                self.dialog.close();
            }
        }
        self.recent.retain(|entry| !removed.contains(&entry.id));

        log::info!("Deleted {} node(s) under {}", removed.len(), id);
        self.check_invariants();
        removed
    }

    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.tree.move_node(id, parent)?;
        self.check_invariants();
        Ok(())
    }

    pub fn reorder(&mut self, id: NodeId, position: usize) -> Result<()> {
        self.tree.reorder(id, position)?;
        self.check_invariants();
        Ok(())
    }

    /// Flip a directory between open and closed. Returns `false` for files
    /// and unknown ids, which have no expansion state.
    pub fn toggle_expanded(&mut self, id: NodeId) -> bool {
        if !self.tree.is_directory(id) {
            log::debug!("toggle_expanded: {} is not a directory", id);
            return false;
        }
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        true
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if !self.tree.is_directory(id) {
            return false;
        }
        if expanded {
            self.expanded.insert(id)
        } else {
            self.expanded.remove(&id)
        }
    }

    /// Open the context menu of `id`, or close it if it is the open one.
    /// Opening a menu closes any other.
    pub fn toggle_menu(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        if !self.tree.contains(id) {
            return Err(TreeError::NotFound(id));
        }
        self.active_menu = if self.active_menu == Some(id) {
            None
        } else {
            Some(id)
        };
        Ok(self.active_menu)
    }

    pub fn close_menu(&mut self) -> bool {
        self.active_menu.take().is_some()
    }

    /// Start the new-document form under `parent`
    pub fn open_create_dialog(&mut self, parent: NodeId) -> Result<()> {
        if !self.tree.is_directory(parent) {
            return Err(TreeError::InvalidParent(parent));
        }
        let draft = Draft {
            kind: self.config.default_file_kind.clone(),
            ..Draft::default()
        };
        self.dialog.open(DialogTarget::CreateIn(parent), draft)
    }

    /// Start the edit form for a document, pre-filled with its stored metadata
    pub fn open_edit_dialog(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.get(id).ok_or(TreeError::NotFound(id))?;
        if node.is_dir() {
            return Err(TreeError::NotAFile(id));
        }
        let draft = Draft::from_node(node);
        self.dialog.open(DialogTarget::Edit(id), draft)
    }

    pub fn edit_dialog(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        self.dialog.set_field(field, value)
    }

    /// Apply the pending dialog and close it.
    ///
    /// Returns the created or edited node id, or `None` when no dialog is
    /// open. On a validation failure the dialog stays open with its draft.
    pub fn confirm_dialog(&mut self) -> Result<Option<NodeId>> {
        let Dialog::Open { target, draft } = &self.dialog else {
            return Ok(None);
        };
        let target = *target;
        let fields = match draft.to_fields() {
            Ok(fields) => fields,
            Err(err) => {
                log::warn!("confirm_dialog: {}", err);
                return Err(err);
            }
        };

        let id = match target {
            DialogTarget::CreateIn(parent) => self.create_file(parent, &fields)?,
            DialogTarget::Edit(id) => {
                self.update_file(id, &fields)?;
                id
            }
        };
        self.dialog.close();
        Ok(Some(id))
    }

    /// Discard the pending dialog without touching the tree
    pub fn cancel_dialog(&mut self) -> bool {
        self.dialog.close()
    }

    /// Tap a node: directories toggle, documents open and are remembered in
    /// the recent list.
    pub fn activate(&mut self, id: NodeId) -> Result<Activation> {
        let node = self.tree.get(id).ok_or(TreeError::NotFound(id))?;
        if node.is_dir() {
            self.toggle_expanded(id);
            return Ok(Activation::Toggled {
                id,
                expanded: self.is_expanded(id),
            });
        }

        let node = node.clone();
        self.recent.retain(|entry| entry.id != id);
        self.recent.insert(
            0,
            RecentEntry {
                id,
                opened_at: Utc::now(),
            },
        );
        self.recent.truncate(self.config.recent_limit);
        Ok(Activation::Opened(node))
    }

    /// Direct children of `parent`, in render order
    pub fn children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.tree.children_of(parent)
    }

    /// Lazy `(node, depth)` walk over everything currently shown
    pub fn visible(&self) -> Visible<'_> {
        Visible::new(&self.tree, &self.expanded)
    }

    pub fn view_items(&self) -> Vec<VisibleItem> {
        visible_items(&self.tree, &self.expanded, self.active_menu)
    }

    pub fn snapshot(&self, parent: Option<NodeId>) -> Snapshot<'_> {
        Snapshot {
            parent,
            children: self.tree.children_of(parent),
            expanded: &self.expanded,
            active_menu: self.active_menu,
            dialog: &self.dialog,
        }
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats(&self.expanded)
    }

    pub fn search(&self, query: &str) -> Vec<(&Node, i64)> {
        self.tree.search(query)
    }

    fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.tree
            .get(id)
            .map(|node| node.parent_id)
            .ok_or(TreeError::NotFound(id))
    }

    fn check_invariants(&self) {
        debug_assert!(self.tree.validate().is_ok(), "{:?}", self.tree.validate());
        debug_assert!(self.expanded.iter().all(|id| self.tree.is_directory(*id)));
        debug_assert!(self.active_menu.map_or(true, |id| self.tree.contains(id)));
    }
}
