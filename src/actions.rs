//! Context-menu actions and the collaborators they talk to
//!
//! The store itself never asks the user anything. These flows sit between
//! the presentation layer and the store: they ask a [`Prompter`] for a name
//! or a confirmation, then apply the matching store operation. A dismissed
//! prompt always leaves the tree untouched.

use crate::error::{Result, TreeError};
use crate::store::{Activation, TreeStore};
use crate::tree::{FileKind, Node, NodeId};
use std::collections::BTreeSet;
use std::fmt;

/// Receives requests to show another screen
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    fn navigate(&mut self, screen: &str, node: &Node);
}

/// Asks the user for free text or a yes/no decision
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// `None` when the user cancelled
    fn prompt_text(&mut self, title: &str) -> Option<String>;
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewFolder,
    NewFile,
    Rename,
    Delete,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::NewFolder => "New folder",
            MenuAction::NewFile => "New file",
            MenuAction::Rename => "Rename",
            MenuAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a menu action ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Created(NodeId),
    Renamed(NodeId),
    Deleted(BTreeSet<NodeId>),
    DialogOpened,
    /// The prompt was dismissed or left empty
    Dismissed,
}

/// Actions offered by a node's context menu
pub fn menu_actions(node: &Node) -> Vec<MenuAction> {
    if node.is_dir() {
        vec![
            MenuAction::NewFolder,
            MenuAction::NewFile,
            MenuAction::Rename,
            MenuAction::Delete,
        ]
    } else {
        vec![MenuAction::Rename, MenuAction::Delete]
    }
}

/// Run a context-menu action on `id`. The menu is closed first.
pub fn run_menu_action(
    store: &mut TreeStore,
    id: NodeId,
    action: MenuAction,
    prompter: &mut dyn Prompter,
) -> Result<ActionOutcome> {
    store.close_menu();
    let is_dir = store
        .tree()
        .get(id)
        .map(Node::is_dir)
        .ok_or(TreeError::NotFound(id))?;

    match action {
        MenuAction::NewFolder => {
            let Some(name) = prompter.prompt_text("Folder name") else {
                return Ok(ActionOutcome::Dismissed);
            };
            Ok(match store.create_directory(Some(id), &name)? {
                Some(created) => ActionOutcome::Created(created),
                None => ActionOutcome::Dismissed,
            })
        }
        MenuAction::NewFile => {
            store.open_create_dialog(id)?;
            Ok(ActionOutcome::DialogOpened)
        }
        MenuAction::Rename if is_dir => {
            let Some(name) = prompter.prompt_text("New name") else {
                return Ok(ActionOutcome::Dismissed);
            };
            Ok(if store.rename(id, &name)? {
                ActionOutcome::Renamed(id)
            } else {
                ActionOutcome::Dismissed
            })
        }
        MenuAction::Rename => {
            store.open_edit_dialog(id)?;
            Ok(ActionOutcome::DialogOpened)
        }
        MenuAction::Delete => {
            if !prompter.confirm(
                "Confirm deletion",
                "Are you sure you want to delete this item?",
            ) {
                return Ok(ActionOutcome::Dismissed);
            }
            Ok(ActionOutcome::Deleted(store.delete(id)))
        }
    }
}

/// Prompt for a new root-level folder
pub fn add_root_folder(store: &mut TreeStore, prompter: &mut dyn Prompter) -> Result<ActionOutcome> {
    let Some(name) = prompter.prompt_text("Folder name") else {
        return Ok(ActionOutcome::Dismissed);
    };
    Ok(match store.create_directory(None, &name)? {
        Some(id) => ActionOutcome::Created(id),
        None => ActionOutcome::Dismissed,
    })
}

/// Tap a node: directories open or close, documents go to the viewer
pub fn activate(
    store: &mut TreeStore,
    id: NodeId,
    navigator: &mut dyn Navigator,
) -> Result<Activation> {
    let activation = store.activate(id)?;
    if let Activation::Opened(node) = &activation {
        let screen = store.config().viewer_screen.clone();
        log::info!("Opening {:?} in {}", node.name, screen);
        navigator.navigate(&screen, node);
    }
    Ok(activation)
}

/// Icon name for a document kind
pub fn glyph_for(kind: &FileKind) -> &'static str {
    match kind {
        FileKind::Pdf => "picture-as-pdf",
        FileKind::Ppt => "slideshow",
        FileKind::Doc => "description",
        FileKind::Xls => "table-chart",
        FileKind::Other(_) => "insert-drive-file",
    }
}

/// Icon name for any node given its expansion state
pub fn node_glyph(node: &Node, expanded: bool) -> &'static str {
    match node.kind() {
        Some(kind) => glyph_for(kind),
        None if expanded => "folder-open",
        None => "folder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::SessionState;
    use assert_matches::assert_matches;
    use maplit::btreeset;
    use mockall::predicate::eq;

    fn sample_store() -> TreeStore {
        TreeStore::from_session(SessionState::default(), Config::default())
    }

    #[test]
    fn test_menu_actions_by_node_type() {
        let store = sample_store();
        assert_eq!(menu_actions(store.tree().get(1).unwrap()).len(), 4);
        assert_eq!(
            menu_actions(store.tree().get(2).unwrap()),
            vec![MenuAction::Rename, MenuAction::Delete]
        );
    }

    #[test]
    fn test_new_folder_prompts_and_closes_menu() {
        let mut store = sample_store();
        store.toggle_menu(5).unwrap();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_prompt_text()
            .with(eq("Folder name"))
            .times(1)
            .returning(|_| Some("Contratos".to_string()));

        let outcome = run_menu_action(&mut store, 5, MenuAction::NewFolder, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Created(6));
        assert_eq!(store.active_menu(), None);
        assert!(store.is_expanded(6));
        assert_eq!(store.tree().get(6).unwrap().parent_id, Some(5));
    }

    #[test]
    fn test_cancelled_prompt_is_a_noop() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        prompter.expect_prompt_text().returning(|_| None);

        let outcome = run_menu_action(&mut store, 1, MenuAction::NewFolder, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Dismissed);
        assert_eq!(store.tree().len(), 5);
        assert_eq!(store.tree().next_id(), 6);

        let outcome = run_menu_action(&mut store, 1, MenuAction::Rename, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Dismissed);
        assert_eq!(store.tree().get(1).unwrap().name, "Documentos");
    }

    #[test]
    fn test_empty_prompt_is_a_noop() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        prompter.expect_prompt_text().returning(|_| Some(String::new()));

        let outcome = add_root_folder(&mut store, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Dismissed);
        assert_eq!(store.tree().next_id(), 6);
    }

    #[test]
    fn test_rename_file_opens_edit_dialog() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        prompter.expect_prompt_text().never();

        let outcome = run_menu_action(&mut store, 2, MenuAction::Rename, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::DialogOpened);
        assert_eq!(store.dialog().draft().unwrap().name, "Informe Financiero.pdf");
    }

    #[test]
    fn test_rename_directory() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        prompter
            .expect_prompt_text()
            .with(eq("New name"))
            .returning(|_| Some("Modelos".to_string()));

        let outcome = run_menu_action(&mut store, 5, MenuAction::Rename, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Renamed(5));
        assert_eq!(store.tree().get(5).unwrap().name, "Modelos");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_, _| false);
        let outcome = run_menu_action(&mut store, 1, MenuAction::Delete, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Dismissed);
        assert_eq!(store.tree().len(), 5);

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_, _| true);
        let outcome = run_menu_action(&mut store, 1, MenuAction::Delete, &mut prompter).unwrap();
        assert_eq!(outcome, ActionOutcome::Deleted(btreeset! {1, 2, 3, 4}));
        assert_eq!(store.tree().len(), 1);
    }

    #[test]
    fn test_action_on_missing_node() {
        let mut store = sample_store();
        let mut prompter = MockPrompter::new();
        assert_matches!(
            run_menu_action(&mut store, 40, MenuAction::Delete, &mut prompter),
            Err(TreeError::NotFound(40))
        );
    }

    #[test]
    fn test_activate_file_navigates_to_viewer() {
        let mut store = sample_store();
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .withf(|screen, node| screen == "Viewer" && node.id == 2)
            .times(1)
            .return_const(());

        activate(&mut store, 2, &mut navigator).unwrap();
        assert_eq!(store.recent()[0].id, 2);
    }

    #[test]
    fn test_activate_directory_does_not_navigate() {
        let mut store = sample_store();
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().never();

        let activation = activate(&mut store, 5, &mut navigator).unwrap();
        assert_eq!(activation, Activation::Toggled { id: 5, expanded: true });
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(glyph_for(&FileKind::Pdf), "picture-as-pdf");
        assert_eq!(glyph_for(&FileKind::Xls), "table-chart");
        assert_eq!(glyph_for(&FileKind::parse("informe")), "insert-drive-file");
        let store = sample_store();
        let dir = store.tree().get(1).unwrap();
        assert_eq!(node_glyph(dir, true), "folder-open");
        assert_eq!(node_glyph(dir, false), "folder");
        assert_eq!(node_glyph(store.tree().get(4).unwrap(), false), "slideshow");
    }
}
