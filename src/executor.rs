use crate::actions::{self, Navigator};
use crate::command::Command;
use crate::config::Config;
use crate::error::{Result, TreeError};
use crate::session::SessionState;
use crate::store::{Activation, TreeStore};
use crate::tree::{FileFields, Node, NodeId};

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub state: SessionState,
    pub status_message: Option<String>,
    /// `(screen, node id)` pairs the navigator was asked to show
    pub navigations: Vec<(String, NodeId)>,
}

/// Navigator that just remembers where it was sent
#[derive(Debug, Default)]
struct RecordingNavigator {
    visits: Vec<(String, NodeId)>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, screen: &str, node: &Node) {
        self.visits.push((screen.to_string(), node.id));
    }
}

/// Executes commands against session states
pub struct Executor;

impl Executor {
    /// Execute a command against a session and return the resulting state.
    ///
    /// Validation failures are reported in the status message and leave the
    /// dialog open for another try. Structural errors (bad ids, invalid
    /// parents) abort the whole command.
    pub fn execute(state: &SessionState, command: Command, config: &Config) -> Result<ExecutionResult> {
        let mut store = TreeStore::from_session(state.clone(), config.clone());
        let mut navigator = RecordingNavigator::default();
        let status_message = Self::apply(&mut store, command, &mut navigator)?;

        Ok(ExecutionResult {
            state: store.to_session(),
            status_message,
            navigations: navigator.visits,
        })
    }

    fn apply(
        store: &mut TreeStore,
        command: Command,
        navigator: &mut RecordingNavigator,
    ) -> Result<Option<String>> {
        let message = match command {
            Command::CreateDirectory { parent, name } => match store.create_directory(parent, &name)? {
                Some(id) => format!("Created directory {} ({})", name.trim(), id),
                None => "Empty name, nothing created".to_string(),
            },
            Command::CreateFile { parent, kind, name } => {
                let id = store.create_file(parent, &FileFields::new(name.as_str(), kind))?;
                format!("Created file {} ({})", name.trim(), id)
            }
            Command::Rename { id, name } => {
                if store.rename(id, &name)? {
                    format!("Renamed {} to {}", id, name.trim())
                } else {
                    "Empty name, nothing renamed".to_string()
                }
            }
            Command::Delete(id) => {
                let removed = store.delete(id);
                format!("Removed {} node(s)", removed.len())
            }
            Command::Move { id, parent } => {
                store.move_node(id, parent)?;
                format!("Moved {}", id)
            }
            Command::Reorder { id, position } => {
                store.reorder(id, position)?;
                format!("Moved {} to position {}", id, position)
            }
            Command::ToggleExpanded(id) => {
                if !store.tree().contains(id) {
                    return Err(TreeError::NotFound(id));
                }
                if store.toggle_expanded(id) {
                    let state = if store.is_expanded(id) { "Expanded" } else { "Collapsed" };
                    format!("{} {}", state, id)
                } else {
                    format!("{} is not a directory", id)
                }
            }
            Command::ToggleMenu(id) => match store.toggle_menu(id)? {
                Some(id) => format!("Menu open on {}", id),
                None => "Menu closed".to_string(),
            },
            Command::Activate(id) => match actions::activate(store, id, navigator)? {
                Activation::Toggled { id, expanded: true } => format!("Expanded {}", id),
                Activation::Toggled { id, expanded: false } => format!("Collapsed {}", id),
                Activation::Opened(node) => format!("Opened {}", node.name),
            },
            Command::OpenCreateDialog(parent) => {
                store.open_create_dialog(parent)?;
                "New document".to_string()
            }
            Command::OpenEditDialog(id) => {
                store.open_edit_dialog(id)?;
                "Edit document".to_string()
            }
            Command::SetField(field, value) => {
                if !store.edit_dialog(field, value) {
                    return Err(TreeError::Parse(format!(
                        "No dialog open to set {}",
                        field
                    )));
                }
                format!("Set {}", field)
            }
            Command::Confirm => match store.confirm_dialog() {
                Ok(Some(id)) => format!("Saved {}", id),
                Ok(None) => "No dialog open".to_string(),
                Err(err) if err.is_recoverable() => {
                    log::warn!("Confirm rejected: {}", err);
                    format!("Cannot save: {}", err)
                }
                Err(err) => return Err(err),
            },
            Command::Cancel => {
                if store.cancel_dialog() {
                    "Dialog cancelled".to_string()
                } else {
                    "No dialog open".to_string()
                }
            }
            Command::Sequence(commands) => {
                let mut last = None;
                for command in commands {
                    last = Self::apply(store, command, navigator)?;
                }
                return Ok(last);
            }
        };
        Ok(Some(message))
    }
}
