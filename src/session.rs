use crate::dialog::Dialog;
use crate::error::Result;
use crate::tree::{DocumentTree, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A document the user opened, for the "recent" strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub id: NodeId,
    pub opened_at: DateTime<Utc>,
}

/// Serializable picture of a store session, used by the command line
/// tool and by tests to set up and inspect scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub tree: DocumentTree,
    #[serde(default)]
    pub expanded: BTreeSet<NodeId>,
    #[serde(default)]
    pub active_menu: Option<NodeId>,
    #[serde(default)]
    pub dialog: Dialog,
    #[serde(default)]
    pub recent: Vec<RecentEntry>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            tree: DocumentTree::sample(),
            // "Documentos" and "Proyectos" start open
            expanded: BTreeSet::from([1, 3]),
            active_menu: None,
            dialog: Dialog::Closed,
            recent: Vec::new(),
        }
    }
}

impl SessionState {
    /// An empty session with no nodes
    pub fn empty() -> Self {
        Self {
            tree: DocumentTree::new(),
            expanded: BTreeSet::new(),
            active_menu: None,
            dialog: Dialog::Closed,
            recent: Vec::new(),
        }
    }

    /// Load a session from a JSON file. The tree is validated on load.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let state: SessionState = serde_json::from_str(&content)?;
        log::debug!(
            "Loaded session from {:?}: {} nodes",
            path.as_ref(),
            state.tree.len()
        );
        Ok(state)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogTarget, Draft};
    use tempfile::TempDir;

    #[test]
    fn test_default_is_sample() {
        let state = SessionState::default();
        assert_eq!(state.tree.len(), 5);
        assert!(state.expanded.contains(&1));
        assert!(state.expanded.contains(&3));
        assert_eq!(state.tree.next_id(), 6);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut state = SessionState::default();
        state.active_menu = Some(2);
        state.dialog = Dialog::Open {
            target: DialogTarget::CreateIn(5),
            draft: Draft {
                name: "Acta".to_string(),
                ..Draft::default()
            },
        };
        state.save_to_file(&path).unwrap();

        let loaded = SessionState::load_from_file(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "tree": {
                "next_id": 3,
                "nodes": [
                    { "id": 1, "name": "Raiz", "order": 1, "entry": { "type": "directory" } },
                    { "id": 2, "name": "a.pdf", "parent_id": 1, "order": 1,
                      "entry": { "type": "file", "kind": "PDF" } }
                ]
            }
        }"#;
        let state: SessionState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tree.len(), 2);
        assert_eq!(state.tree.get(2).unwrap().kind().unwrap().as_str(), "pdf");
        assert!(state.expanded.is_empty());
    }

    #[test]
    fn test_invalid_tree_is_rejected() {
        let json = r#"{
            "tree": {
                "next_id": 3,
                "nodes": [
                    { "id": 1, "name": "a.pdf", "order": 1, "entry": { "type": "file", "kind": "pdf" } },
                    { "id": 2, "name": "b", "parent_id": 1, "order": 1, "entry": { "type": "directory" } }
                ]
            }
        }"#;
        assert!(serde_json::from_str::<SessionState>(json).is_err());
    }
}
