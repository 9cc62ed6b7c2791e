use crate::error::{Result, TreeError};
use crate::tree::{FileFields, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a confirmed dialog will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogTarget {
    CreateIn(NodeId),
    Edit(NodeId),
}

impl DialogTarget {
    pub fn node_id(&self) -> NodeId {
        match self {
            DialogTarget::CreateIn(id) | DialogTarget::Edit(id) => *id,
        }
    }
}

/// Draft values of the document form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub code: String,
}

impl Draft {
    /// Pre-fill from the stored metadata of a file node
    pub fn from_node(node: &Node) -> Self {
        let meta = node.file_meta();
        Self {
            name: node.name.clone(),
            kind: meta.map(|m| m.kind.to_string()).unwrap_or_default(),
            description: meta
                .and_then(|m| m.description.clone())
                .unwrap_or_default(),
            code: meta.and_then(|m| m.code.clone()).unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Name => self.name = value,
            DraftField::Kind => self.kind = value,
            DraftField::Description => self.description = value,
            DraftField::Code => self.code = value,
        }
    }

    /// Validate and convert into create/update fields
    pub fn to_fields(&self) -> Result<FileFields> {
        if self.name.trim().is_empty() {
            return Err(TreeError::ValidationFailed("name"));
        }
        let mut fields = FileFields::new(self.name.trim(), self.kind.trim());
        if !self.description.trim().is_empty() {
            fields = fields.with_description(self.description.trim());
        }
        if !self.code.trim().is_empty() {
            fields = fields.with_code(self.code.trim());
        }
        Ok(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Kind,
    Description,
    Code,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Name,
        DraftField::Kind,
        DraftField::Description,
        DraftField::Code,
    ];
}

impl FromStr for DraftField {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(DraftField::Name),
            "kind" | "type" => Ok(DraftField::Kind),
            "description" => Ok(DraftField::Description),
            "code" => Ok(DraftField::Code),
            _ => Err(TreeError::Parse(format!("Unknown dialog field: {}", s))),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DraftField::Name => "name",
            DraftField::Kind => "kind",
            DraftField::Description => "description",
            DraftField::Code => "code",
        })
    }
}

/// The pending create/edit form. There is no "open without a draft" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Dialog {
    #[default]
    Closed,
    Open { target: DialogTarget, draft: Draft },
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        matches!(self, Dialog::Open { .. })
    }

    pub fn target(&self) -> Option<DialogTarget> {
        match self {
            Dialog::Open { target, .. } => Some(*target),
            Dialog::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Dialog::Open { draft, .. } => Some(draft),
            Dialog::Closed => None,
        }
    }

    /// `Closed -> Open(draft)`. Fails if a dialog is already open.
    pub fn open(&mut self, target: DialogTarget, draft: Draft) -> Result<()> {
        if self.is_open() {
            return Err(TreeError::DialogAlreadyOpen);
        }
        *self = Dialog::Open { target, draft };
        Ok(())
    }

    /// `Open(draft) -> Open(draft')`. Returns `false` when closed.
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        match self {
            Dialog::Open { draft, .. } => {
                draft.set(field, value.into());
                true
            }
            Dialog::Closed => false,
        }
    }

    /// `Open(draft) -> Closed`, discarding the draft
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        *self = Dialog::Closed;
        was_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DocumentTree;
    use assert_matches::assert_matches;

    fn open_dialog() -> Dialog {
        let mut dialog = Dialog::Closed;
        dialog
            .open(
                DialogTarget::CreateIn(1),
                Draft {
                    kind: "Informe".to_string(),
                    ..Draft::default()
                },
            )
            .unwrap();
        dialog
    }

    #[test]
    fn test_open_edit_close() {
        let mut dialog = open_dialog();
        assert!(dialog.is_open());
        assert!(dialog.set_field(DraftField::Name, "Acta.doc"));
        assert_eq!(dialog.draft().unwrap().name, "Acta.doc");
        assert!(dialog.close());
        assert_eq!(dialog, Dialog::Closed);
        assert!(!dialog.close());
    }

    #[test]
    fn test_editing_a_closed_dialog_does_nothing() {
        let mut dialog = Dialog::Closed;
        assert!(!dialog.set_field(DraftField::Name, "x"));
        assert_eq!(dialog, Dialog::Closed);
    }

    #[test]
    fn test_second_open_is_rejected() {
        let mut dialog = open_dialog();
        assert_matches!(
            dialog.open(DialogTarget::Edit(2), Draft::default()),
            Err(TreeError::DialogAlreadyOpen)
        );
        assert_eq!(dialog.target(), Some(DialogTarget::CreateIn(1)));
    }

    #[test]
    fn test_draft_requires_name() {
        let draft = Draft {
            name: "  ".to_string(),
            ..Draft::default()
        };
        assert_matches!(draft.to_fields(), Err(TreeError::ValidationFailed("name")));
    }

    #[test]
    fn test_draft_from_node_uses_stored_metadata() {
        let mut tree = DocumentTree::sample();
        tree.update_file(
            2,
            &FileFields::new("Informe Financiero.pdf", "pdf")
                .with_description("Cierre anual")
                .with_code("FIN-01"),
        )
        .unwrap();
        let draft = Draft::from_node(tree.get(2).unwrap());
        assert_eq!(draft.kind, "pdf");
        assert_eq!(draft.description, "Cierre anual");
        assert_eq!(draft.code, "FIN-01");
    }

    #[test]
    fn test_field_names() {
        assert_eq!("type".parse::<DraftField>().unwrap(), DraftField::Kind);
        assert!("colour".parse::<DraftField>().is_err());
        assert_eq!(DraftField::Description.to_string(), "description");
    }
}
