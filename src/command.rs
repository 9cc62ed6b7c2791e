use crate::dialog::DraftField;
use crate::error::TreeError;
use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents all operations that can be driven from the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Tree mutations
    CreateDirectory { parent: Option<NodeId>, name: String },
    CreateFile { parent: NodeId, kind: String, name: String },
    Rename { id: NodeId, name: String },
    Delete(NodeId),
    Move { id: NodeId, parent: Option<NodeId> },
    Reorder { id: NodeId, position: usize },

    // View state
    ToggleExpanded(NodeId),
    ToggleMenu(NodeId),
    Activate(NodeId),

    // Document dialog
    OpenCreateDialog(NodeId),
    OpenEditDialog(NodeId),
    SetField(DraftField, String),
    Confirm,
    Cancel,

    // Multi-step commands for testing
    Sequence(Vec<Command>),
}

fn parse_id(raw: &str) -> Result<NodeId, TreeError> {
    raw.trim()
        .parse()
        .map_err(|_| TreeError::Parse(format!("Invalid node id: {}", raw)))
}

/// `root` (or an empty string) means no parent
fn parse_parent(raw: &str) -> Result<Option<NodeId>, TreeError> {
    match raw.trim() {
        "" | "root" => Ok(None),
        id => parse_id(id).map(Some),
    }
}

fn format_parent(parent: Option<NodeId>) -> String {
    parent.map_or_else(|| "root".to_string(), |id| id.to_string())
}

impl FromStr for Command {
    type Err = TreeError;

    /// Parse a command from its string representation, e.g. `mkdir:1:Reports`
    /// or `sequence:[toggle:1,menu:2]`. Names are the last field, so they may
    /// contain `:`. Inside `sequence:[..]` the steps are split on every `,`,
    /// so names there must not contain commas and sequences do not nest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s
            .strip_prefix("sequence:[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if inner.trim().is_empty() {
                return Ok(Command::Sequence(vec![]));
            }
            let commands = inner
                .split(',')
                .map(|cmd_str| {
                    cmd_str.parse().map_err(|e| {
                        TreeError::Parse(format!("Invalid command in sequence '{}': {}", cmd_str, e))
                    })
                })
                .collect::<Result<Vec<Command>, TreeError>>()?;
            return Ok(Command::Sequence(commands));
        }

        let (verb, args) = s.split_once(':').unwrap_or((s, ""));
        match verb.to_lowercase().as_str() {
            "mkdir" => {
                let (parent, name) = args
                    .split_once(':')
                    .ok_or_else(|| TreeError::Parse(format!("Usage: mkdir:<parent|root>:<name>, got {}", s)))?;
                Ok(Command::CreateDirectory {
                    parent: parse_parent(parent)?,
                    name: name.to_string(),
                })
            }
            "touch" => {
                let mut parts = args.splitn(3, ':');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(parent), Some(kind), Some(name)) => Ok(Command::CreateFile {
                        parent: parse_id(parent)?,
                        kind: kind.to_string(),
                        name: name.to_string(),
                    }),
                    _ => Err(TreeError::Parse(format!(
                        "Usage: touch:<parent>:<kind>:<name>, got {}",
                        s
                    ))),
                }
            }
            "rename" => {
                let (id, name) = args
                    .split_once(':')
                    .ok_or_else(|| TreeError::Parse(format!("Usage: rename:<id>:<name>, got {}", s)))?;
                Ok(Command::Rename {
                    id: parse_id(id)?,
                    name: name.to_string(),
                })
            }
            "delete" | "rm" => Ok(Command::Delete(parse_id(args)?)),
            "move" | "mv" => {
                let (id, parent) = args
                    .split_once(':')
                    .ok_or_else(|| TreeError::Parse(format!("Usage: move:<id>:<parent|root>, got {}", s)))?;
                Ok(Command::Move {
                    id: parse_id(id)?,
                    parent: parse_parent(parent)?,
                })
            }
            "reorder" => {
                let (id, position) = args
                    .split_once(':')
                    .ok_or_else(|| TreeError::Parse(format!("Usage: reorder:<id>:<position>, got {}", s)))?;
                let position = position
                    .trim()
                    .parse()
                    .map_err(|_| TreeError::Parse(format!("Invalid position: {}", position)))?;
                Ok(Command::Reorder {
                    id: parse_id(id)?,
                    position,
                })
            }
            "toggle" | "expand" => Ok(Command::ToggleExpanded(parse_id(args)?)),
            "menu" => Ok(Command::ToggleMenu(parse_id(args)?)),
            "open" | "enter" => Ok(Command::Activate(parse_id(args)?)),
            "new_file" => Ok(Command::OpenCreateDialog(parse_id(args)?)),
            "edit" => Ok(Command::OpenEditDialog(parse_id(args)?)),
            "set" => {
                let (field, value) = args
                    .split_once(':')
                    .ok_or_else(|| TreeError::Parse(format!("Usage: set:<field>:<value>, got {}", s)))?;
                Ok(Command::SetField(field.parse()?, value.to_string()))
            }
            "confirm" | "save" if args.is_empty() => Ok(Command::Confirm),
            "cancel" | "escape" if args.is_empty() => Ok(Command::Cancel),
            _ => Err(TreeError::Parse(format!("Unknown command: {}", s))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateDirectory { parent, name } => {
                write!(f, "mkdir:{}:{}", format_parent(*parent), name)
            }
            Command::CreateFile { parent, kind, name } => {
                write!(f, "touch:{}:{}:{}", parent, kind, name)
            }
            Command::Rename { id, name } => write!(f, "rename:{}:{}", id, name),
            Command::Delete(id) => write!(f, "delete:{}", id),
            Command::Move { id, parent } => write!(f, "move:{}:{}", id, format_parent(*parent)),
            Command::Reorder { id, position } => write!(f, "reorder:{}:{}", id, position),
            Command::ToggleExpanded(id) => write!(f, "toggle:{}", id),
            Command::ToggleMenu(id) => write!(f, "menu:{}", id),
            Command::Activate(id) => write!(f, "open:{}", id),
            Command::OpenCreateDialog(id) => write!(f, "new_file:{}", id),
            Command::OpenEditDialog(id) => write!(f, "edit:{}", id),
            Command::SetField(field, value) => write!(f, "set:{}:{}", field, value),
            Command::Confirm => write!(f, "confirm"),
            Command::Cancel => write!(f, "cancel"),
            Command::Sequence(commands) => {
                let inner: Vec<String> = commands.iter().map(ToString::to_string).collect();
                write!(f, "sequence:[{}]", inner.join(","))
            }
        }
    }
}
