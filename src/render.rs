use crate::actions::{menu_actions, node_glyph};
use crate::config::Config;
use crate::dialog::{Dialog, DialogTarget};
use crate::error::Result;
use crate::session::SessionState;
use crate::store::TreeStore;
use std::fmt::Write as _;
use std::fs;

/// Render the visible tree, the open menu and any pending dialog as text
pub fn render_outline(store: &TreeStore) -> String {
    let indent_width = store.config().indent_width;
    let mut out = String::new();

    for (node, depth) in store.visible() {
        let expanded = store.is_expanded(node.id);
        let marker = match (node.is_dir(), expanded) {
            (true, true) => '▾',
            (true, false) => '▸',
            (false, _) => ' ',
        };
        let _ = write!(
            out,
            "{:indent$}{} {} [{}] #{}",
            "",
            marker,
            node.name,
            node_glyph(node, expanded),
            node.id,
            indent = depth * indent_width
        );
        if store.active_menu() == Some(node.id) {
            let labels: Vec<&str> = menu_actions(node).iter().map(|a| a.label()).collect();
            let _ = write!(out, "  ⋮ {}", labels.join(" | "));
        }
        out.push('\n');
    }

    if store.tree().is_empty() {
        out.push_str("(empty)\n");
    }

    if let Dialog::Open { target, draft } = store.dialog() {
        let title = match target {
            DialogTarget::CreateIn(parent) => format!("New document in #{}", parent),
            DialogTarget::Edit(id) => format!("Edit document #{}", id),
        };
        let _ = writeln!(out, "\n== {} ==", title);
        let _ = writeln!(out, "name:        {}", draft.name);
        let _ = writeln!(out, "kind:        {}", draft.kind);
        let _ = writeln!(out, "description: {}", draft.description);
        let _ = writeln!(out, "code:        {}", draft.code);
    }

    if !store.recent().is_empty() {
        out.push_str("\nRecent:\n");
        for entry in store.recent() {
            if let Some(node) = store.tree().get(entry.id) {
                let _ = writeln!(
                    out,
                    "  {} ({})",
                    node.name,
                    entry.opened_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }

    out
}

/// Render a session file, writing to `output_path` or stdout
pub fn write_outline(
    state: SessionState,
    config: Config,
    output_path: Option<&str>,
) -> Result<()> {
    let store = TreeStore::from_session(state, config);
    let outline = render_outline(&store);
    match output_path {
        Some(path) => {
            fs::write(path, outline)?;
            println!("Outline saved to: {}", path);
        }
        None => print!("{}", outline),
    }
    Ok(())
}
