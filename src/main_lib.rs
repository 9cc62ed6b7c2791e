// Library module containing the testable bodies of the CLI subcommands

use crate::command::Command;
use crate::config::Config;
use crate::error::Result;
use crate::executor::Executor;
use crate::render::{render_outline, write_outline};
use crate::session::SessionState;
use crate::store::TreeStore;
use std::fs;

/// Load a session file, or the sample session when no path is given
pub fn load_state(state_path: Option<&str>) -> Result<SessionState> {
    match state_path {
        Some(path) => SessionState::load_from_file(path),
        None => Ok(SessionState::default()),
    }
}

fn emit(content: &str, output_path: Option<&str>, what: &str) -> Result<()> {
    match output_path {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} saved to: {}", what, path);
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn show(config: Config, state_path: Option<&str>, output_path: Option<&str>) -> Result<()> {
    let state = load_state(state_path)?;
    write_outline(state, config, output_path)
}

pub fn execute_command(
    config: &Config,
    state_path: Option<&str>,
    command_str: &str,
    output_path: Option<&str>,
    outline: bool,
) -> Result<()> {
    // Load the session
    let state = load_state(state_path)?;

    // Parse the command
    let command: Command = command_str.parse()?;
    log::info!("Executing {}", command);

    // Execute the command
    let result = Executor::execute(&state, command, config)?;

    // Output the result
    let result_json = serde_json::to_string_pretty(&result.state)?;
    emit(&result_json, output_path, "Result")?;

    // Show execution summary
    if let Some(status) = &result.status_message {
        eprintln!("Status: {}", status);
    }
    for (screen, id) in &result.navigations {
        eprintln!("Navigate: {} -> #{}", screen, id);
    }
    if outline {
        let store = TreeStore::from_session(result.state, config.clone());
        eprint!("{}", render_outline(&store));
    }

    Ok(())
}

pub fn init(output_path: Option<&str>, empty: bool) -> Result<()> {
    let state = if empty {
        SessionState::empty()
    } else {
        SessionState::default()
    };
    let json = serde_json::to_string_pretty(&state)?;
    emit(&json, output_path, "Session")
}

pub fn search(state_path: Option<&str>, query: &str) -> Result<()> {
    let state = load_state(state_path)?;
    let hits = state.tree.search(query);
    if hits.is_empty() {
        eprintln!("No matches for {:?}", query);
    }
    for (node, score) in hits {
        println!("#{}\t{}\t{}", node.id, score, node.name);
    }
    Ok(())
}
