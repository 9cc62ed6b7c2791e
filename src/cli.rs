use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doc-tree")]
#[command(about = "Build and inspect document directory trees from the command line")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Print the visible outline of a session (the sample session by default)
    Show {
        /// Path to the JSON session file
        #[arg(short, long)]
        state: Option<String>,
        /// Output file for the outline (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Execute a command against a session and output the resulting session
    Execute {
        /// Path to the JSON session file (the sample session when omitted)
        #[arg(short, long)]
        state: Option<String>,
        /// Command to execute (e.g., "mkdir:1:Reports", "toggle:3", "sequence:[menu:2,cancel]")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting session (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Also print the outline of the result to stderr
        #[arg(long)]
        outline: bool,
    },
    /// Write a session file to start from
    Init {
        /// Output file for the session (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Start with no nodes instead of the sample tree
        #[arg(long)]
        empty: bool,
    },
    /// Search node names
    Search {
        query: String,
        /// Path to the JSON session file
        #[arg(short, long)]
        state: Option<String>,
    },
}
