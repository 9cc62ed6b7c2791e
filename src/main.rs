use clap::Parser;
use doc_tree::cli::{Cli, Commands};
use doc_tree::config::Config;
use doc_tree::error::Result;
use doc_tree::main_lib;

fn init_logging(verbose: bool) -> Result<()> {
    // Log to a file only if DOC_TREE_LOG names one
    if let Ok(log_file) = std::env::var("DOC_TREE_LOG") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else if verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    log::info!("doc-tree starting up");

    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Show {
        state: None,
        output: None,
    }) {
        Commands::Show { state, output } => {
            main_lib::show(config, state.as_deref(), output.as_deref())
        }
        Commands::Execute {
            state,
            command,
            output,
            outline,
        } => main_lib::execute_command(
            &config,
            state.as_deref(),
            &command,
            output.as_deref(),
            outline,
        ),
        Commands::Init { output, empty } => main_lib::init(output.as_deref(), empty),
        Commands::Search { query, state } => main_lib::search(state.as_deref(), &query),
    }
}
