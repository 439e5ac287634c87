use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{
    activity, add, checkout, export, find, persist, roster, status, toggle, util,
};
use ct_cli::{ActivityAction, Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");
    let store = util::open_store(&config)?;

    // Observer wiring at the composition root: activity replacements
    // are announced through the store's notification surface.
    store.subscribe(Some(ct_store::ACTIVITY_PROPERTY), |old, new| {
        tracing::info!(
            old = old.map(|a| a.name.as_str()),
            new = new.map(|a| a.name.as_str()),
            "activity changed"
        );
    });

    match &cli.command {
        Some(Commands::Add { first, last, id }) => {
            add::run(&store, first, last, *id)?;
            util::persist(&store, &config)?;
        }
        Some(Commands::Find { first, last }) => {
            find::run(&store, first, last)?;
        }
        Some(Commands::Toggle { id }) => {
            toggle::run(&store, *id)?;
            util::persist(&store, &config)?;
        }
        Some(Commands::Activity { action }) => match action {
            ActivityAction::Set { name, start, end } => {
                activity::set(&store, name, start, end)?;
                util::persist(&store, &config)?;
            }
            ActivityAction::Show => activity::show(&store),
            ActivityAction::Clear => {
                activity::clear(&store);
                util::persist(&store, &config)?;
            }
        },
        Some(Commands::Status) => status::run(&store),
        Some(Commands::Roster { json }) => roster::run(&store, *json)?,
        Some(Commands::CheckoutAll) => {
            checkout::run(&store);
            util::persist(&store, &config)?;
        }
        Some(Commands::Dump { dir }) => {
            let dir = dir.as_deref().unwrap_or(&config.database_dir);
            persist::dump(&store, dir)?;
        }
        Some(Commands::Load { dir }) => {
            let dir = dir.as_deref().unwrap_or(&config.database_dir);
            persist::load(&store, dir)?;
            util::persist(&store, &config)?;
        }
        Some(Commands::ExportCsv { path }) => export::run(&store, path)?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
