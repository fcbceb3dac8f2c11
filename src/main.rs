use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use gizmoforge::api::GizmoEngine;
use gizmoforge::config::SearchConfig;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Game data file (perkToComp / compInfo / perkInfo).
    #[arg(global = true, short, long, default_value = "data/calc_data.json")]
    data: String,

    /// JSON file with search tunables; command-line flags win over it.
    #[arg(global = true, short, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the material combinations most likely to roll the target perks.
    Search(cmd::search::SearchArgs),
    /// List the perks a gizmo shell can roll.
    Perks(cmd::perks::PerksArgs),
    /// Show the invention budget distribution per level.
    Budget(cmd::budget::BudgetArgs),
}

fn main() {
    // 1. Parse Raw Matches (needed to tell typed flags from defaults)
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // 2. Logging
    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    // 3. Budget tables need no game data
    if let Commands::Budget(args) = &cli.command {
        cmd::budget::run(args);
        return;
    }

    // 4. Resolve Config: defaults < file < command line
    let mut config = match &cli.config {
        Some(path) => {
            info!("⚙️  Loading search config from {}", path);
            SearchConfig::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            })
        }
        None => SearchConfig::default(),
    };
    if let (Commands::Search(args), Some(sub_matches)) =
        (&cli.command, matches.subcommand_matches("search"))
    {
        if cli.config.is_some() {
            config.merge_from_cli(&args.config, sub_matches);
        } else {
            config = args.config.clone();
        }
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(1);
    }

    // 5. Load Game Data
    info!("🚀 Initializing GizmoForge...");
    let engine = GizmoEngine::load(&cli.data, config).unwrap_or_else(|e| {
        eprintln!("\n❌ FATAL ERROR LOADING GAME DATA:");
        eprintln!("   {}", e);
        process::exit(1);
    });

    // 6. Execute
    let outcome = match cli.command {
        Commands::Search(args) => cmd::search::run(args, &engine),
        Commands::Perks(args) => cmd::perks::run(args, &engine),
        Commands::Budget(_) => Ok(()),
    };
    if let Err(e) = outcome {
        eprintln!("\n❌ {}", e);
        process::exit(1);
    }
}
