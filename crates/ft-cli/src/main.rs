use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ft_core::{Identity, SystemClock, TimerKind};
use ft_db::{Database, Mirror, UserStore};
use tracing_subscriber::EnvFilter;

use ft_cli::commands::{history, projects, stats, status, sync, task, timer, watch};
use ft_cli::{Cli, Commands, Config, FocusApp, HistoryAction, PresetKind, ProjectsAction, SyncAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Open the mirror database configured as `mirror_path`.
fn open_mirror(config: &Config, identity: Identity) -> Result<Mirror<Database>> {
    let path = config
        .mirror_path
        .as_deref()
        .context("no mirror configured; set mirror_path in config.toml or FT_MIRROR_PATH")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create mirror directory")?;
    }
    let db = Database::open(path)
        .with_context(|| format!("failed to open mirror {}", path.display()))?;
    Ok(Mirror::new(db, identity))
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves,
/// so the watch still ends when the timer stops.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (db, config) = open_database(cli.config.as_deref())?;
    let identity = config.identity();
    let store = UserStore::new(db, identity.clone());
    let mut app = FocusApp::load(store, SystemClock, &config);
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Status { json } => status::run(&mut out, &app, *json)?,
        Commands::Toggle => timer::toggle(&mut out, &mut app)?,
        Commands::Phase => timer::switch_phase(&mut out, &mut app)?,
        Commands::Reset => timer::reset(&mut out, &mut app)?,
        Commands::Finish => timer::finish(&mut out, &mut app)?,
        Commands::Preset { kind } => match kind {
            PresetKind::Stopwatch => timer::preset(&mut out, &mut app, TimerKind::Stopwatch, None)?,
            PresetKind::Countdown { minutes } => {
                timer::preset(&mut out, &mut app, TimerKind::Countdown, *minutes)?;
            }
        },
        Commands::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            let period = Duration::from_millis(config.tick_interval_ms);
            runtime.block_on(watch::run(&mut out, &mut app, period, ctrl_c()))?;
        }
        Commands::Stats {
            period,
            offset,
            from,
            to,
            json,
        } => {
            let query = stats::build_query(
                *period,
                *offset,
                from.as_deref(),
                to.as_deref(),
                app.now(),
                &chrono::Local,
            )?;
            stats::run(&mut out, &app, &query, *json)?;
        }
        Commands::History(action) => match action {
            HistoryAction::List { limit, json } => history::list(&mut out, &app, *limit, *json)?,
            HistoryAction::Clear { yes } => history::clear(&mut out, &mut app, *yes)?,
        },
        Commands::Projects(action) => match action {
            ProjectsAction::List => projects::list(&mut out, &app)?,
            ProjectsAction::Add { name } => projects::add(&mut out, &mut app, name)?,
            ProjectsAction::Rename { id, name } => projects::rename(&mut out, &mut app, id, name)?,
            ProjectsAction::Delete { id } => projects::delete(&mut out, &mut app, id)?,
            ProjectsAction::Select { id } => projects::select(&mut out, &mut app, id)?,
        },
        Commands::Task { text, clear } => task::run(&mut out, &mut app, text.as_deref(), *clear)?,
        Commands::Sync(action) => {
            let mut mirror = open_mirror(&config, identity)?;
            match action {
                SyncAction::Push => sync::push(&mut out, &app, &mut mirror)?,
                SyncAction::Pull => sync::pull(&mut out, &mut app, &mirror)?,
            }
        }
    }

    if !app.flush() {
        eprintln!("warning: some changes could not be saved");
    }
    Ok(())
}
