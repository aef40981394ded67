mod cli;
mod output;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use torrdispatch_core::{
    default_config_path, load_config, validate_config, Config, ConfigError, Dispatcher, FsPlacer,
    GroupConfig,
};

use cli::{Cli, Command, HaveArgs, MoveArgs, SearchArgs};
use output::{found_line, render_group};

/// Exit code when the configuration file is missing.
const EXIT_NO_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| (if cli.debug { "debug" } else { "info" }).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.command.is_none() {
        // Printing help can only fail on a closed stdout.
        let _ = Cli::command().print_help();
        process::exit(1);
    }

    if let Err(e) = run(cli).await {
        if let Some(ConfigError::FileNotFound(path)) = e.downcast_ref::<ConfigError>() {
            error!("Configuration file not found. Please create the file {}.", path);
            process::exit(EXIT_NO_CONFIG);
        }
        error!("Fatal error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path().context("Cannot locate the user configuration directory")?,
    };
    let config = load_config_file(config_path)?;

    let groups = limit_to_groups(&config.groups, &cli.limit_to);
    let mut dispatchers = Vec::with_capacity(groups.len());
    for group in groups {
        let dispatcher = Dispatcher::new(group.clone(), &config.extension, FsPlacer::with_defaults())
            .with_context(|| format!("Invalid group {}", group.label()))?;
        dispatchers.push(dispatcher);
    }

    match cli.command {
        Some(Command::Move(args)) => move_torrents(&dispatchers, args).await,
        Some(Command::Search(args)) => search(&dispatchers, args).await,
        Some(Command::Have(args)) => have(&dispatchers, args).await,
        Some(Command::List) => {
            list_groups(&dispatchers);
            Ok(())
        }
        None => Ok(()),
    }
}

fn load_config_file(path: PathBuf) -> Result<Config> {
    debug!("Loading configuration from {:?}", path);
    let config = load_config(&path)?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("{} group(s) configured", config.groups.len());
    Ok(config)
}

/// Groups named in `names`, or every group when `names` is empty.
fn limit_to_groups<'a>(groups: &'a [GroupConfig], names: &[String]) -> Vec<&'a GroupConfig> {
    if names.is_empty() {
        return groups.iter().collect();
    }
    let selected: Vec<_> = groups
        .iter()
        .filter(|g| g.name.as_ref().is_some_and(|n| names.contains(n)))
        .collect();
    if selected.is_empty() {
        warn!("No group exists with that name");
    }
    selected
}

async fn move_torrents(dispatchers: &[Dispatcher<FsPlacer>], args: MoveArgs) -> Result<()> {
    let mut moved = 0;
    let mut failed_groups = Vec::new();
    for dispatcher in dispatchers {
        match dispatcher.dispatch(None, args.dryrun).await {
            Ok(report) => moved += report.moved_count(),
            Err(e) => {
                error!("Cannot dispatch group {}: {}", dispatcher.label(), e);
                failed_groups.push(dispatcher.label().to_string());
            }
        }
    }
    if moved > 0 {
        info!("All torrents moved ({})", moved);
    } else {
        debug!("Nothing to move");
    }

    if !failed_groups.is_empty() {
        anyhow::bail!("groups not dispatched: {}", failed_groups.join(", "));
    }
    Ok(())
}

async fn search(dispatchers: &[Dispatcher<FsPlacer>], args: SearchArgs) -> Result<()> {
    for dispatcher in dispatchers {
        let results: Vec<String> = dispatcher
            .search(args.terms.as_slice())
            .await
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        if let Some(text) = render_group(dispatcher.label(), &results, args.hide_groups) {
            print!("{}", text);
        }
    }
    Ok(())
}

async fn have(dispatchers: &[Dispatcher<FsPlacer>], args: HaveArgs) -> Result<()> {
    for dispatcher in dispatchers {
        let results: Vec<String> = dispatcher
            .have(&args.torrents)
            .await
            .iter()
            .map(found_line)
            .collect();
        if let Some(text) = render_group(dispatcher.label(), &results, args.hide_groups) {
            print!("{}", text);
        }
    }
    Ok(())
}

fn list_groups(dispatchers: &[Dispatcher<FsPlacer>]) {
    for dispatcher in dispatchers {
        println!("{}\n", dispatcher.describe());
    }
}
