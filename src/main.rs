use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gitviz::render::{render_json, render_text};
use gitviz_ui::{CoordinatorOptions, GraphConfig, RefreshCoordinator, SessionEvent, SessionState};
use graph::CommitGraph;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitviz")]
#[command(about = "Live commit graph of a Git repository", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the commit graph once
    Show(GraphArgs),
    /// Print the commit graph again whenever the repository changes
    Watch(GraphArgs),
}

#[derive(Args)]
struct GraphArgs {
    /// Path to the repository
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Config file (TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of commits to show
    #[arg(short, long)]
    count: Option<NonZeroUsize>,
    /// Include commits no reference can reach
    #[arg(long)]
    unreachable: bool,
    /// Show commit subjects
    #[arg(long)]
    comments: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl GraphArgs {
    fn graph_config(&self) -> Result<GraphConfig> {
        let mut config = match &self.config {
            Some(path) => GraphConfig::load(path)?,
            None => GraphConfig::default(),
        };
        if let Some(count) = self.count {
            config.number_of_commits_to_show = count;
        }
        config.visualize_unreachable |= self.unreachable;
        config.visualize_comments |= self.comments;
        Ok(config)
    }

    fn print(&self, graph: &CommitGraph, config: &GraphConfig) -> Result<()> {
        match self.format {
            Format::Text => print!("{}", render_text(graph, config.visualize_comments)),
            Format::Json => println!("{}", render_json(graph)?),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Show(args) => {
            let config = args.graph_config()?;
            let coordinator = RefreshCoordinator::new(
                config,
                CoordinatorOptions {
                    watch: false,
                    ..CoordinatorOptions::default()
                },
            );
            let events = coordinator.subscribe();
            if coordinator.set_repository_path(Some(args.path.clone())) == SessionState::Unset {
                bail!("Not a git repository: {}", args.path.display());
            }
            if let Ok(SessionEvent::RefreshFailed(error)) = events.try_recv() {
                bail!("Failed to load commit graph: {}", error);
            }
            args.print(&coordinator.graph(), &config)?;
        }
        Commands::Watch(args) => {
            let config = args.graph_config()?;
            let coordinator = RefreshCoordinator::new(config, CoordinatorOptions::default());
            let events = coordinator.subscribe();
            if coordinator.set_repository_path(Some(args.path.clone())) == SessionState::Unset {
                bail!("Not a git repository: {}", args.path.display());
            }
            info!(path = %args.path.display(), "watching for changes");

            for event in events {
                match event {
                    SessionEvent::GraphReplaced(graph) => {
                        args.print(&graph, &config)?;
                        println!();
                    }
                    SessionEvent::RefreshFailed(error) => warn!(%error, "refresh failed; keeping previous graph"),
                    SessionEvent::WatchFailed(error) => bail!("Failed to watch repository: {}", error),
                    SessionEvent::Cleared => break,
                }
            }
        }
    }

    Ok(())
}
