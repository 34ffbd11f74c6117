use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use catacombs_client::{
    load_payload_from_path, AvatarProvider, AvatarTemplate, ClientConfig, FallbackResolver, HttpClient, PlayerDirectory,
    Tracker,
};
use catacombs_stats::{derive_player_view, Comparison, DeriveOptions, XpCurve};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod summary;

#[derive(Debug, Parser)]
#[command(name = "catacombs")]
#[command(about = "Skyblock catacombs stats CLI", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive a player view from a saved stats payload.
    Derive {
        payload: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        player_id: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        summary: bool,
        #[arg(long, default_value_t = 1.0)]
        xp_multiplier: f64,
    },
    /// Compare saved payloads given as NAME=PATH or NAME@ID=PATH.
    Compare {
        #[arg(required = true)]
        players: Vec<String>,
        #[arg(long)]
        json: bool,
        #[arg(long, default_value_t = 1.0)]
        xp_multiplier: f64,
    },
    /// Look a player up over the network.
    Fetch {
        name: String,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Player list used as the fallback identity table.
        #[arg(long)]
        players: Option<PathBuf>,
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long)]
        summary: bool,
        /// Factor applied to stored XP, e.g. 1000 for sources that store thousands.
        #[arg(long, default_value_t = 1.0)]
        xp_multiplier: f64,
    },
    /// Print the quick-access player list.
    Players { path: PathBuf },
}

#[derive(Debug, PartialEq, Eq)]
struct PlayerArg {
    name: String,
    player_id: Option<String>,
    path: PathBuf,
}

fn parse_player_arg(arg: &str) -> anyhow::Result<PlayerArg> {
    let (who, path) = arg
        .split_once('=')
        .with_context(|| format!("expected NAME=PATH, got: {arg}"))?;
    let (name, player_id) = match who.split_once('@') {
        Some((name, id)) => (name, Some(id.to_string())),
        None => (who, None),
    };
    if name.is_empty() || path.is_empty() {
        anyhow::bail!("expected NAME=PATH, got: {arg}");
    }
    Ok(PlayerArg {
        name: name.to_string(),
        player_id,
        path: PathBuf::from(path),
    })
}

fn xp_curve(multiplier: f64) -> XpCurve {
    XpCurve::dungeon().with_multiplier(multiplier)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Derive {
            payload,
            name,
            player_id,
            output,
            summary,
            xp_multiplier,
        } => {
            let raw = load_payload_from_path(&payload)?;
            let options = DeriveOptions {
                player_id,
                xp_curve: xp_curve(xp_multiplier),
            };
            let avatar = AvatarTemplate::new(ClientConfig::default().avatar_url).avatar_url(&name);
            let view = derive_player_view(&name, avatar, &raw, &options)
                .with_context(|| format!("derive failed: {}", payload.display()))?;

            let text = if summary {
                summary::render_view(&view)
            } else {
                serde_json::to_string_pretty(&view).context("failed to serialize view")?
            };
            emit(&text, output.as_deref())?;
        }
        Command::Compare {
            players,
            json,
            xp_multiplier,
        } => {
            let avatars = AvatarTemplate::new(ClientConfig::default().avatar_url);
            let mut comparison = Comparison::new();
            for arg in &players {
                let player = parse_player_arg(arg)?;
                let raw = load_payload_from_path(&player.path)?;
                tracing::debug!(player = %player.name, path = %player.path.display(), "loaded payload");
                let options = DeriveOptions {
                    player_id: player.player_id,
                    xp_curve: xp_curve(xp_multiplier),
                };
                let avatar = avatars.avatar_url(&player.name);
                let view = derive_player_view(&player.name, avatar, &raw, &options)
                    .with_context(|| format!("derive failed: {}", player.path.display()))?;
                comparison.add(view.into())?;
            }

            let rows = comparison.to_table();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows).context("failed to serialize table")?);
            } else {
                print!("{}", summary::render_table(&rows));
            }
        }
        Command::Fetch {
            name,
            config,
            players,
            timeout,
            summary,
            xp_multiplier,
        } => {
            let mut config = match config {
                Some(path) => ClientConfig::load(path)?,
                None => ClientConfig::default(),
            };
            if let Some(secs) = timeout {
                config.timeout_secs = secs.max(1);
            }
            let directory = match players {
                Some(path) => PlayerDirectory::load(path)?,
                None => PlayerDirectory::default(),
            };

            let http = HttpClient::new(config)?;
            let tracker = Tracker::new(FallbackResolver::new(http.clone(), directory), http.clone(), http)
                .with_xp_curve(xp_curve(xp_multiplier));
            let view = tracker
                .lookup(&name)
                .await
                .with_context(|| format!("lookup failed: {name}"))?;

            if summary {
                print!("{}", summary::render_view(&view));
            } else {
                println!("{}", serde_json::to_string_pretty(&view).context("failed to serialize view")?);
            }
        }
        Command::Players { path } => {
            let directory = PlayerDirectory::load(path)?;
            print!("{}", summary::render_players(directory.quick_access()));
        }
    }

    Ok(())
}

fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write: {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
