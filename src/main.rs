use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glintlock::api;
use glintlock::config::Config;
use glintlock::loader::WorldLoader;
use glintlock::source::{AgentClient, DocumentSource, FsSource};
use glintlock::watcher::{WatchHandle, WatcherConfig, WorldWatcher};

#[derive(Parser)]
#[command(name = "glint")]
#[command(about = "Live world state for markdown-driven tabletop campaigns")]
struct Cli {
    /// Agent server URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Campaign directory on the agent server
    #[arg(long, global = true)]
    directory: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the world once and print it as JSON
    Snapshot {
        /// Read from a local campaign directory instead of the agent server
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Follow world changes and log each new snapshot
    Watch,
    /// Follow world changes and serve the current snapshot over HTTP
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Initialize tracing with output to stderr (when stdout carries JSON) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "glintlock=debug,tower_http=debug".into()),
    );

    if use_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Snapshot prints JSON on stdout, so logs go to stderr
    let use_stderr = matches!(cli.command, Some(Commands::Snapshot { .. }));
    init_tracing(use_stderr);

    let mut config = Config::load();
    if let Some(url) = cli.url {
        config.server_url = url;
    }
    if let Some(directory) = cli.directory {
        config.directory = Some(directory);
    }

    match cli.command {
        Some(Commands::Snapshot { root }) => {
            let source: Arc<dyn DocumentSource> = match root {
                Some(root) => Arc::new(FsSource::new(root)),
                None => Arc::new(AgentClient::from_config(&config)),
            };
            let loader = WorldLoader::new(source, config.paths.clone());
            let snapshot = loader.try_fetch().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Some(Commands::Watch) => {
            let handle = start_watcher(&config);
            let mut updates = handle.store().subscribe();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let published = updates.borrow_and_update().clone();
                        let world = &published.snapshot;
                        tracing::info!(
                            "World #{}: {} ({} npcs, {} quests, {} log entries)",
                            published.generation,
                            world.status().as_str(),
                            world.npcs.len(),
                            world.quests.len(),
                            world.log_entries.len(),
                        );
                    }
                }
            }

            handle.shutdown().await;
        }
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.set_listen_port(port);
            }
            serve(config).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}

fn start_watcher(config: &Config) -> WatchHandle {
    let client = Arc::new(AgentClient::from_config(config));
    tracing::info!("Watching world at {}", client.base_url());

    let loader = WorldLoader::new(client.clone(), config.paths.clone());
    WorldWatcher::new(loader, client, WatcherConfig::from_config(config)).start()
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let handle = start_watcher(&config);
    let app = api::create_router(handle.store().clone());

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!("Glintlock server listening on http://{}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    handle.shutdown().await;
    Ok(())
}
