/// Soundboard Server - browse, organize and play a directory of sounds over HTTP
use clap::Parser;
use soundboard_core::SoundEngine;
use soundboard_library::{LibraryManager, UrlIngestor};
use soundboard_playback::{NullEngine, PlaybackDispatcher};
use soundboard_server::{api, config::ServerConfig, state::AppState};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soundboard-server")]
#[command(about = "Soundboard web app serving a directory of sounds", long_about = None)]
struct Cli {
    /// Path to the directory containing sound files
    #[arg(short = 'd', long = "sounds-dir", visible_alias = "dir", env = "SOUNDBOARD_SOUNDS_DIR")]
    sounds_dir: PathBuf,

    /// Port to run the web app on [default: 5000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "soundboard_server=info,soundboard_library=info,soundboard_playback=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration, command line wins
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    config.apply_cli(cli.sounds_dir, cli.port, cli.host);
    config.validate()?;

    serve(config).await
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Soundboard Server");
    tracing::info!("Sounds directory: {}", config.library.root.display());

    let library = LibraryManager::new(&config.library.root)?;
    tracing::info!("Library opened at {}", library.root().display());

    let ingestor = UrlIngestor::new(library.clone(), config.ingest_config())?;

    let engine = open_engine();
    let dispatcher = PlaybackDispatcher::start(
        library.resolver().clone(),
        engine,
        config.playback_config(),
    );
    tracing::info!("Playback dispatcher started ({})", dispatcher.engine_name());

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    let web_dir = config.server.web_dir.clone();

    let app_state = AppState::new(
        Arc::new(library),
        Arc::new(ingestor),
        Arc::new(dispatcher),
        Arc::new(config),
    );
    let app = api::router(app_state, web_dir.as_deref());

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Audio device output when built with it, otherwise the silent engine
#[cfg(feature = "device-output")]
fn open_engine() -> Arc<dyn SoundEngine> {
    match soundboard_playback::RodioEngine::open_default() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::warn!("No audio output available ({}), playback will be silent", e);
            Arc::new(NullEngine::new())
        }
    }
}

#[cfg(not(feature = "device-output"))]
fn open_engine() -> Arc<dyn SoundEngine> {
    tracing::warn!("Built without device output, playback will be silent");
    Arc::new(NullEngine::new())
}
