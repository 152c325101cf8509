use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use parlour_server::config;
use parlour_server::database::ConnectionStringDatabase;
use parlour_server::logging;
use parlour_server::state::AppState;
use parlour_server::websocket;

/// Parlour -- real-time room coordination core for turn-based social games.
#[derive(Parser, Debug)]
#[command(name = "parlour-server")]
#[command(about = "Room coordination server: admission, presence, and broadcast for turn-based social games")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_required(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  CORS origins: {}", cfg.cors_origins);
                println!("  Room code length: {}", cfg.server.room_code_length);
                println!("  Rate limit (room creation): {}/window", cfg.rate_limit.max_room_creations);
                return Ok(());
            }
            Err(err) => {
                eprintln!("Configuration validation failed:\n{err}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "starting parlour-server");

    let database = Arc::new(ConnectionStringDatabase::new(&cfg.database_url)?);
    let state = Arc::new(AppState::with_config(database, &cfg.server, &cfg.rate_limit));

    state.rate_limiter.clone().spawn_cleanup_task();

    let router = websocket::create_router(state, &cfg.cors_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(anyhow::Error::from)
}
