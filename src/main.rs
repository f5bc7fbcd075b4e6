//! Portfolio binary entry point

use clap::{Parser, Subcommand};
use portfolio::{AppState, config, service::AccountService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "portfolio", about = "Backend for a personal portfolio site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the admin account; refuses if one already exists
    CreateAdmin {
        /// Login name
        #[arg(long)]
        username: String,
        /// Password (at least 8 characters)
        #[arg(long, env = "PORTFOLIO_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging
/// 3. Run the selected command; only `serve` builds the full AppState
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    init_tracing(&config.logging);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            // 3. Initialize metrics and application state
            portfolio::metrics::init_metrics();
            let state = AppState::new(config).await?;
            serve(state).await
        }
        Command::CreateAdmin { username, password } => {
            let user = AccountService::open(&config.database.path)
                .await?
                .create_admin(&username, &password)
                .await?;
            println!("Admin account '{}' created", user.username);
            Ok(())
        }
    }
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("portfolio={},tower_http=info", logging.level).into()
    });

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    if let Some(backend) = &state.backend {
        if !AccountService::new(backend.db.clone()).has_admin().await? {
            tracing::warn!(
                "No admin account exists; run `portfolio create-admin --username <name>` to create one"
            );
        }
    }

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = portfolio::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
