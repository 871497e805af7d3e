use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

mod config;
mod db;
mod models;
pub mod observability;
mod routes;
pub mod services;

/// Shared application state passed to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::ServiceConfig>,
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
}

impl AppState {
    pub async fn new(config: config::ServiceConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = db::DbPool::from_config(&config.database).await?;
        if config.database.run_migrations {
            pool.run_migrations().await?;
        }
        let db = Arc::new(pool);

        let services = services::Services::new(db.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            services,
        })
    }
}

/// CLI arguments for the statistics service
#[derive(Parser, Debug)]
#[command(version, about = "Advertising statistics service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./adstats.toml, created if missing)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Initialize a new configuration file
    Init {
        /// Path to create the config file (defaults to ./adstats.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run database migrations and exit
    ///
    /// Useful for Kubernetes init containers or CI/CD pipelines.
    /// Connects to the database, runs any pending migrations, and exits.
    Migrate,
}

/// Default configuration for zero-config startup.
fn default_config_toml() -> &'static str {
    r#"# Advertising statistics service configuration
# Generated automatically for local development

[server]
host = "127.0.0.1"
port = 8080

# SQLite database for persistent storage
[database]
path = "adstats.db"

[observability.logging]
level = "info"
format = "compact"
"#
}

/// Resolve the config path, creating a default config if necessary.
/// Returns the config path and whether it was newly created.
fn resolve_config_path(explicit_path: Option<&str>) -> Result<(PathBuf, bool), String> {
    // If explicit path is provided, use it
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok((path, false));
    }

    // Check for adstats.toml in current directory
    let cwd_config = PathBuf::from("adstats.toml");
    if cwd_config.exists() {
        return Ok((cwd_config, false));
    }

    // No config found, write the default into the working directory
    std::fs::write(&cwd_config, default_config_toml())
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok((cwd_config, true))
}

pub fn build_app(config: &config::ServiceConfig, state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness))
        .nest("/api", routes::get_api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => {
            run_init(output, force);
        }
        Some(Command::Migrate) => {
            run_migrate(args.config.as_deref()).await;
        }
        Some(Command::Serve) | None => {
            run_server(args.config.as_deref()).await;
        }
    }
}

/// Initialize a new configuration file
fn run_init(output: Option<String>, force: bool) {
    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("adstats.toml"));

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    // Create parent directories if needed
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, default_config_toml()) {
        eprintln!("Failed to write config file: {}", e);
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("To start the server, run:");
    println!("  adstats serve");
}

async fn run_server(explicit_config_path: Option<&str>) {
    // Resolve config path, creating default if necessary
    let (config_path, is_new_config) = match resolve_config_path(explicit_config_path) {
        Ok((path, is_new)) => (path, is_new),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if is_new_config {
        println!(
            "Created default configuration at: {}",
            config_path.display()
        );
        println!();
    }

    let config = match config::ServiceConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    observability::init_tracing(&config.observability).expect("Failed to initialize tracing");

    tracing::info!(
        config_file = %config_path.display(),
        "Starting statistics service"
    );

    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Run database migrations and exit.
///
/// Exits with code 0 on success, 1 on failure.
async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config_path, _) = match resolve_config_path(explicit_config_path) {
        Ok((path, is_new)) => (path, is_new),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = match config::ServiceConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    observability::init_tracing(&config.observability).expect("Failed to initialize tracing");

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!("Database migrations completed successfully");
                std::process::exit(0);
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}
