use anyhow::{anyhow, Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use users::api::rest::{register_routes, ApiState};
use users::config::UsersConfig;
use users::domain::events::UserDomainEvent;
use users::domain::ports::EventPublisher;
use users::domain::service::{Service, ServiceConfig};
use users::infra::events::{BroadcastEventPublisher, HttpEventPublisher};
use users::infra::storage::migrations::Migrator;
use users::infra::storage::SeaOrmUsersRepository;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USERS_MODULE: &str = "users";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Adds `mode=rwc` when no query is given so the file is created on first run.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

/// Users Server - user management service
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - user management service")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Detect DB backend from URL scheme (sqlite/postgres).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_database(cfg: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_from_dsn(cfg)?;

    let mut dsn = cfg.url.trim().to_owned();
    if backend == "sqlite" {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    // Every pooled connection to an in-memory SQLite would see its own database.
    let max_conns = if dsn == "sqlite::memory:" {
        1
    } else {
        cfg.max_conns.unwrap_or(10)
    };

    let mut opts = ConnectOptions::new(dsn);
    opts.max_connections(max_conns).sqlx_logging(false);
    if let Some(ms) = cfg.acquire_timeout_ms {
        opts.acquire_timeout(Duration::from_millis(ms));
    }

    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {backend} database"))?;
    tracing::info!(backend, "Connected to database");
    Ok(db)
}

type Publisher = Arc<dyn EventPublisher<UserDomainEvent>>;

/// HTTP publisher when an endpoint is configured, in-process broadcast otherwise.
fn build_publisher(cfg: &UsersConfig) -> Result<(Publisher, Option<BroadcastEventPublisher>)> {
    match &cfg.events.endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, exchange = %cfg.events.exchange, "Publishing user events over HTTP");
            let http = HttpEventPublisher::new(
                endpoint.clone(),
                cfg.events.exchange.clone(),
                cfg.events.publish_timeout,
            )?;
            let publisher: Publisher = Arc::new(http);
            Ok((publisher, None))
        }
        None => {
            tracing::info!("Broadcasting user events in-process (SSE)");
            let broadcast = BroadcastEventPublisher::new(cfg.events.broadcast_capacity);
            let publisher: Publisher = Arc::new(broadcast.clone());
            Ok((publisher, Some(broadcast)))
        }
    }
}

/// What `/health` needs to report on.
#[derive(Clone)]
struct HealthState {
    db: DatabaseConnection,
    /// `http` or `broadcast`.
    events: &'static str,
}

fn up_down(ok: bool) -> &'static str {
    if ok {
        "UP"
    } else {
        "DOWN"
    }
}

async fn health(Extension(state): Extension<HealthState>) -> Response {
    let db_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = serde_json::json!({
        "status": up_down(db_ok),
        "database": up_down(db_ok),
        "events": state.events,
    });
    (status, Json(body)).into_response()
}

fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(Extension(state))
}

async fn run_server(config: AppConfig) -> Result<()> {
    let users_cfg: UsersConfig = config.module_config(USERS_MODULE)?;
    let db_cfg = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("database section is required"))?;

    let db = connect_database(&db_cfg, Path::new(&config.server.home_dir)).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    let (events, broadcast) = build_publisher(&users_cfg)?;
    let service = Service::new(
        Arc::new(SeaOrmUsersRepository::new(db.clone())),
        events,
        ServiceConfig {
            default_page_size: users_cfg.default_page_size,
        },
    );

    let health_state = HealthState {
        db,
        events: if broadcast.is_some() { "broadcast" } else { "http" },
    };

    let shutdown = runtime::shutdown_token();
    let mut state = ApiState::new(Arc::new(service), users_cfg.request_timeout)
        .with_shutdown(shutdown.clone());
    if let Some(broadcast) = broadcast {
        state = state.with_events(broadcast);
    }

    let app = register_routes(health_router(health_state), state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Users Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let _: UsersConfig = config.module_config(USERS_MODULE)?;
    if let Some(db) = &config.database {
        detect_from_dsn(db)?;
    }

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
