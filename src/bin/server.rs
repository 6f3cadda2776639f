use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use budget_buddy::{
    AppState, PaginationConfig, build_router, get_local_offset, graceful_shutdown,
    logging_middleware,
};

/// Serve Budget Buddy over HTTPS.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The directory holding the TLS certificate `cert.pem` and its key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to listen on.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone dates are shown in, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How many budgets or expenses to show per page.
    #[arg(long, default_value_t = 12)]
    page_size: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging();

    if get_local_offset(&args.timezone).is_none() {
        eprintln!(
            "\"{}\" is not a valid timezone. Use a canonical name such as \"Pacific/Auckland\".",
            args.timezone
        );
        exit(1);
    }

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let cert_dir = PathBuf::from(&args.cert_path);
    let tls_config =
        RustlsConfig::from_pem_file(cert_dir.join("cert.pem"), cert_dir.join("key.pem"))
            .await
        .expect("Could not read cert.pem and key.pem");

    let connection = Connection::open(&args.db_path).expect("Could not open the database");
    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };
    let app_state = AppState::new(connection, &secret, &args.timezone, pagination_config)
        .expect("Could not create the database tables");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("Budget Buddy is listening on https://{addr}");

    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app(app_state).into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

/// The router with request logging, and live reload in debug builds.
fn app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str);

            tracing::debug_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                matched_path,
            )
        })
        // Server errors are logged where they happen.
        .on_failure(());

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(trace_layer);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    router
}

/// Log INFO and above to stdout and DEBUG and above to `debug.log`, both
/// narrowed further by `RUST_LOG` if it is set.
fn setup_logging() {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not open debug.log");

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(LevelFilter::INFO);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(LevelFilter::DEBUG);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
