use clap::{Parser, Subcommand};
use mock_api::admin_api::AdminApiServer;
use mock_api::config::{
    ServerConfig, DEFAULT_ADMIN_PORT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RESPONSE_BODY,
    DEFAULT_STATIC_DIR,
};
use mock_api::dispatch::PublicServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "mock-api",
    version,
    about = "Configurable mock HTTP endpoint for integration testing"
)]
struct Args {
    /// Port for the mock endpoint
    #[arg(short, long, env = "MOCK_API_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Port for the admin API and dashboard
    #[arg(short, long, env = "MOCK_API_ADMIN_PORT", default_value_t = DEFAULT_ADMIN_PORT)]
    admin_port: u16,

    /// Address both listeners bind to
    #[arg(long, env = "MOCK_API_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Body of the default response
    #[arg(short, long, env = "MOCK_API_RESPONSE", default_value = DEFAULT_RESPONSE_BODY)]
    response: String,

    /// Directory holding the dashboard assets
    #[arg(long, default_value = DEFAULT_STATIC_DIR)]
    static_dir: PathBuf,

    /// YAML file of path responses applied at startup
    #[arg(long)]
    responses_file: Option<PathBuf>,

    /// Keep at most this many request log entries (0 keeps all)
    #[arg(long)]
    max_log_entries: Option<usize>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the version number
    Version,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            admin_port: self.admin_port,
            default_response: self.response,
            static_dir: self.static_dir,
            responses_file: self.responses_file,
            max_log_entries: self.max_log_entries,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::Version) = args.command {
        println!("mock-api v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    let config = args.into_config();
    config.validate()?;
    info!(version = env!("CARGO_PKG_VERSION"), "mock-api starting");

    let state = Arc::new(config.build_state()?);
    let public = PublicServer::bind(config.public_addr()?, Arc::clone(&state)).await?;
    let admin =
        AdminApiServer::bind(config.admin_addr()?, Arc::clone(&state), &config.static_dir).await?;

    tokio::select! {
        result = public.run() => result?,
        result = admin.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
