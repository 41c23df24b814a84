//! app-access - line-delimited JSON front end
//!
//! Reads one raw request per line on stdin and writes one response
//! envelope per line on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use app_access::config::FileConfigStore;
use app_access::probe::NetworkProber;
use app_access::router::{Dispatcher, DispatcherConfig, DEFAULT_APP, DEFAULT_MAX_CONCURRENT_PROBES};
use app_access::{init_logging, server};

#[derive(Debug, Parser)]
#[command(name = "app-access", version, about = "Endpoint diagnostics and SSH connection authorization")]
struct Cli {
    /// Configuration document (defaults to ~/.app-access/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// App name used for known API paths
    #[arg(long, default_value = DEFAULT_APP)]
    app: String,

    /// Endpoints probed concurrently by `/endpoints?probe=true`
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_PROBES)]
    max_concurrent_probes: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let store = match cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => match FileConfigStore::new() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to locate config: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    tracing::info!("Starting app-access (config {:?})", store.path());

    let config = DispatcherConfig::new(cli.app).with_max_concurrent_probes(cli.max_concurrent_probes);
    let dispatcher = Dispatcher::new(config, Arc::new(store), Arc::new(NetworkProber));

    let stdin = BufReader::new(tokio::io::stdin());
    match server::serve_lines(&dispatcher, stdin, tokio::io::stdout()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("I/O error: {}", e);
            ExitCode::FAILURE
        }
    }
}
