//! Replays the blockchain test fixtures found under a directory against a
//! client serving JSON-RPC on a Unix socket.
use std::{path::PathBuf, time::Duration};

use clap::Parser;
use dotenvy::dotenv;
use ef_rpc_testing::{
    constants::{DEFAULT_LOG_FILTER, DEFAULT_SKIP_FILE, DEFAULT_SKIP_FILE_PATH},
    models::suite::BlockchainTestSuite,
    traits::Suite,
};
use fixture_utils::filter::Filter;
use ipc_client::{IpcClient, IpcConfig};
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "run_fixtures", about = "Run blockchain test fixtures over JSON-RPC", long_about = None)]
struct Cli {
    /// Directory containing the fixture files
    #[arg(value_name = "TEST_DIR")]
    test_dir: PathBuf,

    /// Path of the client's IPC socket
    #[arg(long, env = "EF_RPC_IPC_PATH")]
    ipc_path: PathBuf,

    /// YAML deny-list of fixture files and test cases
    #[arg(long)]
    skip_file: Option<PathBuf>,

    /// Timeout of a single response read, in seconds
    #[arg(long, default_value_t = 30)]
    read_timeout_secs: u64,
}

fn load_filter(skip_file: Option<PathBuf>) -> eyre::Result<Filter> {
    if let Some(path) = skip_file {
        return Filter::load_file(path);
    }

    let local = PathBuf::from(DEFAULT_SKIP_FILE);
    for candidate in [&local, &*DEFAULT_SKIP_FILE_PATH] {
        if candidate.is_file() {
            info!(path = %candidate.display(), "using skip file");
            return Filter::load_file(candidate);
        }
    }

    warn!("no skip file found, running every fixture");
    Ok(Filter::default())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = IpcConfig::builder()
        .socket_path(cli.ipc_path)
        .read_timeout(Duration::from_secs(cli.read_timeout_secs))
        .build()?;
    let client = IpcClient::new(config)?;

    let suite = BlockchainTestSuite::new(cli.test_dir, load_filter(cli.skip_file)?);
    let report = suite.run(&client).await;
    report.log_summary();

    if !report.is_success() {
        eyre::bail!(
            "{} case(s) failed, {} file(s) could not be loaded",
            report.failed(),
            report.file_errors.len()
        );
    }
    Ok(())
}
