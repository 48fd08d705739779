//! A terminal client for the employee management backend.
//!
//! The client restores the persisted session, then lets the user manage
//! their profile, form templates and employee records.

use anyhow::{Context, Result};
use ems_client::{
    config::{ClientConfig, ConfigOverrides},
    logging,
    tui_app::TuiApp,
};
use ems_core::{
    ApiClient,
    auth::{FileStorage, SessionStore},
};
use pico_args::Arguments;
use std::{path::PathBuf, sync::Arc};

const HELP: &str = "\
Manage employees and employee forms from the terminal

USAGE:
  ems_client [OPTIONS]

OPTIONS:
  --server URL          Backend base URL  [default: env EMS_API_BASE_URL or http://localhost:8000]
  --session-dir DIR     Where the session is kept  [default: env EMS_SESSION_DIR or ~/.ems]
  --log-file PATH       Log output file  [default: env EMS_LOG_FILE or <session dir>/ems_client.log]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  EMS_SEARCH_DEBOUNCE_MS    Quiet period before a search is sent  [default: 500]
  RUST_LOG                  Log filter  [default: info]
";

struct Args {
    server: Option<String>,
    session_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server: pargs.opt_value_from_str("--server")?,
        session_dir: pargs.opt_value_from_os_str("--session-dir", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        log_file: pargs.opt_value_from_os_str("--log-file", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(ConfigOverrides {
        server: args.server,
        session_dir: args.session_dir,
        log_file: args.log_file,
    })?;
    config.validate()?;

    logging::init(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        session_dir = %config.session_dir.display(),
        "Starting employee management client"
    );

    let session = Arc::new(SessionStore::open(Box::new(FileStorage::new(
        &config.session_dir,
    ))));
    let api = ApiClient::new(config.api_base_url.clone(), session)
        .context("Failed to create API client")?;

    let terminal = ratatui::init();
    let app = TuiApp::new(api, config.search_debounce, whoami::username());
    let result = app.run(terminal).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!("Client exited with error: {e:#}");
    }
    result
}
