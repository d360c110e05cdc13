mod cli;
mod dispatcher;
mod file;
mod model;
mod s3_store;
mod settings;
mod store;
mod sync_error;

use std::io::{stderr, stdout};
use std::process::exit;
use tracing::level_filters::LevelFilter;
use crate::cli::{build_cli, command_args, CONFIG, DEFAULT_CONFIG, VERBOSE};
use crate::dispatcher::Dispatcher;
use crate::model::photo::PhotoSuffixes;
use crate::s3_store::StoreClient;
use crate::settings::load_settings;
use crate::sync_error::SyncError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = build_cli().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(0);
    });
    init_logging(matches.occurrences_of(VERBOSE));

    let config_path = matches.value_of(CONFIG).unwrap_or(DEFAULT_CONFIG);
    let (store, suffixes) = initialize(config_path).unwrap_or_else(|err| {
        eprintln!("An error occurred while initializing the application. {}", err);
        exit(1);
    });

    let dispatcher = Dispatcher::new(store, suffixes);
    dispatcher.execute(&command_args(&matches), &mut stdout(), &mut stderr()).await;
}

fn initialize(config_path: &str) -> Result<(StoreClient, PhotoSuffixes), SyncError> {
    let settings = load_settings(config_path)?;
    let store = StoreClient::new(&settings.aws)?;

    Ok((store, settings.suffixes()))
}

fn init_logging(verbosity: u64) {
    let log_level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();
}
