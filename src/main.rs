use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use edushelf::{App, Cli, Config, ContentStore, DatasetCatalog, FileKvStore, Result};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.datasets_dir {
        config.datasets_dir = dir;
    }

    let kv = FileKvStore::open(config.data_dir.clone())?;
    let catalog = DatasetCatalog::load_dir(&config.datasets_dir, &config.classes)?;

    let mut store =
        ContentStore::new(kv, catalog).with_defaults(&config.default_class, config.default_theme);
    store.initialize();

    let mut app = App::new(store, config, cli.verbose);
    let outcome = app.run(cli.command);
    app.shutdown();
    outcome
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    match run(cli) {
        Ok(()) => {
            info!("Application shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
