use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use readtime::{
    Config, ConfigError, ReadingTime, ReadtimeError, SettingsInput, cli,
    config::IpArray,
    content::{ContentItem, DirectorySource},
    presenter,
    server::{Server, ServerConfig},
    store::{JsonFileStore, MemoryStore, SettingsStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ReadtimeError> {
    let args = cli::Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let input_path = Path::new(&args.path);
    let absolute_path = input_path.canonicalize().map_err(|e| {
        ConfigError::CanonicalizeFailed {
            path: input_path.to_path_buf(),
            source: e,
        }
    })?;
    let is_directory = absolute_path.is_dir();

    let mut config = Config::read(&absolute_path)?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = &args.host {
        config.host = IpArray::parse(host)?;
    }
    config.validate()?;

    tracing::info!("Root dir: {}", config.root_dir.display());

    let file_store = JsonFileStore::new(config.settings_path(), config.reading.clone());
    let overrides = args.settings_overrides();
    let store: Arc<dyn SettingsStore> = if overrides.is_empty() {
        Arc::new(file_store)
    } else {
        tracing::info!("Command line settings apply to this run only and are not saved");
        let current = SettingsInput::from(&file_store.get()).overlay(overrides.clone());
        let store = MemoryStore::with_defaults(config.reading.clone().overlay(overrides));
        store.set(current)?;
        Arc::new(store)
    };
    let reading_time = ReadingTime::new(store);

    if args.server || (is_directory && !args.stdout) {
        let content_root = if is_directory {
            absolute_path.clone()
        } else {
            config.root_dir.clone()
        };
        let source = DirectorySource::new(content_root, &config.content_extensions);
        let server = Server::init(ServerConfig {
            ip: config.host.0,
            port: config.port,
            reading_time,
            source: Arc::new(source),
        })?;
        server.start().await?;
    } else {
        if is_directory {
            eprintln!("Cannot estimate a directory to stdout. Give a file, or use -s to serve it.");
            eprintln!("  readtime -s {}  # Start server", args.path.display());
            std::process::exit(1);
        }
        let item = ContentItem::from_file(&absolute_path)?;
        println!(
            "{}",
            presenter::render(&item.body_html, &reading_time.settings())
        );
    }
    Ok(())
}
