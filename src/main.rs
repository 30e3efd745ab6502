mod config;
mod dictionary;
mod engine;
mod exec;
mod fuzzy;
mod injector;
mod layout;
mod processor;
mod protocol;
mod server;
mod store;

use anyhow::{Context, Result};
use config::DaemonConfig;
use dictionary::{discover_dictionary_files, DictionaryCatalog};
use engine::SuggestionEngine;
use injector::XdoInjector;
use processor::ProcessorRegistry;
use server::{DaemonContext, SuggestionServer};
use store::{CustomWordStore, HistoryStore, IgnoreListStore};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    std::fs::create_dir_all(&config.paths.config_dir).with_context(|| {
        format!(
            "failed to create config directory {}",
            config.paths.config_dir.display()
        )
    })?;

    let ignore_list = IgnoreListStore::load(config.paths.ignore_list_file())?;
    let custom_words = CustomWordStore::load(config.paths.custom_words_file())?;
    let history = HistoryStore::load(config.paths.history_file())?;

    let dictionary_files = discover_dictionary_files(&config.paths.dictionaries_dir);
    let catalog = DictionaryCatalog::load_all(&dictionary_files, &ignore_list);

    let registry = ProcessorRegistry::new(
        config.paths.processor_dirs.clone(),
        config.exec.timeout_ms,
    );
    let engine = SuggestionEngine::new(catalog, custom_words, history, ignore_list, registry);

    info!(
        socket = %config.server.socket_path.display(),
        config_dir = %config.paths.config_dir.display(),
        dictionaries_dir = %config.paths.dictionaries_dir.display(),
        dictionaries = dictionary_files.len(),
        processor_dirs = config.paths.processor_dirs.len(),
        request_timeout_ms = config.server.request_timeout_ms,
        exec_timeout_ms = config.exec.timeout_ms,
        "loaded suggestd config"
    );

    let context = DaemonContext {
        engine: Mutex::new(engine),
        injector: Box::new(XdoInjector::new(config.exec.timeout_ms)),
        exec_timeout_ms: config.exec.timeout_ms,
    };
    let server = SuggestionServer::new(config.server.clone(), context);
    server.run().await
}
