use std::sync::Arc;

use lexitac::{LexitacError, LexitacServer, ServerConfig, telemetry};
use lexitac_room::{Dictionary, GameStore, JsonLinesStore, MemoryStore, WordList};

#[tokio::main]
async fn main() -> Result<(), LexitacError> {
    telemetry::init();

    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let path = config
        .dictionary_path
        .as_ref()
        .ok_or_else(|| LexitacError::Config("LEXITAC_DICTIONARY must point to a word list".into()))?;
    let dictionary: Arc<dyn Dictionary> = Arc::new(WordList::from_file(path)?);

    let store: Arc<dyn GameStore> = match &config.store_path {
        Some(path) => Arc::new(JsonLinesStore::open(path)?),
        None => {
            tracing::warn!("LEXITAC_STORE not set, finished games are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let server = LexitacServer::builder()
        .bind(&config.bind_addr)
        .game_config(config.game.clone())
        .build(dictionary, store)
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
