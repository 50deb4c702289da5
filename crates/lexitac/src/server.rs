//! `LexitacServer` builder and server loop.
//!
//! This is the entry point for running a Lexitac server. It ties together
//! all the layers: transport → protocol → room.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lexitac_protocol::{Codec, JsonCodec};
use lexitac_room::{Dictionary, GameConfig, GameStore, RoomRegistry};
use lexitac_transport::{Transport, WebSocketTransport};

use crate::LexitacError;
use crate::handler::handle_connection;

/// How long a new connection has to send its `JoinRoom`.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// does its own per-room locking, so nothing here needs a mutex.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: C,
    pub(crate) join_timeout: Duration,
}

/// Builder for configuring and starting a Lexitac server.
///
/// # Example
///
/// ```rust,ignore
/// let server = LexitacServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(dictionary, store)
///     .await?;
/// server.run().await
/// ```
pub struct LexitacServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    join_timeout: Duration,
}

impl LexitacServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game_config: GameConfig::default(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the rules every room on this server plays by.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(
        self,
        dictionary: Arc<dyn Dictionary>,
        store: Arc<dyn GameStore>,
    ) -> Result<LexitacServer<JsonCodec>, LexitacError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(self.game_config, dictionary, store),
            codec: JsonCodec,
            join_timeout: self.join_timeout,
        });

        Ok(LexitacServer { transport, state })
    }
}

impl Default for LexitacServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Lexitac server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LexitacServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl LexitacServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> LexitacServerBuilder {
        LexitacServerBuilder::new()
    }
}

impl<C: Codec> LexitacServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, LexitacError> {
        Ok(self.transport.local_addr()?)
    }

    /// Number of rooms currently open.
    pub fn room_count(&self) -> usize {
        self.state.registry.room_count()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), LexitacError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then stops every
    /// room.
    ///
    /// Each accepted connection gets its own handler task.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Result<(), LexitacError> {
        tracing::info!("Lexitac server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!(rooms = self.state.registry.room_count(), "Lexitac server shutting down");
        self.state.registry.shutdown_all().await;
        Ok(())
    }
}
