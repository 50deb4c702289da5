#[cfg(feature = "websocket")]
use tokio_tungstenite::tungstenite;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone; nothing more can be sent or received.
    #[error("connection closed")]
    ConnectionClosed,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    #[cfg(feature = "websocket")]
    #[error("WebSocket handshake with {peer} failed: {source}")]
    Handshake {
        peer: std::net::SocketAddr,
        #[source]
        source: tungstenite::Error,
    },

    #[cfg(feature = "websocket")]
    #[error("send failed: {0}")]
    SendFailed(#[source] tungstenite::Error),

    #[cfg(feature = "websocket")]
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tungstenite::Error),
}

#[cfg(feature = "websocket")]
impl TransportError {
    /// Folds tungstenite's "already closed" family into
    /// [`ConnectionClosed`](Self::ConnectionClosed).
    pub(crate) fn on_send(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::ConnectionClosed
            }
            other => Self::SendFailed(other),
        }
    }

    pub(crate) fn on_receive(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::ConnectionClosed
            }
            other => Self::ReceiveFailed(other),
        }
    }
}
