use relay_core::{ChannelName, RelayRequest, RelayResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("failed to encode relay frame: {0}")]
    Encode(String),
    #[error("malformed relay frame: {0}")]
    Decode(String),
    #[error("relay channel {0} is closed")]
    Closed(ChannelName),
}

/// Page-context end of the relay channel: posts requests, receives responses.
pub struct PagePort {
    name: ChannelName,
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Privileged-context end: receives requests, posts responses.
pub struct HostPort {
    name: ChannelName,
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Open the bidirectional channel. Frames are JSON text, delivered in the
/// order they were posted. Dropping either end closes the channel.
pub fn open_channel(name: ChannelName) -> (PagePort, HostPort) {
    let (to_host, from_page) = mpsc::unbounded_channel();
    let (to_page, from_host) = mpsc::unbounded_channel();
    (
        PagePort {
            name,
            tx: to_host,
            rx: from_host,
        },
        HostPort {
            name,
            tx: to_page,
            rx: from_page,
        },
    )
}

impl PagePort {
    pub fn name(&self) -> ChannelName {
        self.name
    }

    pub fn post(&self, request: &RelayRequest) -> Result<(), RelayError> {
        let frame = encode(request)?;
        self.tx
            .send(frame)
            .map_err(|_| RelayError::Closed(self.name))
    }

    /// Inject a raw frame towards the privileged side, bypassing the encoder.
    pub fn post_raw(&self, frame: impl Into<String>) -> Result<(), RelayError> {
        self.tx
            .send(frame.into())
            .map_err(|_| RelayError::Closed(self.name))
    }

    /// Next inbound frame; `None` once the privileged side is gone.
    pub async fn recv(&mut self) -> Option<Result<RelayResponse, RelayError>> {
        let frame = self.rx.recv().await?;
        Some(decode(&frame))
    }
}

impl HostPort {
    pub fn name(&self) -> ChannelName {
        self.name
    }

    /// Next request frame; `None` once the page side is gone.
    pub async fn recv(&mut self) -> Option<Result<RelayRequest, RelayError>> {
        let frame = self.rx.recv().await?;
        Some(decode(&frame))
    }

    pub fn reply(&self, response: &RelayResponse) -> Result<(), RelayError> {
        let frame = encode(response)?;
        self.tx
            .send(frame)
            .map_err(|_| RelayError::Closed(self.name))
    }

    /// Inject a raw frame towards the page, bypassing the encoder.
    pub fn reply_raw(&self, frame: impl Into<String>) -> Result<(), RelayError> {
        self.tx
            .send(frame.into())
            .map_err(|_| RelayError::Closed(self.name))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, RelayError> {
    serde_json::to_string(value).map_err(|err| RelayError::Encode(err.to_string()))
}

fn decode<T: DeserializeOwned>(frame: &str) -> Result<T, RelayError> {
    serde_json::from_str(frame).map_err(|err| RelayError::Decode(err.to_string()))
}
