use std::sync::Arc;
use std::thread::{self, JoinHandle};

use relay_core::{RelayRequest, RelayResponse};
use relay_logging::{relay_debug, relay_info, relay_warn};

use crate::{HostPort, RelayError, SuggestionFetcher};

const SUPERSEDED: &str = "superseded by a newer request";

/// Privileged context: a dedicated thread answering relay requests from one
/// page channel until the page side closes it.
pub struct RelayHost {
    thread: Option<JoinHandle<()>>,
}

impl RelayHost {
    pub fn spawn(port: HostPort, fetcher: Arc<dyn SuggestionFetcher>) -> Self {
        let thread = thread::spawn(move || {
            relay_logging::set_context_label("privileged");
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(serve(port, fetcher.as_ref()));
        });
        Self {
            thread: Some(thread),
        }
    }

    /// Wait for the host thread to finish. It exits once the page port
    /// drops, abandoning any lookup still running.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                relay_warn!("Relay host thread panicked");
            }
        }
    }

    /// [`RelayHost::join`] for async callers; the calling runtime keeps
    /// running while the thread winds down.
    pub async fn wait(self) {
        if tokio::task::spawn_blocking(move || self.join()).await.is_err() {
            relay_warn!("Relay host join task failed");
        }
    }
}

type Frame = Option<Result<RelayRequest, RelayError>>;

/// Answer requests one at a time, so responses leave in request order.
/// Every request frame, even an undecodable one, gets exactly one reply.
///
/// A frame arriving while a lookup runs cancels that lookup; the cancelled
/// request is answered with an error and the new frame is served next. A hung
/// endpoint therefore costs one request, not the channel.
pub async fn serve(mut port: HostPort, fetcher: &dyn SuggestionFetcher) {
    relay_info!("Relay channel {} connected", port.name());
    let mut next = port.recv().await;
    while let Some(frame) = next {
        let (response, queued) = match frame {
            Ok(request) => answer(&mut port, fetcher, &request).await,
            Err(err) => {
                relay_warn!("Rejecting relay frame: {}", err);
                (RelayResponse::error(err.to_string()), None)
            }
        };
        if let Err(err) = port.reply(&response) {
            relay_debug!("Dropping response: {}", err);
            break;
        }
        next = match queued {
            Some(frame) => frame,
            None => port.recv().await,
        };
    }
    relay_info!("Relay channel {} closed", port.name());
}

/// Race the lookup against the next inbound frame. Returns the response and,
/// if the lookup lost, the frame that interrupted it.
async fn answer(
    port: &mut HostPort,
    fetcher: &dyn SuggestionFetcher,
    request: &RelayRequest,
) -> (RelayResponse, Option<Frame>) {
    let lookup = respond(fetcher, request);
    tokio::pin!(lookup);
    tokio::select! {
        biased;
        response = &mut lookup => (response, None),
        frame = port.recv() => {
            if frame.is_some() {
                relay_info!("Lookup cancelled by a newer relay frame");
            }
            (RelayResponse::error(SUPERSEDED), Some(frame))
        }
    }
}

/// Run one lookup and turn its outcome into a response frame.
pub async fn respond(fetcher: &dyn SuggestionFetcher, request: &RelayRequest) -> RelayResponse {
    relay_debug!(
        "Fetching suggestions platform={} query_len={}",
        request.platform,
        request.query_text.len()
    );
    match fetcher.fetch(request).await {
        Ok(suggestions) => RelayResponse::Suggestions { suggestions },
        Err(err) => {
            relay_warn!("Suggestion fetch failed: {}", err);
            RelayResponse::error(err.message)
        }
    }
}
