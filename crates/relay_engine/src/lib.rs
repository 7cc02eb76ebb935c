//! Relay engine: DOM extraction, the page <-> privileged relay channel, the
//! suggestion fetcher and the runtime executing core effects.
mod channel;
mod dom;
mod extract;
mod fetch;
mod host;
mod page;
mod types;

pub use channel::{open_channel, HostPort, PagePort, RelayError};
pub use dom::{ClickListener, LiveDocument, MutationBatch, MutationObserver, PageDom};
pub use extract::{extract_from, selector_matches, Extractor, SelectorExtractor};
pub use fetch::{FetchSettings, ReqwestSuggestionFetcher, SuggestionFetcher};
pub use host::{respond, serve, RelayHost};
pub use page::{connect_page, PageHandle, PageRuntime, PageSettings};
pub use types::{FailureKind, FetchError};
