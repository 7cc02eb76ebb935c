//! Replays saved snapshots of a support page through the relay pipeline.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use relay_core::{detect_platform, PageViewModel, Platform, SelectorSet};
use relay_engine::{connect_page, LiveDocument, PageHandle, ReqwestSuggestionFetcher};
use relay_logging::{relay_info, relay_warn};
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};

use crate::config::RelayConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub platform: Platform,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
    /// Compose text after clicking the picked suggestion.
    pub composed: Option<String>,
}

pub fn load_snapshots(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("reading snapshot {:?}", path))
        })
        .collect()
}

/// Load the first snapshot, then swap in each following one after the step
/// interval. Returns once suggestions or an error show up, or the settle
/// timeout expires.
pub async fn replay(
    config: &RelayConfig,
    location: &str,
    snapshots: Vec<String>,
    pick: Option<usize>,
) -> Result<ReplayOutcome> {
    let platform = detect_platform(location);
    let Some(selectors) = SelectorSet::for_platform(platform) else {
        relay_warn!("No selectors for {:?}; nothing to replay", location);
        return Ok(ReplayOutcome::default());
    };

    let mut steps = snapshots.into_iter();
    let Some(first) = steps.next() else {
        bail!("at least one snapshot is required");
    };

    let fetcher = ReqwestSuggestionFetcher::new(config.fetch_settings())
        .context("building suggestion client")?;
    let doc = LiveDocument::new(first);
    let (runtime, handle, host) = connect_page(
        location,
        Arc::new(doc.clone()),
        config.page_settings(),
        Arc::new(fetcher),
    );
    let mut views = runtime.views();

    let script = async {
        for markup in steps {
            sleep(config.step_interval()).await;
            doc.replace_markup(markup);
        }
        let view = settle(&mut views, config.settle_timeout()).await;
        let composed = match pick {
            Some(index) if index < view.suggestions.len() => {
                choose(&handle, &doc, selectors, index, config.settle_timeout()).await
            }
            Some(index) => {
                relay_warn!("No suggestion #{} to pick", index);
                None
            }
            None => None,
        };
        handle.shutdown();
        ReplayOutcome {
            platform,
            suggestions: view.suggestions,
            error: view.last_error,
            composed,
        }
    };

    let ((), outcome) = tokio::join!(runtime.run(), script);
    host.wait().await;
    relay_info!(
        "Replay finished with {} suggestion(s)",
        outcome.suggestions.len()
    );
    Ok(outcome)
}

async fn settle(views: &mut watch::Receiver<PageViewModel>, wait: Duration) -> PageViewModel {
    let ready = timeout(
        wait,
        views.wait_for(|view| !view.suggestions.is_empty() || view.last_error.is_some()),
    )
    .await
    .map(|result| result.map(|view| view.clone()));
    match ready {
        Ok(Ok(view)) => view,
        _ => {
            relay_warn!("No suggestions within {:?}", wait);
            views.borrow().clone()
        }
    }
}

async fn choose(
    handle: &PageHandle,
    doc: &LiveDocument,
    selectors: &SelectorSet,
    index: usize,
    wait: Duration,
) -> Option<String> {
    handle.click_suggestion(index);
    let deadline = Instant::now() + wait;
    loop {
        if let Some(text) = doc.text_of(selectors.message_terminal) {
            return Some(text);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(Duration::from_millis(10)).await;
    }
}
