use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ego_tree::NodeRef;
use relay_core::{ObservationScope, Suggestion};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::mpsc;

use crate::extract::selector_matches;

/// Boundary to the host page's document. Reads are snapshots; the only
/// writes are editor text, synthetic clicks and the suggestion area.
pub trait PageDom: Send + Sync {
    /// Current serialized markup.
    fn markup(&self) -> String;

    fn query(&self, selector: &str) -> bool {
        selector_matches(&self.markup(), selector)
    }

    /// Watch the first element matching `selector`. A missing element is
    /// reported as detached on the first batch.
    fn observe(&self, selector: &str, scope: ObservationScope) -> MutationObserver;

    /// Be told about clicks on elements matching `selector`.
    fn listen_clicks(&self, selector: &str) -> ClickListener;

    fn set_text(&self, selector: &str, text: &str) -> bool;

    fn click(&self, selector: &str) -> bool;

    fn render_suggestions(&self, anchor: &str, suggestions: &[Suggestion]) -> bool;

    fn clear_suggestions(&self, anchor: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObservedChange {
    Mutated,
    Detached,
}

/// Changes coalesced from one notification cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: usize,
    pub detached: bool,
}

impl MutationBatch {
    fn absorb(&mut self, change: ObservedChange) {
        self.records += 1;
        self.detached |= change == ObservedChange::Detached;
    }
}

/// Receives mutation batches for one observed container until disconnected.
pub struct MutationObserver {
    rx: mpsc::UnboundedReceiver<ObservedChange>,
    on_disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl MutationObserver {
    fn new(
        rx: mpsc::UnboundedReceiver<ObservedChange>,
        on_disconnect: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            on_disconnect: Some(Box::new(on_disconnect)),
        }
    }

    /// Wait for the next batch. Everything queued when the first change
    /// arrives is folded into the same batch.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        let first = self.rx.recv().await?;
        let mut batch = MutationBatch {
            records: 0,
            detached: false,
        };
        batch.absorb(first);
        while let Ok(change) = self.rx.try_recv() {
            batch.absorb(change);
        }
        Some(batch)
    }

    pub fn is_connected(&self) -> bool {
        self.on_disconnect.is_some()
    }

    /// Stop observing. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if let Some(hook) = self.on_disconnect.take() {
            hook();
            self.rx.close();
        }
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Click notifications for one selector.
pub struct ClickListener {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ClickListener {
    /// Wait for the next click; extra queued clicks are folded in.
    pub async fn clicked(&mut self) -> Option<()> {
        self.rx.recv().await?;
        while self.rx.try_recv().is_ok() {}
        Some(())
    }
}

struct ObserverSlot {
    id: u64,
    selector: String,
    scope: ObservationScope,
    fingerprint: Option<String>,
    tx: mpsc::UnboundedSender<ObservedChange>,
}

struct ClickSlot {
    selector: String,
    tx: mpsc::UnboundedSender<()>,
}

#[derive(Default)]
struct DocumentState {
    markup: String,
    observers: Vec<ObserverSlot>,
    next_observer_id: u64,
    click_listeners: Vec<ClickSlot>,
    texts: HashMap<String, String>,
    clicks: Vec<String>,
    rendered: Vec<String>,
}

/// In-memory document whose markup is replaced wholesale by its owner, with
/// mutation observers scoped to a container element.
#[derive(Clone, Default)]
pub struct LiveDocument {
    inner: Arc<Mutex<DocumentState>>,
}

impl LiveDocument {
    pub fn new(markup: impl Into<String>) -> Self {
        let doc = Self::default();
        doc.lock().markup = markup.into();
        doc
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the document and notify observers whose container changed
    /// within their scope, or disappeared.
    pub fn replace_markup(&self, markup: impl Into<String>) {
        let mut state = self.lock();
        state.markup = markup.into();
        let doc = Html::parse_document(&state.markup);

        state.observers.retain_mut(|slot| {
            let next = fingerprint_of(&doc, &slot.selector, slot.scope);
            let change = match (&slot.fingerprint, &next) {
                (_, None) => Some(ObservedChange::Detached),
                (None, Some(_)) => Some(ObservedChange::Mutated),
                (Some(prev), Some(cur)) if prev != cur => Some(ObservedChange::Mutated),
                _ => None,
            };
            slot.fingerprint = next;
            match change {
                Some(change) => slot.tx.send(change).is_ok(),
                None => !slot.tx.is_closed(),
            }
        });
    }

    /// Text last written to `selector` through [`PageDom::set_text`].
    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.lock().texts.get(selector).cloned()
    }

    /// Selectors clicked so far, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn rendered_suggestions(&self) -> Vec<String> {
        self.lock().rendered.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl PageDom for LiveDocument {
    fn markup(&self) -> String {
        self.lock().markup.clone()
    }

    fn observe(&self, selector: &str, scope: ObservationScope) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let doc = Html::parse_document(&state.markup);
        let fingerprint = fingerprint_of(&doc, selector, scope);
        if fingerprint.is_none() {
            let _ = tx.send(ObservedChange::Detached);
        }
        let id = state.next_observer_id;
        state.next_observer_id += 1;
        state.observers.push(ObserverSlot {
            id,
            selector: selector.to_string(),
            scope,
            fingerprint,
            tx,
        });
        drop(state);

        let inner = Arc::downgrade(&self.inner);
        MutationObserver::new(rx, move || {
            if let Some(inner) = inner.upgrade() {
                let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
                state.observers.retain(|slot| slot.id != id);
            }
        })
    }

    fn listen_clicks(&self, selector: &str) -> ClickListener {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().click_listeners.push(ClickSlot {
            selector: selector.to_string(),
            tx,
        });
        ClickListener { rx }
    }

    fn set_text(&self, selector: &str, text: &str) -> bool {
        let mut state = self.lock();
        if !selector_matches(&state.markup, selector) {
            return false;
        }
        state.texts.insert(selector.to_string(), text.to_string());
        true
    }

    fn click(&self, selector: &str) -> bool {
        let mut state = self.lock();
        if !selector_matches(&state.markup, selector) {
            return false;
        }
        state.clicks.push(selector.to_string());
        state
            .click_listeners
            .retain(|slot| slot.selector != selector || slot.tx.send(()).is_ok());
        true
    }

    fn render_suggestions(&self, anchor: &str, suggestions: &[Suggestion]) -> bool {
        let mut state = self.lock();
        if !selector_matches(&state.markup, anchor) {
            return false;
        }
        state.rendered = suggestions.iter().map(|s| s.text.clone()).collect();
        true
    }

    fn clear_suggestions(&self, _anchor: &str) {
        self.lock().rendered.clear();
    }
}

fn fingerprint_of(doc: &Html, selector: &str, scope: ObservationScope) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let container = doc.select(&sel).next()?;
    Some(fingerprint(container, scope))
}

/// Serialize the parts of a container's subtree that `scope` watches, so two
/// snapshots compare equal exactly when no observed mutation happened.
fn fingerprint(container: ElementRef<'_>, scope: ObservationScope) -> String {
    let mut out = String::new();
    write_children(*container, scope, &mut out);
    out
}

fn write_children(node: NodeRef<'_, Node>, scope: ObservationScope, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Element(element) => {
                if scope.child_list {
                    out.push('<');
                    out.push_str(element.name());
                    out.push('>');
                }
                if scope.subtree {
                    write_children(child, scope, out);
                }
                if scope.child_list {
                    out.push_str("</>");
                }
            }
            // Snapshots carry no node identity, so changed text under a
            // watched child list is a node swap.
            Node::Text(text) => {
                if scope.child_list || scope.character_data {
                    out.push_str(text);
                }
            }
            _ => {}
        }
    }
}
