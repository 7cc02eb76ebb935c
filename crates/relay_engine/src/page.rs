use std::collections::VecDeque;
use std::future;
use std::sync::Arc;
use std::time::Duration;

use relay_core::{
    update, ChannelName, Conversation, Effect, Msg, ObservationScope, PageContext,
    PageViewModel, RelayResponse, SelectorSet,
};
use relay_logging::{relay_debug, relay_info, relay_warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::{
    open_channel, ClickListener, Extractor, MutationBatch, MutationObserver, PageDom, PagePort,
    RelayHost, SelectorExtractor, SuggestionFetcher,
};

#[derive(Debug, Clone)]
pub struct PageSettings {
    /// Probe cadence while waiting for the conversation container.
    pub poll_interval: Duration,
    /// Overrides the platform's observation scope.
    pub observation: Option<ObservationScope>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            observation: None,
        }
    }
}

enum PageEvent {
    SuggestionClicked(usize),
    SuggestionDismissed(usize),
    SuggestionsDismissed,
    TriggerRequested,
    Shutdown,
}

/// Operator-side controls for a running page context.
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::UnboundedSender<PageEvent>,
}

impl PageHandle {
    pub fn click_suggestion(&self, index: usize) {
        let _ = self.tx.send(PageEvent::SuggestionClicked(index));
    }

    pub fn dismiss_suggestion(&self, index: usize) {
        let _ = self.tx.send(PageEvent::SuggestionDismissed(index));
    }

    pub fn dismiss_all(&self) {
        let _ = self.tx.send(PageEvent::SuggestionsDismissed);
    }

    /// Re-extract and relay the latest customer message on demand.
    pub fn trigger(&self) {
        let _ = self.tx.send(PageEvent::TriggerRequested);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(PageEvent::Shutdown);
    }
}

/// Page context: owns the core state, the relay port and the DOM resources
/// (poll timer, mutation observer, send-button listener), and runs every
/// callback on one task so none of them overlap.
pub struct PageRuntime {
    state: PageContext,
    dom: Arc<dyn PageDom>,
    extractor: Box<dyn Extractor>,
    port: PagePort,
    settings: PageSettings,
    polling: Option<Interval>,
    observer: Option<MutationObserver>,
    send_listener: Option<ClickListener>,
    events: mpsc::UnboundedReceiver<PageEvent>,
    view_tx: watch::Sender<PageViewModel>,
}

/// Open the page's relay channel, start the privileged host on its other end
/// and build the page runtime.
pub fn connect_page(
    location: &str,
    dom: Arc<dyn PageDom>,
    settings: PageSettings,
    fetcher: Arc<dyn SuggestionFetcher>,
) -> (PageRuntime, PageHandle, RelayHost) {
    let (page_port, host_port) = open_channel(ChannelName::ConversationData);
    let host = RelayHost::spawn(host_port, fetcher);
    let (runtime, handle) = PageRuntime::new(location, dom, page_port, settings);
    (runtime, handle, host)
}

impl PageRuntime {
    pub fn new(
        location: &str,
        dom: Arc<dyn PageDom>,
        port: PagePort,
        settings: PageSettings,
    ) -> (Self, PageHandle) {
        let state = PageContext::for_location(location);
        let (tx, events) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(state.view());
        let runtime = Self {
            state,
            dom,
            extractor: Box::new(SelectorExtractor),
            port,
            settings,
            polling: None,
            observer: None,
            send_listener: None,
            events,
            view_tx,
        };
        (runtime, PageHandle { tx })
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Latest view of the page context, republished whenever it changes.
    pub fn views(&self) -> watch::Receiver<PageViewModel> {
        self.view_tx.subscribe()
    }

    /// Run until shut down through the handle (or every handle is dropped).
    pub async fn run(mut self) {
        relay_logging::set_context_label("page");
        if !self.state.platform().is_known() {
            relay_info!("Unsupported page; relay stays inert");
        }
        self.dispatch(Msg::PageLoaded);

        let mut channel_open = true;
        loop {
            tokio::select! {
                _ = tick(&mut self.polling) => {
                    let present = self.selectors().is_some_and(|s| self.dom.query(s.message_box));
                    self.dispatch(Msg::PollTick { container_present: present });
                }
                batch = next_batch(&mut self.observer) => {
                    self.on_mutations(batch);
                }
                clicked = send_clicked(&mut self.send_listener) => match clicked {
                    Some(()) => self.dispatch(Msg::SendClicked),
                    None => self.send_listener = None,
                },
                frame = self.port.recv(), if channel_open => match frame {
                    Some(Ok(response)) => self.dispatch(Msg::RelayReceived(response)),
                    Some(Err(err)) => {
                        relay_warn!("Undecodable relay frame: {}", err);
                        self.dispatch(Msg::RelayReceived(RelayResponse::error(err.to_string())));
                    }
                    None => {
                        relay_warn!("Relay channel {} closed by privileged side", self.port.name());
                        channel_open = false;
                    }
                },
                event = self.events.recv() => match event {
                    Some(PageEvent::SuggestionClicked(index)) => {
                        self.dispatch(Msg::SuggestionClicked(index));
                    }
                    Some(PageEvent::SuggestionDismissed(index)) => {
                        self.dispatch(Msg::SuggestionDismissed(index));
                    }
                    Some(PageEvent::SuggestionsDismissed) => {
                        self.dispatch(Msg::SuggestionsDismissed);
                    }
                    Some(PageEvent::TriggerRequested) => {
                        let conversation = self.extract();
                        self.dispatch(Msg::TriggerRequested(conversation));
                    }
                    Some(PageEvent::Shutdown) | None => break,
                },
            }
        }

        self.teardown();
    }

    fn selectors(&self) -> Option<&'static SelectorSet> {
        self.state.selectors()
    }

    fn on_mutations(&mut self, batch: Option<MutationBatch>) {
        match batch {
            Some(batch) if !batch.detached => {
                relay_debug!("Mutation batch with {} records", batch.records);
                let conversation = self.extract();
                self.dispatch(Msg::MutationBatch(conversation));
            }
            Some(_) => self.dispatch(Msg::ContainerDetached),
            None => {
                self.detach_observer();
                self.dispatch(Msg::ContainerDetached);
            }
        }
    }

    fn extract(&self) -> Conversation {
        match self.selectors() {
            Some(selectors) => self.extractor.extract(&self.dom.markup(), selectors),
            None => Conversation::new(),
        }
    }

    /// Apply `msg` and execute the resulting effects; effects that fail may
    /// feed follow-up messages back through the same loop.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() {
                self.view_tx.send_replace(state.view());
            }
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.execute(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    fn execute(&mut self, effect: Effect) -> Option<Msg> {
        let selectors = self.selectors()?;
        match effect {
            Effect::StartPolling => {
                let period = self.settings.poll_interval.max(Duration::from_millis(1));
                let mut interval = time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.polling = Some(interval);
            }
            Effect::StopPolling => {
                self.polling = None;
            }
            Effect::AttachObserver => {
                self.detach_observer();
                let scope = self.settings.observation.unwrap_or(selectors.observation);
                self.observer = Some(self.dom.observe(selectors.message_box, scope));
            }
            Effect::DetachObserver => self.detach_observer(),
            Effect::PostRelay(request) => {
                if let Err(err) = self.port.post(&request) {
                    relay_warn!("Could not post relay request: {}", err);
                    return Some(Msg::RelayReceived(RelayResponse::error(err.to_string())));
                }
            }
            Effect::RenderSuggestions(suggestions) => {
                if !self
                    .dom
                    .render_suggestions(selectors.suggestion_anchor, &suggestions)
                {
                    relay_warn!("Suggestion anchor {:?} not found", selectors.suggestion_anchor);
                }
                if self.send_listener.is_none() {
                    self.send_listener = Some(self.dom.listen_clicks(selectors.send_button));
                }
            }
            Effect::ClearSuggestions => {
                self.dom.clear_suggestions(selectors.suggestion_anchor);
                self.send_listener = None;
            }
            Effect::InsertCompose { text } => {
                if !self.dom.set_text(selectors.message_terminal, &text) {
                    relay_warn!("Compose editor {:?} not found", selectors.message_terminal);
                }
            }
            Effect::ActivateEditor => {
                if !self.dom.click(selectors.message_terminal_container) {
                    relay_debug!("Editor container not found; skipping activation click");
                }
            }
        }
        None
    }

    fn detach_observer(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    fn teardown(&mut self) {
        self.polling = None;
        self.detach_observer();
        self.send_listener = None;
    }
}

async fn tick(polling: &mut Option<Interval>) {
    match polling {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

async fn next_batch(observer: &mut Option<MutationObserver>) -> Option<MutationBatch> {
    match observer {
        Some(observer) => observer.next_batch().await,
        None => future::pending().await,
    }
}

async fn send_clicked(listener: &mut Option<ClickListener>) -> Option<()> {
    match listener {
        Some(listener) => listener.clicked().await,
        None => future::pending().await,
    }
}
