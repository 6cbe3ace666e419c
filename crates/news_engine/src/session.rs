use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_error, engine_info, engine_trace};
use futures_util::{Stream, StreamExt};
use news_core::{
    action_from_intent, reduce_with, Action, Intent, IntentFilter, MergePolicy, PopulateResult,
    ViewState, DEFAULT_COUNTRY,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::{ActionProcessor, NewsGateway, PipelineError};

const RESULT_BUFFER: usize = 64;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Turns an accepted intent into the action to dispatch for `country`;
/// `None` skips the intent.
pub type ActionRoute = fn(&Intent, &str) -> Option<Action>;

/// Maps with [`action_from_intent`] and skips [`Action::Ignore`].
pub fn default_route(intent: &Intent, country: &str) -> Option<Action> {
    match action_from_intent(intent, country) {
        Action::Ignore => None,
        action => Some(action),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub country: String,
    pub merge: MergePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            merge: MergePolicy::default(),
        }
    }
}

/// One browsing session: routes intents, runs actions and holds the latest
/// view state for whichever view is currently attached.
///
/// The pipeline runs on its own thread and tokio runtime from construction
/// on, whether or not anyone observes it.
pub struct NewsSession {
    intents: mpsc::UnboundedSender<Intent>,
    states: watch::Receiver<ViewState>,
    results: broadcast::Sender<PopulateResult>,
    runtime: tokio::runtime::Handle,
    settled: Arc<AtomicU64>,
    stop: oneshot::Sender<()>,
    worker: thread::JoinHandle<Result<(), PipelineError>>,
}

impl NewsSession {
    pub fn new(
        gateway: Arc<dyn NewsGateway>,
        config: SessionConfig,
    ) -> Result<Self, PipelineError> {
        Self::with_route(gateway, config, default_route)
    }

    /// Like [`new`](Self::new), with a custom intent to action step.
    pub fn with_route(
        gateway: Arc<dyn NewsGateway>,
        config: SessionConfig,
        route: ActionRoute,
    ) -> Result<Self, PipelineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("news-session-io")
            .build()
            .map_err(|err| PipelineError::Runtime(err.to_string()))?;
        let handle = runtime.handle().clone();

        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewState::idle());
        let (result_tx, _) = broadcast::channel(RESULT_BUFFER);
        let (stop_tx, stop_rx) = oneshot::channel();
        let settled = Arc::new(AtomicU64::new(0));

        let pipeline = Pipeline {
            processor: ActionProcessor::new(gateway),
            config,
            route,
            states: state_tx,
            results: result_tx.clone(),
            settled: settled.clone(),
        };
        let worker = thread::Builder::new()
            .name("news-session".to_string())
            .spawn(move || runtime.block_on(pipeline.run(intent_rx, stop_rx)))
            .map_err(|err| PipelineError::Runtime(err.to_string()))?;

        Ok(Self {
            intents: intent_tx,
            states: state_rx,
            results: result_tx,
            runtime: handle,
            settled,
            stop: stop_tx,
            worker,
        })
    }

    pub fn submit_intents(
        &self,
        intents: impl IntoIterator<Item = Intent>,
    ) -> Result<(), PipelineError> {
        for intent in intents {
            self.intents
                .send(intent)
                .map_err(|_| PipelineError::Stopped)?;
        }
        Ok(())
    }

    /// Handle for an additional intent producer.
    pub fn intent_sender(&self) -> IntentSender {
        IntentSender {
            tx: self.intents.clone(),
        }
    }

    /// Forwards every intent of `intents` into the session until the stream
    /// ends or the session stops.
    pub fn process_intents<S>(&self, intents: S)
    where
        S: Stream<Item = Intent> + Send + 'static,
    {
        let tx = self.intents.clone();
        self.runtime.spawn(async move {
            let mut intents = Box::pin(intents);
            while let Some(intent) = intents.next().await {
                if tx.send(intent).is_err() {
                    break;
                }
            }
        });
    }

    /// Subscribes to view states. The first state yielded is the latest one.
    pub fn states(&self) -> StateSubscription {
        StateSubscription {
            rx: self.states.clone(),
            replayed: false,
        }
    }

    /// Raw results as they are folded, e.g. to show progress on `InFlight`.
    pub fn results(&self) -> broadcast::Receiver<PopulateResult> {
        self.results.subscribe()
    }

    /// Number of actions whose terminal result has been folded into the state.
    ///
    /// Unlike [`results`](Self::results) this never lags, so callers waiting for
    /// a known number of actions should count here.
    pub fn settled_actions(&self) -> u64 {
        self.settled.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Stops routing intents, waits for in-flight fetches to be folded and
    /// reports a fatal pipeline error if one occurred.
    ///
    /// Blocks the calling thread.
    pub fn shutdown(self) -> Result<(), PipelineError> {
        let NewsSession { stop, worker, .. } = self;
        let _ = stop.send(());
        worker.join().map_err(|_| PipelineError::Stopped)?
    }
}

/// Cloneable intent producer attached to a session.
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: mpsc::UnboundedSender<Intent>,
}

impl IntentSender {
    pub fn send(&self, intent: Intent) -> Result<(), PipelineError> {
        self.tx.send(intent).map_err(|_| PipelineError::Stopped)
    }
}

/// Latest-value view of a session's states.
#[derive(Debug, Clone)]
pub struct StateSubscription {
    rx: watch::Receiver<ViewState>,
    replayed: bool,
}

impl StateSubscription {
    pub fn latest(&self) -> ViewState {
        self.rx.borrow().clone()
    }

    /// Waits for the next state; `None` once the session has stopped and the
    /// final state has been seen.
    pub async fn next(&mut self) -> Option<ViewState> {
        if !self.replayed {
            self.replayed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn try_next(&mut self) -> Option<ViewState> {
        if !self.replayed {
            self.replayed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            Ok(false) => None,
            // Closed, but the final state may not have been seen yet.
            Err(_) => {
                let latest = self.rx.borrow_and_update();
                latest.has_changed().then(|| latest.clone())
            }
        }
    }

    /// Blocking variant of [`next`](Self::next) for views without a runtime.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<ViewState> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(state) = self.try_next() {
                return Some(state);
            }
            if self.is_closed() || Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// True once the session has stopped. An unseen final state is still
    /// returned by [`try_next`](Self::try_next).
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

struct Pipeline {
    processor: ActionProcessor,
    config: SessionConfig,
    route: ActionRoute,
    states: watch::Sender<ViewState>,
    results: broadcast::Sender<PopulateResult>,
    settled: Arc<AtomicU64>,
}

impl Pipeline {
    async fn run(
        self,
        intents: mpsc::UnboundedReceiver<Intent>,
        stop: oneshot::Receiver<()>,
    ) -> Result<(), PipelineError> {
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let mut router = tokio::spawn(route_intents(
            intents,
            stop,
            self.processor.clone(),
            self.route,
            self.config.country.clone(),
            result_tx,
        ));
        let mut routing = true;
        let mut state = ViewState::idle();
        engine_info!("Session started for country={}", self.config.country);

        loop {
            tokio::select! {
                routed = &mut router, if routing => {
                    routing = false;
                    router_outcome(routed)?;
                    engine_debug!("Intent routing finished; draining results");
                }
                next = result_rx.recv() => {
                    let Some(result) = next else { break };
                    let terminal = result.is_terminal();
                    state = reduce_with(self.config.merge, state, result.clone());
                    if publish(&self.states, &state) {
                        engine_trace!(
                            "Published state loaded={} articles={} error={}",
                            state.is_loaded,
                            state.articles.len(),
                            state.error.is_some()
                        );
                    }
                    if terminal {
                        self.settled.fetch_add(1, Ordering::AcqRel);
                    }
                    // Listeners may read the state as soon as they see the result.
                    let _ = self.results.send(result);
                }
            }
        }

        // The router may finish unobserved if nothing was in flight.
        if routing {
            router_outcome(router.await)?;
        }
        engine_info!("Session stopped");
        Ok(())
    }
}

fn router_outcome(
    routed: Result<Result<(), PipelineError>, tokio::task::JoinError>,
) -> Result<(), PipelineError> {
    match routed {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            engine_error!("Session pipeline failed: {}", err);
            Err(err)
        }
        Err(join_err) => {
            engine_error!("Intent router aborted: {}", join_err);
            Err(PipelineError::Stopped)
        }
    }
}

async fn route_intents(
    mut intents: mpsc::UnboundedReceiver<Intent>,
    mut stop: oneshot::Receiver<()>,
    processor: ActionProcessor,
    route: ActionRoute,
    country: String,
    results: mpsc::UnboundedSender<PopulateResult>,
) -> Result<(), PipelineError> {
    let mut filter = IntentFilter::new();
    loop {
        // Intents already queued are routed before a stop request.
        let intent = tokio::select! {
            biased;
            next = intents.recv() => match next {
                Some(intent) => intent,
                None => break,
            },
            _ = &mut stop => break,
        };

        if !filter.accept(&intent) {
            engine_debug!("Dropping repeated {:?}", intent);
            continue;
        }
        engine_debug!("Routing {:?}", intent);
        match route(&intent, &country) {
            Some(action) => processor.dispatch(action, &results)?,
            None => engine_trace!("Skipping {:?}", intent),
        }
    }
    Ok(())
}

/// Stores `next` unless it equals the current state. Returns whether it did.
fn publish(states: &watch::Sender<ViewState>, next: &ViewState) -> bool {
    states.send_if_modified(|current| {
        if current == next {
            false
        } else {
            *current = next.clone();
            true
        }
    })
}
