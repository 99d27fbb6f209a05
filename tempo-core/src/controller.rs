//! Debounced lookup controller.
//!
//! One actor task owns the query and the [`RequestState`]. Edits arrive over a
//! channel; every edit restarts the debounce deadline, and only a deadline
//! that elapses without a newer edit starts a fetch. State leaves the task
//! through a `watch` channel, so a subscriber can redraw after each change.
//!
//! A debounce firing drops whatever fetch is still in flight, so a response
//! for a superseded query never lands on top of a newer one.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, warn};

use crate::{
    LookupError, WeatherResult,
    error::ControllerClosed,
    model::{LookupSnapshot, RequestState},
    provider::WeatherProvider,
};

type Fetch = Pin<Box<dyn Future<Output = Result<WeatherResult, LookupError>> + Send>>;

/// A fetch in flight, tagged with the query it was issued for.
struct InFlight {
    query: String,
    fetch: Fetch,
}

pub struct LookupController {
    provider: Arc<dyn WeatherProvider>,
    debounce: Duration,
    snapshot: watch::Sender<LookupSnapshot>,
}

impl LookupController {
    /// Start the controller on the current tokio runtime.
    pub fn spawn(provider: Arc<dyn WeatherProvider>, debounce: Duration) -> LookupHandle {
        let (queries_tx, queries_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(LookupSnapshot::default());

        let controller = Self { provider, debounce, snapshot: snapshot_tx };
        let task = tokio::spawn(controller.run(queries_rx));

        LookupHandle { queries: queries_tx, snapshot: snapshot_rx, task }
    }

    async fn run(self, mut queries: mpsc::UnboundedReceiver<String>) {
        let mut deadline: Option<Instant> = None;
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                biased;

                edit = queries.recv() => match edit {
                    Some(text) => {
                        self.on_query_change(text);
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    None => break,
                },
                () = wait_until(deadline) => {
                    deadline = None;
                    if let Some(stale) = in_flight.take() {
                        debug!(query = %stale.query, "dropping superseded lookup");
                    }
                    in_flight = self.on_debounce_fired();
                }
                (query, outcome) = settle(&mut in_flight) => {
                    in_flight = None;
                    self.on_fetch_settled(&query, outcome);
                }
            }
        }

        debug!("lookup controller stopped");
    }

    fn on_query_change(&self, text: String) {
        debug!(query = %text, "query changed");
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.query == text {
                return false;
            }
            snapshot.query = text;
            true
        });
    }

    fn on_debounce_fired(&self) -> Option<InFlight> {
        let query = self.snapshot.borrow().query.clone();

        if query.trim().is_empty() {
            debug!("debounce fired on empty query, clearing");
            self.publish(RequestState::Idle);
            return None;
        }

        debug!(query = %query, "debounce fired, starting lookup");
        self.publish(RequestState::Loading);

        let provider = Arc::clone(&self.provider);
        let city = query.clone();
        let fetch: Fetch = Box::pin(async move { provider.current_weather(&city).await });

        Some(InFlight { query, fetch })
    }

    fn on_fetch_settled(&self, query: &str, outcome: Result<WeatherResult, LookupError>) {
        self.publish(settled_state(query, outcome));
    }

    fn publish(&self, state: RequestState) {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.state == state {
                return false;
            }
            snapshot.state = state;
            true
        });
    }
}

/// Handle to a running [`LookupController`]. Dropping it tears the
/// controller down.
#[derive(Debug)]
pub struct LookupHandle {
    queries: mpsc::UnboundedSender<String>,
    snapshot: watch::Receiver<LookupSnapshot>,
    task: JoinHandle<()>,
}

impl LookupHandle {
    /// Replace the query text verbatim and restart the debounce window.
    pub fn set_query(&self, text: impl Into<String>) -> Result<(), ControllerClosed> {
        self.queries.send(text.into()).map_err(|_| ControllerClosed)
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is marked changed after every published state change.
    pub fn subscribe(&self) -> watch::Receiver<LookupSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the controller, dropping any pending timer or in-flight lookup.
    pub async fn shutdown(self) {
        let Self { queries, task, .. } = self;
        drop(queries);

        if let Err(err) = task.await {
            warn!(error = %err, "lookup controller task ended abnormally");
        }
    }
}

/// One lookup without debounce, for callers that already have the final
/// query.
pub async fn lookup_once(provider: &dyn WeatherProvider, query: &str) -> LookupSnapshot {
    let state = if query.trim().is_empty() {
        RequestState::Idle
    } else {
        let outcome = provider.current_weather(query).await;
        settled_state(query, outcome)
    };

    LookupSnapshot { query: query.to_string(), state }
}

fn settled_state(query: &str, outcome: Result<WeatherResult, LookupError>) -> RequestState {
    match outcome {
        Ok(result) => {
            info!(query, location = %result.location_name, "lookup succeeded");
            RequestState::Success(result)
        }
        Err(err) => {
            warn!(query, error = %err, "lookup failed");
            RequestState::Failure(err.user_message().to_string())
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn settle(in_flight: &mut Option<InFlight>) -> (String, Result<WeatherResult, LookupError>) {
    match in_flight {
        Some(InFlight { query, fetch }) => {
            let outcome = fetch.await;
            (query.clone(), outcome)
        }
        None => std::future::pending().await,
    }
}
