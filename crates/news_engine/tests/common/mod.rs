#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use news_core::{Article, FailureKind, FetchError, News, ViewState};
use news_engine::{NewsGateway, StateSubscription};
use tokio::sync::Semaphore;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn ok_page(titles: &[&str]) -> News {
    News {
        status: "ok".to_string(),
        total_results: titles.len() as u32,
        articles: titles.iter().map(|title| Article::new(*title)).collect(),
        ..News::default()
    }
}

pub fn titles(state: &ViewState) -> Vec<&str> {
    state.articles.iter().map(|a| a.title.as_str()).collect()
}

/// Gateway answering from a fixed page table, optionally held behind a gate.
#[derive(Default)]
pub struct StubGateway {
    pages: HashMap<String, Result<News, FetchError>>,
    calls: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Semaphore>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: &str, result: Result<News, FetchError>) -> Self {
        self.pages.insert(page.to_string(), result);
        self
    }

    /// Every fetch waits for one permit of the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NewsGateway for StubGateway {
    async fn fetch(&self, country: &str, page: &str) -> Result<News, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((country.to_string(), page.to_string()));
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.pages.get(page).cloned().unwrap_or_else(|| {
            Err(FetchError::new(
                FailureKind::HttpStatus(404),
                format!("no page {page}"),
            ))
        })
    }
}

/// Pulls states until one matches, failing the test after a few seconds.
pub async fn wait_for(
    states: &mut StateSubscription,
    matches: impl Fn(&ViewState) -> bool,
) -> ViewState {
    let wait = async {
        while let Some(state) = states.next().await {
            if matches(&state) {
                return state;
            }
        }
        panic!("session stopped before the expected state");
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("timed out waiting for state")
}
