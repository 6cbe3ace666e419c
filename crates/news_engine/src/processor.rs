use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use news_core::{Action, PopulateResult};
use tokio::sync::mpsc;

use crate::{NewsGateway, PipelineError};

/// Runs actions against the gateway and reports their results.
#[derive(Clone)]
pub struct ActionProcessor {
    gateway: Arc<dyn NewsGateway>,
}

impl ActionProcessor {
    pub fn new(gateway: Arc<dyn NewsGateway>) -> Self {
        Self { gateway }
    }

    /// Starts one action.
    ///
    /// `InFlight` is sent before this returns; the terminal result follows from a
    /// task spawned on the current runtime, so overlapping actions race freely.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(
        &self,
        action: Action,
        results: &mpsc::UnboundedSender<PopulateResult>,
    ) -> Result<(), PipelineError> {
        match action {
            Action::Populate { country, page } => {
                let _ = results.send(PopulateResult::InFlight);
                let gateway = self.gateway.clone();
                let results = results.clone();
                tokio::spawn(async move {
                    let result = populate(gateway.as_ref(), &country, &page).await;
                    let _ = results.send(result);
                });
                Ok(())
            }
            unhandled @ Action::Ignore => Err(PipelineError::UnhandledAction(unhandled)),
        }
    }

    /// Runs one action to completion and returns its full result sequence.
    pub async fn process(&self, action: Action) -> Result<Vec<PopulateResult>, PipelineError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.dispatch(action, &tx)?;
        drop(tx);

        let mut results = Vec::with_capacity(2);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        Ok(results)
    }
}

async fn populate(gateway: &dyn NewsGateway, country: &str, page: &str) -> PopulateResult {
    engine_debug!("Populate country={} page={}", country, page);
    match gateway.fetch(country, page).await {
        Ok(news) => {
            if !news.is_ok() {
                engine_warn!(
                    "Page {} for {} returned status={} code={:?} message={:?}",
                    page,
                    country,
                    news.status,
                    news.code,
                    news.message
                );
            }
            PopulateResult::Success { news }
        }
        Err(error) => {
            engine_warn!("Page {} for {} failed: {}", page, country, error);
            PopulateResult::Failure { error }
        }
    }
}
