use news_core::Action;
use thiserror::Error;

/// Faults that stop the whole session pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("unknown action type: {0:?}")]
    UnhandledAction(Action),
    #[error("failed to start session runtime: {0}")]
    Runtime(String),
    #[error("session pipeline stopped unexpectedly")]
    Stopped,
}
