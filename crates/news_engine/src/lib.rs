//! News engine: fetch gateway, action processor and the session that folds
//! results into view state.
mod error;
mod gateway;
mod processor;
mod session;

pub use error::PipelineError;
pub use gateway::{FetchSettings, NewsGateway, ReqwestNewsGateway, TOP_HEADLINES_PATH};
pub use processor::ActionProcessor;
pub use session::{
    default_route, ActionRoute, IntentSender, NewsSession, SessionConfig, StateSubscription,
};
