//! News core: pure intent, action, result and view-state types plus the
//! intent router and reducer.
mod action;
mod error;
mod intent;
mod model;
mod reducer;
mod result;
mod router;
mod state;

pub use action::{action_from_intent, Action, DEFAULT_COUNTRY, FIRST_PAGE};
pub use error::{FailureKind, FetchError};
pub use intent::Intent;
pub use model::{Article, ArticleSource, News, STATUS_OK};
pub use reducer::{reduce, reduce_with, MergePolicy};
pub use result::PopulateResult;
pub use router::{filter_intents, IntentFilter};
pub use state::ViewState;
