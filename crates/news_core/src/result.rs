use crate::{FetchError, News};

/// Outcome of processing one `Populate` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateResult {
    InFlight,
    Success { news: News },
    Failure { error: FetchError },
}

impl PopulateResult {
    /// True for `Success` and `Failure`, the last result of an action.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PopulateResult::InFlight)
    }
}
