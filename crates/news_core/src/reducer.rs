use crate::{PopulateResult, ViewState};

/// How a successful page combines with the articles already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Each successful page replaces the list.
    #[default]
    Replace,
    /// Each successful page is appended to the list.
    Append,
}

/// Pure reducer: folds one result into the previous state.
pub fn reduce(state: ViewState, result: PopulateResult) -> ViewState {
    reduce_with(MergePolicy::Replace, state, result)
}

pub fn reduce_with(policy: MergePolicy, mut state: ViewState, result: PopulateResult) -> ViewState {
    match result {
        PopulateResult::InFlight => state,
        PopulateResult::Success { news } => {
            if !news.is_ok() {
                return state;
            }
            state.is_loaded = true;
            state.error = None;
            match policy {
                MergePolicy::Replace => state.articles = news.articles,
                MergePolicy::Append => state.articles.extend(news.articles),
            }
            state
        }
        PopulateResult::Failure { error } => {
            state.error = Some(error);
            state
        }
    }
}
