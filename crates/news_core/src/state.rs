use crate::{Article, FetchError};

/// Immutable snapshot the view renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub is_loaded: bool,
    pub error: Option<FetchError>,
    pub articles: Vec<Article>,
}

impl ViewState {
    pub fn idle() -> Self {
        Self::default()
    }
}
