use crate::Intent;

/// Country requested when the session is not configured otherwise.
pub const DEFAULT_COUNTRY: &str = "eg";

/// Page requested by the initial intent.
pub const FIRST_PAGE: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Populate { country: String, page: String },
    /// Dropped before processing; any processor that receives it fails.
    Ignore,
}

impl Action {
    pub fn populate(country: impl Into<String>, page: impl Into<String>) -> Self {
        Action::Populate {
            country: country.into(),
            page: page.into(),
        }
    }
}

/// Translates an intent into the action that serves it.
pub fn action_from_intent(intent: &Intent, country: &str) -> Action {
    match intent {
        Intent::Initial => Action::populate(country, FIRST_PAGE),
        Intent::LoadMore { page } => Action::populate(country, page.to_string()),
    }
}
