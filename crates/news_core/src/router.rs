use crate::Intent;

/// Forwards the first `Initial` intent only, and every `LoadMore`.
///
/// A view re-attaching after teardown sends `Initial` again; dropping it keeps
/// the session from reloading data it already holds.
#[derive(Debug, Clone, Default)]
pub struct IntentFilter {
    initial_seen: bool,
}

impl IntentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, intent: &Intent) -> bool {
        match intent {
            Intent::Initial => !std::mem::replace(&mut self.initial_seen, true),
            Intent::LoadMore { .. } => true,
        }
    }
}

/// Applies a fresh [`IntentFilter`] to a whole sequence.
pub fn filter_intents(intents: impl IntoIterator<Item = Intent>) -> Vec<Intent> {
    let mut filter = IntentFilter::new();
    intents
        .into_iter()
        .filter(|intent| filter.accept(intent))
        .collect()
}
