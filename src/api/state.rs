use std::sync::Arc;

use tokio::sync::Mutex;

use crate::tracker::Tracker;

/// Shared handler state. The mutex serializes every ledger operation, so a
/// dedup check and the writes that follow it can't interleave with another
/// request.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
