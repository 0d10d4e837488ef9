use std::sync::Arc;

use crate::client::ReplayClient;
use crate::coach::backend::CoachBackend;
use crate::store::MatchStore;

/// Shared state for all API handlers.
///
/// The client and coach backend are optional: without a replay API key the
/// server still serves stored data, and without a coach key every endpoint
/// except `/coaching` still works.
#[derive(Clone)]
pub struct AppState {
    pub store: MatchStore,
    pub client: Option<Arc<ReplayClient>>,
    pub coach: Option<Arc<dyn CoachBackend>>,
}
