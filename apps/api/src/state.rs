use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::tailoring::tailor::ResumeTailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub tailor: ResumeTailor,
    pub config: Config,
    /// Cancelled on graceful shutdown; handlers hand a child token to in-flight work.
    pub shutdown: CancellationToken,
}
