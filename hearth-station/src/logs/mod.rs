//! Data service integration: best-effort snapshot persistence and history
//! queries.

mod forwarder;
mod queue;
mod reader;

pub use forwarder::LogForwarder;
pub use queue::{DEFAULT_CAPACITY, LogQueue, LogWorker};
pub use reader::LogReader;

use url::Url;

/// `{base}/{peripheral}/{action}` on the data service.
fn data_service_url(base: &Url, peripheral: &str, action: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    format!("{base}/{peripheral}/{action}")
}
