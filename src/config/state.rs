// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::error::StartupError;
use crate::handler::static_files::StaticResponder;

/// Application state
///
/// Built once at startup and shared through `Arc`; nothing in here is
/// mutated afterwards, so connections read it without locking.
pub struct AppState {
    pub config: Config,
    pub responder: StaticResponder,
}

impl AppState {
    /// Validate the site configuration and build the responder.
    ///
    /// Fails fast when the document root is missing or unreadable.
    pub fn new(config: Config) -> Result<Self, StartupError> {
        let responder = StaticResponder::new(&config.site)?;
        Ok(Self { config, responder })
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
