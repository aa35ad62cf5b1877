//! Application state shared by every handler and socket.
//!
//! This module owns:
//!   - the validated content catalog (read-only after startup)
//!   - the student roster
//!   - the assessment result ledger
//!   - the loaded config (static dir, timings, submit timeout)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use crate::assessment::sink::{ResultLedger, ResultSink};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::roster::StudentStore;

pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub roster: StudentStore,
    pub ledger: ResultLedger,
    pub config: AppConfig,
}

impl AppState {
    /// Build state from config. A bad catalog or unreadable roster file aborts startup.
    #[instrument(level = "info", skip_all)]
    pub async fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog = Arc::new(Catalog::load(config.content_path.as_deref())?);

        let roster = StudentStore::open(config.roster_path.as_ref().map(PathBuf::from)).await?;
        if config.seed_roster {
            roster.seed_demo().await?;
        }

        info!(
            target: "phonics_backend",
            static_dir = %config.static_dir,
            submit_timeout_ms = config.submit_timeout_ms,
            "Application state ready"
        );
        Ok(Self { catalog, roster, ledger: ResultLedger::new(), config })
    }

    /// Built-in catalog, in-memory roster and ledger.
    pub fn in_memory(config: AppConfig) -> Result<Self, crate::error::ContentError> {
        Ok(Self {
            catalog: Arc::new(Catalog::builtin()?),
            roster: StudentStore::in_memory(),
            ledger: ResultLedger::new(),
            config,
        })
    }

    pub fn sink(&self) -> &dyn ResultSink {
        &self.ledger
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.config.submit_timeout_ms)
    }
}
