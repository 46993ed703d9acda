//! Shared setup for commands that talk to providers.
//!
//! Loads the config file, starts file logging and owns the tokio runtime.

use std::future::Future;

use roadpilot::config::{config_file_path, ConfigFile};
use roadpilot::logging::{init_logging, WorkerGuard};
use roadpilot::provider::ReqwestClient;
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let log_guard = init_logging(&config.logging.directory, &config.logging.level)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("roadpilot-worker")
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = roadpilot::VERSION,
            command,
            config = %config_file_path().display(),
            log_dir = %self.config.logging.directory.display(),
            "RoadPilot starting"
        );
    }

    /// HTTP client with the given request timeout.
    pub fn http_client(&self, timeout_secs: u64) -> Result<ReqwestClient, CliError> {
        Ok(ReqwestClient::with_timeout(timeout_secs)?)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
