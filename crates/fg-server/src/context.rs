//! Application context shared across route handlers via Axum state.

use std::sync::Arc;

use fg_av::ToolRegistry;
use fg_core::config::Config;
use fg_pipeline::JobRunner;

use crate::jobs::JobSupervisor;

/// Central context passed to every route handler.
#[derive(Clone, Debug)]
pub struct AppContext {
    /// Configuration the server was started with.
    pub config: Arc<Config>,
    /// Discovered external tools.
    pub tools: Arc<ToolRegistry>,
    /// The job slot.
    pub jobs: Arc<JobSupervisor>,
}

impl AppContext {
    pub fn new(config: Config, tools: Arc<ToolRegistry>) -> Self {
        let runner = JobRunner::new(tools.clone(), &config);
        Self {
            config: Arc::new(config),
            tools,
            jobs: Arc::new(JobSupervisor::new(runner)),
        }
    }
}
