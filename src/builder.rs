use std::{path::PathBuf, sync::Arc};

use tokio::runtime::Runtime;

use crate::{Config, Engine, Result};

#[derive(Default)]
pub struct EngineBuilder {
    async_worker_thread_number: Option<u16>,
    config: Option<Config>,
    config_path: Option<PathBuf>,
    rt: Option<Arc<Runtime>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides `async_worker_thread_number` of the configuration.
    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.async_worker_thread_number = Some(n);
        self
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from a TOML file when the engine is built.
    pub fn config_path(
        mut self,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Runs the engine on an existing runtime instead of creating one.
    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn build(&self) -> Result<Engine> {
        let mut config = match (&self.config, &self.config_path) {
            (Some(config), _) => config.clone(),
            (None, Some(path)) => Config::create(path)?,
            (None, None) => Config::default(),
        };
        if let Some(n) = self.async_worker_thread_number {
            config.async_worker_thread_number = n;
        }

        match &self.rt {
            Some(runtime) => Ok(Engine::new(runtime.clone(), config)),
            None => Engine::new_with_config(config),
        }
    }
}
