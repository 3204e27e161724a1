//! monoio runtime wrapper
//!
//! The fusion driver uses io_uring where the kernel allows it and falls back
//! to epoll otherwise. The timer is always enabled: settlement polling and
//! fetch deadlines both sleep on it.

use monoio::{FusionDriver, RuntimeBuilder};
use tracing::info;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name used in startup logs
    pub thread_name: String,
    /// io_uring submission queue size, `None` for the monoio default
    pub entries: Option<u32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_name: "bitbot-main".to_string(),
            entries: None,
        }
    }
}

pub struct BotRuntime {
    config: RuntimeConfig,
}

impl BotRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Build the runtime and drive `f` to completion on the current thread
    pub fn start<F, Fut>(self, f: F) -> std::io::Result<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future,
    {
        let mut builder = RuntimeBuilder::<FusionDriver>::new();
        if let Some(entries) = self.config.entries {
            builder = builder.with_entries(entries);
        }
        let mut runtime = builder.enable_timer().build()?;

        info!("▶️  Starting runtime on {}", self.config.thread_name);
        let output = runtime.block_on(f());
        info!("⏹️  Runtime on {} stopped", self.config.thread_name);
        Ok(output)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for BotRuntime {
    fn default() -> Self {
        Self::new()
    }
}
