//! Tokio runtime construction

use loadgen_config::RuntimeConfig;
use tokio::runtime::{Builder, Runtime};

/// Build the multi-threaded runtime described by `config`
pub fn build_runtime(config: &RuntimeConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder
        .enable_all()
        .thread_name("loadgen-worker")
        .max_blocking_threads(config.max_blocking_threads);

    if let Some(workers) = config.worker_threads {
        builder.worker_threads(workers);
    }

    builder.build()
}
