//! # Job Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, resuelve el programa, sirve la API y al recibir
//! SIGINT/SIGTERM drena los jobs antes de salir con el número de la señal.

use anyhow::Context;
use job_server::config::Config;
use job_server::jobs::{JobManager, JobManagerConfig};
use job_server::program;
use job_server::server::Server;
use job_server::shutdown::{self, ShutdownReason, ShutdownSignal};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(reason) => std::process::exit(reason.exit_code()),
        Err(e) => {
            tracing::error!(error = ?e, "Fatal error");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<ShutdownReason> {
    let config = Config::new();
    config.validate()?;

    if config.http_threads == 1 {
        tracing::warn!("A single HTTP thread is not supported, using 2");
    }
    config.log_summary();

    let program = program::resolve_program(&config.program, config.check_program, config.prefer_local)?;
    let manager = Arc::new(JobManager::new(JobManagerConfig::from_config(&config, program)));

    let server = Server::bind(&config, Arc::clone(&manager)).context("Failed to start HTTP server")?;

    let shutdown = ShutdownSignal::new();
    let _listener = shutdown::install_signal_listener(shutdown.clone())
        .context("Failed to install signal handlers")?;

    let serving = {
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("http-accept".to_string())
            .spawn(move || {
                let result = server.run(&shutdown);
                shutdown.trigger(ShutdownReason::ServerStopped);
                result
            })
            .context("Failed to spawn accept thread")?
    };

    let reason = shutdown.wait();
    tracing::info!(?reason, "Shutting down, waiting for running jobs");

    let joined = manager.drain();
    tracing::info!(jobs = joined, "All jobs finished");

    match serving.join() {
        Ok(result) => result.context("HTTP server failed")?,
        Err(_) => anyhow::bail!("Accept thread panicked"),
    }

    Ok(reason)
}
