//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de jobs con soporte para argumentos CLI
//! y variables de entorno. Se parsea una sola vez al arrancar.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./job_server -P 8080 -T 4 -J stress-ng -M 5 --prefer-local false
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! JOB_SERVER_PORT=9000 JOB_SERVER_PROGRAM=echo ./job_server
//! ```

use crate::error::ConfigError;
use crate::jobs::AdmissionPolicy;
use clap::{ArgAction, Parser};

/// Configuración del servidor de jobs
#[derive(Debug, Clone, Parser)]
#[command(name = "job_server")]
#[command(about = "Servidor HTTP que ejecuta un programa externo como jobs concurrentes")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short = 'P', long, default_value = "8080", env = "JOB_SERVER_PORT")]
    pub port: u16,

    /// IP o nombre DNS en el que escucha
    #[arg(short = 'I', long = "ip", default_value = "0.0.0.0", env = "JOB_SERVER_IP")]
    pub host: String,

    /// Threads HTTP (0 = atender en el thread que acepta conexiones)
    #[arg(short = 'T', long = "threads", default_value = "10", env = "JOB_SERVER_THREADS")]
    pub http_threads: usize,

    /// Programa a ejecutar en cada job
    #[arg(short = 'J', long = "job", default_value = "stress-ng", env = "JOB_SERVER_PROGRAM")]
    pub program: String,

    /// Verificar que el programa existe antes de arrancar
    #[arg(
        short = 'C',
        long = "check-program",
        default_value_t = true,
        action = ArgAction::Set,
        env = "JOB_SERVER_CHECK_PROGRAM"
    )]
    pub check_program: bool,

    /// Preferir la copia local (./programa) sobre la del PATH
    #[arg(
        short = 'L',
        long = "prefer-local",
        default_value_t = true,
        action = ArgAction::Set,
        env = "JOB_SERVER_PREFER_LOCAL"
    )]
    pub prefer_local: bool,

    /// Máximo de jobs ejecutándose a la vez
    #[arg(short = 'M', long = "max-concurrent-jobs", default_value = "5", env = "JOB_SERVER_MAX_JOBS")]
    pub max_concurrent_jobs: usize,

    /// Momento en que un job cuenta contra el límite
    #[arg(long, value_enum, default_value = "reserve", env = "JOB_SERVER_ADMISSION")]
    pub admission: AdmissionPolicy,

    /// Shell usado para lanzar los comandos
    #[arg(long, default_value = "/bin/sh", env = "JOB_SERVER_SHELL")]
    pub shell: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use job_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Número efectivo de threads HTTP.
    ///
    /// 0 se respeta (modo de un solo thread); 1 se eleva a 2.
    pub fn effective_http_threads(&self) -> usize {
        match self.http_threads {
            1 => 2,
            n => n,
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_jobs == 0 {
            return Err(ConfigError::Invalid(
                "max concurrent jobs must be >= 1".to_string(),
            ));
        }
        if self.program.trim().is_empty() {
            return Err(ConfigError::Invalid("program must not be empty".to_string()));
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::Invalid("shell must not be empty".to_string()));
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        tracing::info!(
            address = %self.address(),
            http_threads = self.effective_http_threads(),
            program = %self.program,
            check_program = self.check_program,
            prefer_local = self.prefer_local,
            max_concurrent_jobs = self.max_concurrent_jobs,
            admission = ?self.admission,
            shell = %self.shell,
            "Server configuration"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto (los mismos valores que el CLI)
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            http_threads: 10,
            program: "stress-ng".to_string(),
            check_program: true,
            prefer_local: true,
            max_concurrent_jobs: 5,
            admission: AdmissionPolicy::Reserve,
            shell: "/bin/sh".to_string(),
        }
    }
}
