//! # Errores del Servidor
//! src/error.rs
//!
//! Errores tipados de arranque y de requests. Los fallos de un subproceso
//! no aparecen aquí: se guardan como texto en el resultado del job.

use thiserror::Error;

/// Errores de configuración detectados antes de servir
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Program {0} does not exist")]
    ProgramNotFound(String),
}

/// Errores al interpretar el body de `POST /run`
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunRequestError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Missing or invalid field: flags")]
    MissingFlags,
}

/// Errores del loop del servidor HTTP
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
