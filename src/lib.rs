//! # Job Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que ejecuta un programa externo configurado (por
//! defecto `stress-ng`) como jobs concurrentes en background, limita
//! cuántos corren a la vez y agrega sus resultados en un reporte de texto.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `router`: Enrutamiento por método y path
//! - `server`: Loop de accept y pool de workers HTTP
//! - `jobs`: Registro, admisión, ejecución y reporte de jobs
//! - `config`: Configuración por CLI y variables de entorno
//! - `program`: Ubicación del programa a ejecutar
//! - `shutdown`: Señales y apagado ordenado
//! - `error`: Errores tipados
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use job_server::config::Config;
//! use job_server::jobs::{JobManager, JobManagerConfig};
//! use job_server::server::Server;
//! use job_server::shutdown::ShutdownSignal;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let manager = Arc::new(JobManager::new(JobManagerConfig::from_config(
//!     &config,
//!     config.program.clone(),
//! )));
//! let server = Server::bind(&config, Arc::clone(&manager)).unwrap();
//! server.run(&ShutdownSignal::new()).unwrap();
//! manager.drain();
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod program;
pub mod router;
pub mod server;
pub mod shutdown;
