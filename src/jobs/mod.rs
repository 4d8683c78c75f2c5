//! # Sistema de Jobs
//!
//! Ejecuta el programa configurado como jobs en background, limitados por
//! un máximo de concurrencia, y agrega sus resultados por batch.
//!
//! ## Endpoints
//!
//! - `POST /run` - Lanzar un job con `{"flags": "..."}`
//! - `GET /results` - Reporte del batch actual o del último completo

pub mod admission;
pub mod executor;
pub mod handlers;
pub mod manager;
pub mod registry;
pub mod report;
pub mod types;

pub use admission::AdmissionPolicy;
pub use manager::{JobManager, JobManagerConfig, SubmitOutcome};
pub use types::{JobHandle, JobRecord, JobState};
