//! # Tipos y Estructuras para el Sistema de Jobs
//! src/jobs/types.rs
//!
//! Define el registro de un job y los identificadores que se comparten
//! entre el manager y el thread que lo ejecuta.

use chrono::{DateTime, Local};

/// Estado de un job
///
/// Solo existe la transición `Running -> Finished`; admisión y despacho
/// son atómicos, así que no hay estado `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Job ejecutándose actualmente
    Running,

    /// Subproceso terminado (con éxito o no) y resultado disponible
    Finished,
}

/// Referencia a un job dentro del batch actual del registro.
///
/// Es un índice en el `Vec` del registro: sigue siendo válido mientras el
/// job esté `Running`, porque el registro solo se vacía cuando todos
/// terminaron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(pub(crate) usize);

impl JobHandle {
    /// ID visible del job (1-based dentro del batch)
    pub fn id(&self) -> usize {
        self.0 + 1
    }
}

/// Registro de un comando enviado y su resultado
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// ID dentro del batch actual
    pub id: usize,

    /// Programa configurado + flags del cliente
    pub command: String,

    /// Estado actual
    pub state: JobState,

    /// Salida combinada stdout/stderr (vacía mientras corre)
    pub result: String,

    /// Momento en que el executor arrancó el subproceso
    pub start_time: Option<DateTime<Local>>,

    /// Momento en que el subproceso terminó
    pub end_time: Option<DateTime<Local>>,
}

impl JobRecord {
    pub fn new(id: usize, command: String) -> Self {
        Self {
            id,
            command,
            state: JobState::Running,
            result: String::new(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }
}
