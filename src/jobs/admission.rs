//! # Control de Admisión
//! src/jobs/admission.rs
//!
//! Decide si un job nuevo puede arrancar según cuántos están en vuelo.
//! Se consulta siempre con el lock del registro tomado.

use clap::ValueEnum;

/// Momento en que un job empieza a contar contra el límite
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdmissionPolicy {
    /// Se reserva el cupo al admitir, en la misma sección crítica que el chequeo
    Reserve,

    /// Se cuenta cuando el executor arranca; jobs admitidos a la vez pueden
    /// superar el límite por un instante
    OnStart,
}

/// Resultado del chequeo de capacidad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Accept,
    Reject { in_flight: usize, limit: usize },
}

pub fn try_admit(in_flight: usize, limit: usize) -> AdmissionDecision {
    if in_flight >= limit {
        AdmissionDecision::Reject { in_flight, limit }
    } else {
        AdmissionDecision::Accept
    }
}
