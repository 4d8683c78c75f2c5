//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP de la API de jobs:
//! 1. Escucha en `ip:puerto`
//! 2. Acepta conexiones sin bloquear, revisando la bandera de apagado
//! 3. Entrega cada conexión a un pool fijo de workers HTTP
//! 4. Cada worker lee un request, lo enruta y responde

pub mod pool;
pub mod tcp;

pub use pool::{ConnectionQueue, WorkerPool};
pub use tcp::{build_router, Server};
