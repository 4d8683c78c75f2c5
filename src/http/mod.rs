//! # Módulo HTTP
//!
//! Implementación mínima de HTTP/1.0 (RFC 1945) para la API de jobs:
//!
//! - Parsing de requests, incluido el body de `POST`
//! - Construcción de responses de texto
//! - Status codes usados por la API
//!
//! HTTP/1.0 no mantiene conexiones persistentes: cada request se responde
//! y la conexión se cierra.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
