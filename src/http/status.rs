//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Los códigos que el servidor de jobs puede devolver:
//!
//! - **2xx**: job aceptado (202) o reporte (200)
//! - **4xx**: body inválido, ruta desconocida, backpressure (429)
//! - **5xx**: apagado en curso (503)

/// Códigos de estado HTTP que soporta el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Reporte de resultados
    Ok = 200,

    /// 202 Accepted - Job admitido y corriendo en background
    Accepted = 202,

    /// 400 Bad Request - Body no es JSON o falta `flags`
    BadRequest = 400,

    /// 404 Not Found - Ruta desconocida
    NotFound = 404,

    /// 405 Method Not Allowed - Ruta conocida con otro método
    MethodNotAllowed = 405,

    /// 413 Payload Too Large - Request más grande que el buffer de lectura
    PayloadTooLarge = 413,

    /// 429 Too Many Requests - Se alcanzó el máximo de jobs concurrentes
    TooManyRequests = 429,

    /// 503 Service Unavailable - El servidor está drenando jobs para apagarse
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// ```
    /// use job_server::http::StatusCode;
    /// assert_eq!(StatusCode::Accepted.as_u16(), 202);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Accepted => "Accepted",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::TooManyRequests => "Too Many Requests",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "202 Accepted"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Accepted.as_u16(), 202);
        assert_eq!(StatusCode::TooManyRequests.as_u16(), 429);
        assert_eq!(StatusCode::ServiceUnavailable.as_u16(), 503);
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Accepted.to_string(), "202 Accepted");
        assert_eq!(StatusCode::TooManyRequests.to_string(), "429 Too Many Requests");
        assert_eq!(StatusCode::MethodNotAllowed.to_string(), "405 Method Not Allowed");
    }
}
