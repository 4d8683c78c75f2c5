//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Respuestas HTTP/1.0 y su serialización al socket.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 202 Accepted\r\n
//! Content-Type: text/plain; charset=utf-8\r\n
//! Content-Length: 19\r\n
//! \r\n
//! Command is running
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use job_server::http::{Response, StatusCode};
//!
//! let response = Response::text(StatusCode::Accepted, "Command is running\n");
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 202 Accepted\r\n"));
//! ```

use super::StatusCode;
use std::io::{self, Write};

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Headers en orden de inserción; un nombre aparece una sola vez
    headers: Vec<(String, String)>,

    body: Vec<u8>,
}

impl Response {
    /// Respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Respuesta de texto plano.
    ///
    /// Todas las rutas del servidor responden texto: el reporte de
    /// resultados y los mensajes cortos de confirmación o error.
    ///
    /// ```
    /// use job_server::http::{Response, StatusCode};
    ///
    /// let response = Response::text(StatusCode::TooManyRequests, "Too many concurrent jobs\n");
    /// assert_eq!(response.status().as_u16(), 429);
    /// assert_eq!(response.header("content-length"), Some("25"));
    /// ```
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega o reemplaza un header (el nombre no distingue mayúsculas)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body y su `Content-Length`
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        let len = self.body.len().to_string();
        self.add_header("Content-Length", &len);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Escribe status line, headers y (salvo `head_only`) el body
    pub fn write_to<W: Write>(&self, out: &mut W, head_only: bool) -> io::Result<()> {
        write!(out, "HTTP/1.0 {}\r\n", self.status)?;
        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        out.write_all(b"\r\n")?;
        if !head_only {
            out.write_all(&self.body)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128 + self.body.len());
        // Escribir en un Vec no falla
        let _ = self.write_to(&mut bytes, false);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_add_header_replaces_case_insensitively() {
        let mut response = Response::new(StatusCode::Ok).with_header("X-Custom", "one");
        response.add_header("x-custom", "two");

        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("X-CUSTOM"), Some("two"));
    }

    #[test]
    fn test_text_response() {
        let response = Response::text(StatusCode::Accepted, "Command is running\n");

        assert_eq!(response.status(), StatusCode::Accepted);
        assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.header("Content-Length"), Some("19"));
        assert_eq!(response.body(), b"Command is running\n");
    }

    #[test]
    fn test_to_bytes_layout() {
        let response = Response::text(StatusCode::Ok, "Test");
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert_eq!(
            text,
            "HTTP/1.0 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: 4\r\n\r\nTest"
        );
    }

    #[test]
    fn test_head_only_omits_body() {
        let response = Response::text(StatusCode::Ok, "hidden");
        let mut out = Vec::new();
        response.write_to(&mut out, true).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 6\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_content_length_counts_trailing_newline() {
        let response = Response::text(StatusCode::TooManyRequests, "Too many concurrent jobs\n");
        assert_eq!(response.header("Content-Length"), Some("25"));
    }
}
