//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! - Path desconocido: 404 Not Found
//! - Path conocido con otro método: 405 Method Not Allowed (con header `Allow`)
//! - `HEAD` usa el handler de `GET`; el servidor omite el body al escribir
//!
//! Los headers comunes (`Server`, `Connection: close`) los agrega el
//! servidor al escribir, con `add_common_headers`.

use crate::http::{Method, Request, Response, StatusCode};
use std::sync::Arc;

/// Un handler recibe el request y retorna la respuesta.
///
/// Es un closure compartible entre workers para que pueda capturar
/// estado (por ejemplo el `JobManager`).
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Router que mapea método y path a handlers
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<(Method, String, Handler)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use job_server::router::Router;
    /// use job_server::http::{Method, Request, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello", |_req: &Request| {
    ///     Response::text(StatusCode::Ok, "hello\n")
    /// });
    ///
    /// let request = Request::parse(b"GET /hello HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).status(), StatusCode::Ok);
    /// ```
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes
            .push((method, path.to_string(), Arc::new(handler)));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();
        let wanted = match request.method() {
            Method::HEAD => Method::GET,
            other => other,
        };

        let mut allowed: Vec<&'static str> = Vec::new();
        for (method, route_path, handler) in &self.routes {
            if route_path != path {
                continue;
            }
            if *method == wanted {
                return handler(request);
            }
            allowed.push(method.as_str());
        }

        if allowed.is_empty() {
            Response::text(StatusCode::NotFound, &format!("Route not found: {}\n", path))
        } else {
            Response::text(
                StatusCode::MethodNotAllowed,
                &format!("Method {} not allowed on {}\n", request.method().as_str(), path),
            )
            .with_header("Allow", &allowed.join(", "))
        }
    }

    /// Cantidad de rutas registradas
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Headers que lleva toda respuesta, también las que no pasan por el router
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "job_server/1.0");
    response.add_header("Connection", "close");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_router() -> Router {
        let mut router = Router::new();
        router.register(Method::GET, "/results", |_req: &Request| {
            Response::text(StatusCode::Ok, "report\n")
        });
        router.register(Method::POST, "/run", |_req: &Request| {
            Response::text(StatusCode::Accepted, "Command is running\n")
        });
        router
    }

    fn request(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap()
    }

    #[test]
    fn test_register_route() {
        assert!(Router::new().is_empty());
        assert_eq!(ok_router().len(), 2);
    }

    #[test]
    fn test_route_found() {
        let router = ok_router();

        let response = router.route(&request(b"GET /results HTTP/1.0\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);

        let response = router.route(&request(b"POST /run HTTP/1.0\r\n\r\n{}"));
        assert_eq!(response.status(), StatusCode::Accepted);
    }

    #[test]
    fn test_route_not_found() {
        let response = ok_router().route(&request(b"GET /nonexistent HTTP/1.0\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_wrong_method() {
        let response = ok_router().route(&request(b"GET /run HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("POST"));
    }

    #[test]
    fn test_head_uses_get_handler() {
        let response = ok_router().route(&request(b"HEAD /results HTTP/1.0\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_handler_captures_state() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let mut router = Router::new();
        router.register(Method::GET, "/count", move |_req: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Response::text(StatusCode::Ok, "")
        });

        router.route(&request(b"GET /count HTTP/1.0\r\n\r\n"));
        router.route(&request(b"GET /count HTTP/1.0\r\n\r\n"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_common_headers() {
        let mut response = Response::text(StatusCode::BadRequest, "bad\n");
        add_common_headers(&mut response);

        assert_eq!(response.header("Server"), Some("job_server/1.0"));
        assert_eq!(response.header("Connection"), Some("close"));
    }
}
