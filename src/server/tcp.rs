//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Loop de accept no bloqueante que revisa la bandera de apagado entre
//! conexiones. Las conexiones se entregan al pool de workers HTTP o, con
//! 0 threads, se atienden en el mismo thread que acepta.

use crate::config::Config;
use crate::error::ServerError;
use crate::http::request::header_end;
use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::{handlers as job_handlers, JobManager};
use crate::router::{self, Router};
use crate::server::pool::WorkerPool;
use crate::shutdown::ShutdownSignal;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Tamaño máximo aceptado para un request completo
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Pausa del loop de accept cuando no hay conexiones pendientes
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Límite de espera por un cliente que no termina de enviar
const READ_TIMEOUT: Duration = Duration::from_secs(10);

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Servidor HTTP/1.0 de la API de jobs
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    http_threads: usize,
}

impl Server {
    /// Abre el socket de escucha. El puerto 0 elige uno libre.
    pub fn bind(config: &Config, job_manager: Arc<JobManager>) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        listener.set_nonblocking(true)?;

        tracing::info!(address = %listener.local_addr()?, "Server listening");

        Ok(Self {
            listener,
            router: Arc::new(build_router(job_manager)),
            http_threads: config.effective_http_threads(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Atiende conexiones hasta que se dispare `shutdown`.
    ///
    /// Al salir, los workers terminan los requests que ya estaban encolados.
    pub fn run(&self, shutdown: &ShutdownSignal) -> Result<(), ServerError> {
        let pool = if self.http_threads > 0 {
            let router = Arc::clone(&self.router);
            Some(WorkerPool::spawn(self.http_threads, move |stream: TcpStream| {
                serve(stream, &router);
            })?)
        } else {
            tracing::info!("Serving connections on the accept thread");
            None
        };

        while !shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "Accepted connection");
                    if let Err(e) = prepare_stream(&stream) {
                        tracing::warn!(%peer, error = %e, "Failed to configure connection");
                        continue;
                    }
                    match &pool {
                        Some(pool) => {
                            if pool.dispatch(stream).is_err() {
                                tracing::warn!(%peer, "Worker pool closed, dropping connection");
                            }
                        }
                        None => serve(stream, &self.router),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Accept loop stopped");
        if let Some(pool) = pool {
            pool.shutdown();
        }
        Ok(())
    }
}

/// Rutas de la API de jobs
pub fn build_router(job_manager: Arc<JobManager>) -> Router {
    let mut router = Router::new();

    let manager = Arc::clone(&job_manager);
    router.register(Method::POST, "/run", move |req: &Request| {
        job_handlers::run_handler(req, &manager)
    });

    let manager = job_manager;
    router.register(Method::GET, "/results", move |req: &Request| {
        job_handlers::results_handler(req, &manager)
    });

    router
}

/// El listener es no bloqueante; las conexiones aceptadas no deben serlo
fn prepare_stream(stream: &TcpStream) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))
}

fn serve(stream: TcpStream, router: &Router) {
    if let Err(e) = handle_connection(stream, router) {
        tracing::error!(error = %e, "Connection error");
    }
}

/// Resultado de leer un request del socket
enum ReadOutcome {
    Complete(Vec<u8>),
    TooLarge,
    Closed,
}

/// Lee hasta el fin de los headers más `Content-Length` bytes de body
fn read_request(stream: &mut TcpStream) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(if buffer.is_empty() {
                ReadOutcome::Closed
            } else {
                ReadOutcome::Complete(buffer)
            });
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(ReadOutcome::TooLarge);
        }

        if let Some(end) = header_end(&buffer) {
            let expected = end + 4 + declared_content_length(&buffer[..end]);
            if expected > MAX_REQUEST_BYTES {
                return Ok(ReadOutcome::TooLarge);
            }
            if buffer.len() >= expected {
                return Ok(ReadOutcome::Complete(buffer));
            }
        }
    }
}

/// `Content-Length` de la cabecera, o 0 si falta o es inválido
fn declared_content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

fn next_request_id() -> String {
    let mut hasher = DefaultHasher::new();
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
        .hash(&mut hasher);
    thread::current().id().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Atiende una conexión: un request, una respuesta, cierre
fn handle_connection(mut stream: TcpStream, router: &Router) -> io::Result<()> {
    let start = Instant::now();
    let request_id = next_request_id();

    let raw = match read_request(&mut stream)? {
        ReadOutcome::Complete(raw) => raw,
        ReadOutcome::Closed => {
            tracing::debug!("Peer closed without sending a request");
            return Ok(());
        }
        ReadOutcome::TooLarge => {
            let response = Response::text(StatusCode::PayloadTooLarge, "Request too large\n");
            return write_response(&mut stream, response, &request_id, false);
        }
    };

    let (response, method, path, head_only) = match Request::parse(&raw) {
        Ok(request) => (
            router.route(&request),
            request.method().as_str(),
            request.path().to_string(),
            request.method() == Method::HEAD,
        ),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed request");
            (
                Response::text(StatusCode::BadRequest, &format!("Invalid request: {}\n", e)),
                "-",
                String::from("-"),
                false,
            )
        }
    };

    let status = response.status().as_u16();
    write_response(&mut stream, response, &request_id, head_only)?;

    tracing::info!(
        request_id = %&request_id[..8],
        method,
        path = %path,
        status,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Request served"
    );
    Ok(())
}

fn write_response(
    stream: &mut TcpStream,
    mut response: Response,
    request_id: &str,
    head_only: bool,
) -> io::Result<()> {
    router::add_common_headers(&mut response);
    response.add_header("X-Request-Id", request_id);
    response.add_header("X-Worker-Thread", &format!("{:?}", thread::current().id()));
    response.add_header("X-Worker-Pid", &std::process::id().to_string());

    response.write_to(stream, head_only)?;
    stream.flush()
}
