//! # Apagado Ordenado
//! src/shutdown.rs
//!
//! `ShutdownSignal` es la bandera compartida entre el loop de accept, los
//! workers HTTP y el listener de señales. El listener solo la dispara: el
//! drenado de jobs lo hace el thread principal.

use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::signal::unix::{signal, SignalKind};

const SIGINT: i32 = 2;
const SIGTERM: i32 = 15;

/// Motivo del apagado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Señal POSIX recibida (número de señal)
    Signal(i32),

    /// El loop del servidor terminó por su cuenta
    ServerStopped,
}

impl ShutdownReason {
    /// Código de salida del proceso: el número de la señal recibida, o 0
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Signal(signo) => *signo,
            ShutdownReason::ServerStopped => 0,
        }
    }
}

/// Bandera de apagado que se dispara una sola vez
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<Option<ShutdownReason>>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispara el apagado. Solo el primer motivo queda registrado.
    ///
    /// Retorna `true` si esta llamada fue la que lo disparó.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut current = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_some() {
            return false;
        }
        *current = Some(reason);
        cvar.notify_all();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.reason().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que se dispare el apagado
    pub fn wait(&self) -> ShutdownReason {
        let (lock, cvar) = &*self.inner;
        let mut current = lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(reason) = *current {
                return reason;
            }
            current = cvar.wait(current).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Escucha SIGINT y SIGTERM en un thread dedicado con un runtime tokio
/// de un solo thread, y dispara `shutdown` al recibir la primera.
///
/// Los handlers se registran antes de retornar, de modo que un error de
/// instalación se reporta aquí y no dentro del thread.
pub fn install_signal_listener(shutdown: ShutdownSignal) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (mut sigterm, mut sigint) = {
        let _guard = runtime.enter();
        (
            signal(SignalKind::terminate())?,
            signal(SignalKind::interrupt())?,
        )
    };

    thread::Builder::new()
        .name("signal-listener".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let signo = tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown");
                        SIGTERM
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT, initiating graceful shutdown");
                        SIGINT
                    }
                };
                shutdown.trigger(ShutdownReason::Signal(signo));
            });
        })
}
