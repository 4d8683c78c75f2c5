//! # Pool de Workers HTTP
//! src/server/pool.rs
//!
//! El thread que acepta conexiones las encola en una cola FIFO bloqueante;
//! un número fijo de workers las toma y las atiende.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO thread-safe con cierre
pub struct ConnectionQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Notifica a los workers cuando hay items o la cola se cierra
    available: Condvar,
}

impl<T> ConnectionQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola un item. Si la cola está cerrada lo devuelve en `Err`.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);
        self.available.notify_one();
        Ok(())
    }

    /// Desencola el item más antiguo.
    ///
    /// Bloquea mientras la cola esté vacía y abierta. Retorna `None` solo
    /// cuando está cerrada y ya no quedan items.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Cierra la cola; los items pendientes todavía se entregan
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ConnectionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool fijo de workers que consumen una `ConnectionQueue`
pub struct WorkerPool<T: Send + 'static> {
    queue: Arc<ConnectionQueue<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Lanza `size` workers; cada uno ejecuta `handler` por item
    pub fn spawn<F>(size: usize, handler: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let queue = Arc::new(ConnectionQueue::new());
        let handler = Arc::new(handler);
        let mut workers = Vec::with_capacity(size);

        for index in 0..size {
            let worker_queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let spawned = thread::Builder::new()
                .name(format!("http-worker-{}", index))
                .spawn(move || {
                    while let Some(item) = worker_queue.pop() {
                        (*handler)(item);
                    }
                });

            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Liberar los workers ya lanzados antes de fallar
                    queue.close();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(e);
                }
            }
        }

        tracing::debug!(workers = size, "HTTP worker pool started");
        Ok(Self { queue, workers })
    }

    /// Entrega un item a algún worker libre
    pub fn dispatch(&self, item: T) -> Result<(), T> {
        self.queue.push(item)
    }

    #[cfg(test)]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Cierra la cola y espera a que los workers terminen lo pendiente
    pub fn shutdown(self) {
        self.queue.close();
        for worker in self.workers {
            if worker.join().is_err() {
                tracing::warn!("HTTP worker panicked");
            }
        }
    }
}
