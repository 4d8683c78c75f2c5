//! # Gestor Central de Jobs
//! src/jobs/manager.rs
//!
//! Coordina la ejecución de jobs: admisión, despacho a threads, reporte
//! de resultados y drenado al apagar.
//!
//! Todo el estado compartido (registro, contador en vuelo, cache del último
//! batch y handles de los threads) vive detrás de un único mutex. El lock
//! nunca se mantiene mientras corre un subproceso.

use crate::jobs::admission::{self, AdmissionDecision, AdmissionPolicy};
use crate::jobs::executor::JobExecutor;
use crate::jobs::registry::JobRegistry;
use chrono::Local;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Configuración del Job Manager
#[derive(Debug, Clone)]
pub struct JobManagerConfig {
    /// Programa (ya resuelto) que se ejecuta en cada job
    pub program: String,

    /// Máximo de jobs en vuelo
    pub max_concurrent_jobs: usize,

    /// Cuándo cuenta un job contra el límite
    pub admission: AdmissionPolicy,

    /// Shell usado para lanzar los comandos
    pub shell: String,
}

impl Default for JobManagerConfig {
    fn default() -> Self {
        Self {
            program: "stress-ng".to_string(),
            max_concurrent_jobs: 5,
            admission: AdmissionPolicy::Reserve,
            shell: "/bin/sh".to_string(),
        }
    }
}

impl JobManagerConfig {
    /// Crea una configuración desde el Config principal y el programa resuelto
    pub fn from_config(config: &crate::config::Config, program: String) -> Self {
        Self {
            program,
            max_concurrent_jobs: config.max_concurrent_jobs,
            admission: config.admission,
            shell: config.shell.clone(),
        }
    }
}

/// Resultado de `submit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Job registrado y despachado
    Accepted { id: usize },

    /// Sin capacidad; el cliente debe reintentar
    Rejected { in_flight: usize, limit: usize },

    /// El servidor está drenando y no acepta trabajo nuevo
    ShuttingDown,
}

/// Foto de los contadores internos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerStats {
    pub tracked: usize,
    pub running: usize,
    pub in_flight: usize,
}

pub(crate) struct ManagerState {
    pub(crate) registry: JobRegistry,
    pub(crate) in_flight: usize,
    workers: Vec<JoinHandle<()>>,
    shutting_down: bool,
}

pub(crate) struct Shared {
    state: Mutex<ManagerState>,
    pub(crate) job_done: Condvar,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Gestor central de jobs
pub struct JobManager {
    config: JobManagerConfig,
    executor: JobExecutor,
    shared: Arc<Shared>,
}

impl JobManager {
    pub fn new(config: JobManagerConfig) -> Self {
        let executor = JobExecutor::new(config.shell.clone(), config.admission);
        Self {
            config,
            executor,
            shared: Arc::new(Shared {
                state: Mutex::new(ManagerState {
                    registry: JobRegistry::new(),
                    in_flight: 0,
                    workers: Vec::new(),
                    shutting_down: false,
                }),
                job_done: Condvar::new(),
            }),
        }
    }

    /// Arma el comando completo: programa configurado + flags del cliente
    pub fn command_for(&self, flags: &str) -> String {
        format!("{} {}", self.config.program, flags)
    }

    /// Admite y despacha un comando.
    ///
    /// El chequeo de capacidad, la creación del registro y el despacho
    /// ocurren en la misma sección crítica: un rechazo nunca deja rastro.
    pub fn submit(&self, command: String) -> SubmitOutcome {
        let mut state = self.shared.lock();

        if state.shutting_down {
            tracing::warn!(command = %command, "Rejecting job during shutdown");
            return SubmitOutcome::ShuttingDown;
        }

        // Los threads que ya terminaron no hace falta esperarlos al apagar
        state.workers.retain(|worker| !worker.is_finished());

        if let AdmissionDecision::Reject { in_flight, limit } =
            admission::try_admit(state.in_flight, self.config.max_concurrent_jobs)
        {
            tracing::warn!(in_flight, limit, command = %command, "Too many concurrent jobs");
            return SubmitOutcome::Rejected { in_flight, limit };
        }

        let handle = state.registry.allocate(command.clone());
        if self.config.admission == AdmissionPolicy::Reserve {
            state.in_flight += 1;
        }

        let shared = Arc::clone(&self.shared);
        let executor = self.executor.clone();
        let spawned = thread::Builder::new()
            .name(format!("job-{}", handle.id()))
            .spawn(move || executor.execute(&shared, handle, &command));

        match spawned {
            Ok(worker) => state.workers.push(worker),
            Err(e) => {
                // El job queda terminado con el error como resultado
                tracing::error!(job_id = handle.id(), error = %e, "Failed to spawn job thread");
                state.registry.mark_finished(
                    handle,
                    format!("Failed to start job thread: {}\n", e),
                    Local::now(),
                );
                if self.config.admission == AdmissionPolicy::Reserve {
                    state.in_flight = state.in_flight.saturating_sub(1);
                }
            }
        }

        SubmitOutcome::Accepted { id: handle.id() }
    }

    /// Reporte del batch actual (o del último completo)
    pub fn snapshot(&self) -> String {
        self.shared.lock().registry.snapshot_and_maybe_clear()
    }

    pub fn stats(&self) -> ManagerStats {
        let state = self.shared.lock();
        ManagerStats {
            tracked: state.registry.len(),
            running: state.registry.running_count(),
            in_flight: state.in_flight,
        }
    }

    #[cfg(test)]
    pub fn is_shutting_down(&self) -> bool {
        self.shared.lock().shutting_down
    }

    /// Marca el apagado y despierta a quien esté esperando
    pub fn begin_shutdown(&self) {
        self.shared.lock().shutting_down = true;
        self.shared.job_done.notify_all();
    }

    /// Bloquea hasta que no quede ningún job en vuelo
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock();
        while state.in_flight > 0 {
            tracing::info!(in_flight = state.in_flight, "Waiting for running jobs");
            state = self
                .shared
                .job_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Deja de admitir, espera a los jobs en vuelo y hace join de todos los
    /// threads despachados. Retorna cuántos threads se esperaron.
    pub fn drain(&self) -> usize {
        self.begin_shutdown();
        self.wait_idle();

        let mut joined = 0;
        loop {
            let workers = std::mem::take(&mut self.shared.lock().workers);
            if workers.is_empty() {
                break;
            }
            for worker in workers {
                if worker.join().is_err() {
                    tracing::warn!("Job thread panicked");
                }
                joined += 1;
            }
        }

        tracing::info!(joined, "All jobs drained");
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn manager(max: usize, policy: AdmissionPolicy) -> JobManager {
        JobManager::new(JobManagerConfig {
            program: "echo".to_string(),
            max_concurrent_jobs: max,
            admission: policy,
            shell: "/bin/sh".to_string(),
        })
    }

    fn wait_until(manager: &JobManager, cond: impl Fn(ManagerStats) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond(manager.stats()) {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_command_for_joins_program_and_flags() {
        let manager = manager(1, AdmissionPolicy::Reserve);
        assert_eq!(manager.command_for("-n hi"), "echo -n hi");
    }

    #[test]
    fn test_snapshot_without_jobs() {
        let manager = manager(1, AdmissionPolicy::Reserve);
        assert_eq!(manager.snapshot(), crate::jobs::report::NO_JOB_MESSAGE);
    }

    #[test]
    fn test_echo_round_trip() {
        let manager = manager(2, AdmissionPolicy::Reserve);
        let outcome = manager.submit("echo hello".to_string());
        assert_eq!(outcome, SubmitOutcome::Accepted { id: 1 });

        wait_until(&manager, |s| s.running == 0);

        let report = manager.snapshot();
        assert!(report.contains("[Job 1] Command: echo hello"));
        assert!(report.contains("Result:\nhello\n"));
        assert_eq!(manager.stats().tracked, 0);

        // El cache se sirve tal cual mientras no haya jobs nuevos
        assert_eq!(manager.snapshot(), report);
    }

    #[test]
    fn test_rejection_at_capacity_leaves_no_record() {
        let manager = manager(2, AdmissionPolicy::Reserve);

        assert!(matches!(manager.submit("sleep 1".to_string()), SubmitOutcome::Accepted { .. }));
        assert!(matches!(manager.submit("sleep 1".to_string()), SubmitOutcome::Accepted { .. }));
        assert_eq!(
            manager.submit("sleep 1".to_string()),
            SubmitOutcome::Rejected { in_flight: 2, limit: 2 }
        );

        let stats = manager.stats();
        assert_eq!(stats.tracked, 2);
        assert!(stats.running <= 2);

        manager.drain();
    }

    #[test]
    fn test_cap_plus_one_yields_single_rejection() {
        let manager = manager(3, AdmissionPolicy::Reserve);

        let rejected = (0..4)
            .map(|_| manager.submit("sleep 1".to_string()))
            .filter(|o| matches!(o, SubmitOutcome::Rejected { .. }))
            .count();

        assert_eq!(rejected, 1);
        manager.drain();
    }

    #[test]
    fn test_snapshot_while_running_keeps_records() {
        let manager = manager(2, AdmissionPolicy::Reserve);
        manager.submit("echo quick".to_string());
        manager.submit("sleep 1".to_string());

        wait_until(&manager, |s| s.running == 1);

        let report = manager.snapshot();
        assert!(report.contains("[Job 2] Results not ready for process: sleep 1"));
        assert_eq!(manager.stats().tracked, 2);

        manager.drain();
    }

    #[test]
    fn test_drain_waits_for_running_jobs() {
        let manager = manager(3, AdmissionPolicy::Reserve);
        for _ in 0..3 {
            manager.submit("sleep 0.3".to_string());
        }

        let started = Instant::now();
        let joined = manager.drain();

        assert_eq!(joined, 3);
        assert!(started.elapsed() >= Duration::from_millis(250));

        let stats = manager.stats();
        assert_eq!(stats.running, 0);
        assert_eq!(stats.in_flight, 0);
    }

    #[test]
    fn test_submit_after_shutdown_is_refused() {
        let manager = manager(2, AdmissionPolicy::Reserve);
        manager.begin_shutdown();

        assert!(manager.is_shutting_down());
        assert_eq!(manager.submit("echo late".to_string()), SubmitOutcome::ShuttingDown);
        assert_eq!(manager.stats().tracked, 0);
    }

    #[test]
    fn test_on_start_policy_counts_when_running() {
        let manager = manager(1, AdmissionPolicy::OnStart);
        manager.submit("sleep 0.5".to_string());

        wait_until(&manager, |s| s.in_flight == 1);
        assert!(matches!(
            manager.submit("echo blocked".to_string()),
            SubmitOutcome::Rejected { .. }
        ));

        manager.drain();
        assert_eq!(manager.stats().in_flight, 0);
    }

    #[test]
    fn test_failed_command_still_finishes() {
        let manager = manager(1, AdmissionPolicy::Reserve);
        manager.submit("sh -c 'echo broken >&2; exit 7'".to_string());

        wait_until(&manager, |s| s.running == 0);
        let report = manager.snapshot();
        assert!(report.contains("broken"));
    }
}
