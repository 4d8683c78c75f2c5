//! # Executor de Jobs
//! src/jobs/executor.rs
//!
//! Corre un job admitido en su propio thread: lanza el comando a través del
//! shell, captura stdout y stderr combinados y publica el resultado en el
//! registro. Un exit status distinto de cero o un fallo al lanzar el
//! proceso no son errores aquí: se guardan como texto del resultado.

use crate::jobs::admission::AdmissionPolicy;
use crate::jobs::manager::Shared;
use crate::jobs::types::JobHandle;
use chrono::Local;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct JobExecutor {
    shell: String,
    policy: AdmissionPolicy,
}

impl JobExecutor {
    pub fn new(shell: impl Into<String>, policy: AdmissionPolicy) -> Self {
        Self {
            shell: shell.into(),
            policy,
        }
    }

    /// Ejecuta el comando y retorna su salida combinada.
    ///
    /// Bloquea hasta que el subproceso termina; no hay timeout.
    pub fn capture(&self, command: &str) -> String {
        // stderr se redirige dentro del shell para conservar el orden de escritura
        let script = format!("exec 2>&1\n{}", command);

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => {
                tracing::debug!(
                    command,
                    exit_code = ?output.status.code(),
                    "Subprocess exited"
                );
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                text
            }
            Err(e) => {
                tracing::error!(command, shell = %self.shell, error = %e, "Failed to launch subprocess");
                format!("Failed to launch '{}' with {}: {}\n", command, self.shell, e)
            }
        }
    }

    /// Cuerpo del thread de un job
    pub(crate) fn execute(&self, shared: &Shared, handle: JobHandle, command: &str) {
        let started = Local::now();
        {
            let mut state = shared.lock();
            state.registry.mark_started(handle, started);
            if self.policy == AdmissionPolicy::OnStart {
                state.in_flight += 1;
            }
        }
        tracing::info!(job_id = handle.id(), command, started_at = %started, "Job started");

        // Sin lock durante el subproceso
        let output = self.capture(command);
        let finished = Local::now();

        {
            let mut state = shared.lock();
            state.registry.mark_finished(handle, output, finished);
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        shared.job_done.notify_all();

        tracing::info!(job_id = handle.id(), command, finished_at = %finished, "Job finished");
    }
}
