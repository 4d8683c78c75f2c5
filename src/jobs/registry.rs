//! # Registro de Jobs
//! src/jobs/registry.rs
//!
//! Colección ordenada de jobs del batch actual más el cache del último
//! batch completo. No tiene sincronización propia: el `JobManager` lo
//! guarda detrás de su único mutex.

use crate::jobs::report::{self, NO_JOB_MESSAGE};
use crate::jobs::types::{JobHandle, JobRecord, JobState};
use chrono::{DateTime, Local};

#[derive(Debug, Default)]
pub struct JobRegistry {
    records: Vec<JobRecord>,
    last_batch: String,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un job nuevo en estado `Running`
    pub fn allocate(&mut self, command: String) -> JobHandle {
        let handle = JobHandle(self.records.len());
        self.records.push(JobRecord::new(handle.id(), command));
        handle
    }

    pub fn mark_started(&mut self, handle: JobHandle, at: DateTime<Local>) {
        if let Some(record) = self.records.get_mut(handle.0) {
            record.start_time = Some(at);
        }
    }

    /// Publica el resultado de un job. Solo la primera llamada tiene efecto.
    pub fn mark_finished(
        &mut self,
        handle: JobHandle,
        result: String,
        at: DateTime<Local>,
    ) -> bool {
        match self.records.get_mut(handle.0) {
            Some(record) if record.state == JobState::Running => {
                record.result = result;
                record.end_time = Some(at);
                record.state = JobState::Finished;
                true
            }
            _ => {
                tracing::warn!(job_id = handle.id(), "Ignoring duplicate or stale job completion");
                false
            }
        }
    }

    /// Renderiza el batch actual y lo archiva si todos los jobs terminaron
    pub fn snapshot_and_maybe_clear(&mut self) -> String {
        if self.records.is_empty() {
            if self.last_batch.is_empty() {
                return NO_JOB_MESSAGE.to_string();
            }
            return self.last_batch.clone();
        }

        let (rendered, all_finished) = report::render_batch(&self.records);
        if all_finished {
            self.last_batch = rendered.clone();
            self.records.clear();
        }
        rendered
    }

    #[cfg(test)]
    pub fn get(&self, handle: JobHandle) -> Option<&JobRecord> {
        self.records.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_finished()).count()
    }

    #[cfg(test)]
    pub fn last_batch(&self) -> &str {
        &self.last_batch
    }
}
