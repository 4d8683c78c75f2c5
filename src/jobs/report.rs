//! # Reporte de Resultados
//! src/jobs/report.rs
//!
//! Formato de texto que devuelve `GET /results`.

use crate::jobs::types::{JobRecord, JobState};
use chrono::{DateTime, Local};

/// Mensaje cuando nunca se completó un batch y no hay jobs
pub const NO_JOB_MESSAGE: &str =
    "No job has been started. Please submit a POST request to /run.\n";

/// Layout de `ctime(3)` sin el salto de línea final
const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn format_time(time: Option<&DateTime<Local>>) -> String {
    match time {
        Some(t) => t.format(TIME_FORMAT).to_string(),
        None => "pending".to_string(),
    }
}

/// Renderiza un job: una línea si sigue corriendo, un bloque si terminó
pub fn render_record(record: &JobRecord) -> String {
    let start = format_time(record.start_time.as_ref());

    match record.state {
        JobState::Running => format!(
            "[Job {}] Results not ready for process: {} that started at {}\n",
            record.id, record.command, start
        ),
        JobState::Finished => format!(
            "[Job {}] Command: {}\nStart time: {}\nEnd time: {}\nResult:\n{}\n",
            record.id,
            record.command,
            start,
            format_time(record.end_time.as_ref()),
            record.result
        ),
    }
}

/// Renderiza todos los jobs en orden de envío.
///
/// Retorna el texto y si todos estaban terminados.
pub fn render_batch<'a, I>(records: I) -> (String, bool)
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut report = String::new();
    let mut all_finished = true;

    for record in records {
        report.push_str(&render_record(record));
        all_finished &= record.is_finished();
    }

    (report, all_finished)
}
