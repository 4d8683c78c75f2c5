//! # Ubicación del Programa
//! src/program.rs
//!
//! Decide qué programa ejecutan los jobs: la copia local (`./programa`),
//! la del `PATH`, o ninguna si no existe.

use crate::error::ConfigError;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Dónde se encontró el programa
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramLocation {
    NotFound,
    PathOnly,
    LocalOnly,
    Both,
}

impl ProgramLocation {
    fn from_flags(local: bool, on_path: bool) -> Self {
        match (local, on_path) {
            (true, true) => ProgramLocation::Both,
            (true, false) => ProgramLocation::LocalOnly,
            (false, true) => ProgramLocation::PathOnly,
            (false, false) => ProgramLocation::NotFound,
        }
    }
}

/// Busca `name` en el directorio actual y en el `PATH` del proceso
pub fn locate_program(name: &str) -> ProgramLocation {
    locate_in(name, Path::new("."), std::env::var_os("PATH").as_deref())
}

/// Archivo regular con algún bit de ejecución, igual que lo exige `which`
fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn locate_in(name: &str, local_dir: &Path, path_var: Option<&OsStr>) -> ProgramLocation {
    if name.contains('/') {
        // Un nombre con ruta se usa tal cual: ni copia local ni búsqueda en el PATH
        let found = is_executable(Path::new(name));
        return ProgramLocation::from_flags(false, found);
    }

    let local = is_executable(&local_dir.join(name));
    let on_path = path_var
        .map(|path| std::env::split_paths(path).any(|dir| is_executable(&dir.join(name))))
        .unwrap_or(false);
    ProgramLocation::from_flags(local, on_path)
}

/// Resuelve el programa efectivo a partir de su ubicación.
///
/// Con `check` activo, un programa inexistente es un error de arranque.
/// Si existe en ambos lugares y `prefer_local` está activo se usa `./name`.
pub fn resolve_program(name: &str, check: bool, prefer_local: bool) -> Result<String, ConfigError> {
    resolve_at(name, locate_program(name), check, prefer_local)
}

fn resolve_at(
    name: &str,
    location: ProgramLocation,
    check: bool,
    prefer_local: bool,
) -> Result<String, ConfigError> {
    match location {
        ProgramLocation::NotFound if check => Err(ConfigError::ProgramNotFound(name.to_string())),
        ProgramLocation::Both if prefer_local && !name.contains('/') => {
            tracing::info!(program = name, "Using local copy of program");
            Ok(format!("./{}", name))
        }
        _ => Ok(name.to_string()),
    }
}
